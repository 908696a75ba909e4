//! Column layout and value-label dictionary types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Zero-based, end-exclusive byte range of a field within a record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Builds a span from a 1-based starting column and a field width.
    ///
    /// Returns `None` for column 0, a zero width, or an end past `usize::MAX`.
    pub fn from_column(column: usize, width: usize) -> Option<Self> {
        if column == 0 || width == 0 {
            return None;
        }
        let start = column - 1;
        let end = start.checked_add(width)?;
        Some(Self { start, end })
    }

    /// Slices `line`, clamping to its length. Short lines yield a shorter
    /// (possibly empty) slice rather than failing.
    pub fn slice(self, line: &[u8]) -> &[u8] {
        let start = self.start.min(line.len());
        let end = self.end.min(line.len()).max(start);
        &line[start..end]
    }
}

/// One requested variable from the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Variable code (e.g. `v101`).
    pub code: String,
    /// Descriptive label, may be empty.
    pub label: String,
    pub span: ByteSpan,
    /// Secondary identifier ("svar"), may be empty.
    pub tag: String,
}

impl VariableSpec {
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        span: ByteSpan,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            span,
            tag: tag.into(),
        }
    }
}

/// Mapping of stripped raw values to stripped labels for one variable.
///
/// An empty-string label is a hit, distinct from a value with no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLabelTable {
    labels: BTreeMap<String, String>,
}

impl ValueLabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value/label pair; later definitions of the same value win.
    pub fn insert(&mut self, value: &str, label: &str) {
        self.labels
            .insert(value.trim().to_string(), label.trim().to_string());
    }

    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.labels.get(value).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for ValueLabelTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (value, label) in iter {
            table.insert(value.as_ref(), label.as_ref());
        }
        table
    }
}

/// The four schema collections in schema-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaParts {
    pub byte_spans: Vec<ByteSpan>,
    pub var_labels: Vec<(String, String)>,
    pub value_labels: BTreeMap<String, ValueLabelTable>,
    pub tags: Vec<(String, String)>,
}

/// Accepted variables and their value-label tables.
///
/// Variable order is the order of first appearance in the schema source and
/// drives column order downstream. Every accepted variable has a table entry,
/// possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    variables: Vec<VariableSpec>,
    value_labels: BTreeMap<String, ValueLabelTable>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable. Returns `false` (and leaves the schema unchanged)
    /// when the code is already present.
    pub fn push_variable(&mut self, spec: VariableSpec) -> bool {
        if self.contains(&spec.code) {
            return false;
        }
        self.value_labels.entry(spec.code.clone()).or_default();
        self.variables.push(spec);
        true
    }

    /// Adds a value label to an accepted variable. Unknown codes are ignored.
    pub fn insert_value_label(&mut self, code: &str, value: &str, label: &str) {
        if let Some(table) = self.value_labels.get_mut(code) {
            table.insert(value, label);
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.variables.iter().any(|v| v.code == code)
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn variable(&self, code: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.code == code)
    }

    pub fn value_labels(&self, code: &str) -> Option<&ValueLabelTable> {
        self.value_labels.get(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Requested codes with no variable in this schema, in request order.
    pub fn missing_codes<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        requested
            .iter()
            .filter_map(|code| {
                let code: &str = code.as_ref();
                (!self.contains(code)).then(|| code.to_string())
            })
            .collect()
    }

    pub fn into_parts(self) -> SchemaParts {
        let byte_spans = self.variables.iter().map(|v| v.span).collect();
        let var_labels = self
            .variables
            .iter()
            .map(|v| (v.code.clone(), v.label.clone()))
            .collect();
        let tags = self
            .variables
            .iter()
            .map(|v| (v.code.clone(), v.tag.clone()))
            .collect();
        SchemaParts {
            byte_spans,
            var_labels,
            value_labels: self.value_labels,
            tags,
        }
    }
}
