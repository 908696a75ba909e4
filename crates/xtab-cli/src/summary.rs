use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use xtab_cli::pipeline::RunResult;

/// Prints the crosstab rows as a table on stderr.
pub fn print_preview(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Label"),
        header_cell("Frequency"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if let Some(column) = table.column_mut(2) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for row in result.crosstab.rows() {
        table.add_row(vec![
            Cell::new(&row.composite_code),
            Cell::new(&row.composite_label),
            Cell::new(row.frequency),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} combinations", result.crosstab.len())).fg(Color::DarkGrey),
        Cell::new(result.crosstab.total()).add_attribute(Attribute::Bold),
    ]);
    eprintln!("Sample: {} ({} records)", result.sample, result.records);
    eprintln!("{table}");
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
