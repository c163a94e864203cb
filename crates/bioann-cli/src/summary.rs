use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bioann_core::{PipelineStats, RowFailure};

pub fn print_summary(output_path: &Path, stats: &PipelineStats, failures: &[RowFailure]) {
    println!("Output: {}", output_path.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Input rows"), Cell::new(stats.input_rows)]);
    table.add_row(vec![
        Cell::new("Output rows"),
        Cell::new(stats.output_rows).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Matched lines"), Cell::new(stats.matched_lines)]);
    table.add_row(vec![
        Cell::new("Rows without matches"),
        dim_or_plain(stats.zero_match_rows),
    ]);
    table.add_row(vec![
        Cell::new("Malformed lines"),
        count_cell(stats.malformed_lines, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Unresolved class lookups"),
        count_cell(stats.unresolved_lookups, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Skipped rows"),
        count_cell(stats.skipped_rows, Color::Red),
    ]);
    println!("{table}");

    if !failures.is_empty() {
        print_failure_table(failures);
    }
}

fn print_failure_table(failures: &[RowFailure]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Row"), header_cell("Error")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for failure in failures {
        table.add_row(vec![
            Cell::new(failure.row_index),
            Cell::new(&failure.message).fg(Color::Red),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_or_plain(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
