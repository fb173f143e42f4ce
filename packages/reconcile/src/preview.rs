//! Text preview of the updated table.

use std::fmt::Write as _;

use payroll_recon_employee_models::{Cell, ColumnSlot, EmployeeTable};

/// Shown for absent values.
const ABSENT: &str = "-";

/// Renders the first `rows` rows of `table` as an aligned text table, with
/// a leading row index and a trailing size line.
#[must_use]
pub fn render_preview(table: &EmployeeTable, rows: usize) -> String {
    let mut grid: Vec<Vec<String>> = Vec::new();

    let mut header = vec![String::new()];
    header.extend(table.columns().iter().map(|c| ColumnSlot::header(c).to_owned()));
    grid.push(header);

    for (index, record) in table.rows().iter().take(rows).enumerate() {
        let mut line = vec![index.to_string()];
        line.extend(table.cells(record).iter().map(format_cell));
        grid.push(line);
    }

    let widths: Vec<usize> = (0..grid[0].len())
        .map(|col| {
            grid.iter()
                .map(|line| line.get(col).map_or(0, |s| s.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in &grid {
        let rendered: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();
        writeln!(out, "{}", rendered.join("  ").trim_end()).unwrap();
    }

    if table.len() > rows {
        writeln!(out, "... {} more row(s)", table.len() - rows).unwrap();
    }
    write!(
        out,
        "[{} rows x {} columns]",
        table.len(),
        table.columns().len()
    )
    .unwrap();

    out
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Empty => ABSENT.to_owned(),
        Cell::Number(n) => format!("{n:.2}"),
        other => other.to_string(),
    }
}
