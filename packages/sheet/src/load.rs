//! Loads the employee table from a workbook.

use std::path::Path;

use calamine::{Data, Reader as _};
use payroll_recon_employee_models::{Cell, Column, ColumnSlot, EmployeeRecord, EmployeeTable};

use crate::{ColumnMapping, SheetError};

/// Reads `worksheet` (or the first worksheet) of the workbook at `path`.
///
/// The first row is the header. Headers matching a label in `mapping` are
/// renamed to their canonical column, all others are carried through.
///
/// # Errors
///
/// * [`SheetError::Open`] if the workbook cannot be opened
/// * [`SheetError::NoWorksheet`] if it has no worksheet
/// * [`SheetError::MissingColumn`] if a mapped label is not in the header
pub fn load_table(
    path: &Path,
    worksheet: Option<&str>,
    mapping: &ColumnMapping,
) -> Result<EmployeeTable, SheetError> {
    let mut workbook = calamine::open_workbook_auto(path).map_err(|source| SheetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let range = match worksheet {
        Some(name) => workbook.worksheet_range(name)?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SheetError::NoWorksheet {
                path: path.to_path_buf(),
            })??,
    };

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());

    let header = rows.next().unwrap_or_default();
    let table = build_table(&header, rows, mapping)?;

    log::info!(
        "Loaded {} employee row(s) from {}",
        table.len(),
        path.display()
    );

    Ok(table)
}

/// Converts a worksheet cell.
#[must_use]
pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

/// Builds the table from a header row and data rows.
///
/// Rows whose cells are all empty are dropped. Amount cells that are not
/// numbers are kept as they are.
///
/// # Errors
///
/// Returns [`SheetError::MissingColumn`] if a mapped label is not in
/// `header`.
pub fn build_table(
    header: &[Cell],
    rows: impl Iterator<Item = Vec<Cell>>,
    mapping: &ColumnMapping,
) -> Result<EmployeeTable, SheetError> {
    let mut columns = Vec::with_capacity(header.len());
    for cell in header {
        let label = cell.to_string();
        let slot = match mapping.column_for(&label) {
            Some(column) if !columns.contains(&ColumnSlot::Known(column)) => {
                ColumnSlot::Known(column)
            }
            _ => ColumnSlot::Extra(label.trim().to_owned()),
        };
        columns.push(slot);
    }

    for column in Column::ALL {
        if !columns.contains(&ColumnSlot::Known(column)) {
            return Err(SheetError::MissingColumn {
                label: mapping.label(column).to_owned(),
                column,
            });
        }
    }

    let records = rows
        .filter(|row| row.iter().any(|c| *c != Cell::Empty))
        .map(|row| build_record(&columns, row))
        .collect();

    Ok(EmployeeTable::new(columns, records))
}

fn build_record(columns: &[ColumnSlot], mut row: Vec<Cell>) -> EmployeeRecord {
    row.resize(columns.len(), Cell::Empty);

    let mut record = EmployeeRecord::default();
    for (slot, cell) in columns.iter().zip(row) {
        match slot {
            ColumnSlot::Extra(_) => record.extra.push(cell),
            ColumnSlot::Known(Column::Name) => record.name = cell.to_string(),
            ColumnSlot::Known(Column::JobTitle) => {
                record.job_title = match cell {
                    Cell::Empty => None,
                    other => Some(other.to_string()),
                };
            }
            ColumnSlot::Known(column) => match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    if let Some(slot) = record.amount_mut(*column) {
                        *slot = Some(n);
                    }
                }
                other => {
                    record.kept.insert(*column, other);
                }
            },
        }
    }

    record
}
