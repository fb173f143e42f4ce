//! Persists the employee table.
//!
//! The header row uses canonical column names for known columns and the
//! original header for carried-through ones. Rows keep their original
//! order; absent values are written as empty cells.

use std::path::Path;

use payroll_recon_employee_models::{Cell, ColumnSlot, EmployeeTable};
use rust_xlsxwriter::Workbook;

use crate::SheetError;

/// Writes `table` to `path`: CSV when the extension is `csv`, XLSX
/// otherwise.
///
/// # Errors
///
/// Returns [`SheetError`] if the file cannot be written.
pub fn write_table(table: &EmployeeTable, path: &Path) -> Result<(), SheetError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_csv(table, path)?;
    } else {
        write_xlsx(table, path)?;
    }

    log::info!("Wrote {} row(s) to {}", table.len(), path.display());

    Ok(())
}

fn write_xlsx(table: &EmployeeTable, path: &Path) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();

        for (col, slot) in table.columns().iter().enumerate() {
            worksheet.write_string(0, column_index(col)?, slot.header())?;
        }

        for (row_idx, record) in table.rows().iter().enumerate() {
            let row = u32::try_from(row_idx + 1)
                .map_err(|_| SheetError::TooLarge(format!("{} rows", table.len())))?;
            for (col, cell) in table.cells(record).iter().enumerate() {
                let col = column_index(col)?;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(row, col, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row, col, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(row, col, *b)?;
                    }
                }
            }
        }
    }

    workbook.save(path)?;

    Ok(())
}

fn write_csv(table: &EmployeeTable, path: &Path) -> Result<(), SheetError> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(table.columns().iter().map(ColumnSlot::header))?;
    for record in table.rows() {
        writer.write_record(table.cells(record).iter().map(ToString::to_string))?;
    }
    writer.flush()?;

    Ok(())
}

fn column_index(col: usize) -> Result<u16, SheetError> {
    u16::try_from(col).map_err(|_| SheetError::TooLarge(format!("{} columns", col + 1)))
}
