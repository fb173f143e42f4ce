#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Employee spreadsheet loading and writing.
//!
//! [`load::load_table`] reads the first (or a named) worksheet of an
//! XLSX/XLS/ODS workbook with [`calamine`] and renames the configured
//! header labels to canonical [`Column`]s. [`write::write_table`] persists
//! the table as XLSX ([`rust_xlsxwriter`]) or CSV ([`csv`]).

pub mod load;
pub mod write;

use std::collections::BTreeMap;
use std::path::PathBuf;

use payroll_recon_employee_models::Column;
use serde::{Deserialize, Serialize};

pub use load::load_table;
pub use write::write_table;

/// Errors that can occur while reading or writing the employee table.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The workbook could not be opened.
    #[error("Failed to open workbook {}: {source}", path.display())]
    Open {
        /// Path of the workbook.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: calamine::Error,
    },

    /// The workbook contains no worksheet.
    #[error("Workbook {} does not contain any worksheets", path.display())]
    NoWorksheet {
        /// Path of the workbook.
        path: PathBuf,
    },

    /// Reading a worksheet failed.
    #[error("Failed to read worksheet: {0}")]
    Worksheet(#[from] calamine::Error),

    /// A configured header label is not present in the header row.
    #[error("Column '{label}' (for {column}) not found in spreadsheet header")]
    MissingColumn {
        /// Header label that was looked for.
        label: String,
        /// Canonical column it maps to.
        column: Column,
    },

    /// The table does not fit in a worksheet.
    #[error("Table too large for a worksheet: {0}")]
    TooLarge(String),

    /// Writing the XLSX output failed.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Writing the CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Header label each canonical column has in the input spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    labels: BTreeMap<Column, String>,
}

impl ColumnMapping {
    /// Default labels with `overrides` applied.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<Column, String>) -> Self {
        let mut mapping = Self::default();
        for (column, label) in overrides {
            mapping.labels.insert(*column, label.trim().to_owned());
        }
        mapping
    }

    /// Header label for `column`.
    #[must_use]
    pub fn label(&self, column: Column) -> &str {
        self.labels
            .get(&column)
            .map_or_else(|| column.default_label(), String::as_str)
    }

    /// The canonical column whose label is `header`, if any.
    #[must_use]
    pub fn column_for(&self, header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .into_iter()
            .find(|column| self.label(*column) == header)
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            labels: Column::ALL
                .into_iter()
                .map(|c| (c, c.default_label().to_owned()))
                .collect(),
        }
    }
}
