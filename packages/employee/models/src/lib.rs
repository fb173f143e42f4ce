#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Employee record, rubric, and column types for payroll reconciliation.
//!
//! This crate defines the canonical table shape shared by the spreadsheet
//! loader, the payslip text extractor, and the reconciliation loop. The
//! spreadsheet's own headers are renamed into [`Column`]s on load, and each
//! payslip [`Rubric`] knows which [`Column`] it fills.

pub mod amount;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use amount::{AmountParseError, parse_amount};

/// Canonical (lowercase) columns of the employee table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// Employee full name, the lookup key.
    Name,
    /// Job title.
    JobTitle,
    /// Gross pay ("Total de Proventos").
    GrossPay,
    /// Monthly severance-fund (FGTS) deposit.
    SeveranceDeposit,
    /// Transport voucher deduction.
    TransportDeduction,
    /// Meal allowance.
    MealAllowance,
}

impl Column {
    /// Every canonical column, in table order.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::JobTitle,
        Self::GrossPay,
        Self::SeveranceDeposit,
        Self::TransportDeduction,
        Self::MealAllowance,
    ];

    /// Header label this column carries in the source spreadsheet unless
    /// configured otherwise.
    #[must_use]
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::Name => "NOME",
            Self::JobTitle => "CARGO",
            Self::GrossPay => "SALARIO",
            Self::SeveranceDeposit => "FGTS",
            Self::TransportDeduction => "VT",
            Self::MealAllowance => "VA",
        }
    }

    /// Whether the column holds a decimal amount.
    #[must_use]
    pub const fn is_amount(self) -> bool {
        !matches!(self, Self::Name | Self::JobTitle)
    }
}

/// A payroll quantity or attribute looked up in the payslip text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rubric {
    /// "Função" / "Referência"
    JobTitle,
    /// "Total de Proventos"
    GrossPay,
    /// "FGTS do Mês"
    SeveranceDeposit,
    /// "Desconto Transporte"
    TransportDeduction,
    /// "Vale Refeição"
    MealAllowance,
}

impl Rubric {
    /// Every rubric, in lookup order.
    pub const ALL: [Self; 5] = [
        Self::JobTitle,
        Self::GrossPay,
        Self::SeveranceDeposit,
        Self::TransportDeduction,
        Self::MealAllowance,
    ];

    /// Label printed on the payslip next to the value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::JobTitle => "Função",
            Self::GrossPay => "Total de Proventos",
            Self::SeveranceDeposit => "FGTS do Mês",
            Self::TransportDeduction => "Desconto Transporte",
            Self::MealAllowance => "Vale Refeição",
        }
    }

    /// Table column the rubric's value is written to.
    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::JobTitle => Column::JobTitle,
            Self::GrossPay => Column::GrossPay,
            Self::SeveranceDeposit => Column::SeveranceDeposit,
            Self::TransportDeduction => Column::TransportDeduction,
            Self::MealAllowance => Column::MealAllowance,
        }
    }

    /// Whether the captured text must be converted to a decimal amount.
    #[must_use]
    pub const fn is_amount(self) -> bool {
        self.column().is_amount()
    }
}

/// A value extracted for one rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RubricValue {
    /// Free text (job title).
    Text(String),
    /// Decimal amount.
    Amount(f64),
}

/// A spreadsheet cell from a column the reconciliation does not touch.
///
/// Kept so that the table can be written back with every original column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// No value.
    #[default]
    Empty,
    /// Text value.
    Text(String),
    /// Numeric value (integers are widened).
    Number(f64),
    /// Boolean value.
    Bool(bool),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One row of the employee table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Employee full name as written in the spreadsheet.
    pub name: String,
    /// Job title.
    pub job_title: Option<String>,
    /// Gross pay.
    pub gross_pay: Option<f64>,
    /// Severance-fund deposit.
    pub severance_deposit: Option<f64>,
    /// Transport deduction.
    pub transport_deduction: Option<f64>,
    /// Meal allowance.
    pub meal_allowance: Option<f64>,
    /// Existing cells of amount columns that are not numbers, written back
    /// as they were until a payslip value replaces them.
    pub kept: BTreeMap<Column, Cell>,
    /// Pass-through cells, one per [`ColumnSlot::Extra`] in table order.
    pub extra: Vec<Cell>,
}

impl EmployeeRecord {
    /// Creates a record with only a name set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Stores `value` in the column `rubric` maps to.
    ///
    /// A text value for an amount rubric (or vice versa) is ignored.
    pub fn set(&mut self, rubric: Rubric, value: &RubricValue) {
        match (rubric, value) {
            (Rubric::JobTitle, RubricValue::Text(text)) => {
                self.job_title = Some(text.clone());
            }
            (Rubric::JobTitle, RubricValue::Amount(_)) | (_, RubricValue::Text(_)) => {}
            (_, RubricValue::Amount(amount)) => {
                let column = rubric.column();
                if let Some(slot) = self.amount_mut(column) {
                    *slot = Some(*amount);
                    self.kept.remove(&column);
                }
            }
        }
    }

    /// Returns the amount stored in an amount column.
    #[must_use]
    pub const fn amount(&self, column: Column) -> Option<f64> {
        match column {
            Column::GrossPay => self.gross_pay,
            Column::SeveranceDeposit => self.severance_deposit,
            Column::TransportDeduction => self.transport_deduction,
            Column::MealAllowance => self.meal_allowance,
            Column::Name | Column::JobTitle => None,
        }
    }

    /// Returns the value of a canonical column as a [`Cell`].
    #[must_use]
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::Name => Cell::Text(self.name.clone()),
            Column::JobTitle => self
                .job_title
                .as_ref()
                .map_or(Cell::Empty, |t| Cell::Text(t.clone())),
            _ => self.amount(column).map_or_else(
                || self.kept.get(&column).cloned().unwrap_or_default(),
                Cell::Number,
            ),
        }
    }

    /// Mutable access to an amount column, `None` for text columns.
    pub fn amount_mut(&mut self, column: Column) -> Option<&mut Option<f64>> {
        match column {
            Column::GrossPay => Some(&mut self.gross_pay),
            Column::SeveranceDeposit => Some(&mut self.severance_deposit),
            Column::TransportDeduction => Some(&mut self.transport_deduction),
            Column::MealAllowance => Some(&mut self.meal_allowance),
            Column::Name | Column::JobTitle => None,
        }
    }
}

/// A column position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSlot {
    /// A canonical column.
    Known(Column),
    /// A column carried through untouched, with its original header.
    Extra(String),
}

impl ColumnSlot {
    /// Header written for this column.
    #[must_use]
    pub fn header(&self) -> &str {
        match self {
            Self::Known(column) => column.as_ref(),
            Self::Extra(header) => header,
        }
    }
}

/// The employee table: column layout in original order plus rows in
/// original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeTable {
    columns: Vec<ColumnSlot>,
    rows: Vec<EmployeeRecord>,
}

impl EmployeeTable {
    /// Creates a table from a column layout and rows.
    #[must_use]
    pub const fn new(columns: Vec<ColumnSlot>, rows: Vec<EmployeeRecord>) -> Self {
        Self { columns, rows }
    }

    /// Creates a table with only the canonical columns.
    #[must_use]
    pub fn with_rows(rows: Vec<EmployeeRecord>) -> Self {
        Self {
            columns: Column::ALL.into_iter().map(ColumnSlot::Known).collect(),
            rows,
        }
    }

    /// Column layout.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSlot] {
        &self.columns
    }

    /// Rows in original order.
    #[must_use]
    pub fn rows(&self) -> &[EmployeeRecord] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of `row`, laid out like [`Self::columns`].
    #[must_use]
    pub fn cells(&self, row: &EmployeeRecord) -> Vec<Cell> {
        let mut extra = row.extra.iter();
        self.columns
            .iter()
            .map(|slot| match slot {
                ColumnSlot::Known(column) => row.cell(*column),
                ColumnSlot::Extra(_) => extra.next().cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Employee names in row order, duplicates included.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.name.clone()).collect()
    }

    /// Writes `values` into every row whose name equals `name`.
    ///
    /// Returns the number of rows updated.
    pub fn apply(&mut self, name: &str, values: &[(Rubric, RubricValue)]) -> usize {
        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|r| r.name == name) {
            for (rubric, value) in values {
                row.set(*rubric, value);
            }
            updated += 1;
        }
        updated
    }
}
