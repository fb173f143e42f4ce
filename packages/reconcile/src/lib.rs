#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reconciles payslip values against the employee spreadsheet.
//!
//! For every employee name in table order, [`reconcile`] finds the name in
//! the payslip text, cuts the text window up to the next employee's name,
//! looks up each rubric in that window, and writes the values it finds
//! into every row carrying that name. Names and rubrics that cannot be
//! found are reported as [`Warning`]s; an amount that cannot be converted
//! aborts the run.
//!
//! [`pipeline::run`] wires the spreadsheet loader, the PDF extractor, the
//! loop, and the optional output write together from a
//! [`config::ReconcileConfig`].

pub mod config;
pub mod pipeline;
pub mod preview;
pub mod progress;

use std::sync::Arc;

use payroll_recon_employee_models::{EmployeeTable, Rubric, RubricValue, parse_amount};
use payroll_recon_pdf::{rubrics::RubricRegistry, section};

use crate::progress::ProgressCallback;

/// Errors that abort the reconciliation loop.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// A captured amount could not be converted to a number.
    #[error("Invalid amount '{raw}' for rubric '{}' of {name}", rubric.label())]
    InvalidAmount {
        /// Employee whose window held the value.
        name: String,
        /// Rubric being converted.
        rubric: Rubric,
        /// The captured text.
        raw: String,
    },
}

/// A lookup miss that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The employee's name does not occur in the payslip text.
    NameNotFound {
        /// Employee name.
        name: String,
    },
    /// A rubric was not found in the employee's window.
    RubricNotFound {
        /// Employee name.
        name: String,
        /// Rubric that was looked for.
        rubric: Rubric,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameNotFound { name } => {
                write!(f, "name '{name}' not found in the payslip document")
            }
            Self::RubricNotFound { name, rubric } => {
                write!(f, "rubric '{}' not found for {name}", rubric.label())
            }
        }
    }
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Names processed, duplicates included.
    pub employees: usize,
    /// Names found in the payslip text.
    pub matched: usize,
    /// Rubric values written, counted once per name.
    pub values_found: usize,
    /// Lookup misses, in the order they happened.
    pub warnings: Vec<Warning>,
}

impl ReconcileReport {
    /// Warnings concerning `name`.
    pub fn warnings_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Warning> + 'a {
        self.warnings.iter().filter(move |w| match w {
            Warning::NameNotFound { name: n } | Warning::RubricNotFound { name: n, .. } => {
                n == name
            }
        })
    }
}

/// Values found in one employee's window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Rubrics found, in registry order.
    pub values: Vec<(Rubric, RubricValue)>,
    /// Rubrics not found, in registry order.
    pub missing: Vec<Rubric>,
}

/// Looks up every rubric of `registry` in `window`.
///
/// # Errors
///
/// Returns [`ReconcileError::InvalidAmount`] if an amount rubric captured
/// text that is not a number.
pub fn extract_rubrics(
    name: &str,
    window: &str,
    registry: &RubricRegistry,
) -> Result<Extraction, ReconcileError> {
    let mut extraction = Extraction::default();

    for pattern in registry.iter() {
        let rubric = pattern.rubric;
        let Some(raw) = pattern.find(window) else {
            extraction.missing.push(rubric);
            continue;
        };

        let value = if rubric.is_amount() {
            let amount = parse_amount(raw).map_err(|e| ReconcileError::InvalidAmount {
                name: name.to_owned(),
                rubric,
                raw: e.raw,
            })?;
            RubricValue::Amount(amount)
        } else {
            RubricValue::Text(raw.to_owned())
        };

        extraction.values.push((rubric, value));
    }

    Ok(extraction)
}

/// Fills `table` with the rubric values found in `text`.
///
/// Names are processed in row order. Each name's window starts at its
/// first occurrence and ends at the first occurrence of the next row's
/// name, searched from that same start, or at the end of `text`. Values
/// found are written to every row with that name; misses are logged and
/// collected in the report.
///
/// # Errors
///
/// Returns [`ReconcileError::InvalidAmount`] if a captured amount cannot be
/// converted. Rows already processed keep their new values.
pub fn reconcile(
    table: &mut EmployeeTable,
    text: &str,
    registry: &RubricRegistry,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ReconcileReport, ReconcileError> {
    let names = table.names();
    let mut report = ReconcileReport {
        employees: names.len(),
        ..ReconcileReport::default()
    };

    progress.set_total(names.len() as u64);

    for (index, name) in names.iter().enumerate() {
        log::info!("Searching data for: {name}");
        progress.set_message(name.clone());

        let Some(&anchor) = section::occurrences(text, name).first() else {
            let warning = Warning::NameNotFound { name: name.clone() };
            log::warn!("{warning}");
            report.warnings.push(warning);
            progress.inc(1);
            continue;
        };

        let next_name = names.get(index + 1).map(String::as_str);
        let window = section::window(text, anchor, next_name);
        log::debug!(
            "{name}: window of {} byte(s) at offset {anchor}",
            window.len()
        );

        let extraction = extract_rubrics(name, window, registry)?;

        for rubric in extraction.missing {
            let warning = Warning::RubricNotFound {
                name: name.clone(),
                rubric,
            };
            log::warn!("{warning}");
            report.warnings.push(warning);
        }

        let rows = table.apply(name, &extraction.values);
        log::debug!(
            "{name}: {} value(s) written to {rows} row(s)",
            extraction.values.len()
        );

        report.matched += 1;
        report.values_found += extraction.values.len();
        progress.inc(1);
    }

    progress.finish(format!(
        "Reconciled {} of {} employee(s)",
        report.matched, report.employees
    ));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use payroll_recon_employee_models::EmployeeRecord;

    use super::*;
    use crate::progress::null_progress;

    const PAYSLIP: &str = "\
Holerite Mensal
Ana Silva
Função
Referência Analista
Total de Proventos 3.500,00
Bruno Costa
Função
Referência Gerente
Total de Proventos 7.000,00
FGTS do Mês 560,00
Desconto Transporte 90,00
Vale Refeição 1.234,56
";

    fn table(names: &[&str]) -> EmployeeTable {
        EmployeeTable::with_rows(names.iter().map(|n| EmployeeRecord::new(*n)).collect())
    }

    fn run(table: &mut EmployeeTable, text: &str) -> ReconcileReport {
        reconcile(table, text, &RubricRegistry::new().unwrap(), &null_progress()).unwrap()
    }

    #[test]
    fn fills_values_found_in_each_window() {
        let mut table = table(&["Ana Silva", "Bruno Costa"]);

        let report = run(&mut table, PAYSLIP);

        let ana = &table.rows()[0];
        assert_eq!(ana.job_title.as_deref(), Some("Analista"));
        assert_eq!(ana.gross_pay, Some(3500.0));
        assert_eq!(ana.severance_deposit, None);
        assert_eq!(ana.transport_deduction, None);
        assert_eq!(ana.meal_allowance, None);

        let bruno = &table.rows()[1];
        assert_eq!(bruno.job_title.as_deref(), Some("Gerente"));
        assert_eq!(bruno.gross_pay, Some(7000.0));
        assert_eq!(bruno.severance_deposit, Some(560.0));
        assert_eq!(bruno.transport_deduction, Some(90.0));
        assert_eq!(bruno.meal_allowance, Some(1234.56));

        assert_eq!(report.employees, 2);
        assert_eq!(report.matched, 2);
        assert_eq!(report.values_found, 7);
    }

    #[test]
    fn placeholder_cells_survive_misses_and_yield_to_found_values() {
        use payroll_recon_employee_models::{Cell, Column};

        let mut ana = EmployeeRecord::new("Ana Silva");
        ana.kept
            .insert(Column::GrossPay, Cell::Text("a conferir".to_owned()));
        ana.kept
            .insert(Column::MealAllowance, Cell::Text("n/d".to_owned()));
        let mut table = EmployeeTable::with_rows(vec![ana, EmployeeRecord::new("Bruno Costa")]);

        run(&mut table, PAYSLIP);

        let ana = &table.rows()[0];
        assert_eq!(ana.cell(Column::GrossPay), Cell::Number(3500.0));
        assert_eq!(ana.cell(Column::MealAllowance), Cell::Text("n/d".to_owned()));
    }

    #[test]
    fn warns_once_per_missing_rubric() {
        let mut table = table(&["Ana Silva", "Bruno Costa"]);

        let report = run(&mut table, PAYSLIP);

        let ana: Vec<&Warning> = report.warnings_for("Ana Silva").collect();
        assert_eq!(
            ana,
            vec![
                &Warning::RubricNotFound {
                    name: "Ana Silva".to_owned(),
                    rubric: Rubric::SeveranceDeposit
                },
                &Warning::RubricNotFound {
                    name: "Ana Silva".to_owned(),
                    rubric: Rubric::TransportDeduction
                },
                &Warning::RubricNotFound {
                    name: "Ana Silva".to_owned(),
                    rubric: Rubric::MealAllowance
                },
            ]
        );
        assert_eq!(report.warnings_for("Bruno Costa").count(), 0);
    }

    #[test]
    fn missing_name_leaves_record_untouched() {
        let mut table = table(&["Carla Dias", "Ana Silva"]);

        let report = run(&mut table, PAYSLIP);

        assert_eq!(table.rows()[0], EmployeeRecord::new("Carla Dias"));
        assert_eq!(
            report.warnings_for("Carla Dias").collect::<Vec<_>>(),
            vec![&Warning::NameNotFound {
                name: "Carla Dias".to_owned()
            }]
        );
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn blank_name_is_reported_as_not_found() {
        let mut table = table(&[""]);

        let report = run(&mut table, PAYSLIP);

        assert_eq!(
            report.warnings,
            vec![Warning::NameNotFound {
                name: String::new()
            }]
        );
        assert_eq!(table.rows()[0], EmployeeRecord::new(""));
    }

    #[test]
    fn last_employee_window_runs_to_end() {
        let mut table = table(&["Bruno Costa"]);

        run(&mut table, PAYSLIP);

        assert_eq!(table.rows()[0].meal_allowance, Some(1234.56));
    }

    #[test]
    fn window_stops_at_next_name() {
        // Ana's window must not reach Bruno's meal allowance.
        let mut table = table(&["Ana Silva", "Bruno Costa"]);

        run(&mut table, PAYSLIP);

        assert_eq!(table.rows()[0].meal_allowance, None);
    }

    #[test]
    fn running_twice_gives_the_same_table() {
        let mut table = table(&["Ana Silva", "Bruno Costa", "Carla Dias"]);

        let first = run(&mut table, PAYSLIP);
        let after_first = table.clone();
        let second = run(&mut table, PAYSLIP);

        assert_eq!(table, after_first);
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_names_receive_identical_values() {
        let mut table = table(&["Ana Silva", "Bruno Costa", "Ana Silva"]);

        run(&mut table, PAYSLIP);

        assert_eq!(table.rows()[0], table.rows()[2]);
        assert_eq!(table.rows()[2].gross_pay, Some(3500.0));
    }

    #[test]
    fn next_name_matching_at_anchor_gives_empty_window() {
        // "Ana" occurs at Ana Silva's anchor, so her window is empty.
        let mut table = table(&["Ana Silva", "Ana"]);

        let report = run(&mut table, PAYSLIP);

        assert_eq!(table.rows()[0], EmployeeRecord::new("Ana Silva"));
        assert_eq!(report.warnings_for("Ana Silva").count(), Rubric::ALL.len());
    }

    #[test]
    fn invalid_amount_aborts() {
        let mut table = table(&["Ana Silva"]);
        let text = "Ana Silva\nTotal de Proventos ...,,\n";

        let err = reconcile(&mut table, text, &RubricRegistry::new().unwrap(), &null_progress())
            .unwrap_err();

        match err {
            ReconcileError::InvalidAmount { name, rubric, raw } => {
                assert_eq!(name, "Ana Silva");
                assert_eq!(rubric, Rubric::GrossPay);
                assert_eq!(raw, "...,,");
            }
        }
    }

    #[test]
    fn end_to_end_example() {
        let mut table = table(&["Ana Silva", "Bruno Costa"]);
        let text = "cabeçalho Ana Silva lotação Função Operacional Referência Analista\n\
            Total de Proventos 3.500,00 Bruno Costa";

        let report = run(&mut table, text);

        let ana = &table.rows()[0];
        assert_eq!(ana.name, "Ana Silva");
        assert_eq!(ana.job_title.as_deref(), Some("Analista"));
        assert_eq!(ana.gross_pay, Some(3500.0));
        assert_eq!(ana.severance_deposit, None);
        assert_eq!(ana.transport_deduction, None);
        assert_eq!(ana.meal_allowance, None);
        assert_eq!(report.warnings_for("Ana Silva").count(), 3);
    }

    #[test]
    fn warning_messages_name_employee_and_rubric() {
        let warning = Warning::RubricNotFound {
            name: "Ana Silva".to_owned(),
            rubric: Rubric::MealAllowance,
        };
        assert_eq!(
            warning.to_string(),
            "rubric 'Vale Refeição' not found for Ana Silva"
        );
    }
}
