//! One full reconciliation run: load, extract, reconcile, optionally write.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use payroll_recon_employee_models::EmployeeTable;
use payroll_recon_pdf::{PdfError, rubrics::RubricRegistry};
use payroll_recon_sheet::SheetError;

use crate::config::ReconcileConfig;
use crate::progress::ProgressCallback;
use crate::{ReconcileError, ReconcileReport, reconcile};

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Spreadsheet could not be read or written.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// Payslip document could not be read, or a pattern is invalid.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// A payslip value could not be converted.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Result of a successful run.
#[derive(Debug)]
pub struct RunOutcome {
    /// The updated table.
    pub table: EmployeeTable,
    /// What the loop found and missed.
    pub report: ReconcileReport,
    /// Where the table was written, if it was.
    pub written: Option<PathBuf>,
}

/// Runs the whole reconciliation described by `config`.
///
/// The spreadsheet is loaded first, then the document text is extracted;
/// no employee is processed unless both succeed. The updated table is
/// written only when `config.write_output` is set.
///
/// # Errors
///
/// Returns [`PipelineError`] on any fatal condition: an invalid pattern,
/// an unreadable spreadsheet or missing column, a missing or unreadable
/// document, an unconvertible amount, or a failed write.
pub fn run(
    config: &ReconcileConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunOutcome, PipelineError> {
    let start = Instant::now();

    let registry = RubricRegistry::with_overrides(&config.patterns)?;

    let mut table = payroll_recon_sheet::load_table(
        &config.spreadsheet,
        config.worksheet.as_deref(),
        &config.columns,
    )?;
    log::info!("Spreadsheet read and columns renamed.");

    let text = payroll_recon_pdf::extract_text(&config.document)?;
    log::info!(
        "Extracted text from {} ({} characters).",
        config.document.display(),
        text.chars().count()
    );

    let report = reconcile(&mut table, &text, &registry, progress)?;

    log::info!(
        "Reconciliation finished: {}/{} employee(s) found, {} value(s), {} warning(s) in {:.1}s",
        report.matched,
        report.employees,
        report.values_found,
        report.warnings.len(),
        start.elapsed().as_secs_f64()
    );

    let written = if config.write_output {
        payroll_recon_sheet::write_table(&table, &config.output)?;
        Some(config.output.clone())
    } else {
        log::debug!("Output write disabled; {} left untouched", config.output.display());
        None
    };

    Ok(RunOutcome {
        table,
        report,
        written,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use payroll_recon_employee_models::{Column, EmployeeRecord};

    use super::*;

    #[derive(Default)]
    struct CountingProgress {
        total: AtomicU64,
        done: AtomicU64,
    }

    impl ProgressCallback for CountingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }
        fn inc(&self, delta: u64) {
            self.done.fetch_add(delta, Ordering::SeqCst);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {}
    }

    fn write_spreadsheet(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let table = EmployeeTable::with_rows(vec![
            EmployeeRecord::new("Ana Silva"),
            EmployeeRecord::new("Bruno Costa"),
        ]);
        payroll_recon_sheet::write_table(&table, &path).unwrap();
        path
    }

    fn canonical_labels(config: &mut ReconcileConfig) {
        let overrides = Column::ALL
            .into_iter()
            .map(|c| (c, c.to_string()))
            .collect();
        config.columns = payroll_recon_sheet::ColumnMapping::with_overrides(&overrides);
    }

    #[test]
    fn missing_document_stops_before_any_employee() {
        let spreadsheet = write_spreadsheet("payroll_recon_pipeline_test_missing_doc.xlsx");
        let document = std::env::temp_dir().join("payroll_recon_pipeline_test_missing.pdf");
        let _ = std::fs::remove_file(&document);
        let mut config = ReconcileConfig::new(&spreadsheet, &document);
        canonical_labels(&mut config);
        let counting = Arc::new(CountingProgress::default());
        let progress: Arc<dyn ProgressCallback> = counting.clone();

        let result = run(&config, &progress);
        let _ = std::fs::remove_file(&spreadsheet);

        match result {
            Err(PipelineError::Pdf(PdfError::NotFound { path })) => assert_eq!(path, document),
            other => panic!("expected missing document, got {other:?}"),
        }
        assert_eq!(counting.total.load(Ordering::SeqCst), 0);
        assert_eq!(counting.done.load(Ordering::SeqCst), 0);
        assert!(!config.output.exists());
    }

    #[test]
    fn missing_column_stops_the_run() {
        let spreadsheet = write_spreadsheet("payroll_recon_pipeline_test_labels.xlsx");
        // Default labels (NOME, ...) are not in a canonical-header sheet.
        let config = ReconcileConfig::new(&spreadsheet, "HOLERITE.pdf");

        let result = run(&config, &crate::progress::null_progress());
        let _ = std::fs::remove_file(&spreadsheet);

        assert!(matches!(
            result,
            Err(PipelineError::Sheet(SheetError::MissingColumn {
                column: Column::Name,
                ..
            }))
        ));
    }

    #[test]
    fn invalid_pattern_stops_before_reading_files() {
        let mut config = ReconcileConfig::new("does-not-exist.xlsx", "does-not-exist.pdf");
        config
            .patterns
            .insert(payroll_recon_employee_models::Rubric::GrossPay, "(".to_owned());

        let result = run(&config, &crate::progress::null_progress());

        assert!(matches!(result, Err(PipelineError::Pdf(PdfError::Regex(_)))));
    }
}
