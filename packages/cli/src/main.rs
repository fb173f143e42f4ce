#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for payroll reconciliation.
//!
//! Reads the employee spreadsheet and the payslip PDF, fills in the values
//! found for each employee, and prints a preview of the updated table. The
//! table is only written back with `--write` (or `write_output = true` in
//! the config file). Without arguments an interactive prompt asks for the
//! paths instead.
//!
//! Uses `indicatif-log-bridge` (via [`payroll_recon_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the progress bar never fight for the terminal.

mod interactive;

use std::path::PathBuf;

use clap::Parser;
use payroll_recon_cli_utils::IndicatifProgress;
use payroll_recon_reconcile::config::PartialConfig;
use payroll_recon_reconcile::pipeline::{self, RunOutcome};
use payroll_recon_reconcile::preview::render_preview;

#[derive(Parser)]
#[command(
    name = "payroll_recon",
    about = "Reconcile payslip PDF values against the employee spreadsheet"
)]
struct Cli {
    /// TOML configuration file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Employee spreadsheet (XLSX, XLS, or ODS)
    #[arg(long)]
    spreadsheet: Option<PathBuf>,
    /// Worksheet to read (defaults to the first one)
    #[arg(long)]
    worksheet: Option<String>,
    /// Payslip PDF document
    #[arg(long)]
    document: Option<PathBuf>,
    /// Where to write the updated table (`.xlsx` or `.csv`).
    /// Defaults to `<spreadsheet>_updated.xlsx`
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the updated table to the output path
    #[arg(long)]
    write: bool,
    /// Number of rows shown in the preview
    #[arg(long)]
    preview_rows: Option<usize>,
}

impl Cli {
    /// Whether no flag at all was given, which starts the interactive mode.
    const fn is_empty(&self) -> bool {
        self.config.is_none()
            && self.spreadsheet.is_none()
            && self.worksheet.is_none()
            && self.document.is_none()
            && self.output.is_none()
            && !self.write
            && self.preview_rows.is_none()
    }

    fn into_partial(self) -> PartialConfig {
        PartialConfig {
            spreadsheet: self.spreadsheet,
            worksheet: self.worksheet,
            document: self.document,
            output: self.output,
            write_output: self.write.then_some(true),
            preview_rows: self.preview_rows,
            ..PartialConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = payroll_recon_cli_utils::init_logger();
    let cli = Cli::parse();

    if cli.is_empty() {
        return interactive::run(&multi);
    }

    let file = match &cli.config {
        Some(path) => PartialConfig::from_file(path)?,
        None => PartialConfig::default(),
    };
    let config = file.merge(cli.into_partial()).resolve()?;

    let progress = IndicatifProgress::employees_bar(&multi, "Reconciling");
    let outcome = pipeline::run(&config, &progress)?;

    print_outcome(&outcome, config.preview_rows);

    if outcome.written.is_none() {
        log::info!(
            "Updated table not written (pass --write to save it to {})",
            config.output.display()
        );
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome, preview_rows: usize) {
    println!();
    println!("Extraction and update finished. First rows of the updated table:");
    println!("{}", render_preview(&outcome.table, preview_rows));

    if !outcome.report.warnings.is_empty() {
        println!();
        println!("{} warning(s):", outcome.report.warnings.len());
        for warning in &outcome.report.warnings {
            println!("  {warning}");
        }
    }

    if let Some(path) = &outcome.written {
        println!();
        println!("Updated table written to {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use payroll_recon_reconcile::config::ConfigError;

    use super::*;

    #[test]
    fn no_flags_start_interactive_mode() {
        let cli = Cli::try_parse_from(["payroll_recon"]).unwrap();
        assert!(cli.is_empty());
    }

    #[test]
    fn any_flag_disables_interactive_mode() {
        for args in [
            vec!["payroll_recon", "--write"],
            vec!["payroll_recon", "--output", "out.xlsx"],
            vec!["payroll_recon", "--worksheet", "Plan1"],
            vec!["payroll_recon", "--preview-rows", "5"],
        ] {
            let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
            assert!(!cli.is_empty(), "{args:?}");
        }
    }

    #[test]
    fn flags_without_paths_are_a_config_error() {
        let cli = Cli::try_parse_from(["payroll_recon", "--write"]).unwrap();

        let err = cli.into_partial().resolve().unwrap_err();

        assert!(matches!(err, ConfigError::MissingPath("spreadsheet")));
    }

    #[test]
    fn flags_fill_the_partial_config() {
        let cli = Cli::try_parse_from([
            "payroll_recon",
            "--spreadsheet",
            "Conferencia.xlsx",
            "--document",
            "HOLERITE.pdf",
            "--write",
            "--preview-rows",
            "5",
        ])
        .unwrap();

        let config = cli.into_partial().resolve().unwrap();

        assert!(config.write_output);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.document, PathBuf::from("HOLERITE.pdf"));
    }
}
