//! Interactive prompts for running a reconciliation without flags.
//!
//! Asks for the two input paths, runs the reconciliation with output
//! writing disabled, shows the preview, and only then asks whether the
//! updated table should be saved.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use payroll_recon_cli_utils::{IndicatifProgress, MultiProgress};
use payroll_recon_reconcile::config::PartialConfig;
use payroll_recon_reconcile::pipeline;

/// Prompts for the inputs, runs the reconciliation, and offers to save the
/// result.
///
/// # Errors
///
/// Returns an error if a prompt fails or the reconciliation fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Payroll Reconciliation");
    println!();

    let spreadsheet: String = Input::new()
        .with_prompt("Employee spreadsheet")
        .default("Conferência.xlsx".to_owned())
        .interact_text()?;
    let document: String = Input::new()
        .with_prompt("Payslip PDF")
        .default("HOLERITE.pdf".to_owned())
        .interact_text()?;

    let config = PartialConfig {
        spreadsheet: Some(PathBuf::from(spreadsheet.trim())),
        document: Some(PathBuf::from(document.trim())),
        ..PartialConfig::default()
    }
    .resolve()?;

    let progress = IndicatifProgress::employees_bar(multi, "Reconciling");
    let outcome = pipeline::run(&config, &progress)?;

    crate::print_outcome(&outcome, config.preview_rows);
    println!();

    let save = Confirm::new()
        .with_prompt(format!(
            "Write the updated table to {}?",
            config.output.display()
        ))
        .default(false)
        .interact()?;

    if save {
        payroll_recon_sheet::write_table(&outcome.table, &config.output)?;
        println!("Updated table written to {}", config.output.display());
    } else {
        println!("Updated table not written.");
    }

    Ok(())
}
