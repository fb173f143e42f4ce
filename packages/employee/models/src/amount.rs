//! Conversion of payslip amounts to decimal numbers.
//!
//! Payslips print amounts with a dot as thousands separator and a comma as
//! decimal separator (`1.234,56`).

/// Error returned when text is not a valid amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount '{raw}'")]
pub struct AmountParseError {
    /// The text that failed to convert, as given.
    pub raw: String,
}

/// Converts a dot-thousands, comma-decimal amount to an `f64`.
///
/// Every `.` is removed, then every `,` becomes `.`, and the result is
/// parsed as a float. Surrounding whitespace is ignored.
///
/// # Example
///
/// ```
/// use payroll_recon_employee_models::parse_amount;
///
/// assert_eq!(parse_amount("1.234,56").unwrap(), 1234.56);
/// assert_eq!(parse_amount("90,00").unwrap(), 90.0);
/// ```
///
/// # Errors
///
/// Returns [`AmountParseError`] if the normalized text is not a number.
pub fn parse_amount(raw: &str) -> Result<f64, AmountParseError> {
    let normalized = raw.trim().replace('.', "").replace(',', ".");
    normalized.parse::<f64>().map_err(|_| AmountParseError {
        raw: raw.to_owned(),
    })
}
