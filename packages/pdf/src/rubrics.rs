//! Regex patterns that locate payroll rubrics in payslip text.
//!
//! Each pattern matches a rubric's label and captures exactly one value
//! following it. Patterns are matched case-insensitively and only the
//! first match inside a text window counts.

use std::collections::BTreeMap;

use payroll_recon_employee_models::Rubric;
use regex::{Regex, RegexBuilder};

use crate::PdfError;

/// Default pattern for `rubric`.
#[must_use]
pub const fn default_pattern(rubric: Rubric) -> &'static str {
    match rubric {
        Rubric::JobTitle => r"Função[\s\S]*?Referência\s*([^\n]+)",
        Rubric::GrossPay => r"Total de Proventos[\s\S]*?([\d\.,]+)",
        Rubric::SeveranceDeposit => r"FGTS do Mês[\s\S]*?([\d\.,]+)",
        Rubric::TransportDeduction => r"Desconto Transporte[\s\S]*?([\d\.,]+)",
        Rubric::MealAllowance => r"Vale Refeição[\s\S]*?([\d\.,]+)",
    }
}

/// A compiled rubric pattern.
#[derive(Debug, Clone)]
pub struct RubricPattern {
    /// The rubric this pattern locates.
    pub rubric: Rubric,
    regex: Regex,
}

impl RubricPattern {
    /// Compiles `pattern` case-insensitively for `rubric`.
    ///
    /// # Errors
    ///
    /// * [`PdfError::Regex`] if the pattern fails to compile
    /// * [`PdfError::Pattern`] if the pattern has no capture group
    pub fn new(rubric: Rubric, pattern: &str) -> Result<Self, PdfError> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;

        // Group 0 is the implicit whole match.
        if regex.captures_len() < 2 {
            return Err(PdfError::Pattern {
                rubric: rubric.to_string(),
                pattern: pattern.to_owned(),
            });
        }

        Ok(Self { rubric, regex })
    }

    /// The pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the first capture in `window`, trimmed.
    ///
    /// A match whose first group did not participate counts as no match.
    #[must_use]
    pub fn find<'a>(&self, window: &'a str) -> Option<&'a str> {
        self.regex
            .captures(window)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }
}

/// The fixed set of rubric patterns, one per [`Rubric`], in lookup order.
#[derive(Debug, Clone)]
pub struct RubricRegistry {
    patterns: Vec<RubricPattern>,
}

impl RubricRegistry {
    /// Builds the registry from the default patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if a default pattern fails to compile.
    pub fn new() -> Result<Self, PdfError> {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Builds the registry from the default patterns, replacing those
    /// listed in `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if an override is not a valid rubric pattern.
    pub fn with_overrides(overrides: &BTreeMap<Rubric, String>) -> Result<Self, PdfError> {
        let patterns = Rubric::ALL
            .into_iter()
            .map(|rubric| {
                let pattern = overrides
                    .get(&rubric)
                    .map_or_else(|| default_pattern(rubric), String::as_str);
                if overrides.contains_key(&rubric) {
                    log::debug!("Using configured pattern for {rubric}: {pattern}");
                }
                RubricPattern::new(rubric, pattern)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Iterates over the patterns in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &RubricPattern> {
        self.patterns.iter()
    }

    /// Returns the pattern for `rubric`.
    #[must_use]
    pub fn get(&self, rubric: Rubric) -> Option<&RubricPattern> {
        self.patterns.iter().find(|p| p.rubric == rubric)
    }

    /// Returns the first trimmed capture for `rubric` in `window`.
    #[must_use]
    pub fn find<'a>(&self, rubric: Rubric, window: &'a str) -> Option<&'a str> {
        self.get(rubric).and_then(|p| p.find(window))
    }
}
