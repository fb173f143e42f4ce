//! Run configuration.
//!
//! A [`PartialConfig`] is read from an optional TOML file and from
//! command-line flags; the two are merged (flags win) and resolved into a
//! [`ReconcileConfig`] once at startup.
//!
//! ```toml
//! spreadsheet = "Conferencia.xlsx"
//! document = "holerite/HOLERITE.pdf"
//! write_output = true
//!
//! [columns]
//! name = "NOME COMPLETO"
//!
//! [patterns]
//! gross_pay = 'Total Bruto[\s\S]*?([\d\.,]+)'
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use payroll_recon_employee_models::{Column, Rubric};
use payroll_recon_sheet::ColumnMapping;
use serde::Deserialize;

/// Rows shown in the preview unless configured otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Errors raised while building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required path was given neither in the file nor as a flag.
    #[error("Missing required setting '{0}'")]
    MissingPath(&'static str),

    /// The output path is the input spreadsheet.
    #[error("Refusing to overwrite the input spreadsheet {}", path.display())]
    OutputOverwritesInput {
        /// The shared path.
        path: PathBuf,
    },
}

/// Configuration values as given by one source, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    /// Employee spreadsheet.
    pub spreadsheet: Option<PathBuf>,
    /// Worksheet to read; the first one when unset.
    pub worksheet: Option<String>,
    /// Payslip PDF document.
    pub document: Option<PathBuf>,
    /// Where the updated table is written.
    pub output: Option<PathBuf>,
    /// Whether the updated table is written at all.
    pub write_output: Option<bool>,
    /// Rows shown in the preview.
    pub preview_rows: Option<usize>,
    /// Spreadsheet header label per canonical column.
    pub columns: BTreeMap<Column, String>,
    /// Regex pattern per rubric.
    pub patterns: BTreeMap<Rubric, String>,
}

impl PartialConfig {
    /// Parses a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `toml_str` does not match the schema.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads and parses the TOML configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&contents)
    }

    /// Overlays `other` on `self`: every value set in `other` wins.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.spreadsheet = other.spreadsheet.or(self.spreadsheet);
        self.worksheet = other.worksheet.or(self.worksheet);
        self.document = other.document.or(self.document);
        self.output = other.output.or(self.output);
        self.write_output = other.write_output.or(self.write_output);
        self.preview_rows = other.preview_rows.or(self.preview_rows);
        self.columns.extend(other.columns);
        self.patterns.extend(other.patterns);
        self
    }

    /// Resolves defaults and checks the required settings.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::MissingPath`] if the spreadsheet or document is unset
    /// * [`ConfigError::OutputOverwritesInput`] if the output path is the
    ///   input spreadsheet
    pub fn resolve(self) -> Result<ReconcileConfig, ConfigError> {
        let spreadsheet = self
            .spreadsheet
            .ok_or(ConfigError::MissingPath("spreadsheet"))?;
        let document = self.document.ok_or(ConfigError::MissingPath("document"))?;
        let output = self
            .output
            .unwrap_or_else(|| default_output_path(&spreadsheet));

        if same_file(&output, &spreadsheet) {
            return Err(ConfigError::OutputOverwritesInput { path: output });
        }

        Ok(ReconcileConfig {
            spreadsheet,
            worksheet: self.worksheet,
            document,
            output,
            write_output: self.write_output.unwrap_or(false),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            columns: ColumnMapping::with_overrides(&self.columns),
            patterns: self.patterns,
        })
    }
}

/// Everything a reconciliation run needs, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Employee spreadsheet.
    pub spreadsheet: PathBuf,
    /// Worksheet to read; the first one when `None`.
    pub worksheet: Option<String>,
    /// Payslip PDF document.
    pub document: PathBuf,
    /// Where the updated table is written when `write_output` is set.
    pub output: PathBuf,
    /// Whether the updated table is written. Off unless asked for.
    pub write_output: bool,
    /// Rows shown in the preview.
    pub preview_rows: usize,
    /// Spreadsheet header labels.
    pub columns: ColumnMapping,
    /// Rubric pattern overrides.
    pub patterns: BTreeMap<Rubric, String>,
}

impl ReconcileConfig {
    /// A configuration with defaults for everything but the two inputs.
    #[must_use]
    pub fn new(spreadsheet: impl Into<PathBuf>, document: impl Into<PathBuf>) -> Self {
        let spreadsheet = spreadsheet.into();
        Self {
            output: default_output_path(&spreadsheet),
            spreadsheet,
            worksheet: None,
            document: document.into(),
            write_output: false,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            columns: ColumnMapping::default(),
            patterns: BTreeMap::new(),
        }
    }
}

/// `<stem>_updated.xlsx` next to the spreadsheet.
#[must_use]
pub fn default_output_path(spreadsheet: &Path) -> PathBuf {
    let stem = spreadsheet
        .file_stem()
        .map_or_else(|| "employees".into(), |s| s.to_string_lossy());
    spreadsheet.with_file_name(format!("{stem}_updated.xlsx"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = PartialConfig::from_toml(
            r#"
spreadsheet = "Conferencia.xlsx"
worksheet = "Folha"
document = "HOLERITE.pdf"
write_output = true
preview_rows = 10

[columns]
name = "NOME COMPLETO"

[patterns]
gross_pay = 'Bruto\s*([\d\.,]+)'
"#,
        )
        .unwrap()
        .resolve()
        .unwrap();

        assert_eq!(config.spreadsheet, PathBuf::from("Conferencia.xlsx"));
        assert_eq!(config.worksheet.as_deref(), Some("Folha"));
        assert_eq!(config.document, PathBuf::from("HOLERITE.pdf"));
        assert_eq!(config.output, PathBuf::from("Conferencia_updated.xlsx"));
        assert!(config.write_output);
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.columns.label(Column::Name), "NOME COMPLETO");
        assert_eq!(config.columns.label(Column::JobTitle), "CARGO");
        assert_eq!(
            config.patterns.get(&Rubric::GrossPay).map(String::as_str),
            Some(r"Bruto\s*([\d\.,]+)")
        );
    }

    #[test]
    fn output_write_is_off_by_default() {
        let config = PartialConfig {
            spreadsheet: Some("dados/Conferencia.xlsx".into()),
            document: Some("HOLERITE.pdf".into()),
            ..PartialConfig::default()
        }
        .resolve()
        .unwrap();

        assert!(!config.write_output);
        assert_eq!(config.preview_rows, DEFAULT_PREVIEW_ROWS);
        assert_eq!(config.output, PathBuf::from("dados/Conferencia_updated.xlsx"));
        assert_eq!(config, ReconcileConfig::new("dados/Conferencia.xlsx", "HOLERITE.pdf"));
    }

    #[test]
    fn flags_override_file_values() {
        let file = PartialConfig::from_toml(
            r#"
spreadsheet = "a.xlsx"
document = "a.pdf"
preview_rows = 5

[columns]
name = "NOME COMPLETO"
va = "VALE"
"#,
        );
        // `va` is not a canonical column.
        assert!(matches!(file, Err(ConfigError::Parse(_))));

        let file = PartialConfig::from_toml(
            "spreadsheet = \"a.xlsx\"\ndocument = \"a.pdf\"\npreview_rows = 5\n",
        )
        .unwrap();
        let flags = PartialConfig {
            document: Some("b.pdf".into()),
            write_output: Some(true),
            ..PartialConfig::default()
        };

        let config = file.merge(flags).resolve().unwrap();

        assert_eq!(config.spreadsheet, PathBuf::from("a.xlsx"));
        assert_eq!(config.document, PathBuf::from("b.pdf"));
        assert_eq!(config.preview_rows, 5);
        assert!(config.write_output);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PartialConfig::from_toml("spreadsheet = \"a.xlsx\"\npdf = \"a.pdf\"\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_document_setting_is_an_error() {
        let err = PartialConfig {
            spreadsheet: Some("a.xlsx".into()),
            ..PartialConfig::default()
        }
        .resolve()
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingPath("document")));
    }

    #[test]
    fn refuses_to_overwrite_the_input() {
        let err = PartialConfig {
            spreadsheet: Some("Conferencia.xlsx".into()),
            document: Some("HOLERITE.pdf".into()),
            output: Some("Conferencia.xlsx".into()),
            ..PartialConfig::default()
        }
        .resolve()
        .unwrap_err();

        assert!(matches!(err, ConfigError::OutputOverwritesInput { .. }));
    }
}
