//! YAML configuration for the revision differ.
//!
//! Every section is optional; an empty document (or no file at all) gives
//! the behaviour of the classic streaming mapper: wikitext tokens, Delete and
//! Insert spans only, TSV rows, Hadoop counters on stderr.
//!
//! ```yaml
//! version: "1.0"
//!
//! stream:
//!   history_capacity: 10000
//!
//! diff:
//!   tokenizer: wikitext      # wikitext | whitespace | chars
//!   separator: ""
//!   report: [-1, 1]
//!   timeout_ms: 1000
//!   max_vocabulary: 1000000
//!
//! output:
//!   format: tsv              # tsv | json
//!   emit_counters: true
//!   counter_group: SkippingTaskCounters
//!   counter_name: MapProcessedRecords
//!
//! logging:
//!   level: info
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use delta::{DiffOptions, ReportKinds, TokenizerKind};
use serde::{Deserialize, Serialize};
use stream::DEFAULT_HISTORY_CAPACITY;
use thiserror::Error;

/// Environment variable naming the YAML file the binary loads.
pub const CONFIG_ENV: &str = "REVDIFF_CONFIG";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration of a differ run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RevdiffConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub stream: StreamYamlConfig,

    #[serde(default)]
    pub diff: DiffYamlConfig,

    #[serde(default)]
    pub output: OutputYamlConfig,

    #[serde(default)]
    pub logging: LoggingYamlConfig,
}

impl RevdiffConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: RevdiffConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.stream.validate()?;
        self.diff.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

impl Default for RevdiffConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            stream: StreamYamlConfig::default(),
            diff: DiffYamlConfig::default(),
            output: OutputYamlConfig::default(),
            logging: LoggingYamlConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamYamlConfig {
    /// Trailing bytes of input kept for error reports.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl StreamYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.history_capacity == 0 {
            return Err(ConfigLoadError::Validation(
                "stream.history_capacity must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StreamYamlConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffYamlConfig {
    #[serde(default)]
    pub tokenizer: TokenizerKind,

    #[serde(default)]
    pub separator: String,

    #[serde(default = "default_report")]
    pub report: ReportKinds,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub max_vocabulary: Option<usize>,
}

impl DiffYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.timeout_ms == Some(0) {
            return Err(ConfigLoadError::Validation(
                "diff.timeout_ms must be >= 1".to_string(),
            ));
        }
        if self.max_vocabulary == Some(0) {
            return Err(ConfigLoadError::Validation(
                "diff.max_vocabulary must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_options(&self) -> DiffOptions {
        DiffOptions {
            separator: self.separator.clone(),
            report: self.report,
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_vocabulary: self.max_vocabulary,
        }
    }
}

impl Default for DiffYamlConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerKind::default(),
            separator: String::new(),
            report: default_report(),
            timeout_ms: None,
            max_vocabulary: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputYamlConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "true_value")]
    pub emit_counters: bool,

    #[serde(default = "default_counter_group")]
    pub counter_group: String,

    #[serde(default = "default_counter_name")]
    pub counter_name: String,
}

impl OutputYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        for (field, value) in [
            ("counter_group", &self.counter_group),
            ("counter_name", &self.counter_name),
        ] {
            if value.is_empty() || value.contains([',', '\n']) {
                return Err(ConfigLoadError::Validation(format!(
                    "output.{field} must be non-empty without commas or newlines"
                )));
            }
        }
        Ok(())
    }
}

impl Default for OutputYamlConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            emit_counters: true,
            counter_group: default_counter_group(),
            counter_name: default_counter_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingYamlConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingYamlConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_report() -> ReportKinds {
    ReportKinds::changes()
}
fn true_value() -> bool {
    true
}
fn default_counter_group() -> String {
    "SkippingTaskCounters".to_string()
}
fn default_counter_name() -> String {
    "MapProcessedRecords".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use delta::EditKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_streaming_mapper() {
        let config = RevdiffConfig::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.stream.history_capacity, 10_000);
        assert_eq!(config.diff.tokenizer, TokenizerKind::Wikitext);
        assert!(config.diff.report.contains(EditKind::Delete));
        assert!(config.diff.report.contains(EditKind::Insert));
        assert!(!config.diff.report.contains(EditKind::Equal));
        assert_eq!(config.output.format, OutputFormat::Tsv);
        assert!(config.output.emit_counters);
        assert_eq!(config.diff.to_options().timeout, None);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(RevdiffConfig::from_yaml("").unwrap(), RevdiffConfig::default());
        assert_eq!(
            RevdiffConfig::from_yaml("version: \"1\"\n").unwrap().diff,
            DiffYamlConfig::default()
        );
    }

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
stream:
  history_capacity: 512
diff:
  tokenizer: whitespace
  separator: "|"
  report: [-1, 0, 1]
  timeout_ms: 250
output:
  format: json
  emit_counters: false
logging:
  level: debug
"#;

        let config = RevdiffConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.stream.history_capacity, 512);
        assert_eq!(config.diff.tokenizer, TokenizerKind::Whitespace);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.emit_counters);
        assert_eq!(config.logging.level, "debug");

        let options = config.diff.to_options();
        assert_eq!(options.separator, "|");
        assert_eq!(options.report, ReportKinds::all());
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"version: \"1.0\"\ndiff:\n  tokenizer: chars\n")
            .unwrap();

        let config = RevdiffConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.diff.tokenizer, TokenizerKind::Chars);
    }

    #[test]
    fn test_validation_errors() {
        let err = RevdiffConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));

        let err = RevdiffConfig::from_yaml("stream:\n  history_capacity: 0\n").unwrap_err();
        assert!(err.to_string().contains("history_capacity"));

        let err = RevdiffConfig::from_yaml("diff:\n  max_vocabulary: 0\n").unwrap_err();
        assert!(err.to_string().contains("max_vocabulary"));

        let err = RevdiffConfig::from_yaml("output:\n  counter_name: \"a,b\"\n").unwrap_err();
        assert!(err.to_string().contains("counter_name"));
    }

    #[test]
    fn test_unknown_report_kind_is_a_parse_error() {
        let err = RevdiffConfig::from_yaml("diff:\n  report: [2]\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }
}
