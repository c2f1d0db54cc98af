//! Application configuration - store location, table names, inputs and charts
//!
//! Every struct implements `Default` with the values in [`super::defaults`],
//! so a missing or empty `ideal_fit.toml` reproduces the stock layout:
//! CSVs under `data/`, a sled store at `db/database`, result table `result`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable the CLI reads for an explicit config file.
pub const CONFIG_ENV_VAR: &str = "IDEAL_FIT_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ideal_fit.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// An explicit file (`--config` or `$IDEAL_FIT_CONFIG`, resolved by the
/// binary) goes through `AppConfig::load_from_file`; otherwise
/// `AppConfig::load()` reads `./ideal_fit.toml` or falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub tables: TableNames,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub charts: ChartConfig,
}

impl AppConfig {
    /// Load `./ideal_fit.toml`, or the defaults when it is absent
    ///
    /// A local file that fails to parse or validate is logged and ignored.
    pub fn load() -> Self {
        let local = Path::new(LOCAL_CONFIG_FILE);
        if !local.is_file() {
            info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
            return Self::default();
        }

        match Self::load_from_file(local) {
            Ok(config) => {
                info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                config
            }
            Err(e) => {
                warn!(error = %e, "Ignoring ./{}, using built-in defaults", LOCAL_CONFIG_FILE);
                Self::default()
            }
        }
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings only; they never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write the config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate table naming and paths.
    ///
    /// Rules:
    /// - Table names and file names must be non-empty
    /// - The three input tables must be distinct
    /// - The result table must not overwrite an input table
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();
        let t = &self.tables;

        for (key, value) in [
            ("tables.train", &t.train),
            ("tables.ideal", &t.ideal),
            ("tables.test", &t.test),
            ("tables.result", &t.result),
            ("input.train_file", &self.input.train_file),
            ("input.ideal_file", &self.input.ideal_file),
            ("input.test_file", &self.input.test_file),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{key} must not be empty"));
            }
        }

        let inputs: HashSet<&str> = [t.train.as_str(), t.ideal.as_str(), t.test.as_str()]
            .into_iter()
            .collect();
        if inputs.len() != 3 {
            errors.push(format!(
                "tables.train, tables.ideal and tables.test must be distinct (got '{}', '{}', '{}')",
                t.train, t.ideal, t.test
            ));
        }
        if inputs.contains(t.result.as_str()) {
            errors.push(format!(
                "tables.result = '{}' would overwrite an input table",
                t.result
            ));
        }

        if self.store.path.as_os_str().is_empty() {
            errors.push("store.path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            ConfigError::Parse(path, e) => {
                write!(f, "invalid TOML in {}: {e}", path.display())
            }
            ConfigError::Serialize(e) => write!(f, "cannot serialize config: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "invalid config:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Store
// ============================================================================

/// Table store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// sled database directory. Overridden by `--store`.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(defaults::STORE_PATH)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

// ============================================================================
// Table Names
// ============================================================================

/// Names under which datasets are kept in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_train_table")]
    pub train: String,
    #[serde(default = "default_ideal_table")]
    pub ideal: String,
    #[serde(default = "default_test_table")]
    pub test: String,
    /// Output table, replaced on every successful run.
    #[serde(default = "default_result_table")]
    pub result: String,
}

fn default_train_table() -> String {
    defaults::TRAIN_TABLE.to_string()
}
fn default_ideal_table() -> String {
    defaults::IDEAL_TABLE.to_string()
}
fn default_test_table() -> String {
    defaults::TEST_TABLE.to_string()
}
fn default_result_table() -> String {
    defaults::RESULT_TABLE.to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            train: default_train_table(),
            ideal: default_ideal_table(),
            test: default_test_table(),
            result: default_result_table(),
        }
    }
}

// ============================================================================
// Input Files
// ============================================================================

/// CSV sources imported into the store before a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_train_file")]
    pub train_file: String,
    #[serde(default = "default_ideal_file")]
    pub ideal_file: String,
    #[serde(default = "default_test_file")]
    pub test_file: String,
    /// Re-import the CSVs at the start of every `run`.
    #[serde(default = "default_true")]
    pub import_on_run: bool,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(defaults::INPUT_DIR)
}
fn default_train_file() -> String {
    defaults::TRAIN_FILE.to_string()
}
fn default_ideal_file() -> String {
    defaults::IDEAL_FILE.to_string()
}
fn default_test_file() -> String {
    defaults::TEST_FILE.to_string()
}
const fn default_true() -> bool {
    true
}

impl InputConfig {
    pub fn train_path(&self) -> PathBuf {
        self.dir.join(&self.train_file)
    }

    pub fn ideal_path(&self) -> PathBuf {
        self.dir.join(&self.ideal_file)
    }

    pub fn test_path(&self) -> PathBuf {
        self.dir.join(&self.test_file)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            train_file: default_train_file(),
            ideal_file: default_ideal_file(),
            test_file: default_test_file(),
            import_on_run: true,
        }
    }
}

// ============================================================================
// Charts
// ============================================================================

/// Diagnostic chart output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_chart_dir")]
    pub output_dir: PathBuf,
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from(defaults::CHART_DIR)
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_chart_dir(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok(), "defaults must pass validation");
    }

    #[test]
    fn empty_file_means_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tables.result, "result");
        assert_eq!(config.store.path, PathBuf::from("db/database"));
        assert!(config.input.import_on_run);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let toml_str = r#"
[tables]
result = "classified"

[charts]
enabled = false
"#;
        let config = AppConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.tables.result, "classified");
        assert!(!config.charts.enabled);
        // untouched keys keep their defaults
        assert_eq!(config.tables.train, "train_data");
        assert_eq!(config.charts.output_dir, PathBuf::from("charts"));
    }

    #[test]
    fn result_must_not_overwrite_an_input() {
        let mut config = AppConfig::default();
        config.tables.result = config.tables.test.clone();
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("tables.result")));
        }
    }

    #[test]
    fn inputs_need_distinct_tables() {
        let mut config = AppConfig::default();
        config.tables.ideal = config.tables.train.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut config = AppConfig::default();
        config.input.test_file = "  ".to_string();
        let result = config.validate();
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("input.test_file")));
        } else {
            panic!("empty test_file should fail validation");
        }
    }

    #[test]
    fn toml_text_reloads_unchanged() {
        let original = AppConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: AppConfig = toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
        assert!(toml_str.contains("[tables]"));
        assert!(toml_str.contains("[input]"));
    }

    #[test]
    fn input_paths_are_joined_to_dir() {
        let input = InputConfig {
            dir: PathBuf::from("/srv/fit"),
            ..InputConfig::default()
        };
        assert_eq!(input.ideal_path(), PathBuf::from("/srv/fit/ideal.csv"));
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ideal_fit.toml");

        let mut config = AppConfig::default();
        config.tables.result = "run_42".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.tables.result, "run_42");
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[tables\nresult = 1").unwrap();

        let err = AppConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref p, _) if p == &path));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = AppConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(ref p, _) if p == &path));
    }
}
