//! Config Validation Tests
//!
//! Typo detection for unknown TOML keys, table naming rules and the input
//! file checks, exercised through the public config API.

use ideal_fit::config::validation::{
    known_config_keys, suggest_correction, validate_input_files, validate_unknown_keys,
};
use ideal_fit::config::{AppConfig, ConfigError};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_table_name_warns_with_suggestion() {
    let toml_str = r#"
[tables]
idael = "ideal_functions"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("idael"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("tables.ideal"));
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[chart]
enabled = false
"#;
    let warnings = validate_unknown_keys(toml_str);
    // both the section and its key are unknown
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].field, "chart");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("charts"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[store]
path = "db/database"

[tables]
train = "train_data"
ideal = "ideal_data"
test = "test_data"
result = "result"

[input]
dir = "data"
train_file = "train.csv"
ideal_file = "ideal.csv"
test_file = "test.csv"
import_on_run = true

[charts]
enabled = true
output_dir = "charts"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Got warnings: {warnings:?}");
}

#[test]
fn unrelated_key_has_no_suggestion() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("completely_unrelated_setting", &known), None);
}

#[test]
fn malformed_toml_yields_no_key_warnings() {
    assert!(validate_unknown_keys("[tables\ntrain = ").is_empty());
}

// ============================================================================
// Table Naming Rules
// ============================================================================

#[test]
fn empty_config_uses_defaults() {
    let config = AppConfig::from_toml_str("").unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.tables.result, "result");
    assert_eq!(config.input.train_path().to_str(), Some("data/train.csv"));
}

#[test]
fn partial_config_keeps_other_defaults() {
    let config = AppConfig::from_toml_str(
        r#"
[tables]
result = "classified"

[charts]
enabled = false
"#,
    )
    .unwrap();

    assert_eq!(config.tables.result, "classified");
    assert_eq!(config.tables.train, "train_data");
    assert!(!config.charts.enabled);
    assert!(config.input.import_on_run);
}

#[test]
fn result_overwriting_input_is_rejected() {
    let err = AppConfig::from_toml_str(
        r#"
[tables]
result = "test_data"
"#,
    )
    .unwrap_err();

    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("overwrite"), "{errors:?}");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn duplicate_input_tables_are_rejected() {
    let err = AppConfig::from_toml_str(
        r#"
[tables]
train = "data"
ideal = "data"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ideal_fit.toml");

    let mut config = AppConfig::default();
    config.tables.result = "archive".to_string();
    config.charts.enabled = false;
    config.save_to_file(&path).unwrap();

    let loaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

// ============================================================================
// Input File Checks
// ============================================================================

#[test]
fn missing_input_files_warn() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("train.csv"), "x,y1\n").unwrap();

    let mut config = AppConfig::default();
    config.input.dir = dir.path().to_path_buf();

    let warnings = validate_input_files(&config);
    let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
    assert_eq!(fields, vec!["input.ideal_file", "input.test_file"]);
}

#[test]
fn input_checks_skipped_without_import() {
    let mut config = AppConfig::default();
    config.input.dir = "/nonexistent".into();
    config.input.import_on_run = false;
    assert!(validate_input_files(&config).is_empty());
}
