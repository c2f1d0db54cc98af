//! Config file checks that warn instead of failing
//!
//! `ideal_fit.toml` is read twice: once as a raw `toml::Value` so every dotted
//! key can be compared with the keys `AppConfig` understands, then through
//! serde. A misspelt key would otherwise be dropped silently by
//! `#[serde(default)]`, so each unknown key is reported with the closest known
//! key as a suggestion.

use std::collections::HashSet;
use std::fmt;

/// A non-fatal config problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Dotted key path the warning refers to
    pub field: String,
    pub message: String,
    /// Closest known key, when one is near enough
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suggestion {
            Some(known) => write!(f, "{} (did you mean '{known}'?)", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Largest edit distance still offered as a suggestion
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Every section and key `AppConfig` deserializes
const KNOWN_KEYS: &[&str] = &[
    "store",
    "store.path",
    "tables",
    "tables.train",
    "tables.ideal",
    "tables.test",
    "tables.result",
    "input",
    "input.dir",
    "input.train_file",
    "input.ideal_file",
    "input.test_file",
    "input.import_on_run",
    "charts",
    "charts.enabled",
    "charts.output_dir",
];

pub fn known_config_keys() -> HashSet<&'static str> {
    KNOWN_KEYS.iter().copied().collect()
}

/// Dotted paths of every key in a TOML document, each table before its children
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(value, prefix, &mut paths);
    paths
}

fn collect_paths(value: &toml::Value, prefix: &str, paths: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };
    for (key, child) in table {
        let path = match prefix {
            "" => key.clone(),
            _ => format!("{prefix}.{key}"),
        };
        paths.push(path);
        if child.is_table() {
            let parent = paths[paths.len() - 1].clone();
            collect_paths(child, &parent, paths);
        }
    }
}

/// Character-level edit distance (insert, delete, substitute)
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

/// Closest known key within the suggestion distance
///
/// Equal distances resolve to the alphabetically first key.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut candidates: Vec<&str> = known.iter().copied().collect();
    candidates.sort_unstable();

    candidates
        .into_iter()
        .map(|key| (key, edit_distance(unknown, key)))
        .filter(|&(_, distance)| distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|&(_, distance)| distance)
        .map(|(key, _)| key.to_string())
}

/// Warnings for every key in `raw_toml` that `AppConfig` does not know
///
/// Returns nothing for malformed TOML; serde reports that error on its own.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

/// Warn about CSV inputs a `run` with `import_on_run` would fail to read
pub fn validate_input_files(config: &super::AppConfig) -> Vec<ValidationWarning> {
    let input = &config.input;
    if !input.import_on_run {
        return Vec::new();
    }

    [
        ("input.train_file", input.train_path()),
        ("input.ideal_file", input.ideal_path()),
        ("input.test_file", input.test_path()),
    ]
    .into_iter()
    .filter(|(_, path)| !path.is_file())
    .map(|(field, path)| ValidationWarning {
        field: field.to_string(),
        message: format!("{field}: '{}' does not exist", path.display()),
        suggestion: None,
    })
    .collect()
}
