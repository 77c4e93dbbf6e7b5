use std::path::PathBuf;
use thiserror::Error;

use crate::diff::ValueType;
use crate::path::SettingPath;

/// A raw user input that could not be turned into a stored value.
///
/// Raised at the edge closest to user input; the edit is rejected and the
/// previous value stays in the document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("'{0}' is not a whole number of minutes")]
    InvalidMinutes(String),

    #[error("minutes must not be negative (got {0})")]
    NegativeMinutes(i64),

    #[error("{0} minutes does not fit in a duration")]
    MinutesOverflow(i64),

    #[error("stored duration {0} is not a non-negative number")]
    InvalidDuration(String),

    #[error("'{0}' is not a percentage")]
    InvalidPercent(String),

    #[error("'{0}' is not true or false")]
    InvalidBool(String),

    #[error("'{0}' is not an integer")]
    InvalidInteger(String),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("value is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for '{path}': {source}")]
    Conversion {
        path: SettingPath,
        source: ConversionError,
    },

    #[error("{label} ({value}) is out of range ({min}-{max})")]
    OutOfRange {
        label: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("'{value}' is not a valid {label}; expected one of: {}", .options.join(", "))]
    InvalidChoice {
        label: String,
        value: String,
        options: Vec<String>,
    },

    #[error("Two settings share the path '{0}'")]
    CatalogConflict(SettingPath),

    #[error("Invalid definition for '{path}': {reason}")]
    CatalogInvalid { path: SettingPath, reason: String },

    #[error("Unknown settings group '{0}'")]
    UnknownGroup(String),

    #[error("Settings group '{0}' cannot be randomized")]
    NotRandomizable(String),

    #[error("No role group at index {0}")]
    NoRoleGroup(usize),

    #[error("Backup '{0}' not found")]
    BackupNotFound(String),

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} does not hold a settings object (top level is {found})")]
    NotAnObject { path: PathBuf, found: ValueType },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Editor configuration error: {0}")]
    EditorConfig(#[from] confique::Error),
}

impl SettingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SettingsError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_names_the_path() {
        let err = SettingsError::Conversion {
            path: SettingPath::from("gameSettings.dayTimeDuration"),
            source: ConversionError::InvalidMinutes("abc".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("gameSettings.dayTimeDuration"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn out_of_range_formats() {
        let err = SettingsError::OutOfRange {
            label: "Player Health".into(),
            value: "500%".into(),
            min: "25%".into(),
            max: "400%".into(),
        };
        assert_eq!(
            err.to_string(),
            "Player Health (500%) is out of range (25%-400%)"
        );
    }

    #[test]
    fn invalid_choice_lists_options() {
        let err = SettingsError::InvalidChoice {
            label: "Curse Modifier".into(),
            value: "Brutal".into(),
            options: vec!["Easy".into(), "Normal".into(), "Hard".into()],
        };
        assert!(err.to_string().contains("Easy, Normal, Hard"));
    }

    #[test]
    fn not_an_object_names_the_file_and_type() {
        let err = SettingsError::NotAnObject {
            path: PathBuf::from("enshrouded_server.json"),
            found: ValueType::Array,
        };
        assert_eq!(
            err.to_string(),
            "enshrouded_server.json does not hold a settings object (top level is array)"
        );
    }

    #[test]
    fn catalog_conflict_formats() {
        let err = SettingsError::CatalogConflict(SettingPath::from("name"));
        assert!(err.to_string().contains("'name'"));
    }
}
