//! Configuration of the editor itself: which files it works on and how it
//! seeds randomization.
//!
//! Layers, lowest priority first: compiled defaults, an optional TOML file,
//! `ENSH_*` environment variables, then command-line overrides.

use std::path::{Path, PathBuf};

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::store::Store;

pub const APP_NAME: &str = "enshrouded-config";
pub const CONFIG_FILE_NAME: &str = "enshrouded-config.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// The dedicated server's settings file.
    #[config(default = "enshrouded_server.json", env = "ENSH_SETTINGS_FILE")]
    pub settings_file: PathBuf,

    /// Server release notes holding the default settings block.
    #[config(default = "enshrouded_server_readme.txt", env = "ENSH_RELEASE_NOTES")]
    pub release_notes_file: PathBuf,

    /// Directory that receives `.old` backups.
    #[config(default = "old", env = "ENSH_BACKUP_DIR")]
    pub backup_dir: PathBuf,

    /// Fixed seed for randomization. Unset draws from entropy.
    #[config(env = "ENSH_SEED")]
    pub seed: Option<u64>,
}

/// Values given on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub settings_file: Option<PathBuf>,
    pub release_notes_file: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// `enshrouded-config.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Some(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// A commented TOML template of every editor option.
pub fn template() -> String {
    confique::toml::template::<EditorConfig>(confique::toml::FormatOptions::default())
}

impl EditorConfig {
    /// Load from `explicit` if given (it must exist), else from the platform
    /// config file if present, with environment variables on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(SettingsError::io(
                        path,
                        std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                    ));
                }
                Self::load_from(Some(path))
            }
            None => Self::load_from(default_config_path().as_deref()),
        }
    }

    /// Environment over `file` over defaults. A missing `file` is skipped.
    pub fn load_from(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = EditorConfig::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(file) = overrides.settings_file {
            self.settings_file = file;
        }
        if let Some(notes) = overrides.release_notes_file {
            self.release_notes_file = notes;
        }
        if let Some(dir) = overrides.backup_dir {
            self.backup_dir = dir;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }

    pub fn store(&self) -> Store {
        Store::new(&self.settings_file, &self.backup_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_a_file() {
        let dir = TempDir::new().unwrap();
        let config = EditorConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.release_notes_file, PathBuf::from("enshrouded_server_readme.txt"));
        assert_eq!(config.backup_dir, PathBuf::from("old"));
    }

    #[test]
    fn file_values_replace_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "backup_dir = \"backups\"\nseed = 7\n").unwrap();
        let config = EditorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backup_dir, PathBuf::from("backups"));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = EditorConfig::load(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "seed = \"not a number\"\n").unwrap();
        assert!(matches!(
            EditorConfig::load(Some(&path)),
            Err(SettingsError::EditorConfig(_))
        ));
    }

    #[test]
    fn overrides_win() {
        let dir = TempDir::new().unwrap();
        let mut config = EditorConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        config.apply(Overrides {
            settings_file: Some("srv/settings.json".into()),
            seed: Some(99),
            ..Overrides::default()
        });
        assert_eq!(config.settings_file, PathBuf::from("srv/settings.json"));
        assert_eq!(config.backup_dir, PathBuf::from("old"));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.store().settings_file(), Path::new("srv/settings.json"));
    }

    #[test]
    fn template_documents_every_option() {
        let text = template();
        for key in ["settings_file", "release_notes_file", "backup_dir", "seed"] {
            assert!(text.contains(key), "template lacks {key}");
        }
    }
}
