//! Reading and writing the settings file, and its timestamped backups.
//!
//! Backups live in a separate directory and are named
//! `<stem>_<YYYYmmdd_HHMMSS>[_<reason>].old`, so a plain directory listing
//! tells when and why each was taken.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDateTime};
use log::info;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::diff::ValueType;
use crate::error::SettingsError;

pub const BACKUP_EXTENSION: &str = "old";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static BACKUP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stem>.+?)_(?P<ts>\d{8}_\d{6})(?:_(?P<reason>.+))?\.old$")
        .expect("backup name pattern is valid")
});

/// Pretty JSON with four-space indentation and a trailing newline. Keys come
/// out sorted.
pub fn render(doc: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `<stem>_<timestamp>[_<reason>].old`, with spaces in the reason turned
/// into underscores.
pub fn backup_name(stem: &str, at: NaiveDateTime, reason: Option<&str>) -> String {
    let ts = at.format(TIMESTAMP_FORMAT);
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("{stem}_{ts}_{}.{BACKUP_EXTENSION}", reason.replace(' ', "_")),
        None => format!("{stem}_{ts}.{BACKUP_EXTENSION}"),
    }
}

/// One file in the backup directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub taken_at: NaiveDateTime,
    pub reason: Option<String>,
}

impl BackupEntry {
    fn from_path(path: PathBuf) -> Result<Option<Self>, SettingsError> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            return Ok(None);
        };
        let parsed = BACKUP_NAME.captures(&name).and_then(|caps| {
            let taken_at = NaiveDateTime::parse_from_str(&caps["ts"], TIMESTAMP_FORMAT).ok()?;
            Some((taken_at, caps.name("reason").map(|r| r.as_str().to_string())))
        });
        let (taken_at, reason) = match parsed {
            Some(parsed) => parsed,
            None => {
                let modified = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .map_err(|e| SettingsError::io(&path, e))?;
                (DateTime::<Local>::from(modified).naive_local(), None)
            }
        };
        Ok(Some(BackupEntry {
            name,
            path,
            taken_at,
            reason,
        }))
    }
}

/// The settings file and where its backups go.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    settings_file: PathBuf,
    backup_dir: PathBuf,
}

impl Store {
    pub fn new(settings_file: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: settings_file.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// The current document, or `None` if the settings file does not exist.
    /// A file whose top level is not a JSON object is rejected.
    pub fn load(&self) -> Result<Option<Value>, SettingsError> {
        match fs::read_to_string(&self.settings_file) {
            Ok(text) => parse(&self.settings_file, &text).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SettingsError::io(&self.settings_file, e)),
        }
    }

    /// Write `doc` to the settings file, creating parent directories.
    pub fn save(&self, doc: &Value) -> Result<(), SettingsError> {
        let text = render(doc).map_err(|source| SettingsError::Parse {
            path: self.settings_file.clone(),
            source,
        })?;
        if let Some(parent) = self.settings_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SettingsError::io(parent, e))?;
        }
        fs::write(&self.settings_file, text).map_err(|e| SettingsError::io(&self.settings_file, e))?;
        info!("Saved settings to {}", self.settings_file.display());
        Ok(())
    }

    /// Copy the settings file into the backup directory. `None` when there
    /// is no settings file to back up.
    pub fn backup(&self, reason: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
        self.backup_at(reason, Local::now().naive_local())
    }

    pub fn backup_at(
        &self,
        reason: Option<&str>,
        at: NaiveDateTime,
    ) -> Result<Option<PathBuf>, SettingsError> {
        if !self.settings_file.is_file() {
            return Ok(None);
        }
        fs::create_dir_all(&self.backup_dir).map_err(|e| SettingsError::io(&self.backup_dir, e))?;

        let stem = self.stem();
        let mut target = self.backup_dir.join(backup_name(&stem, at, reason));
        let mut attempt = 2;
        while target.exists() {
            let numbered = match reason {
                Some(r) => format!("{r}_{attempt}"),
                None => attempt.to_string(),
            };
            target = self.backup_dir.join(backup_name(&stem, at, Some(&numbered)));
            attempt += 1;
        }

        fs::copy(&self.settings_file, &target).map_err(|e| SettingsError::io(&target, e))?;
        info!("Backed up {} to {}", self.settings_file.display(), target.display());
        Ok(Some(target))
    }

    /// Every `.old` backup of this settings file, newest first.
    pub fn backups(&self) -> Result<Vec<BackupEntry>, SettingsError> {
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SettingsError::io(&self.backup_dir, e)),
        };

        let prefix = format!("{}_", self.stem());
        let mut backups = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SettingsError::io(&self.backup_dir, e))?.path();
            let is_backup = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(BACKUP_EXTENSION)
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix));
            if !is_backup {
                continue;
            }
            if let Some(backup) = BackupEntry::from_path(path)? {
                backups.push(backup);
            }
        }
        backups.sort_by(|a, b| b.taken_at.cmp(&a.taken_at).then_with(|| b.name.cmp(&a.name)));
        Ok(backups)
    }

    /// Replace the settings file with the named backup and return the
    /// restored document. The current file is backed up first.
    pub fn restore(&self, name: &str) -> Result<Value, SettingsError> {
        let source = self.backup_path(name)?;
        let backup_stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        self.backup(Some(&format!("before_restoring_{backup_stem}")))?;

        let text = fs::read_to_string(&source).map_err(|e| SettingsError::io(&source, e))?;
        let doc = parse(&source, &text)?;
        fs::copy(&source, &self.settings_file).map_err(|e| SettingsError::io(&self.settings_file, e))?;
        info!("Restored {} from {}", self.settings_file.display(), source.display());
        Ok(doc)
    }

    fn backup_path(&self, name: &str) -> Result<PathBuf, SettingsError> {
        let plain = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        let path = self.backup_dir.join(name);
        if plain && path.is_file() {
            Ok(path)
        } else {
            Err(SettingsError::BackupNotFound(name.to_string()))
        }
    }

    fn stem(&self) -> String {
        self.settings_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("settings")
            .to_string()
    }
}

fn parse(path: &Path, text: &str) -> Result<Value, SettingsError> {
    let doc: Value = serde_json::from_str(text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !doc.is_object() {
        return Err(SettingsError::NotAnObject {
            path: path.to_path_buf(),
            found: ValueType::of(&doc),
        });
    }
    Ok(doc)
}
