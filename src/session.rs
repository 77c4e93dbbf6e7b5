//! The working document for one run of the editor.
//!
//! [`Session::open`] reconciles the file on disk with the template: a missing
//! file is created, a file missing template keys gets them merged in, and
//! drift is reported as findings. After that, all edits happen on the
//! in-memory document and reach disk only through [`Session::save`].

use std::path::PathBuf;

use log::{info, warn};
use rand::Rng;
use serde_json::Value;

use crate::catalog::{Catalog, Setting};
use crate::diff::{self, Finding};
use crate::edit;
use crate::enshrouded::{self, CUSTOM_PRESET, PRESET_PATH, RANDOMIZE_EXCLUDED};
use crate::error::SettingsError;
use crate::merge;
use crate::path::{self, Key, ROLE_GROUPS_KEY, SettingPath};
use crate::randomize::{self, Assessment, DifficultyReport, Randomizer};
use crate::store::Store;
use crate::template::TemplateSource;

const CORRUPT_BACKUP_REASON: &str = "corrupted_original";
const SAVE_BACKUP_REASON: &str = "before_save";
const REVERT_BACKUP_REASON: &str = "before_revert_to_template";
const NEW_GROUP_PASSWORD: &str = "Password";

/// How [`Session::open`] found the settings file.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    /// No file existed; the template was written.
    Created,
    /// The file could not be decoded and was replaced by the template.
    ReplacedCorrupt { backup: Option<PathBuf> },
    /// Template keys were merged in and the file rewritten.
    Updated { findings: Vec<Finding> },
    /// Nothing to add; the file was left as is.
    Unchanged { findings: Vec<Finding> },
}

impl OpenOutcome {
    pub fn findings(&self) -> &[Finding] {
        match self {
            OpenOutcome::Updated { findings } | OpenOutcome::Unchanged { findings } => findings,
            OpenOutcome::Created | OpenOutcome::ReplacedCorrupt { .. } => &[],
        }
    }
}

/// One field prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub path: SettingPath,
    pub label: String,
    pub value: String,
    pub unit: Option<&'static str>,
    pub hint: Option<String>,
}

pub struct Session {
    catalog: Catalog,
    store: Store,
    template: TemplateSource,
    randomizer: Randomizer,
    document: Value,
}

impl Session {
    /// Load the settings file and bring it up to date with `template`.
    ///
    /// An undecodable file, or one whose top level is not an object, is an
    /// error unless `replace_corrupt` is set, in which case it is backed up
    /// and replaced by the template.
    pub fn open(
        catalog: Catalog,
        store: Store,
        template: TemplateSource,
        replace_corrupt: bool,
    ) -> Result<(Self, OpenOutcome), SettingsError> {
        let (document, outcome) = match store.load() {
            Ok(None) => {
                info!(
                    "{} not found, creating it from defaults",
                    store.settings_file().display()
                );
                let document = template.document.clone();
                store.save(&document)?;
                (document, OpenOutcome::Created)
            }
            Err(err @ (SettingsError::Parse { .. } | SettingsError::NotAnObject { .. }))
                if replace_corrupt =>
            {
                warn!("{err}; replacing it with defaults");
                let backup = store.backup(Some(CORRUPT_BACKUP_REASON))?;
                let document = template.document.clone();
                store.save(&document)?;
                (document, OpenOutcome::ReplacedCorrupt { backup })
            }
            Err(err) => return Err(err),
            Ok(Some(existing)) => {
                let findings = diff::diff(&existing, &template.document);
                for finding in &findings {
                    warn!("{finding}");
                }
                let merged = merge::merge(&template.document, Some(&existing));
                if merged.changed {
                    info!("Added new template settings to {}", store.settings_file().display());
                    store.save(&merged.document)?;
                    (merged.document, OpenOutcome::Updated { findings })
                } else {
                    (merged.document, OpenOutcome::Unchanged { findings })
                }
            }
        };

        let session = Session {
            catalog,
            store,
            template,
            randomizer: Randomizer::new(RANDOMIZE_EXCLUDED.iter().copied()),
            document,
        };
        Ok((session, outcome))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn get(&self, at: &SettingPath) -> Option<&Value> {
        path::get(&self.document, at)
    }

    /// The value at `at` in its typed form (minutes, percent, text).
    pub fn display(&self, at: &SettingPath) -> String {
        edit::display(self.catalog.definition(at), self.get(at))
    }

    pub fn field(&self, at: &SettingPath) -> FieldView {
        let definition = self.catalog.definition(at);
        FieldView {
            path: at.clone(),
            label: definition
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| at.to_string()),
            value: self.display(at),
            unit: definition.and_then(edit::unit),
            hint: definition.and_then(edit::range_hint),
        }
    }

    /// Every field of the named group.
    pub fn group_fields(&self, group: &str) -> Result<Vec<FieldView>, SettingsError> {
        Ok(self
            .catalog
            .group_settings(group)?
            .into_iter()
            .map(|s| self.field(s.path()))
            .collect())
    }

    /// Every field of every role group, grouped by index.
    pub fn role_group_fields(&self) -> Vec<Vec<FieldView>> {
        (0..self.role_groups().len())
            .map(|index| {
                let base = SettingPath::from(ROLE_GROUPS_KEY).child(index);
                self.catalog
                    .role_fields()
                    .iter()
                    .map(|s| {
                        let mut keys = base.keys().to_vec();
                        keys.extend(s.path().keys().iter().cloned());
                        self.field(&SettingPath::new(keys))
                    })
                    .collect()
            })
            .collect()
    }

    /// Parse `raw` for `at` and write it. On failure the document is left
    /// unchanged. Returns the stored value.
    pub fn edit(&mut self, at: &SettingPath, raw: &str) -> Result<Value, SettingsError> {
        if let Some((index, _)) = at.role_group() {
            if index >= self.role_groups().len() {
                return Err(SettingsError::NoRoleGroup(index));
            }
        }
        let value = edit::parse_input(at, self.catalog.definition(at), self.get(at), raw)?;
        path::set(&mut self.document, at, value.clone());
        info!("Set {at} = {value}");
        Ok(value)
    }

    /// Randomize every eligible setting in `group` and score the batch.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        group: &str,
        rng: &mut R,
    ) -> Result<(Assessment, DifficultyReport), SettingsError> {
        let found = self
            .catalog
            .group(group)
            .ok_or_else(|| SettingsError::UnknownGroup(group.to_string()))?;
        if !found.randomizable {
            return Err(SettingsError::NotRandomizable(found.name.clone()));
        }
        let settings: Vec<&Setting> = self.catalog.group_settings(group)?;
        let assessment = self.randomizer.randomize(&mut self.document, &settings, rng);
        let report = randomize::score(&assessment, &self.catalog);
        info!(
            "Randomized {} settings in {}, difficulty score {}",
            assessment.len(),
            found.name,
            report.score
        );
        if report.harder {
            warn!(
                "Randomized {} settings are substantially harder than normal (score {})",
                found.name, report.score
            );
        }
        Ok((assessment, report))
    }

    /// A reminder that individual game settings may be ignored unless the
    /// preset is `Custom`.
    pub fn preset_note(&self) -> Option<String> {
        let preset = self.get(&SettingPath::from(PRESET_PATH))?.as_str()?;
        (preset != CUSTOM_PRESET).then(|| {
            format!(
                "Difficulty preset is '{preset}': the server may ignore individual game settings unless it is '{CUSTOM_PRESET}'."
            )
        })
    }

    pub fn role_groups(&self) -> &[Value] {
        self.get(&SettingPath::from(ROLE_GROUPS_KEY))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a role group with no permissions. Returns its index.
    pub fn add_role_group(&mut self) -> usize {
        let key = SettingPath::from(ROLE_GROUPS_KEY);
        if !self.get(&key).is_some_and(Value::is_array) {
            path::set(&mut self.document, &key, Value::Array(Vec::new()));
        }
        let index = self.role_groups().len();
        let name = format!("NewGroup{}", index + 1);
        let group = enshrouded::role_group(&name, NEW_GROUP_PASSWORD, [false; 4]);
        path::set(&mut self.document, &key.child(Key::Index(index)), group);
        info!("Added role group {name}");
        index
    }

    /// Remove the role group at `index` and return it.
    pub fn delete_role_group(&mut self, index: usize) -> Result<Value, SettingsError> {
        let groups = match self.document.get_mut(ROLE_GROUPS_KEY) {
            Some(Value::Array(groups)) if index < groups.len() => groups,
            _ => return Err(SettingsError::NoRoleGroup(index)),
        };
        let removed = groups.remove(index);
        info!(
            "Deleted role group {}",
            removed.get("name").and_then(Value::as_str).unwrap_or("(unnamed)")
        );
        Ok(removed)
    }

    /// Replace the document with the template and write it, backing up the
    /// current file first.
    pub fn revert_to_template(&mut self) -> Result<Option<PathBuf>, SettingsError> {
        let backup = self.store.backup(Some(REVERT_BACKUP_REASON))?;
        self.document = self.template.document.clone();
        self.store.save(&self.document)?;
        info!("Reverted settings to defaults (version {})", self.template.version);
        Ok(backup)
    }

    /// Back up the file on disk, then write the working document over it.
    pub fn save(&self) -> Result<Option<PathBuf>, SettingsError> {
        let backup = self.store.backup(Some(SAVE_BACKUP_REASON))?;
        self.store.save(&self.document)?;
        Ok(backup)
    }

    pub fn backup(&self, reason: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
        self.store.backup(reason)
    }

    /// Restore the named backup and make it the working document.
    pub fn restore(&mut self, name: &str) -> Result<(), SettingsError> {
        self.document = self.store.restore(name)?;
        Ok(())
    }
}
