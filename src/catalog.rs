//! Typed setting definitions and the catalog that indexes them by path.
//!
//! A [`Catalog`] is built once through [`CatalogBuilder`], validated, and then
//! only read. Every component that needs bounds, normals, or group membership
//! takes a `&Catalog`; there is no global instance.
//!
//! # Lookup
//!
//! [`Catalog::lookup`] answers only for the bounded kinds (duration, factor,
//! string choice). Toggles, freeform fields, and unknown paths come back as
//! `None`, which callers treat as "no bounds apply". [`Catalog::definition`]
//! answers for every kind and also resolves role-group paths
//! (`userGroups.<i>.<field>`) against the per-group field definitions.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::convert;
use crate::error::SettingsError;
use crate::path::SettingPath;

/// Path plus the human-facing text shown next to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingInfo {
    pub path: SettingPath,
    pub label: String,
    pub description: String,
}

impl SettingInfo {
    pub fn new(path: impl Into<SettingPath>, label: &str, description: &str) -> Self {
        Self {
            path: path.into(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

/// Whole minutes, stored as nanoseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationSetting {
    pub info: SettingInfo,
    pub min_minutes: i64,
    pub max_minutes: i64,
    pub normal_minutes: i64,
}

/// A float multiplier shown as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorSetting {
    pub info: SettingInfo,
    pub min: f64,
    pub max: f64,
    pub normal: f64,
    /// Difficulty weight. Negative: higher values favor the player.
    /// Positive: higher values make the game harder. Zero: ignored.
    pub impact_weight: i32,
}

/// One of a fixed, ordered set of strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSetting {
    pub info: SettingInfo,
    pub options: Vec<String>,
    pub normal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleSetting {
    pub info: SettingInfo,
    pub normal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeformKind {
    Text,
    Integer,
}

/// An unconstrained string or integer.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeformSetting {
    pub info: SettingInfo,
    pub kind: FreeformKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Duration(DurationSetting),
    Factor(FactorSetting),
    Choice(ChoiceSetting),
    Toggle(ToggleSetting),
    Freeform(FreeformSetting),
}

impl Setting {
    pub fn info(&self) -> &SettingInfo {
        match self {
            Setting::Duration(s) => &s.info,
            Setting::Factor(s) => &s.info,
            Setting::Choice(s) => &s.info,
            Setting::Toggle(s) => &s.info,
            Setting::Freeform(s) => &s.info,
        }
    }

    pub fn path(&self) -> &SettingPath {
        &self.info().path
    }

    pub fn label(&self) -> &str {
        &self.info().label
    }

    /// Durations, factors, and choices carry bounds; the rest do not.
    pub fn is_bounded(&self) -> bool {
        matches!(
            self,
            Setting::Duration(_) | Setting::Factor(_) | Setting::Choice(_)
        )
    }

    /// The normal value in stored form, if the kind has one.
    pub fn normal_value(&self) -> Option<Value> {
        match self {
            Setting::Duration(s) => convert::minutes_to_duration(s.normal_minutes)
                .ok()
                .map(Value::from),
            Setting::Factor(s) => Some(Value::from(s.normal)),
            Setting::Choice(s) => Some(Value::from(s.normal.clone())),
            Setting::Toggle(s) => Some(Value::Bool(s.normal)),
            Setting::Freeform(_) => None,
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |reason: String| SettingsError::CatalogInvalid {
            path: self.path().clone(),
            reason,
        };
        if self.path().is_empty() {
            return Err(invalid("empty path".into()));
        }
        match self {
            Setting::Duration(s) => {
                if s.min_minutes < 0 || s.min_minutes > s.max_minutes {
                    return Err(invalid(format!(
                        "bad minute bounds {}-{}",
                        s.min_minutes, s.max_minutes
                    )));
                }
                if !(s.min_minutes..=s.max_minutes).contains(&s.normal_minutes) {
                    return Err(invalid(format!(
                        "normal {} min outside {}-{}",
                        s.normal_minutes, s.min_minutes, s.max_minutes
                    )));
                }
                convert::minutes_to_duration(s.max_minutes)
                    .map_err(|e| invalid(e.to_string()))?;
            }
            Setting::Factor(s) => {
                if !(s.min.is_finite() && s.max.is_finite() && s.min <= s.max) {
                    return Err(invalid(format!("bad bounds {}-{}", s.min, s.max)));
                }
                if !(s.min..=s.max).contains(&s.normal) {
                    return Err(invalid(format!(
                        "normal {} outside {}-{}",
                        s.normal, s.min, s.max
                    )));
                }
            }
            Setting::Choice(s) => {
                if !s.options.contains(&s.normal) {
                    return Err(invalid(format!(
                        "normal '{}' is not one of the options",
                        s.normal
                    )));
                }
            }
            Setting::Toggle(_) | Setting::Freeform(_) => {}
        }
        Ok(())
    }
}

/// A named subset of settings shown, randomized, and scored together.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingGroup {
    pub name: String,
    pub paths: Vec<SettingPath>,
    pub randomizable: bool,
}

/// A fixed difficulty bonus: `points` are added when a batch sets `path` to
/// `trigger` and the setting's normal value is something else.
#[derive(Debug, Clone, PartialEq)]
pub struct Bonus {
    pub path: SettingPath,
    pub trigger: Value,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyRules {
    /// Scores at or above this flag the batch as substantially harder.
    pub threshold: i32,
    pub bonuses: Vec<Bonus>,
}

/// Validated, read-only index of setting definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    settings: Vec<Setting>,
    by_path: HashMap<SettingPath, usize>,
    role_fields: Vec<Setting>,
    groups: Vec<SettingGroup>,
    difficulty: DifficultyRules,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// The bounded definition at `path`, or `None` (no bounds apply).
    pub fn lookup(&self, path: &SettingPath) -> Option<&Setting> {
        self.definition(path).filter(|s| s.is_bounded())
    }

    /// The definition at `path` of any kind.
    ///
    /// For role-group paths the returned definition is the per-group field,
    /// whose own path is relative to the group.
    pub fn definition(&self, path: &SettingPath) -> Option<&Setting> {
        if let Some((_, field)) = path.role_group() {
            return self.role_fields.iter().find(|s| s.path() == &field);
        }
        self.by_path.get(path).map(|&i| &self.settings[i])
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn role_fields(&self) -> &[Setting] {
        &self.role_fields
    }

    pub fn groups(&self) -> &[SettingGroup] {
        &self.groups
    }

    /// Find a group by name, ignoring ASCII case.
    pub fn group(&self, name: &str) -> Option<&SettingGroup> {
        self.groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
    }

    /// The definitions of every member of the named group, in group order.
    pub fn group_settings(&self, name: &str) -> Result<Vec<&Setting>, SettingsError> {
        let group = self
            .group(name)
            .ok_or_else(|| SettingsError::UnknownGroup(name.to_string()))?;
        Ok(group
            .paths
            .iter()
            .filter_map(|p| self.definition(p))
            .collect())
    }

    pub fn difficulty(&self) -> &DifficultyRules {
        &self.difficulty
    }
}

/// Collects definitions and checks them once in [`build`](Self::build).
pub struct CatalogBuilder {
    settings: Vec<Setting>,
    role_fields: Vec<Setting>,
    groups: Vec<SettingGroup>,
    threshold: i32,
    bonuses: Vec<Bonus>,
}

impl CatalogBuilder {
    fn new() -> Self {
        Self {
            settings: Vec::new(),
            role_fields: Vec::new(),
            groups: Vec::new(),
            threshold: 3,
            bonuses: Vec::new(),
        }
    }

    pub fn setting(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }

    pub fn settings(mut self, settings: impl IntoIterator<Item = Setting>) -> Self {
        self.settings.extend(settings);
        self
    }

    /// Add a field every role group carries. Its path is relative to the group.
    pub fn role_field(mut self, setting: Setting) -> Self {
        self.role_fields.push(setting);
        self
    }

    /// Add a named group. Members are given as dotted paths.
    pub fn group(mut self, name: &str, paths: &[&str], randomizable: bool) -> Self {
        self.groups.push(SettingGroup {
            name: name.to_string(),
            paths: paths.iter().map(|p| SettingPath::from(*p)).collect(),
            randomizable,
        });
        self
    }

    /// Set the difficulty warning threshold (default: 3).
    pub fn threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn bonus(mut self, path: &str, trigger: Value, points: i32) -> Self {
        self.bonuses.push(Bonus {
            path: SettingPath::from(path),
            trigger,
            points,
        });
        self
    }

    /// Validate every definition and index them.
    ///
    /// Fails with [`SettingsError::CatalogConflict`] when two definitions share
    /// a path, and with [`SettingsError::CatalogInvalid`] when a definition
    /// breaks its own bounds or a group or bonus names an unknown path.
    pub fn build(self) -> Result<Catalog, SettingsError> {
        let mut by_path = HashMap::with_capacity(self.settings.len());
        for (i, setting) in self.settings.iter().enumerate() {
            setting.validate()?;
            if by_path.insert(setting.path().clone(), i).is_some() {
                return Err(SettingsError::CatalogConflict(setting.path().clone()));
            }
        }

        let mut role_paths = HashSet::new();
        for setting in &self.role_fields {
            setting.validate()?;
            if !role_paths.insert(setting.path().clone()) {
                return Err(SettingsError::CatalogConflict(setting.path().clone()));
            }
        }

        let catalog = Catalog {
            settings: self.settings,
            by_path,
            role_fields: self.role_fields,
            groups: self.groups,
            difficulty: DifficultyRules {
                threshold: self.threshold,
                bonuses: self.bonuses,
            },
        };

        for group in &catalog.groups {
            if let Some(missing) = group
                .paths
                .iter()
                .find(|p| catalog.definition(p).is_none())
            {
                return Err(SettingsError::CatalogInvalid {
                    path: missing.clone(),
                    reason: format!("listed in group '{}' but not defined", group.name),
                });
            }
        }
        for bonus in &catalog.difficulty.bonuses {
            if catalog.definition(&bonus.path).is_none() {
                return Err(SettingsError::CatalogInvalid {
                    path: bonus.path.clone(),
                    reason: "difficulty bonus for an undefined setting".into(),
                });
            }
        }

        Ok(catalog)
    }
}
