//! Action handling and the displayable results callers print.
//!
//! [`handle`] opens a [`Session`] for the configured files, runs one
//! [`Action`] against it, and writes the document back when the action
//! changed it.

use std::fmt;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::Catalog;
use crate::diff::Finding;
use crate::enshrouded;
use crate::error::SettingsError;
use crate::path::SettingPath;
use crate::randomize::DifficultyReport;
use crate::session::{FieldView, OpenOutcome, Session};
use crate::settings::{self, EditorConfig};
use crate::store::BackupEntry;
use crate::template::TemplateSource;
use crate::types::Action;

/// A titled list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub fields: Vec<FieldView>,
}

/// Result of an action. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Status {
        settings_file: PathBuf,
        version: String,
        fallback: bool,
        outcome: OpenOutcome,
        preset_note: Option<String>,
    },
    Fields {
        sections: Vec<Section>,
        preset_note: Option<String>,
    },
    Value(FieldView),
    ValueSet(FieldView),
    Randomized {
        group: String,
        changes: Vec<FieldView>,
        report: DifficultyReport,
        threshold: i32,
        saved: bool,
    },
    Reset {
        version: String,
        backup: Option<PathBuf>,
    },
    BackedUp(Option<PathBuf>),
    Backups(Vec<BackupEntry>),
    Restored(String),
    GroupAdded { index: usize, name: String },
    GroupDeleted { index: usize, name: String },
    Template(String),
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &FieldView) -> fmt::Result {
    write!(f, "{}: {}", field.label, field.value)?;
    match field.unit {
        Some("%") => f.write_str("%")?,
        Some(unit) => write!(f, " {unit}")?,
        None => {}
    }
    if let Some(hint) = &field.hint {
        write!(f, "  [{hint}]")?;
    }
    Ok(())
}

fn write_findings(f: &mut fmt::Formatter<'_>, findings: &[Finding]) -> fmt::Result {
    if findings.is_empty() {
        return Ok(());
    }
    write!(f, "\nDifferences from the defaults:")?;
    for finding in findings {
        write!(f, "\n  - {finding}")?;
    }
    Ok(())
}

fn write_backup(f: &mut fmt::Formatter<'_>, backup: &Option<PathBuf>) -> fmt::Result {
    match backup {
        Some(path) => write!(f, " (backup: {})", path.display()),
        None => Ok(()),
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Status {
                settings_file,
                version,
                fallback,
                outcome,
                preset_note,
            } => {
                writeln!(f, "Settings file: {}", settings_file.display())?;
                write!(f, "Game version: {version}")?;
                if *fallback {
                    write!(f, " (built-in defaults)")?;
                }
                writeln!(f)?;
                match outcome {
                    OpenOutcome::Created => write!(f, "Created the settings file from defaults.")?,
                    OpenOutcome::ReplacedCorrupt { backup } => {
                        write!(f, "Replaced a corrupted settings file with defaults")?;
                        write_backup(f, backup)?;
                        write!(f, ".")?;
                    }
                    OpenOutcome::Updated { .. } => {
                        write!(f, "Added new settings from the defaults.")?
                    }
                    OpenOutcome::Unchanged { .. } => write!(f, "Settings are up to date.")?,
                }
                write_findings(f, outcome.findings())?;
                if let Some(note) = preset_note {
                    write!(f, "\nNote: {note}")?;
                }
                Ok(())
            }
            ActionResult::Fields {
                sections,
                preset_note,
            } => {
                for (i, section) in sections.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "[{}]", section.title)?;
                    for field in &section.fields {
                        write!(f, "\n  ")?;
                        write_field(f, field)?;
                    }
                }
                if let Some(note) = preset_note {
                    write!(f, "\nNote: {note}")?;
                }
                Ok(())
            }
            ActionResult::Value(field) => write_field(f, field),
            ActionResult::ValueSet(field) => {
                write!(f, "Set ")?;
                write_field(f, field)
            }
            ActionResult::Randomized {
                group,
                changes,
                report,
                threshold,
                saved,
            } => {
                write!(f, "Randomized {group} settings")?;
                if !saved {
                    write!(f, " (dry run, not saved)")?;
                }
                write!(f, ":")?;
                for field in changes {
                    write!(f, "\n  ")?;
                    write_field(f, field)?;
                }
                write!(f, "\nDifficulty score: {}", report.score)?;
                if report.harder {
                    write!(
                        f,
                        "\nWarning: these settings are substantially harder than normal (score {} >= {threshold}).",
                        report.score
                    )?;
                }
                Ok(())
            }
            ActionResult::Reset { version, backup } => {
                write!(f, "Reverted settings to the defaults for version {version}")?;
                write_backup(f, backup)
            }
            ActionResult::BackedUp(Some(path)) => write!(f, "Backed up to {}", path.display()),
            ActionResult::BackedUp(None) => write!(f, "No settings file to back up"),
            ActionResult::Backups(entries) => {
                if entries.is_empty() {
                    return write!(f, "No backups found");
                }
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}  {}", entry.taken_at.format("%Y-%m-%d %H:%M:%S"), entry.name)?;
                }
                Ok(())
            }
            ActionResult::Restored(name) => write!(f, "Restored settings from {name}"),
            ActionResult::GroupAdded { index, name } => {
                write!(f, "Added role group {name} at index {index}")
            }
            ActionResult::GroupDeleted { index, name } => {
                write!(f, "Deleted role group {name} (index {index})")
            }
            ActionResult::Template(text) => write!(f, "{text}"),
        }
    }
}

/// Open a session on the files named by `config`.
pub fn open_session(
    config: &EditorConfig,
    replace_corrupt: bool,
) -> Result<(Session, OpenOutcome), SettingsError> {
    let catalog: Catalog = enshrouded::catalog()?;
    let template = TemplateSource::resolve(&config.release_notes_file, &catalog);
    Session::open(catalog, config.store(), template, replace_corrupt)
}

/// Run `action` against the files named by `config`.
pub fn handle(
    action: Action,
    config: &EditorConfig,
    replace_corrupt: bool,
) -> Result<ActionResult, SettingsError> {
    if !action.needs_session() {
        return Ok(ActionResult::Template(settings::template()));
    }
    let (mut session, outcome) = open_session(config, replace_corrupt)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    apply(&mut session, outcome, action, &mut rng)
}

/// Run `action` on an open session. `outcome` is what opening it reported.
pub fn apply<R: Rng + ?Sized>(
    session: &mut Session,
    outcome: OpenOutcome,
    action: Action,
    rng: &mut R,
) -> Result<ActionResult, SettingsError> {
    match action {
        Action::Status => Ok(ActionResult::Status {
            settings_file: session.store().settings_file().to_path_buf(),
            version: session.template().version.clone(),
            fallback: session.template().is_fallback(),
            outcome,
            preset_note: session.preset_note(),
        }),
        Action::Show { group } => {
            let sections = match group {
                Some(name) => vec![group_section(session, &name)?],
                None => all_sections(session)?,
            };
            Ok(ActionResult::Fields {
                sections,
                preset_note: session.preset_note(),
            })
        }
        Action::Get { path } => Ok(ActionResult::Value(session.field(&SettingPath::from(path.as_str())))),
        Action::Set { path, value } => {
            let target = SettingPath::from(path.as_str());
            session.edit(&target, &value)?;
            session.save()?;
            Ok(ActionResult::ValueSet(session.field(&target)))
        }
        Action::Randomize { group, dry_run } => {
            let (assessment, report) = session.randomize(&group, rng)?;
            if !dry_run {
                session.save()?;
            }
            let name = session
                .catalog()
                .group(&group)
                .map(|g| g.name.clone())
                .unwrap_or(group);
            Ok(ActionResult::Randomized {
                group: name,
                changes: assessment.keys().map(|p| session.field(p)).collect(),
                report,
                threshold: session.catalog().difficulty().threshold,
                saved: !dry_run,
            })
        }
        Action::Reset => {
            let backup = session.revert_to_template()?;
            Ok(ActionResult::Reset {
                version: session.template().version.clone(),
                backup,
            })
        }
        Action::Backup { reason } => Ok(ActionResult::BackedUp(session.backup(reason.as_deref())?)),
        Action::Backups => Ok(ActionResult::Backups(session.store().backups()?)),
        Action::Restore { name } => {
            session.restore(&name)?;
            Ok(ActionResult::Restored(name))
        }
        Action::AddGroup => {
            let index = session.add_role_group();
            session.save()?;
            Ok(ActionResult::GroupAdded {
                index,
                name: session.display(&role_group_name(index)),
            })
        }
        Action::DeleteGroup { index } => {
            let removed = session.delete_role_group(index)?;
            session.save()?;
            let name = removed
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("(unnamed)")
                .to_string();
            Ok(ActionResult::GroupDeleted { index, name })
        }
        Action::EditorConfig => Ok(ActionResult::Template(settings::template())),
    }
}

fn role_group_name(index: usize) -> SettingPath {
    SettingPath::from(crate::path::ROLE_GROUPS_KEY)
        .child(index)
        .child("name")
}

fn group_section(session: &Session, name: &str) -> Result<Section, SettingsError> {
    let title = session
        .catalog()
        .group(name)
        .map(|g| g.name.clone())
        .ok_or_else(|| SettingsError::UnknownGroup(name.to_string()))?;
    Ok(Section {
        title,
        fields: session.group_fields(name)?,
    })
}

fn all_sections(session: &Session) -> Result<Vec<Section>, SettingsError> {
    let mut sections = session
        .catalog()
        .groups()
        .iter()
        .map(|g| group_section(session, &g.name))
        .collect::<Result<Vec<_>, _>>()?;
    for (index, fields) in session.role_group_fields().into_iter().enumerate() {
        let name = session.display(&role_group_name(index));
        sections.push(Section {
            title: format!("User Group {} ({name})", index + 1),
            fields,
        });
    }
    Ok(sections)
}
