//! Clap adapter for the editor.
//!
//! Compiled only with the `cli` feature (on by default). [`Cli`] parses the
//! global file options and one subcommand; [`Cli::into_parts`] hands the rest
//! of the crate a framework-free [`Action`] plus the [`Overrides`] to layer on
//! top of the loaded [`EditorConfig`](crate::EditorConfig).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::Overrides;
use crate::types::Action;

/// Inspect, edit, randomize, and back up an Enshrouded dedicated-server
/// settings file.
#[derive(Debug, Parser)]
#[command(name = "enshrouded-config", version)]
pub struct Cli {
    /// Editor configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server settings file to work on.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Server release notes holding the default settings.
    #[arg(long, global = true)]
    pub release_notes: Option<PathBuf>,

    /// Directory for `.old` backups.
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Seed for reproducible randomization.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Replace an undecodable settings file with the defaults (after backing it up).
    #[arg(long, global = true)]
    pub replace_corrupt: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync the settings file with the defaults and report differences.
    Status,
    /// Show settings, optionally for one group (General, Player, World, Enemy, Resources, Experience).
    Show { group: Option<String> },
    /// Show one setting by dotted path (e.g. "gameSettings.dayTimeDuration").
    Get { path: String },
    /// Set one setting. Durations take minutes, factors take percentages.
    Set { path: String, value: String },
    /// Randomize every setting in a group within its allowed range.
    Randomize {
        group: String,
        /// Print the result without saving it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Replace all settings with the defaults (a backup is made first).
    Reset,
    /// Back up the settings file.
    Backup {
        /// Short note appended to the backup name.
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// List backups, newest first.
    Backups,
    /// Restore a backup by file name.
    Restore { name: String },
    /// Add a role group with no permissions.
    AddGroup,
    /// Delete the role group at the given index.
    DeleteGroup { index: usize },
    /// Print a commented template of the editor's own options.
    EditorConfig,
}

impl Cli {
    /// Split into the action to run and the command-line config overrides.
    /// No subcommand means `status`.
    pub fn into_parts(self) -> (Action, Overrides) {
        let overrides = Overrides {
            settings_file: self.file,
            release_notes_file: self.release_notes,
            backup_dir: self.backup_dir,
            seed: self.seed,
        };
        let action = match self.command {
            None | Some(Command::Status) => Action::Status,
            Some(Command::Show { group }) => Action::Show { group },
            Some(Command::Get { path }) => Action::Get { path },
            Some(Command::Set { path, value }) => Action::Set { path, value },
            Some(Command::Randomize { group, dry_run }) => Action::Randomize { group, dry_run },
            Some(Command::Reset) => Action::Reset,
            Some(Command::Backup { reason }) => Action::Backup { reason },
            Some(Command::Backups) => Action::Backups,
            Some(Command::Restore { name }) => Action::Restore { name },
            Some(Command::AddGroup) => Action::AddGroup,
            Some(Command::DeleteGroup { index }) => Action::DeleteGroup { index },
            Some(Command::EditorConfig) => Action::EditorConfig,
        };
        (action, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (Action, Overrides) {
        Cli::try_parse_from(args).unwrap().into_parts()
    }

    #[test]
    fn bare_invocation_is_status() {
        let (action, overrides) = parse(&["enshrouded-config"]);
        assert_eq!(action, Action::Status);
        assert_eq!(overrides, Overrides::default());
    }

    #[test]
    fn parse_set() {
        let (action, _) = parse(&["enshrouded-config", "set", "gameSettings.curseModifier", "Hard"]);
        assert_eq!(
            action,
            Action::Set {
                path: "gameSettings.curseModifier".into(),
                value: "Hard".into(),
            }
        );
    }

    #[test]
    fn parse_randomize_dry_run() {
        let (action, _) = parse(&["enshrouded-config", "randomize", "Enemy", "--dry-run"]);
        assert_eq!(
            action,
            Action::Randomize {
                group: "Enemy".into(),
                dry_run: true,
            }
        );
    }

    #[test]
    fn parse_show_with_and_without_group() {
        assert_eq!(
            parse(&["enshrouded-config", "show"]).0,
            Action::Show { group: None }
        );
        assert_eq!(
            parse(&["enshrouded-config", "show", "player"]).0,
            Action::Show {
                group: Some("player".into())
            }
        );
    }

    #[test]
    fn parse_backup_reason() {
        let (action, _) = parse(&["enshrouded-config", "backup", "-r", "before update"]);
        assert_eq!(
            action,
            Action::Backup {
                reason: Some("before update".into())
            }
        );
    }

    #[test]
    fn parse_delete_group_index() {
        let (action, _) = parse(&["enshrouded-config", "delete-group", "2"]);
        assert_eq!(action, Action::DeleteGroup { index: 2 });
        assert!(Cli::try_parse_from(["enshrouded-config", "delete-group", "two"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let (action, overrides) = parse(&[
            "enshrouded-config",
            "randomize",
            "World",
            "--seed",
            "42",
            "--file",
            "srv/enshrouded_server.json",
            "--backup-dir",
            "srv/old",
        ]);
        assert!(matches!(action, Action::Randomize { .. }));
        assert_eq!(overrides.seed, Some(42));
        assert_eq!(
            overrides.settings_file,
            Some(PathBuf::from("srv/enshrouded_server.json"))
        );
        assert_eq!(overrides.backup_dir, Some(PathBuf::from("srv/old")));
    }

    #[test]
    fn replace_corrupt_and_config_flags() {
        let cli = Cli::try_parse_from([
            "enshrouded-config",
            "--replace-corrupt",
            "--config",
            "editor.toml",
            "status",
        ])
        .unwrap();
        assert!(cli.replace_corrupt);
        assert_eq!(cli.config, Some(PathBuf::from("editor.toml")));
    }

    #[test]
    fn invalid_subcommand_errors() {
        assert!(Cli::try_parse_from(["enshrouded-config", "nope"]).is_err());
    }

    #[test]
    fn parse_editor_config() {
        assert_eq!(
            parse(&["enshrouded-config", "editor-config"]).0,
            Action::EditorConfig
        );
    }
}
