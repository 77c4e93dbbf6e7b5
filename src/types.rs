/// An editor operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Reconcile the settings file with the defaults and report the outcome.
    Status,
    /// Show one settings group, or all of them and the role groups.
    Show { group: Option<String> },
    Get { path: String },
    Set { path: String, value: String },
    Randomize { group: String, dry_run: bool },
    /// Replace the settings with the defaults.
    Reset,
    Backup { reason: Option<String> },
    Backups,
    Restore { name: String },
    AddGroup,
    DeleteGroup { index: usize },
    /// Print a commented template of the editor's own options.
    EditorConfig,
}

impl Action {
    /// Whether the action needs the settings file at all.
    pub fn needs_session(&self) -> bool {
        !matches!(self, Action::EditorConfig)
    }
}
