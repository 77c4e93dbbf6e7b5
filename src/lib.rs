//! Schema-driven editing for Enshrouded dedicated-server settings.
//!
//! The server reads a nested JSON document (`enshrouded_server.json`). Each
//! game update can add keys to it, and the release notes ship the new
//! default document. This crate keeps a user's file in step with those
//! defaults without losing edits, validates edits against typed bounds, and
//! can randomize a group of settings while estimating how much harder the
//! result is.
//!
//! ```ignore
//! let catalog = enshrouded::catalog()?;
//! let template = TemplateSource::resolve(Path::new("enshrouded_server_readme.txt"), &catalog);
//! let store = Store::new("enshrouded_server.json", "old");
//! let (mut session, outcome) = Session::open(catalog, store, template, false)?;
//! session.edit(&"gameSettings.dayTimeDuration".into(), "45")?;
//! session.save()?;
//! ```
//!
//! # The catalog is the schema
//!
//! A [`Catalog`] lists every known setting with its kind:
//!
//! - **Duration**: whole minutes with bounds, stored as nanoseconds.
//! - **Factor**: a float multiplier with bounds, edited as a percentage, and
//!   an impact weight used for difficulty scoring.
//! - **Choice**: one of a fixed set of strings.
//! - **Toggle** and **Freeform**: booleans and plain text or integers.
//!
//! Settings are addressed by [`SettingPath`], a dotted key path where numeric
//! segments index arrays (`userGroups.0.password`). Role-group fields are
//! defined once and resolved for every group index. The catalog is built and
//! validated once, then passed by reference; [`enshrouded::catalog`] builds
//! the server's.
//!
//! # Keeping up with the defaults
//!
//! [`Session::open`] runs two passes over the file on disk:
//!
//! - [`merge`] adds every template key the file lacks. Existing values always
//!   win, and a leaf is never replaced by a container or the reverse.
//! - [`diff`] reports keys the template no longer has and leaves whose type
//!   changed. Integers and floats count as the same type.
//!
//! The file is rewritten only when the merge added something; findings alone
//! are reported, not acted on.
//!
//! # Randomization
//!
//! [`Session::randomize`] draws new values for one randomizable group:
//! uniform minutes for durations, a uniform float from the inner 80% of a
//! factor's range, a uniform pick for choices and toggles. Identity and
//! network fields are never touched. The batch is then scored: player-side
//! factors far below normal and enemy-side factors far above it add their
//! weight, and a few specific switches add fixed bonuses. A score of 3 or
//! more is flagged as substantially harder. The score is a heuristic.
//!
//! # Editor configuration
//!
//! Which files the editor works on is itself configurable through
//! [`EditorConfig`]: compiled defaults, then an optional TOML file, then
//! `ENSH_*` environment variables, then command-line flags.
//!
//! # Clap adapter
//!
//! The `cli` feature (on by default) adds [`Cli`], a clap parser that turns
//! arguments into an [`Action`] plus config overrides. Everything below it
//! works without clap:
//!
//! ```toml
//! enshrouded-config = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! Fallible operations return [`SettingsError`]. Rejected input names the
//! setting and its allowed range; file errors carry the path.

pub mod catalog;
pub mod convert;
pub mod diff;
pub mod edit;
pub mod enshrouded;
pub mod error;
pub mod merge;
pub mod ops;
pub mod path;
pub mod randomize;
pub mod session;
pub mod settings;
pub mod store;
pub mod template;
pub mod types;

#[cfg(feature = "cli")]
mod cli;

#[cfg(test)]
mod fixtures;

pub use catalog::{Catalog, CatalogBuilder, Setting};
#[cfg(feature = "cli")]
pub use cli::{Cli, Command};
pub use diff::Finding;
pub use error::{ConversionError, SettingsError};
pub use ops::ActionResult;
pub use path::SettingPath;
pub use session::{OpenOutcome, Session};
pub use settings::EditorConfig;
pub use store::Store;
pub use template::TemplateSource;
pub use types::Action;
