//! The authoritative default document, read from the server's release notes.
//!
//! The dedicated server ships a readme that states its version and embeds the
//! default `enshrouded_server.json`. When the readme is missing or the block
//! cannot be decoded, the hardcoded fallback from [`crate::enshrouded`] is
//! used instead.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::enshrouded;

/// Version label used when the release notes do not state one.
pub const UNKNOWN_VERSION: &str = "Unknown (Readme not found/parsable)";

static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Version:\s*(\S+)").expect("version pattern is valid"));

static DEFAULT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DEFAULT enshrouded_server\.json(?: / VERSION \S+)?\s*(\{[\s\S]*?\n\})")
        .expect("template pattern is valid")
});

/// What could be extracted from a release-notes text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseNotes {
    pub version: Option<String>,
    pub template: Option<Value>,
}

/// Pull the version label and the default settings block out of `text`.
///
/// The block runs from the `{` after the `DEFAULT enshrouded_server.json`
/// marker to the first line consisting of a lone `}`.
pub fn parse_release_notes(text: &str) -> ReleaseNotes {
    let version = VERSION_LINE
        .captures(text)
        .map(|caps| caps[1].to_string());

    let template = match DEFAULT_BLOCK.captures(text) {
        Some(caps) => match serde_json::from_str::<Value>(&caps[1]) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!("Default settings block in release notes is not valid JSON: {err}");
                None
            }
        },
        None => {
            debug!("No default settings block in release notes");
            None
        }
    };

    ReleaseNotes { version, template }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    ReleaseNotes,
    Fallback,
}

/// The default document in effect for a session and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSource {
    pub version: String,
    pub document: Value,
    pub origin: TemplateOrigin,
}

impl TemplateSource {
    /// Read the release notes at `path` and resolve the template, falling
    /// back to the built-in document when needed.
    pub fn resolve(path: &Path, catalog: &Catalog) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_notes(parse_release_notes(&text), catalog),
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    warn!("Release notes not found at {}", path.display());
                } else {
                    warn!("Could not read release notes {}: {err}", path.display());
                }
                Self::from_notes(ReleaseNotes::default(), catalog)
            }
        }
    }

    pub fn from_notes(notes: ReleaseNotes, catalog: &Catalog) -> Self {
        let version = notes.version.unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        match notes.template {
            Some(document) => TemplateSource {
                version,
                document,
                origin: TemplateOrigin::ReleaseNotes,
            },
            None => {
                warn!("Using built-in default settings");
                TemplateSource {
                    version,
                    document: enshrouded::fallback_template(catalog),
                    origin: TemplateOrigin::Fallback,
                }
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == TemplateOrigin::Fallback
    }
}
