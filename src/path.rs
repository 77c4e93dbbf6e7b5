//! Path-addressed reads and writes over a nested JSON document.
//!
//! A [`SettingPath`] is a sequence of [`Key`]s: field names for objects,
//! indices for arrays. Paths print and parse in dotted form
//! (`userGroups.0.password`), where an all-digit segment is an index.
//!
//! Reads never fail: a missing key, an out-of-range index, or a key of the
//! wrong shape for the node it meets all yield `None` (or the caller's
//! default). Writes auto-vivify: intermediate containers are created on the
//! way down, and a node whose shape conflicts with the next key is silently
//! replaced by a fresh container. Callers that need strictness must check the
//! path with [`get`] first.

use std::fmt;

use serde_json::{Map, Value};

/// Top-level key of the role-group list. Paths starting here address one
/// group by index: `userGroups.<index>.<field>`.
pub const ROLE_GROUPS_KEY: &str = "userGroups";

/// One step of a [`SettingPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Field(String),
    Index(usize),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Field(s.to_string())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => write!(f, "{name}"),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

/// An ordered key sequence addressing a location in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingPath(Vec<Key>);

impl SettingPath {
    pub fn new(keys: Vec<Key>) -> Self {
        SettingPath(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Key> {
        self.0.last()
    }

    /// A new path with `key` appended.
    pub fn child(&self, key: impl Into<Key>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.into());
        SettingPath(keys)
    }

    /// Split a role-group path into its group index and the field path
    /// within the group. `None` for any other path.
    pub fn role_group(&self) -> Option<(usize, SettingPath)> {
        match self.0.as_slice() {
            [Key::Field(head), Key::Index(index), rest @ ..] if head == ROLE_GROUPS_KEY => {
                Some((*index, SettingPath(rest.to_vec())))
            }
            _ => None,
        }
    }
}

impl From<&str> for SettingPath {
    fn from(dotted: &str) -> Self {
        if dotted.is_empty() {
            return SettingPath::default();
        }
        let keys = dotted
            .split('.')
            .map(|segment| match segment.parse::<usize>() {
                Ok(i) if segment.bytes().all(|b| b.is_ascii_digit()) => Key::Index(i),
                _ => Key::Field(segment.to_string()),
            })
            .collect();
        SettingPath(keys)
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Walk `doc` along `path`. `None` as soon as a step cannot be taken.
pub fn get<'a>(doc: &'a Value, path: &SettingPath) -> Option<&'a Value> {
    let mut current = doc;
    for key in path.keys() {
        current = match (current, key) {
            (Value::Array(items), Key::Index(i)) => items.get(*i)?,
            (Value::Object(map), Key::Field(name)) => map.get(name)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Like [`get`], returning a clone of the found value or `default`.
pub fn get_or(doc: &Value, path: &SettingPath, default: Value) -> Value {
    get(doc, path).cloned().unwrap_or(default)
}

/// Write `value` at `path`, creating containers along the way.
///
/// A field key needs an object and an index key needs an array at the node
/// it is applied to; any other node there is replaced. Arrays are padded with
/// empty objects below an intermediate index and with `null` below the final
/// one. An empty path replaces the whole document.
pub fn set(doc: &mut Value, path: &SettingPath, value: Value) {
    let Some((last, parents)) = path.keys().split_last() else {
        *doc = value;
        return;
    };

    let mut current = doc;
    for key in parents {
        current = slot(current, key, Value::Object(Map::new()));
    }
    *slot(current, last, Value::Null) = value;
}

/// The child of `node` under `key`, coercing `node` to the container shape
/// `key` needs and growing arrays with `pad`.
fn slot<'a>(node: &'a mut Value, key: &Key, pad: Value) -> &'a mut Value {
    match key {
        Key::Field(name) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                unreachable!("node was just made an object");
            };
            map.entry(name.clone()).or_insert(Value::Null)
        }
        Key::Index(i) => {
            if !node.is_array() {
                *node = Value::Array(Vec::new());
            }
            let Value::Array(items) = node else {
                unreachable!("node was just made an array");
            };
            if items.len() <= *i {
                items.resize(*i + 1, pad);
            }
            &mut items[*i]
        }
    }
}
