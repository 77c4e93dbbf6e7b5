//! Structural drift between a user document and the template.
//!
//! [`diff`] only reads. It reports keys the template no longer has and leaves
//! whose type changed; it never looks inside arrays.

use std::fmt;

use serde_json::{Map, Value};

use crate::path::SettingPath;

/// The JSON type of a leaf, as named in findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(n) if n.is_f64() => ValueType::Float,
            Value::Number(_) => ValueType::Integer,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }

    /// Integers and floats are interchangeable; anything else must match.
    pub fn compatible_with(self, other: ValueType) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// In the user document but not in the template at the same position.
    ObsoleteKey(SettingPath),
    TypeMismatch {
        path: SettingPath,
        user: ValueType,
        default: ValueType,
    },
}

impl Finding {
    pub fn path(&self) -> &SettingPath {
        match self {
            Finding::ObsoleteKey(path) => path,
            Finding::TypeMismatch { path, .. } => path,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::ObsoleteKey(path) => write!(f, "Obsolete/Custom Key: '{path}'"),
            Finding::TypeMismatch {
                path,
                user,
                default,
            } => write!(f, "Type Mismatch: '{path}' (User: {user}, Default: {default})"),
        }
    }
}

/// Compare `existing` against `default`. Run it on the document as loaded,
/// before any merge.
pub fn diff(existing: &Value, default: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();
    if let (Value::Object(current), Value::Object(template)) = (existing, default) {
        scan(current, template, &SettingPath::default(), &mut findings);
    }
    findings
}

fn scan(
    current: &Map<String, Value>,
    template: &Map<String, Value>,
    at: &SettingPath,
    findings: &mut Vec<Finding>,
) {
    for (key, user_val) in current {
        let path = at.child(key.as_str());
        let Some(default_val) = template.get(key) else {
            findings.push(Finding::ObsoleteKey(path));
            continue;
        };
        match (user_val, default_val) {
            (Value::Object(user_obj), Value::Object(default_obj)) => {
                scan(user_obj, default_obj, &path, findings);
            }
            (Value::Null, _) | (_, Value::Null) => {}
            _ => {
                let user = ValueType::of(user_val);
                let default = ValueType::of(default_val);
                if !user.compatible_with(default) {
                    findings.push(Finding::TypeMismatch {
                        path,
                        user,
                        default,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(findings: &[Finding]) -> Vec<String> {
        findings.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn concrete_scenario() {
        let default = json!({"a": 1, "b": {"c": 2}});
        let existing = json!({"b": {"c": 99, "d": 5}, "e": 6});
        assert_eq!(
            rendered(&diff(&existing, &default)),
            vec![
                "Obsolete/Custom Key: 'b.d'".to_string(),
                "Obsolete/Custom Key: 'e'".to_string(),
            ]
        );
    }

    #[test]
    fn int_and_float_are_compatible() {
        let default = json!({"gameSettings": {"playerHealthFactor": 1}});
        let existing = json!({"gameSettings": {"playerHealthFactor": 1.5}});
        assert!(diff(&existing, &default).is_empty());
    }

    #[test]
    fn bool_is_not_numeric() {
        let default = json!({"enableVoiceChat": false});
        let existing = json!({"enableVoiceChat": 0});
        assert_eq!(
            diff(&existing, &default),
            vec![Finding::TypeMismatch {
                path: "enableVoiceChat".into(),
                user: ValueType::Integer,
                default: ValueType::Bool,
            }]
        );
    }

    #[test]
    fn mismatch_message() {
        let default = json!({"slotCount": 16});
        let existing = json!({"slotCount": "16"});
        assert_eq!(
            rendered(&diff(&existing, &default)),
            vec!["Type Mismatch: 'slotCount' (User: string, Default: integer)".to_string()]
        );
    }

    #[test]
    fn nulls_are_never_mismatches() {
        let default = json!({"a": null, "b": 2});
        let existing = json!({"a": "set later", "b": null});
        assert!(diff(&existing, &default).is_empty());
    }

    #[test]
    fn container_against_leaf_is_a_mismatch() {
        let default = json!({"gameSettings": {"x": 1}});
        let existing = json!({"gameSettings": "flat"});
        assert_eq!(
            rendered(&diff(&existing, &default)),
            vec!["Type Mismatch: 'gameSettings' (User: string, Default: object)".to_string()]
        );
    }

    #[test]
    fn arrays_are_not_descended() {
        let default = json!({"userGroups": [{"name": "Admin"}]});
        let existing = json!({"userGroups": [{"name": 5, "extra": true}]});
        assert!(diff(&existing, &default).is_empty());
    }

    #[test]
    fn missing_template_keys_are_not_findings() {
        let default = json!({"a": 1, "b": 2});
        let existing = json!({"a": 3});
        assert!(diff(&existing, &default).is_empty());
    }
}
