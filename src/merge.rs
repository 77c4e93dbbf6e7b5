use serde_json::{Map, Value};

/// Result of [`merge`]: the working document and whether any template key
/// had to be added to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub document: Value,
    pub changed: bool,
}

/// Merge `default` into a copy of `existing`.
///
/// Keys missing from `existing` are copied in from `default`. When both sides
/// hold an object for the same key, recurse. Otherwise `existing`'s value is
/// kept as is, including when one side is a container and the other a leaf.
/// A missing `existing` document yields the template itself.
pub fn merge(default: &Value, existing: Option<&Value>) -> MergeOutcome {
    let Some(existing) = existing else {
        return MergeOutcome {
            document: default.clone(),
            changed: true,
        };
    };
    let mut document = existing.clone();
    let changed = match (&mut document, default) {
        (Value::Object(target), Value::Object(template)) => merge_defaults(target, template),
        _ => false,
    };
    MergeOutcome { document, changed }
}

/// Add every key of `template` that `target` lacks. Returns `true` if
/// anything was added at any depth.
pub fn merge_defaults(target: &mut Map<String, Value>, template: &Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, default_val) in template {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default_val.clone());
                changed = true;
            }
            Some(Value::Object(target_obj)) => {
                if let Value::Object(template_obj) = default_val {
                    changed |= merge_defaults(target_obj, template_obj);
                }
            }
            Some(_) => {}
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disjoint_keys_merge() {
        let out = merge(&json!({"port": 3000}), Some(&json!({"host": "localhost"})));
        assert_eq!(out.document, json!({"host": "localhost", "port": 3000}));
        assert!(out.changed);
    }

    #[test]
    fn existing_leaf_wins() {
        let out = merge(&json!({"slotCount": 16}), Some(&json!({"slotCount": 4})));
        assert_eq!(out.document, json!({"slotCount": 4}));
        assert!(!out.changed);
    }

    #[test]
    fn nested_objects_recurse() {
        let default = json!({"gameSettings": {"a": 1, "b": 2}});
        let existing = json!({"gameSettings": {"a": 10}});
        let out = merge(&default, Some(&existing));
        assert_eq!(out.document, json!({"gameSettings": {"a": 10, "b": 2}}));
        assert!(out.changed);
    }

    #[test]
    fn leaf_against_container_is_left_alone() {
        let default = json!({"gameSettings": {"a": 1}});
        let existing = json!({"gameSettings": "flat"});
        let out = merge(&default, Some(&existing));
        assert_eq!(out.document, existing);
        assert!(!out.changed);

        let out = merge(&json!({"x": 1}), Some(&json!({"x": {"inner": true}})));
        assert_eq!(out.document, json!({"x": {"inner": true}}));
    }

    #[test]
    fn arrays_are_not_merged_element_wise() {
        let default = json!({"userGroups": [{"name": "Admin"}, {"name": "Guest"}]});
        let existing = json!({"userGroups": [{"name": "Mine"}]});
        let out = merge(&default, Some(&existing));
        assert_eq!(out.document, existing);
    }

    #[test]
    fn missing_existing_yields_template() {
        let default = json!({"a": 1});
        let out = merge(&default, None);
        assert_eq!(out.document, default);
        assert!(out.changed);
    }

    #[test]
    fn concrete_scenario() {
        let default = json!({"a": 1, "b": {"c": 2}});
        let existing = json!({"b": {"c": 99, "d": 5}, "e": 6});
        let out = merge(&default, Some(&existing));
        assert_eq!(out.document, json!({"a": 1, "b": {"c": 99, "d": 5}, "e": 6}));
        assert!(out.changed);
    }

    #[test]
    fn idempotent() {
        let default = json!({"a": 1, "b": {"c": 2, "f": {"g": 3}}, "h": [1]});
        let existing = json!({"b": {"c": "user", "d": 5}, "e": 6});
        let once = merge(&default, Some(&existing));
        let twice = merge(&default, Some(&once.document));
        assert_eq!(twice.document, once.document);
        assert!(!twice.changed);
    }

    #[test]
    fn never_removes_existing_keys() {
        let default = json!({"b": {"c": 2}});
        let existing = json!({"b": {"x": 1, "y": {"z": null}}, "custom": [1, 2]});
        let out = merge(&default, Some(&existing));
        assert_eq!(out.document["b"]["x"], json!(1));
        assert_eq!(out.document["b"]["y"], json!({"z": null}));
        assert_eq!(out.document["custom"], json!([1, 2]));
    }
}
