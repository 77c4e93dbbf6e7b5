//! Turning typed input into stored values and stored values back into text.
//!
//! Input forms follow what a server admin thinks in: durations as whole
//! minutes, factors as percentages, choices by name, toggles as yes/no.

use serde_json::Value;

use crate::catalog::{FreeformKind, Setting};
use crate::convert;
use crate::error::{ConversionError, SettingsError};
use crate::path::SettingPath;

/// Parse and validate `raw` for the setting at `path`.
///
/// `setting` is the catalog definition, if any. Paths with no definition keep
/// the JSON type of `current`, falling back to a string.
pub fn parse_input(
    path: &SettingPath,
    setting: Option<&Setting>,
    current: Option<&Value>,
    raw: &str,
) -> Result<Value, SettingsError> {
    let conversion = |source| SettingsError::Conversion {
        path: path.clone(),
        source,
    };
    match setting {
        Some(Setting::Duration(s)) => {
            let minutes = convert::parse_minutes(raw).map_err(conversion)?;
            if !(s.min_minutes..=s.max_minutes).contains(&minutes) {
                return Err(SettingsError::OutOfRange {
                    label: s.info.label.clone(),
                    value: format!("{minutes} min"),
                    min: format!("{} min", s.min_minutes),
                    max: format!("{} min", s.max_minutes),
                });
            }
            let stored = convert::minutes_to_duration(minutes).map_err(conversion)?;
            Ok(Value::from(stored))
        }
        Some(Setting::Factor(s)) => {
            let factor = convert::percent_to_float(raw).map_err(conversion)?;
            if !(s.min..=s.max).contains(&factor) {
                return Err(SettingsError::OutOfRange {
                    label: s.info.label.clone(),
                    value: format!("{}%", raw.trim().trim_end_matches('%')),
                    min: format!("{}%", convert::float_to_percent(s.min)),
                    max: format!("{}%", convert::float_to_percent(s.max)),
                });
            }
            Ok(Value::from(factor))
        }
        Some(Setting::Choice(s)) => {
            let wanted = raw.trim();
            s.options
                .iter()
                .find(|o| o.as_str() == wanted)
                .or_else(|| s.options.iter().find(|o| o.eq_ignore_ascii_case(wanted)))
                .map(|o| Value::from(o.clone()))
                .ok_or_else(|| SettingsError::InvalidChoice {
                    label: s.info.label.clone(),
                    value: wanted.to_string(),
                    options: s.options.clone(),
                })
        }
        Some(Setting::Toggle(_)) => parse_bool(raw).map(Value::Bool).map_err(conversion),
        Some(Setting::Freeform(s)) => match s.kind {
            FreeformKind::Text => Ok(Value::from(raw)),
            FreeformKind::Integer => parse_integer(raw).map(Value::from).map_err(conversion),
        },
        None => parse_like(current, raw).map_err(conversion),
    }
}

/// Accepts true/false, yes/no, on/off, and 1/0, ignoring case.
pub fn parse_bool(raw: &str) -> Result<bool, ConversionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "no" | "n" | "off" | "0" => Ok(false),
        "" => Err(ConversionError::Empty),
        _ => Err(ConversionError::InvalidBool(raw.trim().to_string())),
    }
}

/// Blank input means zero.
fn parse_integer(raw: &str) -> Result<i64, ConversionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| ConversionError::InvalidInteger(trimmed.to_string()))
}

fn parse_like(current: Option<&Value>, raw: &str) -> Result<Value, ConversionError> {
    match current {
        Some(Value::Bool(_)) => parse_bool(raw).map(Value::Bool),
        Some(Value::Number(n)) if n.is_f64() => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| ConversionError::InvalidNumber(raw.trim().to_string())),
        Some(Value::Number(_)) => parse_integer(raw).map(Value::from),
        _ => Ok(Value::from(raw)),
    }
}

/// The stored value in the form it is typed: minutes for durations, a bare
/// percentage for factors, and plain text otherwise. Missing values render
/// empty.
pub fn display(setting: Option<&Setting>, value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match (setting, value) {
        (Some(Setting::Duration(_)), Value::Number(_)) => convert::duration_to_minutes(value)
            .map(|m| m.to_string())
            .unwrap_or_else(|_| value.to_string()),
        (Some(Setting::Factor(_)), Value::Number(n)) => n
            .as_f64()
            .map(convert::float_to_percent)
            .unwrap_or_else(|| value.to_string()),
        (_, Value::String(s)) => s.clone(),
        (_, Value::Null) => String::new(),
        _ => value.to_string(),
    }
}

/// Unit suffix shown after [`display`] output.
pub fn unit(setting: &Setting) -> Option<&'static str> {
    match setting {
        Setting::Duration(_) => Some("min"),
        Setting::Factor(_) => Some("%"),
        _ => None,
    }
}

/// The accepted input range, e.g. `2-60 min`, `25-400%`, `Easy | Normal | Hard`.
pub fn range_hint(setting: &Setting) -> Option<String> {
    match setting {
        Setting::Duration(s) => Some(format!("{}-{} min", s.min_minutes, s.max_minutes)),
        Setting::Factor(s) => Some(format!(
            "{}-{}%",
            convert::float_to_percent(s.min),
            convert::float_to_percent(s.max)
        )),
        Setting::Choice(s) => Some(s.options.join(" | ")),
        Setting::Toggle(_) => Some("true | false".into()),
        Setting::Freeform(s) if s.kind == FreeformKind::Integer => Some("integer".into()),
        Setting::Freeform(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{choice, duration, factor, server_catalog, toggle};
    use serde_json::json;

    fn p(dotted: &str) -> SettingPath {
        SettingPath::from(dotted)
    }

    #[test]
    fn duration_in_range_is_stored_as_nanoseconds() {
        let day = duration("day", 2, 60, 30);
        let value = parse_input(&p("day"), Some(&day), None, "45").unwrap();
        assert_eq!(value, json!(45 * convert::NANOS_PER_MINUTE));
    }

    #[test]
    fn duration_out_of_range_is_rejected() {
        let day = duration("day", 2, 60, 30);
        let err = parse_input(&p("day"), Some(&day), None, "61").unwrap_err();
        assert_eq!(err.to_string(), "day (61 min) is out of range (2 min-60 min)");
    }

    #[test]
    fn duration_garbage_names_the_path() {
        let day = duration("gameSettings.day", 2, 60, 30);
        let err = parse_input(&p("gameSettings.day"), Some(&day), None, "soon").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Conversion {
                source: ConversionError::InvalidMinutes(_),
                ..
            }
        ));
        assert!(err.to_string().contains("gameSettings.day"));
    }

    #[test]
    fn factor_accepts_percent_and_checks_bounds() {
        let health = factor("hp", 0.25, 4.0, 1.0, -2);
        assert_eq!(
            parse_input(&p("hp"), Some(&health), None, "150%").unwrap(),
            json!(1.5)
        );
        let err = parse_input(&p("hp"), Some(&health), None, "500").unwrap_err();
        assert_eq!(err.to_string(), "hp (500%) is out of range (25%-400%)");
    }

    #[test]
    fn choice_matches_case_insensitively() {
        let curse = choice("curse", &["Easy", "Normal", "Hard"], "Normal");
        assert_eq!(
            parse_input(&p("curse"), Some(&curse), None, "hard").unwrap(),
            json!("Hard")
        );
        assert!(matches!(
            parse_input(&p("curse"), Some(&curse), None, "Brutal"),
            Err(SettingsError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn toggles_and_bools() {
        let t = toggle("t", false);
        assert_eq!(parse_input(&p("t"), Some(&t), None, "yes").unwrap(), json!(true));
        assert_eq!(parse_input(&p("t"), Some(&t), None, "OFF").unwrap(), json!(false));
        assert!(parse_input(&p("t"), Some(&t), None, "maybe").is_err());
    }

    #[test]
    fn integer_freeform_blank_is_zero() {
        let catalog = server_catalog();
        let slots = catalog.definition(&p("slotCount"));
        assert_eq!(parse_input(&p("slotCount"), slots, None, "").unwrap(), json!(0));
        assert_eq!(parse_input(&p("slotCount"), slots, None, " 8 ").unwrap(), json!(8));
        assert!(parse_input(&p("slotCount"), slots, None, "eight").is_err());
    }

    #[test]
    fn role_group_fields_use_role_definitions() {
        let catalog = server_catalog();
        let target = p("userGroups.1.canKickBan");
        let def = catalog.definition(&target);
        assert_eq!(parse_input(&target, def, None, "true").unwrap(), json!(true));
    }

    #[test]
    fn unknown_paths_keep_current_type() {
        let target = p("custom");
        assert_eq!(
            parse_input(&target, None, Some(&json!(false)), "true").unwrap(),
            json!(true)
        );
        assert_eq!(parse_input(&target, None, Some(&json!(3)), "7").unwrap(), json!(7));
        assert_eq!(
            parse_input(&target, None, Some(&json!(0.5)), "0.75").unwrap(),
            json!(0.75)
        );
        assert_eq!(parse_input(&target, None, None, "hello").unwrap(), json!("hello"));
    }

    #[test]
    fn display_forms() {
        let day = duration("day", 2, 60, 30);
        let hp = factor("hp", 0.25, 4.0, 1.0, 0);
        assert_eq!(
            display(Some(&day), Some(&json!(12 * convert::NANOS_PER_MINUTE))),
            "12"
        );
        assert_eq!(display(Some(&hp), Some(&json!(0.756))), "76");
        assert_eq!(display(None, Some(&json!("Admin"))), "Admin");
        assert_eq!(display(None, Some(&json!(true))), "true");
        assert_eq!(display(None, Some(&Value::Null)), "");
        assert_eq!(display(Some(&day), None), "");
    }

    #[test]
    fn hints() {
        assert_eq!(range_hint(&duration("d", 2, 60, 30)).unwrap(), "2-60 min");
        assert_eq!(range_hint(&factor("f", 0.25, 4.0, 1.0, 0)).unwrap(), "25-400%");
        assert_eq!(unit(&factor("f", 0.25, 4.0, 1.0, 0)), Some("%"));
    }
}
