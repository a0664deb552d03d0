use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One product's flat field-to-value mapping, in file order
pub type Record = Map<String, Value>;

/// Literal the activity flag must equal for a record to count as active
pub const ACTIVE_FLAG_VALUE: &str = "true";

/// A field counts as missing when it is absent, null, blank text or an empty list.
/// Any other value, including the text "false", is present.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Names of the `fields` that are missing from the record, in the given order
pub fn missing_fields<'a, I>(record: &Record, fields: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    fields
        .into_iter()
        .filter(|field| is_missing(record.get(field.as_str())))
        .cloned()
        .collect()
}

/// String value of a field, or "" when absent or not a string
pub fn text_field<'a>(record: &'a Record, field: &str) -> &'a str {
    record.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Value of a field for console output, "N/A" when absent
pub fn display_field(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Rename `from` to `to` keeping the field's position; an existing `to` is replaced.
/// Returns false when `from` is absent.
pub fn rename_field(record: &mut Record, from: &str, to: &str) -> bool {
    if from == to || !record.contains_key(from) {
        return false;
    }

    *record = std::mem::take(record)
        .into_iter()
        .filter(|(key, _)| key != to)
        .map(|(key, value)| {
            if key == from {
                (to.to_string(), value)
            } else {
                (key, value)
            }
        })
        .collect();
    true
}

/// String-valued activity flag.
///
/// The source data stores the flag as text, so only the exact string `"true"`
/// is active; a JSON boolean `true` is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityFlag {
    Active,
    Inactive(String),
}

impl ActivityFlag {
    /// Read the flag from a record field; `None` when the field is absent
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            None => None,
            Some(Value::String(text)) => Some(Self::from(text.clone())),
            Some(other) => Some(Self::Inactive(format!("{} (not a string)", other))),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<String> for ActivityFlag {
    fn from(text: String) -> Self {
        if text == ACTIVE_FLAG_VALUE {
            Self::Active
        } else {
            Self::Inactive(text)
        }
    }
}

impl From<ActivityFlag> for String {
    fn from(flag: ActivityFlag) -> Self {
        match flag {
            ActivityFlag::Active => ACTIVE_FLAG_VALUE.to_string(),
            ActivityFlag::Inactive(text) => text,
        }
    }
}

impl fmt::Display for ActivityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "{}", ACTIVE_FLAG_VALUE),
            Self::Inactive(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_values() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&Value::Null)));
        assert!(is_missing(Some(&json!(""))));
        assert!(is_missing(Some(&json!("  \t\n"))));
        assert!(is_missing(Some(&json!([]))));

        assert!(!is_missing(Some(&json!("false"))));
        assert!(!is_missing(Some(&json!("x"))));
        assert!(!is_missing(Some(&json!(["tag"]))));
        assert!(!is_missing(Some(&json!(0))));
        assert!(!is_missing(Some(&json!(false))));
    }

    #[test]
    fn test_missing_fields_keeps_requested_order() {
        let record = json!({"b": "", "a": null, "c": "ok"});
        let record = record.as_object().unwrap();
        let fields = vec!["c".to_string(), "b".to_string(), "a".to_string(), "d".to_string()];

        assert_eq!(missing_fields(record, &fields), vec!["b", "a", "d"]);
    }

    #[test]
    fn test_rename_field_keeps_position() {
        let mut record = json!({"product_id": "KB-001", "common_name": "Glyphosate", "origin": ""})
            .as_object()
            .unwrap()
            .clone();

        assert!(rename_field(&mut record, "common_name", "medicine_name"));
        let keys: Vec<&str> = record.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["product_id", "medicine_name", "origin"]);
        assert_eq!(record["medicine_name"], "Glyphosate");

        assert!(!rename_field(&mut record, "common_name", "medicine_name"));
    }

    #[test]
    fn test_rename_field_replaces_existing_target() {
        let mut record = json!({"common_name": "new", "medicine_name": "old"})
            .as_object()
            .unwrap()
            .clone();

        rename_field(&mut record, "common_name", "medicine_name");
        assert_eq!(record.len(), 1);
        assert_eq!(record["medicine_name"], "new");
    }

    #[test]
    fn test_activity_flag_is_exact_string() {
        assert_eq!(ActivityFlag::from_value(Some(&json!("true"))), Some(ActivityFlag::Active));
        assert_eq!(
            ActivityFlag::from_value(Some(&json!("True"))),
            Some(ActivityFlag::Inactive("True".to_string()))
        );
        assert_eq!(
            ActivityFlag::from_value(Some(&json!(true))),
            Some(ActivityFlag::Inactive("true (not a string)".to_string()))
        );
        assert!(!ActivityFlag::from_value(Some(&json!(true))).unwrap().is_active());
        assert_eq!(ActivityFlag::from_value(None), None);
    }

    #[test]
    fn test_activity_flag_serializes_as_text() {
        assert_eq!(serde_json::to_value(ActivityFlag::Active).unwrap(), json!("true"));
        assert_eq!(
            serde_json::to_value(ActivityFlag::Inactive("false".into())).unwrap(),
            json!("false")
        );
    }
}
