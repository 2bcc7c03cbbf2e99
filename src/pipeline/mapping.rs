//! Declarative projection of an upstream record onto a canonical entity.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{EtlError, Result};
use crate::transliterate::latinize;
use crate::types::Record;

/// Gamelog dates look like `Oct 1 '17`
const GAME_DATE_FORMAT: &str = "%b %d '%y";

/// Value conversion applied while projecting a field.
///
/// Missing source values and JSON nulls project to null under every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    Identity,
    /// Transliterates non-Latin text; non-string values pass through
    Latinize,
    /// Integers or numeric strings; an empty string counts as missing
    Integer,
    /// Gamelog date to ISO-8601 midnight, e.g. `2017-10-01T00:00:00`
    GameDate,
}

impl Normalizer {
    pub fn apply(self, field: &str, value: Option<&Value>) -> Result<Value> {
        let value = match value {
            None | Some(Value::Null) => return Ok(Value::Null),
            Some(value) => value,
        };

        match self {
            Normalizer::Identity => Ok(value.clone()),
            Normalizer::Latinize => Ok(match value {
                Value::String(s) => Value::String(latinize(s).into_owned()),
                other => other.clone(),
            }),
            Normalizer::Integer => to_integer(field, value),
            Normalizer::GameDate => to_game_date(field, value),
        }
    }
}

fn invalid(field: &str, value: &Value, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn to_integer(field: &str, value: &Value) -> Result<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| invalid(field, value, e.to_string())),
        _ => Err(invalid(field, value, "expected an integer")),
    }
}

fn to_game_date(field: &str, value: &Value) -> Result<Value> {
    let Value::String(s) = value else {
        return Err(invalid(field, value, "expected a date string"));
    };
    let date = NaiveDate::parse_from_str(s.trim(), GAME_DATE_FORMAT)
        .map_err(|e| invalid(field, value, e.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid(field, value, "date has no midnight"))?;
    Ok(Value::String(midnight.format("%Y-%m-%dT%H:%M:%S").to_string()))
}

/// One row of a mapping table: where a value comes from and where it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Dotted path into the input record, e.g. `division.name`
    pub source: &'static str,
    pub target: &'static str,
    pub normalizer: Normalizer,
}

impl FieldMapping {
    pub const fn new(source: &'static str, target: &'static str) -> Self {
        Self {
            source,
            target,
            normalizer: Normalizer::Identity,
        }
    }

    pub const fn with(self, normalizer: Normalizer) -> Self {
        Self { normalizer, ..self }
    }
}

/// Resolves a dotted path through nested objects.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Builds the target record in mapping order.
pub fn project(record: &Record, mappings: &[FieldMapping]) -> Result<Record> {
    mappings
        .iter()
        .map(|m| {
            let value = m.normalizer.apply(m.target, lookup(record, m.source))?;
            Ok((m.target.to_string(), value))
        })
        .collect()
}

/// Target field names in mapping order
pub fn target_fields(mappings: &[FieldMapping]) -> Vec<String> {
    mappings.iter().map(|m| m.target.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn lookup_follows_nested_objects() {
        let rec = record(json!({"division": {"name": "Atlantic"}, "id": 6}));
        assert_eq!(lookup(&rec, "division.name"), Some(&json!("Atlantic")));
        assert_eq!(lookup(&rec, "id"), Some(&json!(6)));
        assert_eq!(lookup(&rec, "id.name"), None);
        assert_eq!(lookup(&rec, "conference.name"), None);
    }

    #[test]
    fn integer_accepts_numbers_and_numeric_strings() {
        assert_eq!(Normalizer::Integer.apply("gf", Some(&json!("3"))).unwrap(), json!(3));
        assert_eq!(Normalizer::Integer.apply("gf", Some(&json!(" 12 "))).unwrap(), json!(12));
        assert_eq!(Normalizer::Integer.apply("gf", Some(&json!(1917))).unwrap(), json!(1917));
        assert_eq!(Normalizer::Integer.apply("gf", Some(&json!(""))).unwrap(), Value::Null);
        assert_eq!(Normalizer::Integer.apply("gf", None).unwrap(), Value::Null);
    }

    #[test]
    fn integer_rejects_garbage() {
        let err = Normalizer::Integer.apply("gf", Some(&json!("three"))).unwrap_err();
        assert!(matches!(err, EtlError::InvalidValue { ref field, .. } if field == "gf"));
        assert!(Normalizer::Integer.apply("gf", Some(&json!(2.5))).is_err());
    }

    #[test]
    fn game_date_becomes_iso_midnight() {
        assert_eq!(
            Normalizer::GameDate.apply("date", Some(&json!("Oct 1 '17"))).unwrap(),
            json!("2017-10-01T00:00:00")
        );
        assert_eq!(
            Normalizer::GameDate.apply("date", Some(&json!("Apr 07 '18"))).unwrap(),
            json!("2018-04-07T00:00:00")
        );
        assert!(Normalizer::GameDate.apply("date", Some(&json!("yesterday"))).is_err());
    }

    #[test]
    fn latinize_only_touches_strings() {
        assert_eq!(Normalizer::Latinize.apply("n", Some(&json!("Дата"))).unwrap(), json!("Data"));
        assert_eq!(Normalizer::Latinize.apply("n", Some(&json!(5))).unwrap(), json!(5));
    }

    #[test]
    fn project_keeps_mapping_order_and_nulls_missing() {
        const MAPPINGS: &[FieldMapping] = &[
            FieldMapping::new("b", "second"),
            FieldMapping::new("a.x", "first").with(Normalizer::Integer),
            FieldMapping::new("missing", "third"),
        ];
        let rec = record(json!({"a": {"x": "7"}, "b": "bee"}));
        let projected = project(&rec, MAPPINGS).unwrap();

        let keys: Vec<&String> = projected.keys().collect();
        assert_eq!(keys, ["second", "first", "third"]);
        assert_eq!(projected["first"], json!(7));
        assert_eq!(projected["third"], Value::Null);
        assert_eq!(target_fields(MAPPINGS), vec!["second", "first", "third"]);
    }
}
