//! Row-to-entity parsing helpers.
//!
//! Converts `libsql::Row` (column-indexed) into typed structs and handles the
//! dual datetime format (`SQLite`'s `datetime('now')` vs `to_rfc3339()`).

use chrono::{DateTime, Utc};
use tq_core::entities::{AttributeMap, Entity};

use crate::error::StoreError;

/// Column list matching [`row_to_entity`].
pub const ENTITY_COLUMNS: &str = "id, name, attributes, created_at, updated_at";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `StoreError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// # Errors
///
/// Returns `StoreError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, StoreError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Decode the JSON attribute document of an entity row.
///
/// # Errors
///
/// Returns `StoreError::Query` if the column is not a JSON object of
/// string-or-null values.
pub fn parse_attributes(s: &str) -> Result<AttributeMap, StoreError> {
    if s.trim().is_empty() {
        return Ok(AttributeMap::new());
    }
    serde_json::from_str(s)
        .map_err(|e| StoreError::Query(format!("Invalid attribute document: {e}")))
}

/// Encode an attribute map for the `attributes` column.
///
/// # Errors
///
/// Returns `StoreError::Other` if serialization fails.
pub fn encode_attributes(attributes: &AttributeMap) -> Result<String, StoreError> {
    serde_json::to_string(attributes).map_err(|e| StoreError::Other(e.into()))
}

/// Trim values and fold empty strings to `None`.
#[must_use]
pub fn clean_attributes(attributes: &AttributeMap) -> AttributeMap {
    attributes
        .iter()
        .map(|(key, value)| {
            let value = value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            (key.clone(), value)
        })
        .collect()
}

/// Row selected with [`ENTITY_COLUMNS`] to `Entity`.
///
/// # Errors
///
/// Returns `StoreError` if a column is missing or malformed.
pub fn row_to_entity(row: &libsql::Row) -> Result<Entity, StoreError> {
    Ok(Entity {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        attributes: parse_attributes(&get_opt_string(row, 2)?.unwrap_or_default())?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2026-02-09T14:30:00+00:00")]
    #[case("2026-02-09T14:30:00Z")]
    #[case("2026-02-09 14:30:00")]
    fn parses_both_datetime_formats(#[case] input: &str) {
        let dt = parse_datetime(input).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-02-09T14:30:00+00:00");
    }

    #[test]
    fn rejects_garbage_datetime() {
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn attributes_roundtrip_with_nulls() {
        let attrs = AttributeMap::from([
            ("hair".to_string(), Some("brown".to_string())),
            ("hat".to_string(), None),
        ]);
        let encoded = encode_attributes(&attrs).unwrap();
        assert_eq!(parse_attributes(&encoded).unwrap(), attrs);
    }

    #[test]
    fn empty_attribute_column_is_empty_map() {
        assert!(parse_attributes("").unwrap().is_empty());
    }

    #[test]
    fn non_object_attribute_column_is_rejected() {
        assert!(parse_attributes("[1,2]").is_err());
    }

    #[test]
    fn clean_attributes_trims_and_nulls_blanks() {
        let attrs = AttributeMap::from([
            ("hair".to_string(), Some("  brown ".to_string())),
            ("hat".to_string(), Some("   ".to_string())),
        ]);
        let cleaned = clean_attributes(&attrs);
        assert_eq!(cleaned["hair"], Some("brown".to_string()));
        assert_eq!(cleaned["hat"], None);
    }

    #[rstest]
    #[case(1.0 / 3.0, 0.33)]
    #[case(2.0 / 3.0, 0.67)]
    #[case(1.5, 1.5)]
    fn rounds_to_two_decimals(#[case] input: f64, #[case] expected: f64) {
        assert!((round2(input) - expected).abs() < f64::EPSILON);
    }
}
