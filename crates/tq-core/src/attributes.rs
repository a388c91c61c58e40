//! Attribute vocabulary rules.
//!
//! Attribute names are an open, evolving vocabulary. They end up as keys of
//! the JSON attribute document in the relational store and as `json_extract`
//! paths, so every key is checked against a fixed allow-list pattern before it
//! reaches the store. Values are free text, compared after normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::CoreError;

/// Maximum length of an attribute name.
pub const MAX_ATTRIBUTE_NAME_LEN: usize = 64;

static ATTRIBUTE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("attribute name pattern compiles")
});

/// Whether `name` is an acceptable attribute key.
#[must_use]
pub fn is_valid_attribute_name(name: &str) -> bool {
    ATTRIBUTE_NAME.is_match(name)
}

/// Validate a single attribute key.
///
/// # Errors
///
/// Returns `CoreError::InvalidAttributeName` when the key is rejected.
pub fn validate_attribute_name(name: &str) -> Result<(), CoreError> {
    if is_valid_attribute_name(name) {
        Ok(())
    } else {
        Err(CoreError::InvalidAttributeName(name.to_string()))
    }
}

/// Validate every key of an attribute map, reporting the first bad one.
///
/// # Errors
///
/// Returns `CoreError::InvalidAttributeName` for the first rejected key.
pub fn validate_attribute_names<'a, I>(names: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a String>,
{
    names
        .into_iter()
        .try_for_each(|name| validate_attribute_name(name))
}

/// Normalize an attribute value for comparison: trimmed and lowercased.
#[must_use]
pub fn normalize_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Turn a free-form label ("Eye colour") into an attribute key ("eye_colour").
///
/// Returns `None` when nothing usable is left.
#[must_use]
pub fn to_attribute_name(label: &str) -> Option<String> {
    let mut out = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_').to_string();
    is_valid_attribute_name(&trimmed).then_some(trimmed)
}

/// Render an attribute key as question text ("eye_colour" -> "eye colour").
#[must_use]
pub fn humanize(name: &str) -> String {
    name.replace('_', " ")
}
