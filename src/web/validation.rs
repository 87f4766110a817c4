//! Field validation shared by the request payloads.
//!
//! Errors are collected per field so a single response can report every
//! problem with a payload at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const TOO_LONG: &str = "Ensure this field has no more than 255 characters.";
pub const NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";
pub const MAX_DECIMAL_PLACES: &str = "Ensure that there are no more than 2 decimal places.";
pub const MAX_DIGITS: &str = "Ensure that there are no more than 5 digits in total.";
pub const MAX_WHOLE_DIGITS: &str =
    "Ensure that there are no more than 3 digits before the decimal point.";
/// `{id}` is replaced with the offending primary key.
pub const INVALID_PK: &str = "Invalid pk \"{id}\" - object does not exist.";

pub const MAX_TEXT_LENGTH: usize = 255;
const PRICE_MAX_DIGITS: usize = 5;
const PRICE_DECIMAL_PLACES: usize = 2;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Resolves a field that may be absent (`None`) or explicitly `null`
/// (`Some(None)`). Null is always an error; absence only when `required`.
pub fn not_null<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<T>>,
    required: bool,
) -> Option<T> {
    match value {
        Some(Some(value)) => Some(value),
        Some(None) => {
            errors.add(field, NULL);
            None
        }
        None => {
            if required {
                errors.add(field, REQUIRED);
            }
            None
        }
    }
}

/// Validates a present text field: non-blank after trimming and within the length limit.
pub fn text(errors: &mut FieldErrors, field: &str, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        errors.add(field, TOO_LONG);
        return None;
    }
    Some(trimmed.to_string())
}

/// Optional text where blank means "no value".
pub fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        errors.add(field, TOO_LONG);
        return None;
    }
    Some(trimmed.to_string())
}

pub fn non_negative(errors: &mut FieldErrors, field: &str, value: i32) -> Option<i32> {
    if value < 0 {
        errors.add(field, NEGATIVE);
        return None;
    }
    Some(value)
}

/// Checks a price against a five-digit, two-decimal amount. The digits are
/// counted on the shortest decimal form of the value.
pub fn price(errors: &mut FieldErrors, field: &str, value: f64) -> Option<f64> {
    if value < 0.0 {
        errors.add(field, NEGATIVE);
        return None;
    }

    let repr = value.to_string();
    let (whole, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let whole_digits = whole.trim_start_matches('0').len();
    let decimal_places = fraction.len();

    if whole_digits + decimal_places > PRICE_MAX_DIGITS {
        errors.add(field, MAX_DIGITS);
        return None;
    }
    if decimal_places > PRICE_DECIMAL_PLACES {
        errors.add(field, MAX_DECIMAL_PLACES);
        return None;
    }
    if whole_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        errors.add(field, MAX_WHOLE_DIGITS);
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_rejects_whitespace_only() {
        let mut errors = FieldErrors::new();
        assert_eq!(text(&mut errors, "title", "   \t"), None);
        assert_eq!(errors.get("title"), Some(&[BLANK.to_string()][..]));
    }

    #[test]
    fn test_text_trims_and_accepts() {
        let mut errors = FieldErrors::new();
        assert_eq!(text(&mut errors, "name", "  Vegan "), Some("Vegan".to_string()));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_text_length_limit_counts_chars() {
        let mut errors = FieldErrors::new();
        let at_limit = "é".repeat(MAX_TEXT_LENGTH);
        assert!(text(&mut errors, "name", &at_limit).is_some());

        let over_limit = "a".repeat(MAX_TEXT_LENGTH + 1);
        assert!(text(&mut errors, "name", &over_limit).is_none());
        assert_eq!(errors.get("name"), Some(&[TOO_LONG.to_string()][..]));
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "link", Some("  ")), None);
        assert_eq!(optional_text(&mut errors, "link", None), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_price_rules() {
        let mut errors = FieldErrors::new();
        assert_eq!(price(&mut errors, "price", 5.5), Some(5.5));
        assert_eq!(price(&mut errors, "price", 999.99), Some(999.99));
        assert_eq!(price(&mut errors, "price", 0.05), Some(0.05));
        assert_eq!(price(&mut errors, "price", 0.0), Some(0.0));
        assert!(errors.is_empty());

        assert_eq!(price(&mut errors, "price", -1.0), None);
        assert_eq!(price(&mut errors, "price", 1000.0), None);
        assert_eq!(price(&mut errors, "price", 1.234), None);
        assert_eq!(price(&mut errors, "price", 999.999), None);
        assert_eq!(
            errors.get("price"),
            Some(
                &[
                    NEGATIVE.to_string(),
                    MAX_WHOLE_DIGITS.to_string(),
                    MAX_DECIMAL_PLACES.to_string(),
                    MAX_DIGITS.to_string(),
                ][..]
            )
        );
    }

    #[test]
    fn test_not_null() {
        let mut errors = FieldErrors::new();
        assert_eq!(not_null(&mut errors, "title", Some(Some(3)), true), Some(3));
        assert_eq!(not_null::<i32>(&mut errors, "tags", None, false), None);
        assert!(errors.is_empty());

        assert_eq!(not_null::<i32>(&mut errors, "title", None, true), None);
        assert_eq!(not_null::<i32>(&mut errors, "price", Some(None), false), None);
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("price"), Some(&[NULL.to_string()][..]));
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("title", BLANK);
        errors.add("price", REQUIRED);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "price": [REQUIRED], "title": [BLANK] })
        );
        assert_eq!(errors.to_string(), format!("price: {REQUIRED}; title: {BLANK}"));
    }

    #[test]
    fn test_finish() {
        assert_eq!(FieldErrors::new().finish(7), Ok(7));

        let mut errors = FieldErrors::new();
        errors.add("name", BLANK);
        assert!(errors.finish(()).is_err());
    }
}
