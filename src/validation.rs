//! Boundary validation. Problems are collected per field and reported
//! together as one 422 before any store access.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, FieldErrors};

pub const USER_NAME_MIN_LENGTH: usize = 3;

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem; the first one reported for a field wins.
    pub fn reject(&mut self, field: &str, problem: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| problem.into());
    }

    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.reject(field, "is required");
        }
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.reject(field, format!("must be at least {} characters", min));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if let Err(problem) = validate_email_format(value) {
            self.reject(field, problem);
        }
    }

    /// Calendar date in `YYYY-MM-DD`.
    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.reject(field, "must be a date in YYYY-MM-DD format");
                None
            }
        }
    }

    /// A finite number, given either as a JSON number or a numeric string.
    pub fn number(&mut self, field: &str, value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed.filter(|n| n.is_finite()) {
            Some(n) => Some(n),
            None => {
                self.reject(field, "must be a number");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::unprocessable_entity(
                "Validation failed",
                self.errors,
            ))
        }
    }
}

/// Basic email shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err("Invalid email format".to_string()),
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => {
            Ok(())
        }
        _ => Err("Invalid email format".to_string()),
    }
}

/// Emails are stored and looked up trimmed and lowercased, so accounts are
/// unique regardless of letter case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `deserialize_with` for a required email field.
pub fn deserialize_email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|email| normalize_email(&email))
}

/// `deserialize_with` for an optional email field; pair with `#[serde(default)]`.
pub fn deserialize_optional_email<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|email| email.map(|e| normalize_email(&e)))
}

/// Path ids must be UUIDs; anything else is a 422 on `id`.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_field("id", "must be a valid id"))
}
