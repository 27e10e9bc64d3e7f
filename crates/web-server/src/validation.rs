//! The validation gate: structural checks on a payload before any business
//! logic runs. Nothing here touches the database.

use crate::error::AppError;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

/// Field errors collected while reading and validating one payload.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push((field.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `"The <label> field is required."` when `value` is absent.
    pub fn require<T>(&mut self, field: &str, label: &str, value: &Option<T>) {
        if value.is_none() {
            self.push(field, format!("The {label} field is required."));
        }
    }

    /// Parses an optional raw form value into `T`. An absent or empty value is
    /// `None`; anything unparsable is recorded as a field error.
    pub fn parse<T: FromStr>(&mut self, field: &str, label: &str, raw: Option<&str>) -> Option<T> {
        let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.push(field, format!("The value '{raw}' is not valid for {label}."));
                None
            }
        }
    }

    fn absorb(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The field {field} is invalid."));
                self.push(field.to_string(), message);
            }
        }
    }

    /// Messages ordered by field name; messages of one field keep the order
    /// they were recorded in.
    pub fn into_messages(mut self) -> Vec<String> {
        self.errors.sort_by(|a, b| a.0.cmp(&b.0));
        self.errors.into_iter().map(|(_, message)| message).collect()
    }
}

/// Runs the declarative rules of `payload` and fails with every collected
/// field error, including those recorded while the payload was read.
pub fn validate<T: Validate>(payload: &T, mut errors: FieldErrors) -> Result<(), AppError> {
    if let Err(rule_errors) = payload.validate() {
        errors.absorb(&rule_errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.into_messages()))
    }
}
