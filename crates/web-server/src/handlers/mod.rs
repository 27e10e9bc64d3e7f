//! Route handlers, one module per resource.
//!
//! Every handler returns `Result<ApiResponse<_>, AppError>`, so each request
//! ends in exactly one envelope: the success envelope built here, or the
//! error envelope rendered by `AppError`.

pub mod drivers;
pub mod races;
pub mod teams;

use crate::error::AppError;
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

pub(crate) const ID_REQUIRED: &str = "The ID field is required.";

/// Unwraps an id that the validation gate has already required.
pub(crate) fn required_id<T>(id: Option<T>) -> Result<T, AppError> {
    id.ok_or_else(|| AppError::Validation(vec![ID_REQUIRED.to_string()]))
}

/// Deserializes an optional number given either as a JSON number or as a
/// string. Blank strings and `null` are absent.
pub(crate) fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.to_string().parse().map(Some).map_err(D::Error::custom),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}
