use crate::envelope::ApiResponse;
use attachments::AttachmentError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{HostRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use roster::RosterError;
use serde_json::{Value, json};
use std::any::Any;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Structural failures of the payload, one message per field error.
    #[error("Validation Errors")]
    Validation(Vec<String>),
    /// Not-found lookups and relationship conflicts.
    #[error(transparent)]
    Rule(CoreError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Image storage error: {0}")]
    Attachment(#[from] AttachmentError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(subject: &str) -> Self {
        Self::Rule(CoreError::not_found(subject))
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed(errors) => AppError::Validation(errors),
            rule => AppError::Rule(rule),
        }
    }
}

impl From<RosterError<DbError>> for AppError {
    fn from(err: RosterError<DbError>) -> Self {
        match err {
            RosterError::Rule(rule) => rule.into(),
            RosterError::Store(db) => AppError::Database(db),
        }
    }
}

// --- Extractor rejections are structural failures of the request ---

macro_rules! rejection_is_validation {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    AppError::Validation(vec![rejection.body_text()])
                }
            }
        )*
    };
}

rejection_is_validation!(
    JsonRejection,
    PathRejection,
    QueryRejection,
    MultipartRejection,
    MultipartError,
    HostRejection,
);

/// Converts our custom `AppError` into the error envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = match self {
            AppError::Validation(errors) => {
                tracing::warn!(?errors, "Request failed validation.");
                ApiResponse::failure(StatusCode::BAD_REQUEST, "Validation Errors", json!(errors))
            }
            AppError::Rule(rule) => {
                tracing::warn!(rule = %rule, "Request rejected by a business rule.");
                match rule {
                    CoreError::ValidationFailed(errors) => ApiResponse::failure(
                        StatusCode::BAD_REQUEST,
                        "Validation Errors",
                        json!(errors),
                    ),
                    other => {
                        ApiResponse::failure(StatusCode::BAD_REQUEST, other.to_string(), json!(""))
                    }
                }
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                let message = match &db_err {
                    DbError::QueryError(cause) => cause.to_string(),
                    other => other.to_string(),
                };
                ApiResponse::failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message,
                    Value::String(format!("{db_err:?}")),
                )
            }
            AppError::Attachment(storage_err) => {
                tracing::error!(error = ?storage_err, "Image storage error.");
                ApiResponse::failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    storage_err.to_string(),
                    Value::String(format!("{storage_err:?}")),
                )
            }
            AppError::Internal(message) => {
                tracing::error!(%message, "Unclassified error.");
                ApiResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, message, json!(""))
            }
        };
        envelope.into_response()
    }
}

/// Renders a handler panic as a 500 envelope; used by `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown panic message".to_string()
    };
    AppError::Internal(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_every_field_error() {
        let (status, body) = body_of(AppError::Validation(vec![
            "The Name field is required.".into(),
            "The value 'x' is not valid for Age.".into(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation Errors");
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["result"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rules_carry_their_message() {
        let err: AppError = RosterError::<DbError>::Rule(CoreError::already_in_team("Driver1")).into();
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Driver1 is already a part of a team");
        assert_eq!(body["result"], "");
    }

    #[tokio::test]
    async fn validation_failed_rule_becomes_structural() {
        let err: AppError = CoreError::ValidationFailed(vec!["bad".into()]).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn persistence_faults_are_500_with_detail() {
        let err = AppError::Database(DbError::QueryError(database::sqlx::Error::PoolTimedOut));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["statusCode"], 500);
        assert_eq!(body["success"], false);
        assert!(body["result"].as_str().unwrap().contains("QueryError"));
    }

    #[tokio::test]
    async fn panics_render_as_500_envelope() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "boom");
    }
}
