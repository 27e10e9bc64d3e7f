use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// The uniform response body returned by every endpoint.
///
/// `status_code` is also used as the HTTP status of the response, so clients
/// may branch on either the status line or `success`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T = Value> {
    pub message: String,
    pub result: T,
    pub status_code: u16,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// A 200 envelope.
    pub fn ok(message: impl Into<String>, result: T) -> Self {
        Self {
            message: message.into(),
            result,
            status_code: StatusCode::OK.as_u16(),
            success: true,
        }
    }

    /// `"Records fetched successfully"` around a read result.
    pub fn fetched(result: T) -> Self {
        Self::ok("Records fetched successfully", result)
    }
}

impl ApiResponse<Value> {
    pub fn failure(status: StatusCode, message: impl Into<String>, result: Value) -> Self {
        Self {
            message: message.into(),
            result,
            status_code: status.as_u16(),
            success: false,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
