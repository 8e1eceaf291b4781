use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

/// Failures of the demo guard function (reading identity from headers).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("header '{0}' is not valid UTF-8")]
    MalformedHeader(&'static str),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> axum::response::Response {
        match self {
            IdentityError::MalformedHeader(_) => {
                json_error(StatusCode::BAD_REQUEST, "malformed_identity", self.to_string())
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
