use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body: `detail` is the human-readable message, `kind` is stable.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub kind: &'static str,
}

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Any pipeline failure. Always a 500.
    #[error(transparent)]
    Pipeline(#[from] vidscribe::Error),

    /// The request body could not be read as a transcription request.
    #[error("{detail}")]
    InvalidRequest { status: StatusCode, detail: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Pipeline(e) => {
                let kind = e.kind();
                tracing::error!(kind = %kind, error = %e, "transcription failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        detail: e.to_string(),
                        kind: kind.as_str(),
                    },
                )
            }
            ApiError::InvalidRequest { status, detail } => {
                tracing::warn!(%status, %detail, "rejected transcription request");
                (
                    status,
                    ErrorResponse {
                        detail,
                        kind: "invalid_request",
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
