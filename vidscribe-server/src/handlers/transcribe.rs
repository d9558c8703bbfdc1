use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use vidscribe::{TranscriptionRequest, TranscriptionResponse};

use crate::error::ApiError;
use crate::state::AppState;

#[tracing::instrument(skip_all)]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    payload: Result<Json<TranscriptionRequest>, JsonRejection>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.pipeline.run(&request).await?;
    Ok(Json(response))
}
