use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use mediq_core::{CoreError, ResultEnvelope};

use crate::AppState;

/// Shorter inputs cannot describe symptoms in any useful way.
const MIN_INPUT_CHARS: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    patient_input: String,
}

/// Run the full diagnostic pipeline over the submitted patient input.
///
/// Inputs under [`MIN_INPUT_CHARS`] are rejected with 400 before the
/// service is invoked. Everything past that boundary returns HTTP 200
/// with a `ResultEnvelope` whose `success` flag carries the outcome.
async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ResultEnvelope>, CoreError> {
    if body.patient_input.trim().chars().count() < MIN_INPUT_CHARS {
        return Err(CoreError::InvalidInput(format!(
            "Patient input must be at least {} characters",
            MIN_INPUT_CHARS
        )));
    }

    Ok(Json(state.analyze(&body.patient_input).await))
}
