//! Edit submission handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use vedit_models::edit_filename;
use vedit_queue::{ConcatJob, CutJob, QueueJob};

use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::JobAccepted;
use crate::state::AppState;

/// Edit request body.
///
/// The operation parameters are a tagged union keyed by `edit_type`, so an
/// unsupported edit type or malformed parameters are rejected at decode
/// time, before any job exists.
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    /// Original video filename this edit is named after
    pub filename: String,
    #[serde(flatten)]
    pub operation: EditParams,
}

/// Operation parameters per edit type.
#[derive(Debug, Deserialize)]
#[serde(tag = "edit_type", content = "params", rename_all = "snake_case")]
pub enum EditParams {
    Cut { start: f64, end: f64 },
    Concat { sources: Vec<String> },
}

/// Submit a video edit job.
pub async fn submit_edit(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> ApiResult<impl IntoResponse> {
    let output = state
        .library
        .proxy_path(&edit_filename(&request.filename))?;

    let job = match request.operation {
        EditParams::Cut { start, end } => {
            let input = state.library.original_path(&request.filename)?;
            QueueJob::Cut(CutJob::new(input, output, start, end))
        }
        EditParams::Concat { sources } => {
            let mut paths = Vec::with_capacity(sources.len());
            for name in &sources {
                paths.push(state.library.proxy_path(name)?);
            }
            QueueJob::Concat(ConcatJob::new(paths, output))
        }
    };
    job.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let job_id = state.queue.enqueue(job).await?;
    info!("Enqueued edit job {} for {}", job_id, request.filename);

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted::new("Edit job started.", job_id)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_request_decodes() {
        let json = r#"{
            "filename": "a.mp4",
            "edit_type": "cut",
            "params": { "start": 0, "end": 5 }
        }"#;
        let request: EditRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            request.operation,
            EditParams::Cut { start, end } if start == 0.0 && end == 5.0
        ));
    }

    #[test]
    fn test_unknown_edit_type_rejected_at_decode() {
        let json = r#"{
            "filename": "a.mp4",
            "edit_type": "sepia",
            "params": {}
        }"#;
        assert!(serde_json::from_str::<EditRequest>(json).is_err());
    }
}
