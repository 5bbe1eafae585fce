//! Timeline submission handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use vedit_models::Segment;

use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::JobAccepted;
use crate::state::AppState;

/// Timeline request body.
#[derive(Debug, Deserialize, Validate)]
pub struct TimelineRequest {
    /// Segments to cut and concatenate, in output order
    #[validate(length(min = 1, message = "timeline must contain at least one segment"))]
    pub segments: Vec<Segment>,
    /// Final output filename
    pub output_filename: String,
}

/// Submit a timeline: cut each segment, then concatenate in order.
///
/// Responds with the pipeline's job ID (the concat job); polling it reflects
/// the outcome of the whole pipeline because the concat depends on every cut.
pub async fn submit_timeline(
    State(state): State<AppState>,
    Json(request): Json<TimelineRequest>,
) -> ApiResult<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let job_id = state
        .composer
        .compose(&request.segments, &request.output_filename)
        .await?;
    info!(
        "Enqueued timeline pipeline {} ({} segments)",
        job_id,
        request.segments.len()
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted::new("Timeline processing started.", job_id)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_timeline_fails_validation() {
        let request = TimelineRequest {
            segments: Vec::new(),
            output_filename: "out.mp4".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_timeline_request_decodes() {
        let json = r#"{
            "segments": [
                { "id": 1, "source_video_name": "a.mp4", "start": 0, "end": 5 },
                { "id": 2, "source_video_name": "a.mp4", "start": 10, "end": 15 }
            ],
            "output_filename": "out.mp4"
        }"#;
        let request: TimelineRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.segments.len(), 2);
        assert_eq!(request.segments[1].start, 10.0);
    }
}
