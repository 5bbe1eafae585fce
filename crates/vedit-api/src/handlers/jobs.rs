//! Job status handlers.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use vedit_models::JobId;

use crate::error::ApiResult;
use crate::state::AppState;

/// Response for accepted job submissions.
#[derive(Serialize)]
pub struct JobAccepted {
    pub message: String,
    pub job_id: String,
}

impl JobAccepted {
    pub fn new(message: impl Into<String>, job_id: JobId) -> Self {
        Self {
            message: message.into(),
            job_id: job_id.to_string(),
        }
    }
}

/// Job status response.
#[derive(Serialize)]
pub struct JobStatusView {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Get job status.
///
/// Works for any job family (proxy, edit, timeline). An identifier the
/// result store has never seen reports status `unknown` rather than an
/// error, so clients can poll safely.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobStatusView>> {
    let job_id = JobId::from_string(id.clone());
    let record = state.queue.status().get(&job_id).await?;

    let view = match record {
        Some(rec) => JobStatusView {
            id,
            status: rec.status.to_string(),
            output: rec.output,
            error: rec.error,
        },
        None => JobStatusView {
            id,
            status: "unknown".to_string(),
            output: None,
            error: None,
        },
    };

    Ok(Json(view))
}
