//! Video upload, listing and download handlers.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::info;

use vedit_models::proxy_filename;
use vedit_queue::{ProxyGenerateJob, QueueJob};
use vedit_storage::MediaListing;

use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::JobAccepted;
use crate::state::AppState;

/// Accept a video upload, store the original and enqueue proxy generation.
///
/// The file is fully written before the job is enqueued, so the worker's
/// input is guaranteed present by the time it can be dispatched.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::validation("upload must carry a filename"))?;

        let original = state.library.original_path(&filename)?;
        let mut file = tokio::fs::File::create(&original).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        let proxy = state.library.proxy_path(&proxy_filename(&filename))?;
        let job_id = state
            .queue
            .enqueue(QueueJob::ProxyGenerate(ProxyGenerateJob::new(
                original, proxy,
            )))
            .await?;

        counter!("vedit_uploads_total").increment(1);
        info!("Stored upload {} and enqueued proxy job {}", filename, job_id);

        return Ok((
            StatusCode::ACCEPTED,
            Json(JobAccepted::new("Video processing started.", job_id)),
        ));
    }

    Err(ApiError::validation("multipart field 'file' is required"))
}

/// List all uploaded original and proxy videos.
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<MediaListing>> {
    Ok(Json(state.library.list().await?))
}

/// Stream an original video.
pub async fn download_original(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.library.original_path(&filename)?;
    serve_file(path, &filename).await
}

/// Stream a proxy or edit output.
pub async fn download_proxy(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.library.proxy_path(&filename)?;
    serve_file(path, &filename).await
}

async fn serve_file(path: PathBuf, filename: &str) -> ApiResult<Response> {
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => return Err(e.into()),
    };

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
