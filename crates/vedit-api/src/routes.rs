//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::edits::submit_edit;
use crate::handlers::health::{health, metrics, ready};
use crate::handlers::jobs::get_job;
use crate::handlers::timelines::submit_timeline;
use crate::handlers::videos::{download_original, download_proxy, list_videos, upload_video};
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Videos
        .route("/videos", post(upload_video).get(list_videos))
        .route("/videos/:filename/original", get(download_original))
        .route("/videos/:filename/proxy", get(download_proxy))
        // Edits and timelines
        .route("/edits", post(submit_edit))
        .route("/timelines", post(submit_timeline))
        // Job polling
        .route("/jobs/:id", get(get_job))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use vedit_queue::{JobQueue, QueueConfig};
    use vedit_storage::{LibraryConfig, MediaLibrary};

    use crate::config::ApiConfig;

    async fn test_state(root: &std::path::Path) -> AppState {
        let library = MediaLibrary::new(LibraryConfig {
            originals_dir: root.join("originals"),
            proxies_dir: root.join("proxies"),
            work_dir: root.join("work"),
        })
        .await
        .unwrap();
        // URL is parsed eagerly but no connection is made for these routes.
        let queue = JobQueue::new(QueueConfig {
            redis_url: "redis://localhost:1".to_string(),
            ..Default::default()
        })
        .unwrap();
        AppState::new(ApiConfig::default(), library, queue, None)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let app = create_router(test_state(tmp.path()).await);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_download_missing_file_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = create_router(test_state(tmp.path()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/videos/nope.mp4/original")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_timeline_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = create_router(test_state(tmp.path()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/timelines")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"segments": [], "output_filename": "out.mp4"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
