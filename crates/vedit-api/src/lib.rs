//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video upload and download endpoints over the media library
//! - Edit/timeline submission backed by the job queue
//! - Job status polling
//! - CORS, request-id and request-logging middleware

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
