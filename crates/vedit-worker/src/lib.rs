//! Transcoding job worker.
//!
//! This crate provides:
//! - Consumer-group executor with bounded concurrency
//! - Dependency gate (a job runs only after its prerequisites succeed)
//! - Per-operation dispatch into the ffmpeg wrapper
//! - Status-store transitions and intermediate-file cleanup
//! - Graceful shutdown

pub mod config;
pub mod error;
pub mod executor;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
