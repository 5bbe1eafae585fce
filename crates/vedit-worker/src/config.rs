//! Worker configuration.

use std::net::SocketAddr;
use std::time::Duration;

use uuid::Uuid;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Max jobs processed concurrently by this worker
    pub max_concurrent_jobs: usize,
    /// Consumer name within the queue's consumer group
    pub consumer_name: String,
    /// Hard bound on a single ffmpeg invocation
    pub ffmpeg_timeout: Duration,
    /// How long a queue read blocks when the stream is empty
    pub poll_block: Duration,
    /// Prometheus scrape address, disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            consumer_name: format!("worker-{}", Uuid::new_v4()),
            ffmpeg_timeout: Duration::from_secs(600), // 10 minutes
            poll_block: Duration::from_secs(5),
            metrics_addr: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: std::env::var("WORKER_MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_concurrent_jobs),
            consumer_name: std::env::var("WORKER_CONSUMER_NAME")
                .unwrap_or(defaults.consumer_name),
            ffmpeg_timeout: Duration::from_secs(
                std::env::var("FFMPEG_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.ffmpeg_timeout.as_secs()),
            ),
            poll_block: Duration::from_secs(
                std::env::var("WORKER_POLL_BLOCK")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.poll_block.as_secs()),
            ),
            metrics_addr: std::env::var("WORKER_METRICS_ADDR")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
