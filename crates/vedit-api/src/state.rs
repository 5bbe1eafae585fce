//! Application state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use vedit_queue::{JobQueue, TimelineComposer};
use vedit_storage::MediaLibrary;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub library: Arc<MediaLibrary>,
    pub queue: Arc<JobQueue>,
    pub composer: TimelineComposer,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: ApiConfig,
        library: MediaLibrary,
        queue: JobQueue,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let library = Arc::new(library);
        let queue = Arc::new(queue);
        let composer = TimelineComposer::new(queue.clone(), library.clone());

        Self {
            config,
            library,
            queue,
            composer,
            metrics,
        }
    }
}
