//! Timeline composer.
//!
//! Expands a client-supplied ordered segment list into one Cut job per
//! segment plus a final Concat job. The Concat job depends on every Cut job:
//! the worker dispatch gate keeps it off a worker until all cuts have
//! succeeded, and fails it if any cut fails. The composer also hands the
//! Concat job the list of intermediates to delete once the pipeline settles.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use vedit_models::{JobId, Segment, ValidationError};
use vedit_storage::{MediaLibrary, StorageError};

use crate::error::QueueError;
use crate::job::{ConcatJob, CutJob, QueueJob};
use crate::queue::JobQueue;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Invalid timeline: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Expands timeline requests into dependent queue jobs.
#[derive(Clone)]
pub struct TimelineComposer {
    queue: Arc<JobQueue>,
    library: Arc<MediaLibrary>,
}

impl TimelineComposer {
    pub fn new(queue: Arc<JobQueue>, library: Arc<MediaLibrary>) -> Self {
        Self { queue, library }
    }

    /// Compose a timeline into queue jobs and return the pipeline's job ID.
    /// This is the Concat job's ID; its terminal status is the pipeline
    /// outcome.
    ///
    /// Validation runs before anything is enqueued: an invalid request
    /// enqueues no jobs. Whether the referenced source files exist is only
    /// discovered when the cuts execute.
    pub async fn compose(
        &self,
        segments: &[Segment],
        output_filename: &str,
    ) -> Result<JobId, ComposeError> {
        if segments.is_empty() {
            return Err(ValidationError::new("timeline must contain at least one segment").into());
        }
        for segment in segments {
            segment.validate()?;
        }

        // Resolve all paths up front so a bad filename rejects the whole
        // request before any job is enqueued.
        let output = self.library.proxy_path(output_filename)?;
        let mut cuts = Vec::with_capacity(segments.len());
        for segment in segments {
            let input = self.library.original_path(&segment.source_video_name)?;
            let intermediate = self.library.work_path(&segment.intermediate_filename())?;
            cuts.push(CutJob::new(input, intermediate, segment.start, segment.end));
        }

        let mut cut_ids = Vec::with_capacity(cuts.len());
        let mut intermediates = Vec::with_capacity(cuts.len());
        for cut in cuts {
            intermediates.push(cut.output.clone());
            cut_ids.push(self.queue.enqueue(QueueJob::Cut(cut)).await?);
        }

        let concat = ConcatJob::new(intermediates.clone(), output)
            .with_depends_on(cut_ids)
            .with_cleanup(intermediates);
        let pipeline_id = self.queue.enqueue(QueueJob::Concat(concat)).await?;

        info!(
            "Composed timeline: {} segments -> pipeline job {}",
            segments.len(),
            pipeline_id
        );

        Ok(pipeline_id)
    }
}
