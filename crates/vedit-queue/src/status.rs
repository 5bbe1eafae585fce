//! Per-job status records (the result store).
//!
//! One JSON record per job, keyed by job ID, written exactly once per status
//! transition by the worker that owns the job. Records expire after the
//! configured retention; reads are idempotent and an unknown ID is simply
//! `None`, never an error.

use std::path::Path;
use std::time::Duration;

use redis::AsyncCommands;
use tracing::debug;

use vedit_models::{JobId, JobRecord};

use crate::error::QueueResult;

/// Result store client.
#[derive(Clone)]
pub struct JobStatusStore {
    client: redis::Client,
    key_prefix: String,
    retention: Duration,
}

impl JobStatusStore {
    pub fn new(client: redis::Client, key_prefix: impl Into<String>, retention: Duration) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            retention,
        }
    }

    fn key(&self, id: &JobId) -> String {
        format!("{}:{}", self.key_prefix, id)
    }

    /// Record a freshly enqueued job.
    pub async fn set_pending(&self, id: &JobId) -> QueueResult<()> {
        self.write(JobRecord::pending(id.clone())).await
    }

    /// Record that a worker picked the job up.
    pub async fn mark_running(&self, id: &JobId) -> QueueResult<()> {
        self.write(JobRecord::running(id.clone())).await
    }

    /// Record terminal success with the produced output path.
    pub async fn mark_succeeded(&self, id: &JobId, output: &Path) -> QueueResult<()> {
        self.write(JobRecord::succeeded(id.clone(), output.to_path_buf()))
            .await
    }

    /// Record terminal failure with a diagnostic message.
    pub async fn mark_failed(&self, id: &JobId, error: impl Into<String>) -> QueueResult<()> {
        self.write(JobRecord::failed(id.clone(), error)).await
    }

    /// Fetch the status record for a job. Unknown or expired IDs yield `None`.
    pub async fn get(&self, id: &JobId) -> QueueResult<Option<JobRecord>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(self.key(id)).await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Fetch records for a list of prerequisite jobs, preserving order.
    pub async fn get_many(&self, ids: &[JobId]) -> QueueResult<Vec<(JobId, Option<JobRecord>)>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push((id.clone(), self.get(id).await?));
        }
        Ok(records)
    }

    async fn write(&self, record: JobRecord) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(&record)?;
        conn.set_ex::<_, _, ()>(self.key(&record.id), payload, self.retention.as_secs())
            .await?;
        debug!("Status {} -> {}", record.id, record.status);
        Ok(())
    }
}
