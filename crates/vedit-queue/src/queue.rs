//! Job queue using Redis Streams.

use std::time::Duration;

use redis::streams::{StreamAutoClaimReply, StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use vedit_models::JobId;

use crate::error::{QueueError, QueueResult};
use crate::job::QueueJob;
use crate::status::JobStatusStore;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for jobs
    pub stream_name: String,
    /// Consumer group name
    pub consumer_group: String,
    /// Key prefix for status records
    pub status_prefix: String,
    /// How long terminal status records are retained
    pub result_ttl: Duration,
    /// Idle time after which an unacked message may be reclaimed
    pub visibility_timeout: Duration,
    /// Delay before a dependency-blocked job is requeued
    pub defer_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            stream_name: "vedit:jobs".to_string(),
            consumer_group: "vedit:workers".to_string(),
            status_prefix: "vedit:status".to_string(),
            result_ttl: Duration::from_secs(86_400), // 24 hours
            visibility_timeout: Duration::from_secs(1_800), // 30 minutes
            defer_delay: Duration::from_millis(500),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: std::env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            stream_name: std::env::var("QUEUE_STREAM").unwrap_or(defaults.stream_name),
            consumer_group: std::env::var("QUEUE_CONSUMER_GROUP")
                .unwrap_or(defaults.consumer_group),
            status_prefix: std::env::var("QUEUE_STATUS_PREFIX").unwrap_or(defaults.status_prefix),
            result_ttl: Duration::from_secs(
                std::env::var("QUEUE_RESULT_TTL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.result_ttl.as_secs()),
            ),
            visibility_timeout: Duration::from_secs(
                std::env::var("QUEUE_VISIBILITY_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.visibility_timeout.as_secs()),
            ),
            defer_delay: Duration::from_millis(
                std::env::var("QUEUE_DEFER_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.defer_delay.as_millis() as u64),
            ),
        }
    }
}

/// A message pulled from the stream, pending ack.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Stream entry ID, used for ack
    pub message_id: String,
    /// Decoded job payload
    pub job: QueueJob,
}

/// Job queue client.
#[derive(Clone)]
pub struct JobQueue {
    client: redis::Client,
    config: QueueConfig,
    status: JobStatusStore,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let status = JobStatusStore::new(
            client.clone(),
            config.status_prefix.clone(),
            config.result_ttl,
        );
        Ok(Self {
            client,
            config,
            status,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    /// The result store backing this queue.
    pub fn status(&self) -> &JobStatusStore {
        &self.status
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Initialize the queue (create consumer group if not exists).
    pub async fn init(&self) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Create consumer group (ignore error if already exists)
        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => info!("Created consumer group: {}", self.config.consumer_group),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists: {}", self.config.consumer_group);
            }
            Err(e) => return Err(QueueError::Redis(e)),
        }

        Ok(())
    }

    /// Verify the backend is reachable.
    pub async fn ping(&self) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Enqueue a job and return its ID immediately.
    ///
    /// The Pending status record is written before the stream entry so a
    /// client polling right after submission sees `pending`, never `unknown`.
    pub async fn enqueue(&self, job: QueueJob) -> QueueResult<JobId> {
        let job_id = job.job_id().clone();
        self.status.set_pending(&job_id).await?;

        let message_id = self.push(&job).await?;
        info!("Enqueued job {} with message ID {}", job_id, message_id);

        Ok(job_id)
    }

    /// Put a job back on the stream without touching its status record, used
    /// when its prerequisites have not settled yet.
    pub async fn requeue(&self, message_id: &str, job: &QueueJob) -> QueueResult<()> {
        let new_id = self.push(job).await?;
        self.ack(message_id).await?;
        debug!(
            "Deferred job {} requeued as message {}",
            job.job_id(),
            new_id
        );
        Ok(())
    }

    async fn push(&self, job: &QueueJob) -> QueueResult<String> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(job)?;

        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("*")
            .arg("job")
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        Ok(message_id)
    }

    /// Read up to `count` new messages for this consumer, blocking up to
    /// `block` when the stream is empty.
    pub async fn read_batch(
        &self,
        consumer: &str,
        count: usize,
        block: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let options = StreamReadOptions::default()
            .group(&self.config.consumer_group, consumer)
            .count(count)
            .block(block.as_millis() as usize);

        let reply: StreamReadReply = conn
            .xread_options(&[&self.config.stream_name], &[">"], &options)
            .await?;

        let mut messages = Vec::new();
        for key in reply.keys {
            for entry in key.ids {
                match decode_entry(&entry) {
                    Some(job) => messages.push(QueueMessage {
                        message_id: entry.id.clone(),
                        job,
                    }),
                    None => {
                        warn!("Dropping malformed stream entry {}", entry.id);
                        self.ack(&entry.id).await?;
                    }
                }
            }
        }

        Ok(messages)
    }

    /// Claim messages another consumer left unacked past the visibility
    /// timeout (crashed or hung worker).
    pub async fn reclaim_stale(
        &self,
        consumer: &str,
        count: usize,
    ) -> QueueResult<Vec<QueueMessage>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let reply: StreamAutoClaimReply = redis::cmd("XAUTOCLAIM")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(consumer)
            .arg(self.config.visibility_timeout.as_millis() as u64)
            .arg("0-0")
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        let mut messages = Vec::new();
        for entry in reply.claimed {
            match decode_entry(&entry) {
                Some(job) => {
                    warn!("Reclaimed stale job {} ({})", job.job_id(), entry.id);
                    messages.push(QueueMessage {
                        message_id: entry.id.clone(),
                        job,
                    });
                }
                None => {
                    warn!("Dropping malformed reclaimed entry {}", entry.id);
                    self.ack(&entry.id).await?;
                }
            }
        }

        Ok(messages)
    }

    /// Acknowledge a message (mark as consumed) and drop it from the stream.
    pub async fn ack(&self, message_id: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        redis::cmd("XDEL")
            .arg(&self.config.stream_name)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        debug!("Acknowledged message: {}", message_id);
        Ok(())
    }

    /// Get queue length.
    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.xlen(&self.config.stream_name).await?;
        Ok(len)
    }
}

fn decode_entry(entry: &redis::streams::StreamId) -> Option<QueueJob> {
    let payload: String = entry.get("job")?;
    serde_json::from_str(&payload).ok()
}
