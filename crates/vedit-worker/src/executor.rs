//! Job executor.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use vedit_queue::{JobQueue, QueueMessage};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::processor::{process_message, Disposition, ProcessingContext};

/// Job executor that processes jobs from the queue.
pub struct JobExecutor {
    config: WorkerConfig,
    queue: Arc<JobQueue>,
    job_semaphore: Arc<Semaphore>,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new(config: WorkerConfig, queue: JobQueue) -> Self {
        let job_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let (shutdown, _) = tokio::sync::watch::channel(false);

        Self {
            config,
            queue: Arc::new(queue),
            job_semaphore,
            shutdown,
        }
    }

    /// Start the executor. Returns once a shutdown signal has been received
    /// and all in-flight jobs have finished.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(
            "Starting job executor {} with {} max concurrent jobs",
            self.config.consumer_name, self.config.max_concurrent_jobs
        );

        self.queue.init().await?;

        let ctx = Arc::new(ProcessingContext::new(
            self.config.clone(),
            self.queue.clone(),
        )?);

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                info!("Shutdown signal received, stopping executor");
                break;
            }

            // Only ask for as many jobs as there are free slots, so unacked
            // messages never pile up behind the semaphore.
            let slots = self.job_semaphore.available_permits();
            if slots == 0 {
                tokio::select! {
                    _ = shutdown_rx.changed() => {}
                    _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {}
                }
                continue;
            }

            tokio::select! {
                _ = shutdown_rx.changed() => {}
                fetched = self.fetch(slots) => match fetched {
                    Ok(messages) => {
                        for message in messages {
                            self.spawn_job(ctx.clone(), message).await;
                        }
                    }
                    Err(e) => {
                        error!("Queue read failed: {}", e);
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    }
                }
            }
        }

        // Drain: wait for all permits to come back.
        info!("Waiting for in-flight jobs to finish");
        let _ = self
            .job_semaphore
            .acquire_many(self.config.max_concurrent_jobs as u32)
            .await
            .unwrap();

        info!("Job executor stopped");
        Ok(())
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Stale messages first (crashed workers), then new work.
    async fn fetch(&self, slots: usize) -> WorkerResult<Vec<QueueMessage>> {
        let reclaimed = match self
            .queue
            .reclaim_stale(&self.config.consumer_name, slots)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Stale-message reclaim failed: {}", e);
                Vec::new()
            }
        };
        if !reclaimed.is_empty() {
            return Ok(reclaimed);
        }

        let messages = self
            .queue
            .read_batch(&self.config.consumer_name, slots, self.config.poll_block)
            .await?;
        Ok(messages)
    }

    async fn spawn_job(&self, ctx: Arc<ProcessingContext>, message: QueueMessage) {
        let permit = self.job_semaphore.clone().acquire_owned().await.unwrap();
        let queue = self.queue.clone();
        let defer_delay = self.queue.config().defer_delay;

        tokio::spawn(async move {
            let _permit = permit;

            match process_message(&ctx, &message).await {
                Ok(Disposition::Completed) => {
                    if let Err(e) = queue.ack(&message.message_id).await {
                        warn!("Failed to ack message {}: {}", message.message_id, e);
                    }
                }
                Ok(Disposition::Deferred) => {
                    tokio::time::sleep(defer_delay).await;
                    if let Err(e) = queue.requeue(&message.message_id, &message.job).await {
                        warn!(
                            "Failed to requeue deferred job {}: {}",
                            message.job.job_id(),
                            e
                        );
                    }
                }
                Err(e) => {
                    // Infra failure: leave the message unacked so it is
                    // reclaimed after the visibility timeout.
                    error!("Job {} processing error: {}", message.job.job_id(), e);
                }
            }
        });
    }
}
