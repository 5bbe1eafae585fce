//! Queue integration tests.
//!
//! These require a local Redis; run with `cargo test -- --ignored`.

use std::time::Duration;

use vedit_models::JobStatus;
use vedit_queue::{CutJob, JobQueue, QueueConfig, QueueJob};

fn test_queue(suffix: &str) -> JobQueue {
    let config = QueueConfig {
        stream_name: format!("vedit:test:jobs:{suffix}"),
        consumer_group: format!("vedit:test:workers:{suffix}"),
        status_prefix: format!("vedit:test:status:{suffix}"),
        result_ttl: Duration::from_secs(60),
        ..Default::default()
    };
    JobQueue::new(config).expect("Failed to create queue")
}

/// Enqueue returns immediately with a pending status record.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_enqueue_writes_pending_status() {
    let queue = test_queue("pending");
    queue.init().await.expect("Failed to init queue");

    let job = QueueJob::Cut(CutJob::new("/in/a.mp4", "/out/b.mp4", 0.0, 5.0));
    let job_id = queue.enqueue(job).await.expect("Failed to enqueue");

    let record = queue
        .status()
        .get(&job_id)
        .await
        .expect("Failed to read status")
        .expect("Status record missing");
    assert_eq!(record.status, JobStatus::Pending);
}

/// A worker can read the job back and ack it.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_read_and_ack_cycle() {
    let queue = test_queue("readack");
    queue.init().await.expect("Failed to init queue");

    let job = QueueJob::Cut(CutJob::new("/in/a.mp4", "/out/b.mp4", 0.0, 5.0));
    let job_id = queue.enqueue(job).await.expect("Failed to enqueue");

    let messages = queue
        .read_batch("test-consumer", 10, Duration::from_millis(500))
        .await
        .expect("Failed to read");
    let message = messages
        .iter()
        .find(|m| m.job.job_id() == &job_id)
        .expect("Enqueued job not delivered");

    queue.ack(&message.message_id).await.expect("Failed to ack");
}

/// Status reads are idempotent: repeated polls of a terminal job return the
/// same record.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_status_reread_is_stable() {
    let queue = test_queue("reread");
    queue.init().await.expect("Failed to init queue");

    let job = QueueJob::Cut(CutJob::new("/in/a.mp4", "/out/b.mp4", 0.0, 5.0));
    let job_id = queue.enqueue(job).await.expect("Failed to enqueue");

    queue
        .status()
        .mark_succeeded(&job_id, std::path::Path::new("/out/b.mp4"))
        .await
        .expect("Failed to mark succeeded");

    for _ in 0..3 {
        let record = queue
            .status()
            .get(&job_id)
            .await
            .expect("Failed to read status")
            .expect("Status record missing");
        assert_eq!(record.status, JobStatus::Succeeded);
        assert_eq!(record.output.as_deref(), Some(std::path::Path::new("/out/b.mp4")));
    }
}

/// Unknown job IDs read as `None`, never an error.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_unknown_job_id_is_none() {
    let queue = test_queue("unknown");
    queue.init().await.expect("Failed to init queue");

    let record = queue
        .status()
        .get(&vedit_models::JobId::from_string("no-such-job"))
        .await
        .expect("Failed to read status");
    assert!(record.is_none());
}
