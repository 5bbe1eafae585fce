//! Job processing logic.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use vedit_media::{Ffmpeg, MediaResult};
use vedit_models::{EncodingConfig, JobId, JobRecord, JobStatus};
use vedit_queue::{JobQueue, QueueJob, QueueMessage};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;

/// Context for job processing.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub queue: Arc<JobQueue>,
    pub ffmpeg: Ffmpeg,
    pub encoding: EncodingConfig,
}

impl ProcessingContext {
    pub fn new(config: WorkerConfig, queue: Arc<JobQueue>) -> WorkerResult<Self> {
        let ffmpeg = Ffmpeg::new(config.ffmpeg_timeout)?;
        Ok(Self {
            config,
            queue,
            ffmpeg,
            encoding: EncodingConfig::default(),
        })
    }
}

/// What the executor should do with the message after processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Terminal status recorded; ack the message.
    Completed,
    /// Prerequisites not settled yet; requeue after a short delay.
    Deferred,
}

/// Dispatch-eligibility of a job given its prerequisites' status records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyState {
    /// All prerequisites succeeded.
    Ready,
    /// At least one prerequisite is still pending or running.
    Waiting,
    /// A prerequisite failed (or its record is gone); the dependent job must
    /// be failed with the given diagnostic.
    Blocked { prerequisite: JobId, reason: String },
}

/// Evaluate the dependency gate over fetched prerequisite records.
///
/// A failed prerequisite takes precedence over unsettled ones so a doomed
/// pipeline fails as soon as the failure is visible.
pub fn dependency_gate(records: &[(JobId, Option<JobRecord>)]) -> DependencyState {
    let mut waiting = false;

    for (id, record) in records {
        match record {
            None => {
                return DependencyState::Blocked {
                    prerequisite: id.clone(),
                    reason: "status record missing or expired".to_string(),
                }
            }
            Some(rec) => match rec.status {
                JobStatus::Failed => {
                    let reason = match &rec.error {
                        Some(err) => format!("failed: {err}"),
                        None => "failed".to_string(),
                    };
                    return DependencyState::Blocked {
                        prerequisite: id.clone(),
                        reason,
                    };
                }
                JobStatus::Succeeded => {}
                JobStatus::Pending | JobStatus::Running => waiting = true,
            },
        }
    }

    if waiting {
        DependencyState::Waiting
    } else {
        DependencyState::Ready
    }
}

/// Process one dequeued message through to a disposition.
///
/// Errors bubbling out of here are infrastructure failures (the status store
/// is unreachable); the message stays unacked and is reclaimed later.
pub async fn process_message(
    ctx: &ProcessingContext,
    message: &QueueMessage,
) -> WorkerResult<Disposition> {
    let job = &message.job;
    let status = ctx.queue.status();

    let deps = job.depends_on();
    if !deps.is_empty() {
        let records = status.get_many(deps).await?;
        match dependency_gate(&records) {
            DependencyState::Waiting => return Ok(Disposition::Deferred),
            DependencyState::Blocked {
                prerequisite,
                reason,
            } => {
                let diagnostic = format!("prerequisite job {prerequisite} {reason}");
                warn!("Job {} blocked: {}", job.job_id(), diagnostic);
                status.mark_failed(job.job_id(), diagnostic.as_str()).await?;
                remove_intermediates(job).await;
                counter!("vedit_jobs_failed_total").increment(1);
                return Ok(Disposition::Completed);
            }
            DependencyState::Ready => {}
        }
    }

    status.mark_running(job.job_id()).await?;
    info!("Job {} running", job.job_id());

    match execute(ctx, job).await {
        Ok(()) => {
            status.mark_succeeded(job.job_id(), job.output()).await?;
            remove_intermediates(job).await;
            counter!("vedit_jobs_succeeded_total").increment(1);
            info!("Job {} succeeded: {}", job.job_id(), job.output().display());
        }
        Err(e) => {
            let diagnostic = e.diagnostic();
            status.mark_failed(job.job_id(), diagnostic.as_str()).await?;
            remove_intermediates(job).await;
            counter!("vedit_jobs_failed_total").increment(1);
            warn!("Job {} failed: {}", job.job_id(), diagnostic);
        }
    }

    Ok(Disposition::Completed)
}

async fn execute(ctx: &ProcessingContext, job: &QueueJob) -> MediaResult<()> {
    if let Some(parent) = job.output().parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    match job {
        QueueJob::ProxyGenerate(j) => {
            ctx.ffmpeg
                .generate_proxy(&j.input, &j.output, &ctx.encoding)
                .await
        }
        QueueJob::Cut(j) => {
            ctx.ffmpeg
                .cut(&j.input, &j.output, j.start, j.end, &ctx.encoding)
                .await
        }
        QueueJob::Concat(j) => ctx.ffmpeg.concat(&j.sources, &j.output).await,
    }
}

/// Delete pipeline-owned intermediates once their consumer reached a
/// terminal state. Best-effort: a leftover file is logged, not fatal.
async fn remove_intermediates(job: &QueueJob) {
    let QueueJob::Concat(concat) = job else {
        return;
    };

    for path in &concat.cleanup {
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("Removed intermediate {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove intermediate {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vedit_queue::ConcatJob;

    fn record(id: &JobId, status: JobStatus) -> JobRecord {
        match status {
            JobStatus::Pending => JobRecord::pending(id.clone()),
            JobStatus::Running => JobRecord::running(id.clone()),
            JobStatus::Succeeded => JobRecord::succeeded(id.clone(), PathBuf::from("/out")),
            JobStatus::Failed => JobRecord::failed(id.clone(), "ffmpeg exited with code 1"),
        }
    }

    #[test]
    fn test_gate_ready_when_all_succeeded() {
        let a = JobId::new();
        let b = JobId::new();
        let records = vec![
            (a.clone(), Some(record(&a, JobStatus::Succeeded))),
            (b.clone(), Some(record(&b, JobStatus::Succeeded))),
        ];
        assert_eq!(dependency_gate(&records), DependencyState::Ready);
    }

    #[test]
    fn test_gate_waits_on_unsettled() {
        let a = JobId::new();
        let b = JobId::new();
        let records = vec![
            (a.clone(), Some(record(&a, JobStatus::Succeeded))),
            (b.clone(), Some(record(&b, JobStatus::Running))),
        ];
        assert_eq!(dependency_gate(&records), DependencyState::Waiting);
    }

    #[test]
    fn test_gate_failure_beats_waiting() {
        let a = JobId::new();
        let b = JobId::new();
        let records = vec![
            (a.clone(), Some(record(&a, JobStatus::Pending))),
            (b.clone(), Some(record(&b, JobStatus::Failed))),
        ];
        match dependency_gate(&records) {
            DependencyState::Blocked { prerequisite, reason } => {
                assert_eq!(prerequisite, b);
                assert!(reason.contains("ffmpeg exited with code 1"));
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_missing_record_blocks() {
        let a = JobId::new();
        let records = vec![(a.clone(), None)];
        assert!(matches!(
            dependency_gate(&records),
            DependencyState::Blocked { .. }
        ));
    }

    #[test]
    fn test_gate_empty_deps_ready() {
        assert_eq!(dependency_gate(&[]), DependencyState::Ready);
    }

    #[tokio::test]
    async fn test_remove_intermediates_deletes_cleanup_list() {
        let tmp = tempfile::tempdir().unwrap();
        let kept = tmp.path().join("kept.mp4");
        let owned = tmp.path().join("cut_1_a.mp4");
        tokio::fs::write(&kept, b"x").await.unwrap();
        tokio::fs::write(&owned, b"x").await.unwrap();

        let job = QueueJob::Concat(
            ConcatJob::new(vec![kept.clone(), owned.clone()], tmp.path().join("final.mp4"))
                .with_cleanup(vec![owned.clone()]),
        );
        remove_intermediates(&job).await;

        assert!(kept.exists());
        assert!(!owned.exists());
    }

    #[tokio::test]
    async fn test_remove_intermediates_tolerates_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("already-gone.mp4");
        let job = QueueJob::Concat(
            ConcatJob::new(vec![gone.clone()], tmp.path().join("final.mp4"))
                .with_cleanup(vec![gone]),
        );
        // Must not panic or error
        remove_intermediates(&job).await;
    }
}
