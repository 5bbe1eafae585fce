//! Job types for the queue.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vedit_models::{JobId, ValidationError};

/// Job to generate a proxy derivative of an uploaded original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyGenerateJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Source video path
    pub input: PathBuf,
    /// Proxy output path
    pub output: PathBuf,
}

impl ProxyGenerateJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            job_id: JobId::new(),
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Job to extract a time range from a source video, re-encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Source video path
    pub input: PathBuf,
    /// Cut output path
    pub output: PathBuf,
    /// Range start in seconds
    pub start: f64,
    /// Range end in seconds (exclusive)
    pub end: f64,
}

impl CutJob {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            input: input.into(),
            output: output.into(),
            start,
            end,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0 {
            return Err(ValidationError::new(
                "cut start/end must be non-negative numbers",
            ));
        }
        if self.end <= self.start {
            return Err(ValidationError::new(format!(
                "cut end ({}) must be greater than start ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

/// Job to concatenate inputs in order by stream copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcatJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Ordered input paths
    pub sources: Vec<PathBuf>,
    /// Final output path
    pub output: PathBuf,
    /// Jobs that must succeed before this one becomes eligible
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<JobId>,
    /// Intermediate files owned by this pipeline, removed once the job
    /// reaches a terminal state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleanup: Vec<PathBuf>,
}

impl ConcatJob {
    pub fn new(sources: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            job_id: JobId::new(),
            sources,
            output: output.into(),
            depends_on: Vec::new(),
            cleanup: Vec::new(),
        }
    }

    /// Declare prerequisite jobs.
    pub fn with_depends_on(mut self, deps: Vec<JobId>) -> Self {
        self.depends_on = deps;
        self
    }

    /// Declare pipeline-owned intermediates to delete on completion.
    pub fn with_cleanup(mut self, paths: Vec<PathBuf>) -> Self {
        self.cleanup = paths;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sources.is_empty() {
            return Err(ValidationError::new(
                "concat requires at least one input segment",
            ));
        }
        Ok(())
    }
}

/// Generic job wrapper for queue storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueJob {
    ProxyGenerate(ProxyGenerateJob),
    Cut(CutJob),
    Concat(ConcatJob),
}

impl QueueJob {
    pub fn job_id(&self) -> &JobId {
        match self {
            QueueJob::ProxyGenerate(j) => &j.job_id,
            QueueJob::Cut(j) => &j.job_id,
            QueueJob::Concat(j) => &j.job_id,
        }
    }

    /// Prerequisite jobs that must succeed before dispatch.
    pub fn depends_on(&self) -> &[JobId] {
        match self {
            QueueJob::Concat(j) => &j.depends_on,
            _ => &[],
        }
    }

    /// Output path the job will produce on success.
    pub fn output(&self) -> &std::path::Path {
        match self {
            QueueJob::ProxyGenerate(j) => &j.output,
            QueueJob::Cut(j) => &j.output,
            QueueJob::Concat(j) => &j.output,
        }
    }

    /// Shape-level parameter validation, run once at submission time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            QueueJob::ProxyGenerate(_) => Ok(()),
            QueueJob::Cut(j) => j.validate(),
            QueueJob::Concat(j) => j.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_validation() {
        let mut job = CutJob::new("/in/a.mp4", "/out/b.mp4", 0.0, 5.0);
        assert!(job.validate().is_ok());
        job.end = 0.0;
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_concat_rejects_empty_sources() {
        let job = ConcatJob::new(Vec::new(), "/out/final.mp4");
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_queue_job_tagged_decode() {
        let json = r#"{
            "type": "cut",
            "job_id": "abc",
            "input": "/in/a.mp4",
            "output": "/out/b.mp4",
            "start": 0.0,
            "end": 5.0
        }"#;
        let job: QueueJob = serde_json::from_str(json).unwrap();
        match job {
            QueueJob::Cut(cut) => {
                assert_eq!(cut.job_id.as_str(), "abc");
                assert_eq!(cut.end, 5.0);
            }
            other => panic!("decoded wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_depends_on_default_empty() {
        let job = QueueJob::Cut(CutJob::new("/a", "/b", 0.0, 1.0));
        assert!(job.depends_on().is_empty());

        let concat = ConcatJob::new(vec![PathBuf::from("/x")], "/out")
            .with_depends_on(vec![JobId::from_string("dep-1")]);
        assert_eq!(QueueJob::Concat(concat).depends_on().len(), 1);
    }
}
