//! Redis Streams job queue for transcoding work.
//!
//! This crate provides:
//! - Job payload types (proxy generation, cut, concat) with dependency lists
//! - Enqueue/ack/reclaim over a Redis Streams consumer group
//! - Per-job status records with bounded retention (the result store)
//! - The timeline composer that expands segment lists into cut+concat jobs

pub mod error;
pub mod job;
pub mod pipeline;
pub mod queue;
pub mod status;

pub use error::{QueueError, QueueResult};
pub use job::{ConcatJob, CutJob, ProxyGenerateJob, QueueJob};
pub use pipeline::{ComposeError, TimelineComposer};
pub use queue::{JobQueue, QueueConfig, QueueMessage};
pub use status::JobStatusStore;
