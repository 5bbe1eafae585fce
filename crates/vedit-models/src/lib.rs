//! Shared data models for the vedit backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job identity and status records
//! - Edit operation parameters
//! - Timeline segments
//! - Encoding configuration
//! - Deterministic output-filename derivation

pub mod encoding;
pub mod error;
pub mod job;
pub mod naming;
pub mod timeline;

// Re-export common types
pub use encoding::EncodingConfig;
pub use error::ValidationError;
pub use job::{JobId, JobRecord, JobStatus};
pub use naming::{edit_filename, proxy_filename};
pub use timeline::Segment;
