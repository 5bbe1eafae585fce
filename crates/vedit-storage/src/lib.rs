//! Local media library.
//!
//! This crate provides:
//! - Fixed originals/proxies/work directory roots
//! - Filename sanitization and path resolution
//! - Directory listing (the catalog is the filesystem itself)
//!
//! There is no metadata index: a file's existence on disk is its record.

pub mod error;
pub mod library;

pub use error::{StorageError, StorageResult};
pub use library::{LibraryConfig, MediaLibrary, MediaListing};
