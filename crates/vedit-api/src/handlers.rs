//! Request handlers.

pub mod edits;
pub mod health;
pub mod jobs;
pub mod timelines;
pub mod videos;

pub use edits::*;
pub use health::*;
pub use jobs::*;
pub use timelines::*;
pub use videos::*;
