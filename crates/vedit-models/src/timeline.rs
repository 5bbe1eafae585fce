//! Timeline segment models.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One entry in a client-submitted timeline: a time range inside an
/// already-uploaded source video.
///
/// Segments are ephemeral; they exist only while a timeline request is being
/// expanded into jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Client-supplied segment ID, unique within one timeline
    pub id: u32,

    /// Filename of the source video in the originals directory
    pub source_video_name: String,

    /// Range start in seconds
    pub start: f64,

    /// Range end in seconds (exclusive)
    pub end: f64,
}

impl Segment {
    /// Deterministic intermediate filename for this segment's cut output.
    ///
    /// Derived from segment ID and source name so that two concurrently
    /// submitted timelines only collide if given identical inputs.
    pub fn intermediate_filename(&self) -> String {
        format!("cut_{}_{}", self.id, self.source_video_name)
    }

    /// Check the time range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0 {
            return Err(ValidationError::new(format!(
                "segment {}: start/end must be non-negative numbers",
                self.id
            )));
        }
        if self.end <= self.start {
            return Err(ValidationError::new(format!(
                "segment {}: end ({}) must be greater than start ({})",
                self.id, self.end, self.start
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: u32, start: f64, end: f64) -> Segment {
        Segment {
            id,
            source_video_name: "a.mp4".to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_intermediate_filename_is_deterministic() {
        let seg = segment(1, 0.0, 5.0);
        assert_eq!(seg.intermediate_filename(), "cut_1_a.mp4");
        assert_eq!(seg.intermediate_filename(), segment(1, 10.0, 15.0).intermediate_filename());
    }

    #[test]
    fn test_distinct_segments_do_not_collide() {
        assert_ne!(
            segment(1, 0.0, 5.0).intermediate_filename(),
            segment(2, 0.0, 5.0).intermediate_filename()
        );
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert!(segment(1, 5.0, 5.0).validate().is_err());
        assert!(segment(1, 7.0, 5.0).validate().is_err());
        assert!(segment(1, 0.0, 5.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(segment(1, f64::NAN, 5.0).validate().is_err());
        assert!(segment(1, -1.0, 5.0).validate().is_err());
    }
}
