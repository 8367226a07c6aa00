//! Segment store validation.

use crate::tas::store::SegmentStore;
use crate::tas::types::SourceLocation;

/// Ways a segment store can break the frame partition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// First segment doesn't start at frame 1
    #[error("first segment starts at frame {0}, expected 1")]
    BadStart(u64),
    /// Segment covers no frames
    #[error("segment from {location} covers no frames")]
    EmptySegment { location: SourceLocation },
    /// Gap or overlap between neighbours
    #[error("segment from {location} starts at frame {found}, expected {expected}")]
    NotContiguous {
        location: SourceLocation,
        expected: u64,
        found: u64,
    },
}

/// Check that segments cover frames `1..=N` with no gaps or overlaps
pub fn validate_segments(store: &SegmentStore) -> Result<(), ValidationError> {
    let mut expected = 1;
    for segment in store {
        if segment.is_empty() {
            return Err(ValidationError::EmptySegment {
                location: segment.source.clone(),
            });
        }
        if segment.first_frame != expected {
            if expected == 1 {
                return Err(ValidationError::BadStart(segment.first_frame));
            }
            return Err(ValidationError::NotContiguous {
                location: segment.source.clone(),
                expected,
                found: segment.first_frame,
            });
        }
        expected = segment.last_frame.saturating_add(1);
    }
    Ok(())
}
