//! Segment store
//!
//! Ordered sequence of segments produced by a script load. Appended to while
//! loading, read by ordinal during playback.

use serde::{Deserialize, Serialize};

use super::types::{ControllerFrame, Segment};

/// Parsed script, as a partition of the frame axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Drop segments that never received frames
    pub(crate) fn prune_empty(&mut self) {
        self.segments.retain(|segment| !segment.is_empty());
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Total number of logical frames covered
    pub fn frame_count(&self) -> u64 {
        self.segments.last().map(|s| s.last_frame).unwrap_or(0)
    }

    /// Index of the segment covering `frame`
    pub fn segment_index_at(&self, frame: u64) -> Option<usize> {
        let index = self
            .segments
            .partition_point(|segment| segment.last_frame < frame);
        self.segments
            .get(index)
            .filter(|segment| segment.contains_frame(frame))
            .map(|_| index)
    }

    /// Expand to one controller frame per logical frame
    pub fn expand(&self) -> Vec<ControllerFrame> {
        let mut frames = Vec::with_capacity(self.frame_count() as usize);
        for segment in &self.segments {
            let controller = segment.controller();
            frames.extend(std::iter::repeat_n(controller, segment.frame_count() as usize));
        }
        frames
    }
}

impl From<Vec<Segment>> for SegmentStore {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl<'a> IntoIterator for &'a SegmentStore {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
