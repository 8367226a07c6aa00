//! Per-frame result tracking during playback

mod report;

pub use report::{CollectableSample, FrameSample, ResultsLog};

use crate::tas::types::FrameResults;

/// Collects frame results for one run
#[derive(Debug, Clone, Default)]
pub struct ResultTracker {
    samples: Vec<FrameSample>,
    // Results behind the last stored sample
    last_stored: Option<FrameResults>,
    // Most recent results, stored or not
    latest: Option<(FrameResults, Option<String>)>,
}

impl ResultTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take in the results of one played frame
    ///
    /// A sample is stored for the first frame and whenever counters or
    /// positions change.
    pub fn record(&mut self, results: &FrameResults, marker: Option<&str>) {
        let collectables_changed = self
            .latest
            .as_ref()
            .is_none_or(|(previous, _)| results.collectables_changed(previous));
        if collectables_changed {
            tracing::debug!(
                frame = results.tas_frame,
                fuel_cells = results.fuel_cell_total,
                money = results.money_total,
                buzzers = results.buzzer_total,
                "[TAS Playback] Collectables updated"
            );
        }

        let store = self
            .last_stored
            .as_ref()
            .is_none_or(|stored| results.snapshot_changed(stored));
        if store {
            self.samples
                .push(FrameSample::new(results, marker.map(str::to_string)));
            self.last_stored = Some(results.clone());
        }

        self.latest = Some((results.clone(), marker.map(str::to_string)));
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Close the run and build its log
    ///
    /// The final frame is always part of the log.
    pub fn finish(&mut self) -> ResultsLog {
        if let Some((latest, marker)) = self.latest.take() {
            let stored = self
                .last_stored
                .as_ref()
                .is_some_and(|stored| stored.tas_frame == latest.tas_frame);
            if !stored {
                self.samples.push(FrameSample::new(&latest, marker));
            }
        }
        self.last_stored = None;
        ResultsLog::from_samples(std::mem::take(&mut self.samples))
    }

    /// Drop everything collected
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
