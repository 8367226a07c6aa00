//! Results log types and serialization

use crate::tas::types::{FrameResults, Vec4};

/// Results log written at the end of a run
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultsLog {
    /// Every stored sample
    pub all_data: Vec<FrameSample>,
    /// First, last, and every sample where a counter changed
    pub collectable_frames: Vec<CollectableSample>,
}

/// Full sample of one frame
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrameSample {
    pub tas_frame: u64,
    pub fuel_cell_total: f32,
    pub money_total: f32,
    pub buzzer_total: f32,
    pub player_position: Vec4,
    pub camera_position: Vec4,
    /// Marker of the segment that produced this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

/// Collectible counters at one frame
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollectableSample {
    pub tas_frame: u64,
    pub fuel_cell_total: f32,
    pub money_total: f32,
    pub buzzer_total: f32,
}

impl FrameSample {
    pub fn new(results: &FrameResults, marker: Option<String>) -> Self {
        Self {
            tas_frame: results.tas_frame,
            fuel_cell_total: results.fuel_cell_total,
            money_total: results.money_total,
            buzzer_total: results.buzzer_total,
            player_position: results.player_position,
            camera_position: results.camera_position,
            marker,
        }
    }
}

impl From<&FrameSample> for CollectableSample {
    fn from(sample: &FrameSample) -> Self {
        Self {
            tas_frame: sample.tas_frame,
            fuel_cell_total: sample.fuel_cell_total,
            money_total: sample.money_total,
            buzzer_total: sample.buzzer_total,
        }
    }
}

impl ResultsLog {
    /// Build the log from stored samples
    pub fn from_samples(all_data: Vec<FrameSample>) -> Self {
        let last = all_data.len().saturating_sub(1);
        let collectable_frames = all_data
            .iter()
            .enumerate()
            .filter(|&(index, sample)| {
                index == 0
                    || index == last
                    || counters_differ(sample, &all_data[index - 1])
            })
            .map(|(_, sample)| CollectableSample::from(sample))
            .collect();

        Self {
            all_data,
            collectable_frames,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn counters_differ(a: &FrameSample, b: &FrameSample) -> bool {
    a.fuel_cell_total != b.fuel_cell_total
        || a.money_total != b.money_total
        || a.buzzer_total != b.buzzer_total
}
