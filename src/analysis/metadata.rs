//! Analysis metadata structures

use serde::{Deserialize, Serialize};

use crate::features::pitch::scheduler::FrameSchedule;

/// Run metadata attached to every [`PitchAnalysis`](super::result::PitchAnalysis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,

    /// Voice profile name
    pub profile: String,

    /// Frame length in samples
    pub frame_length: usize,

    /// Lag offset in samples
    pub offset_length: usize,

    /// Frame step in samples
    pub frame_step: usize,

    /// Frames with a voiced estimate after post-processing
    pub voiced_frames: usize,

    /// Frames that could not be analysed (counted as unvoiced)
    pub anomalous_frames: usize,

    /// Frames zeroed by the range gate
    pub gated_frames: usize,
}

impl AnalysisMetadata {
    /// Metadata skeleton for a schedule; counts and timing start at 0
    pub fn for_schedule(schedule: &FrameSchedule, profile: &str) -> Self {
        let duration_seconds = if schedule.sample_rate > 0 {
            schedule.signal_length as f32 / schedule.sample_rate as f32
        } else {
            0.0
        };

        Self {
            duration_seconds,
            sample_rate: schedule.sample_rate,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: profile.to_string(),
            frame_length: schedule.frame_length,
            offset_length: schedule.offset_length,
            frame_step: schedule.frame_step,
            voiced_frames: 0,
            anomalous_frames: 0,
            gated_frames: 0,
        }
    }
}
