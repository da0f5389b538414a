//! F0 contour: the terminal product of pitch tracking

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::pitch::scheduler::FrameSchedule;
use crate::features::pitch::smoothing::{median_smooth, range_gate};
use crate::features::rhythm::spectrum::{rhythm_spectrum, RhythmSpectrum};

/// F0 values at a uniform frame rate
///
/// Value `i` belongs to the frame starting at sample `i * frame_step`.
/// 0.0 marks an unvoiced or rejected frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct F0Contour {
    /// F0 per frame in Hz
    pub values: Vec<f32>,

    /// Frames per second (`sample_rate / frame_step`)
    pub frame_rate: f32,

    /// Frame duration in seconds
    pub frame_duration: f32,

    /// Distance between frames in samples
    pub frame_step: usize,

    /// Sample rate of the analysed signal in Hz
    pub sample_rate: u32,
}

impl F0Contour {
    /// Wrap per-frame values with the geometry of `schedule`
    pub fn new(values: Vec<f32>, schedule: &FrameSchedule) -> Self {
        Self {
            values,
            frame_rate: schedule.frame_rate(),
            frame_duration: schedule.frame_duration,
            frame_step: schedule.frame_step,
            sample_rate: schedule.sample_rate,
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no frame was scheduled
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of frames with a non-zero F0
    pub fn voiced_count(&self) -> usize {
        self.values.iter().filter(|&&f| f > 0.0).count()
    }

    /// Share of voiced frames in [0, 1]; 0 for an empty contour
    pub fn voiced_fraction(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.voiced_count() as f32 / self.values.len() as f32
    }

    /// Mean F0 over voiced frames
    pub fn mean_voiced_f0(&self) -> Option<f32> {
        let voiced = self.voiced_values();
        if voiced.is_empty() {
            return None;
        }
        Some(voiced.iter().sum::<f32>() / voiced.len() as f32)
    }

    /// Median F0 over voiced frames (mean of the middle pair for even counts)
    pub fn median_voiced_f0(&self) -> Option<f32> {
        let mut voiced = self.voiced_values();
        if voiced.is_empty() {
            return None;
        }
        voiced.sort_by(|a, b| a.total_cmp(b));
        let mid = voiced.len() / 2;
        if voiced.len() % 2 == 0 {
            Some((voiced[mid - 1] + voiced[mid]) / 2.0)
        } else {
            Some(voiced[mid])
        }
    }

    /// Start time of each frame in seconds
    pub fn times(&self) -> Vec<f32> {
        if self.sample_rate == 0 {
            return vec![0.0; self.values.len()];
        }
        let step_seconds = self.frame_step as f32 / self.sample_rate as f32;
        (0..self.values.len())
            .map(|i| i as f32 * step_seconds)
            .collect()
    }

    /// `(time_seconds, f0_hz)` for every voiced frame
    pub fn voiced_points(&self) -> Vec<(f32, f32)> {
        self.times()
            .into_iter()
            .zip(self.values.iter().copied())
            .filter(|&(_, f)| f > 0.0)
            .collect()
    }

    /// Median-smooth the values in place
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if `window` is 0 or even.
    pub fn smooth(&mut self, window: usize) -> Result<(), AnalysisError> {
        self.values = median_smooth(&self.values, window)?;
        Ok(())
    }

    /// Zero every value outside `[f0_min, f0_max]`; returns the number zeroed
    pub fn gate(&mut self, f0_min: f32, f0_max: f32) -> usize {
        range_gate(&mut self.values, f0_min, f0_max)
    }

    /// Low-frequency spectrum of the contour up to `max_freq_hz`
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for a non-positive limit or frame rate.
    pub fn rhythm_spectrum(&self, max_freq_hz: f32) -> Result<RhythmSpectrum, AnalysisError> {
        rhythm_spectrum(&self.values, self.frame_rate, max_freq_hz)
    }

    fn voiced_values(&self) -> Vec<f32> {
        self.values.iter().copied().filter(|&f| f > 0.0).collect()
    }
}
