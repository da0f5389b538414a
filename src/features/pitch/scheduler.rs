//! Frame scheduling
//!
//! Derives the analysis geometry from a voice profile and sample rate:
//!
//! - `frame_length = round(fs * frame_length_factor / f0_min)`
//! - `offset_length = round(fs * offset_length_factor / f0_max)`
//! - `frame_step = round(frame_length * frame_skip_factor)`, falling back to
//!   `frame_length` when the step is below 1 or above a tenth of the signal
//!
//! Frame starts run `0, step, 2*step, ...` while `start + 2 * frame_length`
//! still fits in the signal: the reference frame and every lag-shifted
//! comparison window must lie inside it. Signals shorter than three frame
//! lengths get no frames at all.

use serde::{Deserialize, Serialize};

use super::profile::VoiceProfile;
use crate::error::AnalysisError;

/// A contiguous block of samples analysed as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// First sample index
    pub start: usize,
    /// Length in samples
    pub length: usize,
}

impl Frame {
    /// One past the last sample of the frame
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Frame geometry for one signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSchedule {
    /// Frame length in samples
    pub frame_length: usize,
    /// First candidate lag in samples
    pub offset_length: usize,
    /// Distance between consecutive frame starts in samples
    pub frame_step: usize,
    /// Unrounded frame duration in seconds
    pub frame_duration: f32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Length of the scheduled signal in samples
    pub signal_length: usize,
}

impl FrameSchedule {
    /// Build the schedule for a signal of `signal_length` samples
    ///
    /// # Errors
    ///
    /// - `SignalInputError` if `sample_rate` is 0
    /// - `ConfigurationError` if the profile is invalid or the derived lengths
    ///   break `frame_length > offset_length > 0`
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_pitch::VoiceProfile;
    /// use stratum_pitch::features::pitch::scheduler::FrameSchedule;
    ///
    /// let profile = VoiceProfile::preset("mid")?;
    /// let schedule = FrameSchedule::new(&profile, 16000, 16000)?;
    /// assert_eq!(schedule.frame_length, 147);
    /// assert_eq!(schedule.offset_length, 27);
    /// assert_eq!(schedule.frame_step, 29);
    /// # Ok::<(), stratum_pitch::AnalysisError>(())
    /// ```
    pub fn new(
        profile: &VoiceProfile,
        sample_rate: u32,
        signal_length: usize,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::SignalInputError(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        profile.validate()?;

        let fs = sample_rate as f64;
        let frame_length = samples_for(
            "Frame length",
            fs * profile.frame_length_factor as f64 / profile.f0_min as f64,
        )?;
        let offset_length = samples_for(
            "Lag offset",
            fs * profile.offset_length_factor as f64 / profile.f0_max as f64,
        )?;

        if offset_length == 0 {
            return Err(AnalysisError::ConfigurationError(format!(
                "Lag offset rounds to 0 samples at {} Hz (offset_length_factor={}, f0_max={})",
                sample_rate, profile.offset_length_factor, profile.f0_max
            )));
        }

        if frame_length <= offset_length {
            return Err(AnalysisError::ConfigurationError(format!(
                "Frame length ({}) must exceed lag offset ({}); no lags to search",
                frame_length, offset_length
            )));
        }

        let mut frame_step = (frame_length as f64 * profile.frame_skip_factor as f64).round() as usize;
        if frame_step < 1 || frame_step as f64 > signal_length as f64 / 10.0 {
            log::warn!(
                "Frame step {} out of range for {} samples, using frame length {}",
                frame_step,
                signal_length,
                frame_length
            );
            frame_step = frame_length;
        }

        let schedule = Self {
            frame_length,
            offset_length,
            frame_step,
            frame_duration: profile.frame_duration(),
            sample_rate,
            signal_length,
        };

        log::debug!(
            "Frame schedule: length={}, offset={}, step={}, {} frames over {} samples",
            frame_length,
            offset_length,
            frame_step,
            schedule.frame_count(),
            signal_length
        );

        Ok(schedule)
    }

    /// Number of frames that fit in the signal
    pub fn frame_count(&self) -> usize {
        let minimum = match self.frame_length.checked_mul(3) {
            Some(minimum) if self.signal_length >= minimum => minimum,
            _ => return 0,
        };
        let span = minimum - self.frame_length;
        (self.signal_length - span) / self.frame_step.max(1) + 1
    }

    /// Number of candidate lags per frame
    pub fn search_range(&self) -> usize {
        self.frame_length - self.offset_length
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.frame_step as f32
    }

    /// Frame start positions, in order
    ///
    /// Each call returns a fresh iterator over the same sequence.
    pub fn starts(&self) -> FrameStarts {
        FrameStarts {
            index: 0,
            count: self.frame_count(),
            step: self.frame_step,
        }
    }

    /// Frames, in order
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.starts().map(move |start| Frame {
            start,
            length: self.frame_length,
        })
    }
}

/// Largest frame or offset length, in samples, the scheduler accepts
///
/// Keeps `3 * frame_length` representable.
pub const MAX_FRAME_SAMPLES: usize = usize::MAX / 4;

/// Round a duration in samples, rejecting values that cannot index a signal
fn samples_for(what: &str, samples: f64) -> Result<usize, AnalysisError> {
    let rounded = samples.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded > MAX_FRAME_SAMPLES as f64 {
        return Err(AnalysisError::ConfigurationError(format!(
            "{} of {} samples is out of range (max {})",
            what, samples, MAX_FRAME_SAMPLES
        )));
    }
    Ok(rounded as usize)
}

/// Iterator over frame start positions
#[derive(Debug, Clone)]
pub struct FrameStarts {
    index: usize,
    count: usize,
    step: usize,
}

impl Iterator for FrameStarts {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.index >= self.count {
            return None;
        }
        let start = self.index * self.step;
        self.index += 1;
        Some(start)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameStarts {}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid() -> VoiceProfile {
        VoiceProfile::preset("mid").unwrap()
    }

    #[test]
    fn test_geometry_mid_16k() {
        let schedule = FrameSchedule::new(&mid(), 16000, 16000).unwrap();
        assert_eq!(schedule.frame_length, 147);
        assert_eq!(schedule.offset_length, 27);
        assert_eq!(schedule.frame_step, 29);
        assert_eq!(schedule.search_range(), 120);
        assert!((schedule.frame_rate() - 16000.0 / 29.0).abs() < 1e-3);
        assert!((schedule.frame_duration - 1.1 / 120.0).abs() < 1e-7);
    }

    #[test]
    fn test_short_signal_yields_no_frames() {
        // 3 * 147 - 1 samples
        let schedule = FrameSchedule::new(&mid(), 16000, 440).unwrap();
        assert_eq!(schedule.frame_count(), 0);
        assert_eq!(schedule.starts().count(), 0);

        let schedule = FrameSchedule::new(&mid(), 16000, 0).unwrap();
        assert_eq!(schedule.starts().count(), 0);
    }

    #[test]
    fn test_boundary_at_three_frames() {
        let schedule = FrameSchedule::new(&mid(), 16000, 441).unwrap();
        let starts: Vec<usize> = schedule.starts().collect();
        assert_eq!(starts, vec![0, 29, 58, 87, 116, 145]);
    }

    #[test]
    fn test_frames_within_bounds() {
        let len = 12345;
        let schedule = FrameSchedule::new(&mid(), 16000, len).unwrap();
        let starts: Vec<usize> = schedule.starts().collect();
        assert_eq!(starts.len(), schedule.frame_count());

        for &start in &starts {
            assert!(start + 2 * schedule.frame_length <= len);
        }

        // The next start would not fit
        let last = *starts.last().unwrap();
        assert!(last + schedule.frame_step + 2 * schedule.frame_length > len);
    }

    #[test]
    fn test_starts_restartable() {
        let schedule = FrameSchedule::new(&mid(), 16000, 8000).unwrap();
        let first: Vec<usize> = schedule.starts().collect();
        let second: Vec<usize> = schedule.starts().collect();
        assert_eq!(first, second);

        let mut iter = schedule.starts();
        iter.next();
        let resumed = iter.clone();
        assert_eq!(iter.collect::<Vec<_>>(), resumed.collect::<Vec<_>>());
        assert_eq!(schedule.starts().len(), schedule.frame_count());
    }

    #[test]
    fn test_step_fallback_when_too_small() {
        let mut profile = mid();
        profile.frame_skip_factor = 0.001;
        let schedule = FrameSchedule::new(&profile, 16000, 16000).unwrap();
        assert_eq!(schedule.frame_step, schedule.frame_length);
    }

    #[test]
    fn test_step_fallback_when_too_large() {
        let mut profile = mid();
        profile.frame_skip_factor = 0.9;
        // round(147 * 0.9) = 132 > 1000 / 10
        let schedule = FrameSchedule::new(&profile, 16000, 1000).unwrap();
        assert_eq!(schedule.frame_step, 147);
    }

    #[test]
    fn test_frames_carry_length() {
        let schedule = FrameSchedule::new(&mid(), 16000, 2000).unwrap();
        for frame in schedule.frames() {
            assert_eq!(frame.length, 147);
            assert_eq!(frame.end(), frame.start + 147);
        }
    }

    #[test]
    fn test_offset_rounds_to_zero() {
        let mut profile = mid();
        profile.offset_length_factor = 0.001;
        let result = FrameSchedule::new(&profile, 16000, 16000);
        assert!(matches!(result, Err(AnalysisError::ConfigurationError(_))));
    }

    #[test]
    fn test_frame_not_longer_than_offset() {
        let mut profile = mid();
        profile.frame_length_factor = 0.1;
        let result = FrameSchedule::new(&profile, 16000, 16000);
        assert!(matches!(result, Err(AnalysisError::ConfigurationError(_))));
    }

    #[test]
    fn test_zero_sample_rate() {
        let result = FrameSchedule::new(&mid(), 0, 16000);
        assert!(matches!(result, Err(AnalysisError::SignalInputError(_))));
    }

    #[test]
    fn test_tiny_f0_min_rejected() {
        let profile = VoiceProfile::custom(1e-20, 300.0);
        assert!(profile.validate().is_ok());

        let result = FrameSchedule::new(&profile, 16000, 16000);
        assert!(matches!(result, Err(AnalysisError::ConfigurationError(_))));
    }

    #[test]
    fn test_frame_count_never_overflows() {
        let schedule = FrameSchedule {
            frame_length: usize::MAX / 2,
            offset_length: 27,
            frame_step: 29,
            frame_duration: 1.0,
            sample_rate: 16000,
            signal_length: usize::MAX,
        };
        assert_eq!(schedule.frame_count(), 0);
        assert_eq!(schedule.starts().count(), 0);
    }
}
