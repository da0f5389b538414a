//! Immutable mono signal container

use crate::error::AnalysisError;

/// Mono waveform plus its sample rate
///
/// Built once per input and read-only afterwards. Integer PCM is scaled to
/// `[-1.0, 1.0]` on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl RawSignal {
    /// Wrap floating-point samples
    ///
    /// # Errors
    ///
    /// `SignalInputError` if `samples` is empty or `sample_rate` is 0.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::SignalInputError(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        if samples.is_empty() {
            return Err(AnalysisError::SignalInputError(
                "Empty audio samples".to_string(),
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build from 16-bit signed PCM
    pub fn from_i16(samples: &[i16], sample_rate: u32) -> Result<Self, AnalysisError> {
        let scale = 1.0 / 32_768.0;
        Self::new(
            samples.iter().map(|&s| s as f32 * scale).collect(),
            sample_rate,
        )
    }

    /// Build from signed integer PCM stored in `i32` with the given bit depth
    ///
    /// # Errors
    ///
    /// `SignalInputError` if `bits_per_sample` is not in `1..=32`, plus the
    /// checks of [`RawSignal::new`].
    pub fn from_i32(
        samples: &[i32],
        bits_per_sample: u16,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if bits_per_sample == 0 || bits_per_sample > 32 {
            return Err(AnalysisError::SignalInputError(format!(
                "Unsupported bit depth: {}",
                bits_per_sample
            )));
        }

        let full_scale = (1u64 << (bits_per_sample - 1)) as f64;
        Self::new(
            samples
                .iter()
                .map(|&s| (s as f64 / full_scale) as f32)
                .collect(),
            sample_rate,
        )
    }

    /// Samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_sample_rate() {
        let result = RawSignal::new(vec![0.1, 0.2], 0);
        assert!(matches!(result, Err(AnalysisError::SignalInputError(_))));
    }

    #[test]
    fn test_rejects_empty() {
        let result = RawSignal::new(vec![], 16000);
        assert!(matches!(result, Err(AnalysisError::SignalInputError(_))));
    }

    #[test]
    fn test_from_i16_scaling() {
        let signal = RawSignal::from_i16(&[0, 16384, -32768], 8000).unwrap();
        assert_eq!(signal.samples(), &[0.0, 0.5, -1.0]);
        assert_eq!(signal.sample_rate(), 8000);
    }

    #[test]
    fn test_from_i32_24bit() {
        let signal = RawSignal::from_i32(&[4_194_304, -8_388_608], 24, 48000).unwrap();
        assert!((signal.samples()[0] - 0.5).abs() < 1e-6);
        assert!((signal.samples()[1] + 1.0).abs() < 1e-6);

        assert!(RawSignal::from_i32(&[1], 0, 48000).is_err());
        assert!(RawSignal::from_i32(&[1], 33, 48000).is_err());
    }

    #[test]
    fn test_duration() {
        let signal = RawSignal::new(vec![0.0; 8000], 16000).unwrap();
        assert_eq!(signal.len(), 8000);
        assert!((signal.duration_seconds() - 0.5).abs() < 1e-6);
    }
}
