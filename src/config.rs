//! Configuration parameters for pitch analysis

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::pitch::amdf::{AmdfEstimator, DistanceMetric};
use crate::features::pitch::profile::VoiceProfile;
use crate::preprocessing::butterworth::BandLimitConfig;

/// Analysis configuration parameters
///
/// Every run receives its configuration explicitly; there are no global
/// defaults to mutate.
///
/// # Example
///
/// ```
/// use stratum_pitch::AnalysisConfig;
///
/// let config = AnalysisConfig::for_profile("female")?;
/// assert_eq!(config.profile.f0_max, 350.0);
/// config.validate()?;
/// # Ok::<(), stratum_pitch::AnalysisError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // Pitch range and frame sizing
    /// Voice register profile (default: "mid", 120-300 Hz)
    pub profile: VoiceProfile,

    // Conditioning
    /// Centre clip threshold as a fraction of full scale (default: 0.1)
    /// Samples at or below it are zeroed; `None` disables
    pub centre_clip: Option<f32>,

    /// Peak clip threshold as a fraction of full scale (default: 0.9)
    /// Samples at or above it are zeroed; `None` disables
    pub peak_clip: Option<f32>,

    /// Band-limiting filters (default: around the profile's F0 range)
    pub band_limit: Option<BandLimitConfig>,

    // Lag search
    /// Difference function aggregate (default: MeanAbsolute)
    pub metric: DistanceMetric,

    /// Reference frames with a peak below this are unvoiced (default: 0.01)
    /// 0.0 disables the gate
    pub silence_threshold: f32,

    /// Run the frame loop on the rayon thread pool (default: true)
    pub parallel: bool,

    // Post-processing
    /// Median smoothing window in frames, odd (default: 5)
    /// 1 disables smoothing
    pub median_window: usize,
}

impl AnalysisConfig {
    /// Defaults for a named voice preset
    ///
    /// The band limit follows the preset's F0 range.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for an unknown preset name.
    pub fn for_profile(name: &str) -> Result<Self, AnalysisError> {
        Ok(Self::with_profile(VoiceProfile::preset(name)?))
    }

    /// Defaults around a given profile
    pub fn with_profile(profile: VoiceProfile) -> Self {
        Self {
            band_limit: Some(BandLimitConfig::for_profile(&profile)),
            profile,
            ..Self::default()
        }
    }

    /// Per-frame estimator for this configuration
    pub fn estimator(&self) -> AmdfEstimator {
        AmdfEstimator::new(self.metric, self.silence_threshold)
    }

    /// Check every parameter that does not depend on the signal
    ///
    /// Filter cutoffs are checked against Nyquist when the signal's sample
    /// rate is known.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` describing the first invalid parameter.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.profile.validate()?;

        for (field, value) in [("centre_clip", self.centre_clip), ("peak_clip", self.peak_clip)] {
            if let Some(fraction) = value {
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(AnalysisError::ConfigurationError(format!(
                        "{} must be within [0, 1], got {}",
                        field, fraction
                    )));
                }
            }
        }

        if self.median_window == 0 || self.median_window % 2 == 0 {
            return Err(AnalysisError::ConfigurationError(format!(
                "Median window must be odd and positive, got {}",
                self.median_window
            )));
        }

        if !self.silence_threshold.is_finite() || self.silence_threshold < 0.0 {
            return Err(AnalysisError::ConfigurationError(format!(
                "Silence threshold must be a non-negative number, got {}",
                self.silence_threshold
            )));
        }

        if let Some(band) = &self.band_limit {
            if band.low_order == 0 || band.high_order == 0 {
                return Err(AnalysisError::ConfigurationError(
                    "Band-limit filter order must be at least 1".to_string(),
                ));
            }
            if band.low_cut_hz >= band.high_cut_hz {
                return Err(AnalysisError::ConfigurationError(format!(
                    "Empty pass band: low cut {:.1} Hz >= high cut {:.1} Hz",
                    band.low_cut_hz, band.high_cut_hz
                )));
            }
        }

        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let profile = VoiceProfile::default();
        Self {
            band_limit: Some(BandLimitConfig::for_profile(&profile)),
            profile,
            centre_clip: Some(0.1),
            peak_clip: Some(0.9),
            metric: DistanceMetric::MeanAbsolute,
            silence_threshold: 0.01,
            parallel: true,
            median_window: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        assert_eq!(config.profile.name, "mid");
        assert_eq!(config.band_limit, Some(BandLimitConfig::for_range(120.0, 300.0)));
    }

    #[test]
    fn test_for_profile_follows_range() {
        let config = AnalysisConfig::for_profile("low").unwrap();
        let band = config.band_limit.unwrap();
        assert_eq!((band.low_cut_hz, band.high_cut_hz), (90.0, 200.0));

        assert!(matches!(
            AnalysisConfig::for_profile("tenor"),
            Err(AnalysisError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_invalid_clip_fraction() {
        let config = AnalysisConfig {
            centre_clip: Some(1.5),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::ConfigurationError(_))
        ));

        let config = AnalysisConfig {
            peak_clip: Some(-0.1),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_median_window() {
        for window in [0, 2, 6] {
            let config = AnalysisConfig {
                median_window: window,
                ..AnalysisConfig::default()
            };
            assert!(config.validate().is_err(), "window {} accepted", window);
        }
    }

    #[test]
    fn test_invalid_band_limit() {
        let config = AnalysisConfig {
            band_limit: Some(BandLimitConfig {
                low_cut_hz: 300.0,
                low_order: 5,
                high_cut_hz: 120.0,
                high_order: 2,
            }),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            band_limit: Some(BandLimitConfig {
                low_order: 0,
                ..BandLimitConfig::for_range(120.0, 300.0)
            }),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_silence_threshold() {
        let config = AnalysisConfig {
            silence_threshold: -0.1,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_profile() {
        let config = AnalysisConfig::with_profile(VoiceProfile::custom(300.0, 100.0));
        assert!(config.validate().is_err());
    }
}
