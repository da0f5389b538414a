//! Voice register profiles
//!
//! A profile bundles the expected F0 range with the three factors that size
//! the analysis frames. `f0_min` sets the frame length (the longest period
//! must fit in one frame); `f0_max` sets the lag offset (the shortest period
//! must not be skipped).

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Default frame length factor, relative to the period of `f0_min`
pub const DEFAULT_FRAME_LENGTH_FACTOR: f32 = 1.1;

/// Default frame skip factor, relative to the frame length
pub const DEFAULT_FRAME_SKIP_FACTOR: f32 = 0.2;

/// Default lag offset factor, relative to the period of `f0_max`
pub const DEFAULT_OFFSET_LENGTH_FACTOR: f32 = 0.5;

/// Names accepted by [`VoiceProfile::preset`]
pub const PRESET_NAMES: [&str; 8] = [
    "high",
    "fairlyhigh",
    "mid",
    "fairlylow",
    "low",
    "male",
    "female",
    "neutral",
];

/// Expected pitch range and frame sizing factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Preset name, or `"custom"`
    pub name: String,

    /// Lowest expected F0 in Hz
    pub f0_min: f32,

    /// Highest expected F0 in Hz
    pub f0_max: f32,

    /// Frame duration as a multiple of `1 / f0_min`
    pub frame_length_factor: f32,

    /// Frame step as a fraction of the frame length
    pub frame_skip_factor: f32,

    /// Lag offset duration as a multiple of `1 / f0_max`
    pub offset_length_factor: f32,
}

impl VoiceProfile {
    /// Custom profile with the default sizing factors
    pub fn custom(f0_min: f32, f0_max: f32) -> Self {
        Self {
            name: "custom".to_string(),
            f0_min,
            f0_max,
            frame_length_factor: DEFAULT_FRAME_LENGTH_FACTOR,
            frame_skip_factor: DEFAULT_FRAME_SKIP_FACTOR,
            offset_length_factor: DEFAULT_OFFSET_LENGTH_FACTOR,
        }
    }

    /// Named voice register preset
    ///
    /// | name | F0 range (Hz) |
    /// |---|---|
    /// | `high` | 160-450 |
    /// | `fairlyhigh` | 140-400 |
    /// | `mid` | 120-300 |
    /// | `fairlylow` | 120-350 |
    /// | `low` | 90-200 |
    /// | `male` | 100-300 |
    /// | `female` | 110-350 |
    /// | `neutral` | 70-420 |
    ///
    /// Names are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for an unknown name.
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_pitch::VoiceProfile;
    ///
    /// let mid = VoiceProfile::preset("mid")?;
    /// assert_eq!((mid.f0_min, mid.f0_max), (120.0, 300.0));
    /// assert!(VoiceProfile::preset("soprano").is_err());
    /// # Ok::<(), stratum_pitch::AnalysisError>(())
    /// ```
    pub fn preset(name: &str) -> Result<Self, AnalysisError> {
        let key = name.trim().to_ascii_lowercase();
        let (f0_min, f0_max) = match key.as_str() {
            "high" => (160.0, 450.0),
            "fairlyhigh" => (140.0, 400.0),
            "mid" => (120.0, 300.0),
            "fairlylow" => (120.0, 350.0),
            "low" => (90.0, 200.0),
            "male" => (100.0, 300.0),
            "female" => (110.0, 350.0),
            "neutral" => (70.0, 420.0),
            _ => {
                return Err(AnalysisError::ConfigurationError(format!(
                    "Unknown voice preset '{}' (expected one of: {})",
                    name,
                    PRESET_NAMES.join(", ")
                )))
            }
        };

        Ok(Self {
            name: key,
            ..Self::custom(f0_min, f0_max)
        })
    }

    /// Frame duration in seconds: `frame_length_factor / f0_min`
    pub fn frame_duration(&self) -> f32 {
        self.frame_length_factor / self.f0_min
    }

    /// Lag offset duration in seconds: `offset_length_factor / f0_max`
    pub fn offset_duration(&self) -> f32 {
        self.offset_length_factor / self.f0_max
    }

    /// Check the range and factors
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if any value is non-finite or non-positive, or if
    /// `f0_min >= f0_max`.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fields = [
            ("f0_min", self.f0_min),
            ("f0_max", self.f0_max),
            ("frame_length_factor", self.frame_length_factor),
            ("frame_skip_factor", self.frame_skip_factor),
            ("offset_length_factor", self.offset_length_factor),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::ConfigurationError(format!(
                    "{} must be a positive number, got {}",
                    field, value
                )));
            }
        }

        if self.f0_min >= self.f0_max {
            return Err(AnalysisError::ConfigurationError(format!(
                "Invalid F0 range: [{:.1}, {:.1}] Hz",
                self.f0_min, self.f0_max
            )));
        }

        Ok(())
    }
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            name: "mid".to_string(),
            ..Self::custom(120.0, 300.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_valid() {
        for name in PRESET_NAMES {
            let profile = VoiceProfile::preset(name).unwrap();
            assert_eq!(profile.name, name);
            profile.validate().unwrap();
        }
    }

    #[test]
    fn test_preset_case_insensitive() {
        let profile = VoiceProfile::preset(" Low ").unwrap();
        assert_eq!(profile.name, "low");
        assert_eq!((profile.f0_min, profile.f0_max), (90.0, 200.0));
    }

    #[test]
    fn test_unknown_preset() {
        let result = VoiceProfile::preset("baritone");
        assert!(matches!(result, Err(AnalysisError::ConfigurationError(_))));
    }

    #[test]
    fn test_default_is_mid() {
        assert_eq!(VoiceProfile::default(), VoiceProfile::preset("mid").unwrap());
    }

    #[test]
    fn test_inverted_range() {
        let profile = VoiceProfile::custom(300.0, 120.0);
        assert!(matches!(
            profile.validate(),
            Err(AnalysisError::ConfigurationError(_))
        ));

        let profile = VoiceProfile::custom(200.0, 200.0);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_non_positive_factors() {
        let mut profile = VoiceProfile::default();
        profile.frame_skip_factor = 0.0;
        assert!(profile.validate().is_err());

        let mut profile = VoiceProfile::default();
        profile.offset_length_factor = -0.5;
        assert!(profile.validate().is_err());

        let mut profile = VoiceProfile::default();
        profile.frame_length_factor = f32::NAN;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_durations() {
        let profile = VoiceProfile::preset("mid").unwrap();
        assert!((profile.frame_duration() - 1.1 / 120.0).abs() < 1e-7);
        assert!((profile.offset_duration() - 0.5 / 300.0).abs() < 1e-7);
    }
}
