//! Error types for the pitch tracking engine
//!
//! Every variant is fatal for the signal being analysed. Per-frame problems
//! (a frame that cannot produce a period) are not errors: they are absorbed
//! as unvoiced frames, see [`crate::features::pitch::amdf::FrameAnomaly`].

use std::fmt;

/// Errors that can occur during pitch analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid configuration (unknown preset, bad F0 range, even median window, ...)
    ConfigurationError(String),

    /// Unusable input signal (empty, silent, non-finite, zero sample rate)
    SignalInputError(String),

    /// Band-limiting cutoff outside (0, Nyquist)
    InvalidCutoffError(String),

    /// Audio file could not be read
    DecodingError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AnalysisError::SignalInputError(msg) => write!(f, "Signal input error: {}", msg),
            AnalysisError::InvalidCutoffError(msg) => write!(f, "Invalid cutoff: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        AnalysisError::DecodingError(err.to_string())
    }
}
