//! Signal conditioning
//!
//! This module contains utilities for preparing speech for pitch tracking:
//! - Peak normalization to [-1, 1]
//! - Centre and peak clipping
//! - Butterworth band-limiting

pub mod butterworth;
pub mod clipping;
pub mod normalization;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::RawSignal;

use clipping::{clip, ClipMode};
use normalization::normalize;

/// Output of the conditioning chain
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionedSignal {
    /// Normalized, clipped and band-limited samples for the lag search
    pub samples: Vec<f32>,

    /// Normalized and clipped samples before band-limiting
    /// (`None` when no band limit is configured)
    pub unfiltered: Option<Vec<f32>>,
}

impl ConditionedSignal {
    /// Samples the voicing decision is taken from
    ///
    /// Filter ringing carries energy into silent stretches, so the amplitude
    /// gate reads the signal before band-limiting.
    pub fn voicing_reference(&self) -> &[f32] {
        self.unfiltered.as_deref().unwrap_or(&self.samples)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Run the conditioning chain: normalize, centre clip, peak clip, band-limit
///
/// Works on copies; the input signal is left untouched. Each step that is
/// disabled in `config` (`None`) is skipped.
///
/// # Errors
///
/// `SignalInputError` for an empty, silent or non-finite signal, and the
/// filter design errors of [`butterworth::bandpass`].
pub fn condition(
    signal: &RawSignal,
    config: &AnalysisConfig,
) -> Result<ConditionedSignal, AnalysisError> {
    log::debug!(
        "Conditioning {} samples at {} Hz",
        signal.len(),
        signal.sample_rate()
    );

    let mut samples = signal.samples().to_vec();
    normalize(&mut samples)?;

    if let Some(threshold) = config.centre_clip {
        clip(&mut samples, threshold, ClipMode::Centre);
    }

    if let Some(threshold) = config.peak_clip {
        clip(&mut samples, threshold, ClipMode::Limit);
    }

    let unfiltered = match &config.band_limit {
        Some(band) => {
            let unfiltered = samples.clone();
            band.apply(&mut samples, signal.sample_rate())?;
            Some(unfiltered)
        }
        None => None,
    };

    Ok(ConditionedSignal {
        samples,
        unfiltered,
    })
}
