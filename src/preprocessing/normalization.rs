//! Amplitude normalization
//!
//! Scales a signal to `[-1.0, 1.0]` by dividing by its peak magnitude, so
//! the clip thresholds downstream can be expressed as fractions of full
//! scale.
//!
//! # Example
//!
//! ```
//! use stratum_pitch::preprocessing::normalization::normalize;
//!
//! let mut samples = vec![0.25f32, -0.5, 0.1];
//! let peak = normalize(&mut samples)?;
//! assert_eq!(peak, 0.5);
//! assert_eq!(samples, vec![0.5, -1.0, 0.2]);
//! # Ok::<(), stratum_pitch::AnalysisError>(())
//! ```

use crate::error::AnalysisError;

/// Peak magnitude of a signal (0.0 for an empty slice)
pub fn peak_magnitude(samples: &[f32]) -> f32 {
    samples.iter().map(|&x| x.abs()).fold(0.0f32, f32::max)
}

/// Normalize samples in place to `[-1.0, 1.0]`
///
/// # Arguments
///
/// * `samples` - Audio samples (modified in place)
///
/// # Returns
///
/// The peak magnitude that was divided out
///
/// # Errors
///
/// Returns `SignalInputError` if:
/// - `samples` is empty
/// - any sample is NaN or infinite
/// - every sample is zero (nothing to scale by)
pub fn normalize(samples: &mut [f32]) -> Result<f32, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::SignalInputError(
            "Empty audio samples".to_string(),
        ));
    }

    if let Some(pos) = samples.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::SignalInputError(format!(
            "Non-finite sample at index {}",
            pos
        )));
    }

    let peak = peak_magnitude(samples);

    if peak == 0.0 {
        return Err(AnalysisError::SignalInputError(
            "Signal is entirely silent, cannot normalize".to_string(),
        ));
    }

    for sample in samples.iter_mut() {
        *sample /= peak;
    }

    log::debug!(
        "Peak normalization: {} samples, peak={:.6} ({:.2} dBFS)",
        samples.len(),
        peak,
        20.0 * peak.log10()
    );

    Ok(peak)
}
