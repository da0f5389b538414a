//! Centre and peak clipping
//!
//! Clipping here zeroes samples rather than saturating them. Zeroed samples
//! keep their position so the signal length and time axis are unchanged.

use serde::{Deserialize, Serialize};

/// Which samples a clip pass zeroes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipMode {
    /// Zero samples with `|x| <= threshold` (low-level noise between speech units)
    Centre,
    /// Zero samples with `|x| >= threshold`
    Limit,
    /// Zero samples with `x < threshold` (signed)
    Lower,
    /// Zero samples with `x > threshold` (signed)
    Upper,
}

impl ClipMode {
    #[inline]
    fn zeroes(self, x: f32, threshold: f32) -> bool {
        match self {
            ClipMode::Centre => x.abs() <= threshold,
            ClipMode::Limit => x.abs() >= threshold,
            ClipMode::Lower => x < threshold,
            ClipMode::Upper => x > threshold,
        }
    }
}

/// Clip samples in place
///
/// # Arguments
///
/// * `samples` - Audio samples (modified in place)
/// * `threshold` - Clip threshold, in the same units as the samples
/// * `mode` - Which side of the threshold is zeroed
///
/// # Returns
///
/// Number of samples that were zeroed
///
/// # Example
///
/// ```
/// use stratum_pitch::preprocessing::clipping::{clip, ClipMode};
///
/// let mut samples = vec![0.05f32, -0.5, 0.95, -0.02];
/// clip(&mut samples, 0.1, ClipMode::Centre);
/// assert_eq!(samples, vec![0.0, -0.5, 0.95, 0.0]);
/// ```
pub fn clip(samples: &mut [f32], threshold: f32, mode: ClipMode) -> usize {
    let mut zeroed = 0;
    for sample in samples.iter_mut() {
        if mode.zeroes(*sample, threshold) {
            *sample = 0.0;
            zeroed += 1;
        }
    }

    log::debug!(
        "{:?} clipping at {:.3}: zeroed {} of {} samples",
        mode,
        threshold,
        zeroed,
        samples.len()
    );

    zeroed
}
