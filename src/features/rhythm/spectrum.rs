//! Low-frequency (FM rhythm) spectrum of an F0 contour
//!
//! # Algorithm
//!
//! 1. FFT of the contour as sampled at the frame rate (unvoiced frames are 0)
//! 2. Magnitude per bin, `freq = bin * frame_rate / n`
//! 3. Drop the DC bin and every bin above `max_freq_hz`
//! 4. Scale so the strongest remaining bin is 1.0
//!
//! Speech rhythm lives below roughly 5 Hz, so only that end of the spectrum is
//! of interest.
//!
//! # Example
//!
//! ```
//! use stratum_pitch::features::rhythm::rhythm_spectrum;
//!
//! // 2 Hz pitch movement around 200 Hz, 100 frames/s for 4 s
//! let contour: Vec<f32> = (0..400)
//!     .map(|i| 200.0 + 20.0 * (2.0 * std::f32::consts::PI * 2.0 * i as f32 / 100.0).sin())
//!     .collect();
//!
//! let spectrum = rhythm_spectrum(&contour, 100.0, 5.0)?;
//! let (freq, magnitude) = spectrum.top_peaks(1)[0];
//! assert!((freq - 2.0).abs() < 1e-3);
//! assert_eq!(magnitude, 1.0);
//! # Ok::<(), stratum_pitch::AnalysisError>(())
//! ```

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use super::peak_picking::find_peaks;
use crate::error::AnalysisError;

/// Shortest contour that gets a spectrum
const MIN_CONTOUR_FRAMES: usize = 4;

/// Scaled magnitude spectrum of a contour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RhythmSpectrum {
    /// Bin frequencies in Hz, ascending, DC excluded
    pub frequencies: Vec<f32>,

    /// Magnitudes scaled to a maximum of 1.0
    pub magnitudes: Vec<f32>,
}

impl RhythmSpectrum {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True when there are no bins
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Up to `count` strongest spectral peaks as `(freq_hz, magnitude)`,
    /// strongest first
    pub fn top_peaks(&self, count: usize) -> Vec<(f32, f32)> {
        find_peaks(&self.magnitudes, 0.0, 1)
            .into_iter()
            .take(count)
            .map(|(bin, magnitude)| (self.frequencies[bin], magnitude))
            .collect()
    }

    /// Magnitudes with every value at or below `limit` set to 0
    pub fn above(&self, limit: f32) -> Vec<f32> {
        self.magnitudes
            .iter()
            .map(|&m| if m <= limit { 0.0 } else { m })
            .collect()
    }
}

/// Compute the low-frequency spectrum of an F0 contour
///
/// # Arguments
///
/// * `contour` - F0 values in Hz, one per frame, 0 for unvoiced frames
/// * `frame_rate` - Contour sample rate in frames per second
/// * `max_freq_hz` - Highest rhythm frequency to keep
///
/// # Returns
///
/// The scaled spectrum. Contours shorter than 4 frames, or without any voiced
/// frame, give an empty spectrum.
///
/// # Errors
///
/// `ConfigurationError` if `frame_rate` or `max_freq_hz` is not a positive
/// number.
pub fn rhythm_spectrum(
    contour: &[f32],
    frame_rate: f32,
    max_freq_hz: f32,
) -> Result<RhythmSpectrum, AnalysisError> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(AnalysisError::ConfigurationError(format!(
            "Invalid frame rate: {}",
            frame_rate
        )));
    }

    if !max_freq_hz.is_finite() || max_freq_hz <= 0.0 {
        return Err(AnalysisError::ConfigurationError(format!(
            "Invalid rhythm frequency limit: {}",
            max_freq_hz
        )));
    }

    let n = contour.len();
    if n < MIN_CONTOUR_FRAMES || contour.iter().all(|&f| f == 0.0) {
        log::debug!("Contour of {} frames has no rhythm spectrum", n);
        return Ok(RhythmSpectrum::default());
    }

    log::debug!(
        "Computing rhythm spectrum: {} frames at {:.2} frames/s, up to {:.1} Hz",
        n,
        frame_rate,
        max_freq_hz
    );

    let mut buffer: Vec<Complex<f32>> = contour.iter().map(|&f| Complex::new(f, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let resolution = frame_rate / n as f32;
    let last_bin = ((max_freq_hz / resolution).floor() as usize).min(n / 2);
    if last_bin == 0 {
        return Ok(RhythmSpectrum::default());
    }

    let mut magnitudes: Vec<f32> = buffer[1..=last_bin].iter().map(|c| c.norm()).collect();
    let frequencies: Vec<f32> = (1..=last_bin).map(|bin| bin as f32 * resolution).collect();

    let max = magnitudes.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for m in magnitudes.iter_mut() {
            *m /= max;
        }
    }

    Ok(RhythmSpectrum {
        frequencies,
        magnitudes,
    })
}
