//! Butterworth band-limiting filters
//!
//! Digital Butterworth low-pass and high-pass filters designed with the
//! bilinear transform. The analog prototype poles are grouped into conjugate
//! pairs, each pair becoming one second-order section; odd orders add one
//! first-order section for the real pole. The cutoff is pre-warped so the
//! -3 dB point lands exactly on the requested frequency.
//!
//! Filtering is causal (single forward pass), so the output is delayed
//! relative to the input. For pitch tracking only the period matters, not the
//! phase, so this is acceptable.
//!
//! # Example
//!
//! ```
//! use stratum_pitch::preprocessing::butterworth::bandpass;
//!
//! let mut samples: Vec<f32> = (0..16000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 200.0 * i as f32 / 16000.0).sin())
//!     .collect();
//! bandpass(&mut samples, 16000, 120.0, 300.0, 5, 2)?;
//! # Ok::<(), stratum_pitch::AnalysisError>(())
//! ```

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::pitch::profile::VoiceProfile;

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Pass frequencies below the cutoff
    LowPass,
    /// Pass frequencies above the cutoff
    HighPass,
}

/// One biquad section in Direct Form II transposed
///
/// First-order sections use `b2 = a2 = 0`.
#[derive(Debug, Clone)]
struct Section {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Section {
    fn second_order(kind: FilterKind, k: f64, q_inv: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k * q_inv + k2);
        let (b0, b1, b2) = match kind {
            FilterKind::LowPass => (k2 * norm, 2.0 * k2 * norm, k2 * norm),
            FilterKind::HighPass => (norm, -2.0 * norm, norm),
        };

        Self {
            b0,
            b1,
            b2,
            a1: 2.0 * (k2 - 1.0) * norm,
            a2: (1.0 - k * q_inv + k2) * norm,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn first_order(kind: FilterKind, k: f64) -> Self {
        let norm = 1.0 / (1.0 + k);
        let (b0, b1) = match kind {
            FilterKind::LowPass => (k * norm, k * norm),
            FilterKind::HighPass => (norm, -norm),
        };

        Self {
            b0,
            b1,
            b2: 0.0,
            a1: (k - 1.0) * norm,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x + self.z2 - self.a1 * y;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = Complex64::new(self.b0, 0.0) + z_inv * self.b1 + z_inv2 * self.b2;
        let den = Complex64::new(1.0, 0.0) + z_inv * self.a1 + z_inv2 * self.a2;
        num / den
    }
}

/// Digital Butterworth filter as a cascade of sections
///
/// Coefficients and state are kept in `f64`: low cutoffs relative to the
/// sample rate put the poles close to the unit circle.
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    kind: FilterKind,
    order: usize,
    cutoff_hz: f32,
    sample_rate: u32,
    sections: Vec<Section>,
}

impl ButterworthFilter {
    /// Design a Butterworth filter
    ///
    /// # Errors
    ///
    /// - `SignalInputError` if `sample_rate` is 0
    /// - `ConfigurationError` if `order` is 0
    /// - `InvalidCutoffError` if `cutoff_hz` is not in `(0, sample_rate / 2)`
    pub fn new(
        kind: FilterKind,
        order: usize,
        cutoff_hz: f32,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::SignalInputError(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        if order == 0 {
            return Err(AnalysisError::ConfigurationError(
                "Filter order must be >= 1".to_string(),
            ));
        }

        let nyquist = sample_rate as f32 / 2.0;
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
            return Err(AnalysisError::InvalidCutoffError(format!(
                "{:?} cutoff {:.1} Hz must lie in (0, {:.1}) Hz (Nyquist)",
                kind, cutoff_hz, nyquist
            )));
        }

        // Pre-warped analog cutoff
        let k = (PI * cutoff_hz as f64 / sample_rate as f64).tan();

        let mut sections = Vec::with_capacity(order.div_ceil(2));
        for i in 0..order / 2 {
            let theta = PI * (2 * i + 1) as f64 / (2 * order) as f64;
            sections.push(Section::second_order(kind, k, 2.0 * theta.sin()));
        }
        if order % 2 == 1 {
            sections.push(Section::first_order(kind, k));
        }

        log::debug!(
            "Designed {:?} Butterworth: order={}, cutoff={:.1} Hz, fs={} Hz, {} sections",
            kind,
            order,
            cutoff_hz,
            sample_rate,
            sections.len()
        );

        Ok(Self {
            kind,
            order,
            cutoff_hz,
            sample_rate,
            sections,
        })
    }

    /// Low-pass filter
    pub fn lowpass(order: usize, cutoff_hz: f32, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(FilterKind::LowPass, order, cutoff_hz, sample_rate)
    }

    /// High-pass filter
    pub fn highpass(order: usize, cutoff_hz: f32, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(FilterKind::HighPass, order, cutoff_hz, sample_rate)
    }

    /// Filter response
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Filter order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Cutoff (-3 dB) frequency in Hz
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Process a single sample through the cascade
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut y = sample as f64;
        for section in &mut self.sections {
            y = section.process(y);
        }
        y as f32
    }

    /// Filter a buffer in place
    pub fn apply(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the filter state
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Magnitude response `|H(e^jw)|` at `freq_hz`
    pub fn magnitude_at(&self, freq_hz: f32) -> f32 {
        let w = 2.0 * PI * freq_hz as f64 / self.sample_rate as f64;
        let z_inv = Complex64::new(w.cos(), -w.sin());
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm() as f32
    }
}

/// Band-limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandLimitConfig {
    /// High-pass cutoff in Hz
    pub low_cut_hz: f32,
    /// High-pass order
    pub low_order: usize,
    /// Low-pass cutoff in Hz
    pub high_cut_hz: f32,
    /// Low-pass order
    pub high_order: usize,
}

impl BandLimitConfig {
    /// Band around an expected F0 range: high-pass at `f0_min` (order 5),
    /// low-pass at `f0_max` (order 2)
    pub fn for_range(f0_min: f32, f0_max: f32) -> Self {
        Self {
            low_cut_hz: f0_min,
            low_order: 5,
            high_cut_hz: f0_max,
            high_order: 2,
        }
    }

    /// [`BandLimitConfig::for_range`] over a profile's F0 range
    pub fn for_profile(profile: &VoiceProfile) -> Self {
        Self::for_range(profile.f0_min, profile.f0_max)
    }

    /// Apply the band limit in place
    pub fn apply(&self, samples: &mut [f32], sample_rate: u32) -> Result<(), AnalysisError> {
        bandpass(
            samples,
            sample_rate,
            self.low_cut_hz,
            self.high_cut_hz,
            self.low_order,
            self.high_order,
        )
    }
}

/// Band-limit a signal in place: low-pass at `high_cut_hz`, then high-pass at
/// `low_cut_hz`
///
/// # Errors
///
/// - `InvalidCutoffError` if either cutoff is not in `(0, Nyquist)`
/// - `ConfigurationError` if an order is 0 or `low_cut_hz >= high_cut_hz`
/// - `SignalInputError` if `sample_rate` is 0
pub fn bandpass(
    samples: &mut [f32],
    sample_rate: u32,
    low_cut_hz: f32,
    high_cut_hz: f32,
    low_order: usize,
    high_order: usize,
) -> Result<(), AnalysisError> {
    let mut lowpass = ButterworthFilter::lowpass(high_order, high_cut_hz, sample_rate)?;
    let mut highpass = ButterworthFilter::highpass(low_order, low_cut_hz, sample_rate)?;

    if low_cut_hz >= high_cut_hz {
        return Err(AnalysisError::ConfigurationError(format!(
            "Empty pass band: low cut {:.1} Hz >= high cut {:.1} Hz",
            low_cut_hz, high_cut_hz
        )));
    }

    log::debug!(
        "Band-limiting {} samples: {:?} order {} at {:.1} Hz, then {:?} order {} at {:.1} Hz",
        samples.len(),
        lowpass.kind(),
        lowpass.order(),
        lowpass.cutoff_hz(),
        highpass.kind(),
        highpass.order(),
        highpass.cutoff_hz()
    );

    lowpass.apply(samples);
    highpass.apply(samples);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, length: usize) -> Vec<f32> {
        (0..length)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn steady_state_peak(samples: &[f32], skip: usize) -> f32 {
        samples[skip..].iter().map(|x| x.abs()).fold(0.0f32, f32::max)
    }

    #[test]
    fn test_section_count() {
        assert_eq!(ButterworthFilter::lowpass(1, 300.0, 16000).unwrap().sections.len(), 1);
        assert_eq!(ButterworthFilter::lowpass(2, 300.0, 16000).unwrap().sections.len(), 1);
        assert_eq!(ButterworthFilter::highpass(5, 240.0, 16000).unwrap().sections.len(), 3);
    }

    #[test]
    fn test_minus_3db_at_cutoff() {
        for order in 1..=6 {
            let lp = ButterworthFilter::lowpass(order, 300.0, 16000).unwrap();
            let hp = ButterworthFilter::highpass(order, 300.0, 16000).unwrap();
            let expected = std::f32::consts::FRAC_1_SQRT_2;
            assert!(
                (lp.magnitude_at(300.0) - expected).abs() < 1e-3,
                "order {} low-pass: {:.4}",
                order,
                lp.magnitude_at(300.0)
            );
            assert!((hp.magnitude_at(300.0) - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_unity_gain_in_passband() {
        let lp = ButterworthFilter::lowpass(2, 300.0, 16000).unwrap();
        assert!((lp.magnitude_at(0.0) - 1.0).abs() < 1e-6);

        let hp = ButterworthFilter::highpass(5, 240.0, 16000).unwrap();
        assert!((hp.magnitude_at(8000.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lowpass_attenuates_high_tone() {
        let mut lp = ButterworthFilter::lowpass(2, 300.0, 16000).unwrap();
        let mut samples = sine(3000.0, 16000, 16000);
        lp.apply(&mut samples);

        let peak = steady_state_peak(&samples, 1000);
        assert!(peak < 0.05, "3 kHz tone should be attenuated, peak={:.4}", peak);
    }

    #[test]
    fn test_lowpass_passes_low_tone() {
        let mut lp = ButterworthFilter::lowpass(2, 300.0, 16000).unwrap();
        let mut samples = sine(100.0, 16000, 16000);
        lp.apply(&mut samples);

        let peak = steady_state_peak(&samples, 4000);
        assert!(peak > 0.9 && peak < 1.1, "100 Hz tone should pass, peak={:.4}", peak);
    }

    #[test]
    fn test_highpass_attenuates_low_tone() {
        let mut hp = ButterworthFilter::highpass(5, 240.0, 16000).unwrap();
        let mut samples = sine(50.0, 16000, 16000);
        hp.apply(&mut samples);

        let peak = steady_state_peak(&samples, 4000);
        assert!(peak < 0.01, "50 Hz tone should be attenuated, peak={:.5}", peak);
    }

    #[test]
    fn test_output_finite() {
        let mut hp = ButterworthFilter::highpass(8, 70.0, 44100).unwrap();
        let mut samples = sine(440.0, 44100, 44100);
        hp.apply(&mut samples);
        assert!(samples.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_reset() {
        let mut lp = ButterworthFilter::lowpass(3, 500.0, 16000).unwrap();
        let first = lp.process(1.0);
        lp.process(0.5);
        lp.reset();
        assert_eq!(lp.process(1.0), first);
    }

    #[test]
    fn test_cutoff_at_or_above_nyquist() {
        let result = ButterworthFilter::lowpass(2, 8000.0, 16000);
        assert!(matches!(result, Err(AnalysisError::InvalidCutoffError(_))));

        let mut samples = vec![0.0f32; 100];
        let result = bandpass(&mut samples, 16000, 100.0, 9000.0, 2, 2);
        assert!(matches!(result, Err(AnalysisError::InvalidCutoffError(_))));

        let result = bandpass(&mut samples, 16000, 8000.0, 300.0, 2, 2);
        assert!(matches!(result, Err(AnalysisError::InvalidCutoffError(_))));
    }

    #[test]
    fn test_invalid_band() {
        let mut samples = vec![0.0f32; 100];
        assert!(matches!(
            bandpass(&mut samples, 16000, 300.0, 120.0, 2, 2),
            Err(AnalysisError::ConfigurationError(_))
        ));
        assert!(matches!(
            bandpass(&mut samples, 16000, 120.0, 300.0, 0, 2),
            Err(AnalysisError::ConfigurationError(_))
        ));
        assert!(matches!(
            bandpass(&mut samples, 16000, 0.0, 300.0, 2, 2),
            Err(AnalysisError::InvalidCutoffError(_))
        ));
    }

    #[test]
    fn test_band_limit_config() {
        let config = BandLimitConfig::for_range(120.0, 300.0);
        assert_eq!(config.low_cut_hz, 120.0);
        assert_eq!(config.high_cut_hz, 300.0);

        let mut samples = sine(200.0, 16000, 8000);
        config.apply(&mut samples, 16000).unwrap();
        assert_eq!(samples.len(), 8000);
        assert!(steady_state_peak(&samples, 4000) > 0.3);
    }
}
