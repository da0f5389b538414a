//! AMDF (Average Magnitude Difference Function) pitch estimation
//!
//! For every frame the reference block `signal[start..start + N]` is compared
//! against lag-shifted blocks `signal[start + L..start + L + N]` for each lag
//! `L` in `offset..N`. The lag with the smallest difference is the period
//! estimate, and `F0 = fs / period`.
//!
//! # Algorithm
//!
//! 1. Reference frame: `N = frame_length` samples starting at `frame_start`
//! 2. Difference function: `d[L - offset] = aggregate(|ref[k] - sig[start + L + k]|)`
//! 3. Best lag: first minimum of `d` in scan order (smallest lag wins ties)
//! 4. Period: `best_index + offset`
//! 5. F0: `fs / period`, or 0 when the period is 0
//!
//! The lag offset skips the trivial self-match near lag 0. Because ties go to
//! the smallest lag, a frame whose difference function dips to the same depth
//! at one and two periods reports the higher frequency.
//!
//! # Reference
//!
//! Ross, M. J., Shaffer, H. L., Cohen, A., Freudberg, R., & Manley, H. J. (1974).
//! Average magnitude difference function pitch extractor.
//! *IEEE Transactions on Acoustics, Speech, and Signal Processing*, 22(5), 353-362.
//!
//! # Performance
//!
//! Each frame costs `O(search_range * frame_length)`. Frames only read the
//! conditioned signal, so [`AmdfEstimator::estimate_contour`] can spread them
//! over the rayon thread pool.
//!
//! # Example
//!
//! ```
//! use stratum_pitch::features::pitch::amdf::estimate_frame_f0;
//!
//! // Exactly periodic 200 Hz tone at 16 kHz (80 samples per period)
//! let period: Vec<f32> = (0..80)
//!     .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 80.0).sin())
//!     .collect();
//! let signal: Vec<f32> = (0..1600).map(|i| period[i % 80]).collect();
//!
//! let f0 = estimate_frame_f0(&signal, 0, 147, 27, 16000);
//! assert_eq!(f0, 200.0);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::scheduler::{Frame, FrameSchedule};
use crate::preprocessing::normalization::peak_magnitude;

/// Aggregate applied to the per-sample differences of one lag
///
/// All variants are non-negative and preserve the ordering of lags for a
/// given frame length, so `MeanAbsolute` and `SumAbsolute` always pick the
/// same lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Mean of absolute differences (classic AMDF)
    #[default]
    MeanAbsolute,
    /// Sum of absolute differences
    SumAbsolute,
    /// Sum of squared differences (ASDF)
    SumSquared,
}

impl DistanceMetric {
    /// Distance between two equally long blocks
    #[inline]
    pub fn distance(self, reference: &[f32], window: &[f32]) -> f32 {
        match self {
            DistanceMetric::MeanAbsolute => {
                sum_abs_diff(reference, window) / reference.len().max(1) as f32
            }
            DistanceMetric::SumAbsolute => sum_abs_diff(reference, window),
            DistanceMetric::SumSquared => reference
                .iter()
                .zip(window)
                .map(|(&a, &b)| {
                    let d = a - b;
                    d * d
                })
                .sum(),
        }
    }
}

#[inline]
fn sum_abs_diff(reference: &[f32], window: &[f32]) -> f32 {
    reference
        .iter()
        .zip(window)
        .map(|(&a, &b)| (a - b).abs())
        .sum()
}

/// Why a frame could not produce a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameAnomaly {
    /// Reference frame plus lag window runs past the end of the signal
    OutOfBounds,
    /// `frame_length <= offset_length`, no lag to search
    EmptySearchRange,
    /// NaN or infinity in the difference function
    NonFinite,
    /// Every lag scored the same (e.g. an all-zero frame)
    FlatDifference,
}

/// Outcome of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameEstimate {
    /// Periodicity found, F0 in Hz
    Voiced(f32),
    /// Below the amplitude gate, or zero period
    Unvoiced,
    /// Degenerate frame, absorbed as unvoiced
    Anomaly(FrameAnomaly),
}

impl FrameEstimate {
    /// F0 in Hz; 0.0 unless voiced
    pub fn hz(&self) -> f32 {
        match self {
            FrameEstimate::Voiced(hz) => *hz,
            FrameEstimate::Unvoiced | FrameEstimate::Anomaly(_) => 0.0,
        }
    }

    /// True for `Voiced`
    pub fn is_voiced(&self) -> bool {
        matches!(self, FrameEstimate::Voiced(_))
    }

    /// True for `Anomaly`
    pub fn is_anomaly(&self) -> bool {
        matches!(self, FrameEstimate::Anomaly(_))
    }
}

/// Check that a frame and all of its lag windows fit in `signal_len` samples
fn check_geometry(
    signal_len: usize,
    frame_start: usize,
    frame_length: usize,
    offset_length: usize,
) -> Result<(), FrameAnomaly> {
    if frame_length <= offset_length {
        return Err(FrameAnomaly::EmptySearchRange);
    }

    // Last window starts at frame_start + frame_length - 1
    let required = frame_length
        .checked_mul(2)
        .and_then(|span| frame_start.checked_add(span - 1))
        .ok_or(FrameAnomaly::OutOfBounds)?;
    if required > signal_len {
        return Err(FrameAnomaly::OutOfBounds);
    }

    Ok(())
}

/// Compute the difference function of one frame
///
/// Returns one value per lag in `offset_length..frame_length`.
///
/// # Errors
///
/// `EmptySearchRange` if `frame_length <= offset_length`; `OutOfBounds` if the
/// last comparison window does not fit in `signal`.
pub fn difference_function(
    signal: &[f32],
    frame_start: usize,
    frame_length: usize,
    offset_length: usize,
    metric: DistanceMetric,
) -> Result<Vec<f32>, FrameAnomaly> {
    check_geometry(signal.len(), frame_start, frame_length, offset_length)?;

    let reference = &signal[frame_start..frame_start + frame_length];

    let diffs = (offset_length..frame_length)
        .map(|lag| {
            let window_start = frame_start + lag;
            metric.distance(reference, &signal[window_start..window_start + frame_length])
        })
        .collect();

    Ok(diffs)
}

/// Index of the first minimum, scanning from the smallest lag
///
/// Returns `None` for an empty slice. NaN values never win.
pub fn best_lag_index(diffs: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in diffs.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        // Strict comparison keeps the first minimum
        if best.map_or(true, |(_, best_value)| value < best_value) {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}

/// Configurable per-frame AMDF estimator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmdfEstimator {
    /// Difference aggregate
    pub metric: DistanceMetric,

    /// Reference frames whose peak magnitude is below this are unvoiced
    /// (0.0 disables the gate)
    pub silence_threshold: f32,
}

impl AmdfEstimator {
    /// Estimator with the given metric and amplitude gate
    pub fn new(metric: DistanceMetric, silence_threshold: f32) -> Self {
        Self {
            metric,
            silence_threshold,
        }
    }

    /// Estimate F0 for one frame, gating on the same signal
    ///
    /// Never panics on bad geometry: frames that cannot be analysed come back
    /// as [`FrameEstimate::Anomaly`].
    pub fn estimate_frame(
        &self,
        signal: &[f32],
        frame: Frame,
        offset_length: usize,
        sample_rate: u32,
    ) -> FrameEstimate {
        self.estimate_gated_frame(signal, signal, frame, offset_length, sample_rate)
    }

    /// Estimate F0 for one frame, taking the amplitude gate from `voicing`
    ///
    /// `voicing` is sample-aligned with `signal` (e.g. the signal before
    /// band-limiting). The lag search runs on `signal`. If `voicing` is too
    /// short for the frame, the gate reads `signal`.
    pub fn estimate_gated_frame(
        &self,
        signal: &[f32],
        voicing: &[f32],
        frame: Frame,
        offset_length: usize,
        sample_rate: u32,
    ) -> FrameEstimate {
        let estimate = self.estimate_frame_inner(signal, voicing, frame, offset_length, sample_rate);
        if let FrameEstimate::Anomaly(anomaly) = estimate {
            log::trace!("Frame at {}: {:?}", frame.start, anomaly);
        }
        estimate
    }

    fn estimate_frame_inner(
        &self,
        signal: &[f32],
        voicing: &[f32],
        frame: Frame,
        offset_length: usize,
        sample_rate: u32,
    ) -> FrameEstimate {
        if let Err(anomaly) = check_geometry(signal.len(), frame.start, frame.length, offset_length) {
            return FrameEstimate::Anomaly(anomaly);
        }

        if self.silence_threshold > 0.0 {
            let reference = voicing
                .get(frame.start..frame.end())
                .unwrap_or(&signal[frame.start..frame.end()]);
            if peak_magnitude(reference) < self.silence_threshold {
                return FrameEstimate::Unvoiced;
            }
        }

        let diffs = match difference_function(
            signal,
            frame.start,
            frame.length,
            offset_length,
            self.metric,
        ) {
            Ok(diffs) => diffs,
            Err(anomaly) => return FrameEstimate::Anomaly(anomaly),
        };

        if diffs.iter().any(|d| !d.is_finite()) {
            return FrameEstimate::Anomaly(FrameAnomaly::NonFinite);
        }

        let min = diffs.iter().copied().fold(f32::INFINITY, f32::min);
        let max = diffs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if max <= min {
            return FrameEstimate::Anomaly(FrameAnomaly::FlatDifference);
        }

        let best_index = match best_lag_index(&diffs) {
            Some(index) => index,
            None => return FrameEstimate::Anomaly(FrameAnomaly::EmptySearchRange),
        };

        let period = best_index + offset_length;
        if period == 0 || sample_rate == 0 {
            return FrameEstimate::Unvoiced;
        }

        FrameEstimate::Voiced(sample_rate as f32 / period as f32)
    }

    /// Estimate every scheduled frame, in frame order
    ///
    /// The lag search runs on `signal` and the amplitude gate on `voicing`
    /// (pass `signal` twice to gate on the searched signal). With `parallel`
    /// set the frames are spread over the rayon thread pool; the result is
    /// identical to the sequential run.
    pub fn estimate_contour(
        &self,
        signal: &[f32],
        voicing: &[f32],
        schedule: &FrameSchedule,
        parallel: bool,
    ) -> Vec<FrameEstimate> {
        log::debug!(
            "Estimating {} frames ({} lags each, {:?}, parallel={})",
            schedule.frame_count(),
            schedule.search_range(),
            self.metric,
            parallel
        );

        let frames: Vec<Frame> = schedule.frames().collect();
        let estimate = |&frame: &Frame| {
            self.estimate_gated_frame(
                signal,
                voicing,
                frame,
                schedule.offset_length,
                schedule.sample_rate,
            )
        };

        let estimates: Vec<FrameEstimate> = if parallel {
            frames.par_iter().map(estimate).collect()
        } else {
            frames.iter().map(estimate).collect()
        };

        let anomalies = estimates.iter().filter(|e| e.is_anomaly()).count();
        if anomalies > 0 {
            log::debug!("{} of {} frames were degenerate", anomalies, estimates.len());
        }

        estimates
    }
}

/// Estimate F0 for one frame with the mean-absolute AMDF and no amplitude gate
///
/// Returns 0.0 for frames that cannot be analysed (out of bounds, no lags,
/// flat or non-finite difference function). A constant frame, zero or not,
/// has a flat difference function and therefore gives 0.0.
pub fn estimate_frame_f0(
    signal: &[f32],
    frame_start: usize,
    frame_length: usize,
    offset_length: usize,
    sample_rate: u32,
) -> f32 {
    AmdfEstimator::default()
        .estimate_frame(
            signal,
            Frame {
                start: frame_start,
                length: frame_length,
            },
            offset_length,
            sample_rate,
        )
        .hz()
}
