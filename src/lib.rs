//! # Stratum Pitch
//!
//! AMDF-based F0 (fundamental frequency) contour estimation for prosodic and
//! rhythm analysis of speech recordings.
//!
//! ## Features
//!
//! - **Signal conditioning**: peak normalization, centre/peak clipping,
//!   Butterworth band-limiting
//! - **Frame scheduling**: frame length, lag offset and step derived from a
//!   voice register profile
//! - **AMDF pitch tracking**: per-frame lag search, parallel over frames
//! - **Contour post-processing**: median smoothing and range gating
//! - **Rhythm spectrum**: low-frequency spectrum of the F0 contour
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_pitch::{analyze_pitch, load_wav, AnalysisConfig};
//!
//! let signal = load_wav("speech.wav")?;
//! let config = AnalysisConfig::for_profile("female")?;
//!
//! let analysis = analyze_pitch(&signal, &config)?;
//! println!(
//!     "{} frames at {:.1} frames/s, {:.0}% voiced",
//!     analysis.contour.len(),
//!     analysis.contour.frame_rate,
//!     analysis.contour.voiced_fraction() * 100.0
//! );
//! # Ok::<(), stratum_pitch::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! RawSignal → Conditioning → Frame Scheduling → AMDF → Smoothing/Gating → F0Contour
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

use rayon::prelude::*;

// Re-export main types
pub use analysis::contour::F0Contour;
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::result::PitchAnalysis;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::pitch::amdf::{DistanceMetric, FrameEstimate};
pub use features::pitch::profile::VoiceProfile;
pub use io::decoder::load_wav;
pub use io::RawSignal;

use features::pitch::scheduler::FrameSchedule;

/// Main analysis function
///
/// Conditions the signal, schedules frames, runs the AMDF lag search on every
/// frame, then median-smooths and range-gates the contour.
///
/// # Arguments
///
/// * `signal` - Mono speech signal
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `PitchAnalysis` with the F0 contour and run metadata. A signal shorter
/// than three frame lengths gives an empty contour, not an error.
///
/// # Errors
///
/// - `ConfigurationError` for invalid configuration
/// - `SignalInputError` for a silent or non-finite signal
/// - `InvalidCutoffError` if a band-limit cutoff is at or above Nyquist
///
/// # Example
///
/// ```
/// use stratum_pitch::{analyze_pitch, AnalysisConfig, RawSignal};
///
/// let samples: Vec<f32> = (0..16000)
///     .map(|i| (2.0 * std::f32::consts::PI * 200.0 * i as f32 / 16000.0).sin())
///     .collect();
/// let signal = RawSignal::new(samples, 16000)?;
///
/// let analysis = analyze_pitch(&signal, &AnalysisConfig::default())?;
/// let median = analysis.contour.median_voiced_f0().unwrap_or(0.0);
/// assert!((median - 200.0).abs() < 5.0);
/// # Ok::<(), stratum_pitch::AnalysisError>(())
/// ```
pub fn analyze_pitch(
    signal: &RawSignal,
    config: &AnalysisConfig,
) -> Result<PitchAnalysis, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting pitch analysis: {} samples at {} Hz, profile '{}' ({:.0}-{:.0} Hz)",
        signal.len(),
        signal.sample_rate(),
        config.profile.name,
        config.profile.f0_min,
        config.profile.f0_max
    );

    config.validate()?;

    // Conditioning
    let conditioned = preprocessing::condition(signal, config)?;

    // Frame scheduling
    let schedule = FrameSchedule::new(&config.profile, signal.sample_rate(), conditioned.len())?;
    if schedule.frame_count() == 0 {
        log::warn!(
            "Signal of {} samples is shorter than three frames ({} samples each); contour is empty",
            conditioned.len(),
            schedule.frame_length
        );
    }

    // Lag search on the band-limited signal, voicing gate before filtering
    let estimates = config.estimator().estimate_contour(
        &conditioned.samples,
        conditioned.voicing_reference(),
        &schedule,
        config.parallel,
    );
    let anomalous_frames = estimates.iter().filter(|e| e.is_anomaly()).count();
    let raw: Vec<f32> = estimates.iter().map(FrameEstimate::hz).collect();

    // Post-processing
    let mut contour = F0Contour::new(raw, &schedule);
    contour.smooth(config.median_window)?;
    let gated_frames = contour.gate(config.profile.f0_min, config.profile.f0_max);

    let mut metadata = AnalysisMetadata::for_schedule(&schedule, &config.profile.name);
    metadata.voiced_frames = contour.voiced_count();
    metadata.anomalous_frames = anomalous_frames;
    metadata.gated_frames = gated_frames;
    metadata.processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Pitch analysis complete: {} frames, {} voiced, {} anomalous, {} gated in {:.2} ms",
        contour.len(),
        metadata.voiced_frames,
        anomalous_frames,
        gated_frames,
        metadata.processing_time_ms
    );

    Ok(PitchAnalysis { contour, metadata })
}

/// Analyze several signals in parallel
///
/// Returns one result per input, in input order. A failing signal does not
/// affect the others.
pub fn analyze_batch(
    signals: &[RawSignal],
    config: &AnalysisConfig,
) -> Vec<Result<PitchAnalysis, AnalysisError>> {
    log::debug!("Starting batch analysis of {} signals", signals.len());

    signals
        .par_iter()
        .map(|signal| analyze_pitch(signal, config))
        .collect()
}
