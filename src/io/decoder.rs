//! Mono WAV decoding using hound

use std::path::Path;

use super::signal::RawSignal;
use crate::error::AnalysisError;

/// Load a mono WAV file
///
/// Integer PCM of any bit depth is scaled to `[-1.0, 1.0]`; float WAV is
/// taken as-is.
///
/// # Errors
///
/// `DecodingError` if the file cannot be read or has more than one channel.
/// `SignalInputError` if it holds no samples.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<RawSignal, AnalysisError> {
    let path = path.as_ref();
    log::debug!("Decoding WAV file: {}", path.display());

    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(AnalysisError::DecodingError(format!(
            "Audio must be mono, got {} channels",
            spec.channels
        )));
    }

    let signal = match spec.sample_format {
        hound::SampleFormat::Float => {
            let samples = reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?;
            RawSignal::new(samples, spec.sample_rate)?
        }
        hound::SampleFormat::Int => {
            let samples = reader
                .samples::<i32>()
                .collect::<Result<Vec<_>, _>>()?;
            RawSignal::from_i32(&samples, spec.bits_per_sample, spec.sample_rate)?
        }
    };

    log::debug!(
        "Decoded {} samples at {} Hz ({:.2} s)",
        signal.len(),
        signal.sample_rate(),
        signal.duration_seconds()
    );

    Ok(signal)
}
