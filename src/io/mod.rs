//! Audio I/O modules
//!
//! In-memory signal container and mono WAV loading using hound.

pub mod decoder;
pub mod signal;

pub use signal::RawSignal;
