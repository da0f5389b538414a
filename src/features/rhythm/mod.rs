//! Low-frequency rhythm analysis of F0 contours
//!
//! The F0 contour is itself a slowly varying signal sampled at the frame rate.
//! Its low-frequency spectrum shows the rate of pitch movement (syllable and
//! phrase rhythm).

pub mod peak_picking;
pub mod spectrum;

pub use spectrum::{rhythm_spectrum, RhythmSpectrum};
