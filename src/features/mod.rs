//! Feature extraction modules
//!
//! - Pitch tracking (AMDF F0 contour)
//! - Rhythm spectrum of the F0 contour

pub mod pitch;
pub mod rhythm;
