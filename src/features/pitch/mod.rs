//! F0 (pitch) tracking
//!
//! - Voice register profiles
//! - Frame scheduling
//! - AMDF lag search
//! - Contour smoothing and range gating

pub mod amdf;
pub mod profile;
pub mod scheduler;
pub mod smoothing;

pub use amdf::{AmdfEstimator, DistanceMetric, FrameAnomaly, FrameEstimate};
pub use profile::VoiceProfile;
pub use scheduler::{Frame, FrameSchedule};
