//! Analysis results
//!
//! - F0 contour and its statistics
//! - Result and metadata types

pub mod contour;
pub mod metadata;
pub mod result;
