//! Analysis result types

use serde::{Deserialize, Serialize};

use super::contour::F0Contour;
use super::metadata::AnalysisMetadata;

/// Complete pitch analysis of one signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchAnalysis {
    /// Smoothed and range-gated F0 contour
    pub contour: F0Contour,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}
