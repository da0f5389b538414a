//! Contour post-processing
//!
//! Median smoothing removes isolated octave jumps and single-frame dropouts;
//! the range gate zeroes estimates outside the expected F0 range. Both keep
//! the contour length, so frame `i` still maps to the same time.

use crate::error::AnalysisError;

/// Sliding median over the contour
///
/// The window is centred on each frame. Near the ends the window is padded
/// with the nearest voiced (non-zero) value found from that end of the
/// contour, or with 0 if the contour has no voiced frame. Padding with a
/// voiced value keeps short voiced runs at the edges from being erased.
///
/// # Arguments
///
/// * `contour` - F0 values in Hz, 0 for unvoiced frames
/// * `window` - Odd window length; 1 returns the contour unchanged
///
/// # Errors
///
/// `ConfigurationError` if `window` is 0 or even.
///
/// # Example
///
/// ```
/// use stratum_pitch::features::pitch::smoothing::median_smooth;
///
/// let smoothed = median_smooth(&[100.0, 100.0, 400.0, 100.0, 100.0], 3)?;
/// assert_eq!(smoothed, vec![100.0; 5]);
/// # Ok::<(), stratum_pitch::AnalysisError>(())
/// ```
pub fn median_smooth(contour: &[f32], window: usize) -> Result<Vec<f32>, AnalysisError> {
    if window == 0 || window % 2 == 0 {
        return Err(AnalysisError::ConfigurationError(format!(
            "Median window must be odd and positive, got {}",
            window
        )));
    }

    if window == 1 || contour.is_empty() {
        return Ok(contour.to_vec());
    }

    let half = window / 2;
    let head = contour.iter().copied().find(|&f| f != 0.0).unwrap_or(0.0);
    let tail = contour.iter().rev().copied().find(|&f| f != 0.0).unwrap_or(0.0);

    let mut padded = Vec::with_capacity(contour.len() + 2 * half);
    padded.extend(std::iter::repeat(head).take(half));
    padded.extend_from_slice(contour);
    padded.extend(std::iter::repeat(tail).take(half));

    let mut scratch = vec![0.0f32; window];
    let smoothed = padded
        .windows(window)
        .map(|w| {
            scratch.copy_from_slice(w);
            scratch.sort_by(|a, b| a.total_cmp(b));
            scratch[half]
        })
        .collect();

    Ok(smoothed)
}

/// Zero every value outside `[f0_min, f0_max]`
///
/// Zeros stay zero. Non-finite values are zeroed.
///
/// # Returns
///
/// Number of values that were zeroed
pub fn range_gate(contour: &mut [f32], f0_min: f32, f0_max: f32) -> usize {
    let mut gated = 0;
    for f0 in contour.iter_mut() {
        if *f0 != 0.0 && !(*f0 >= f0_min && *f0 <= f0_max) {
            *f0 = 0.0;
            gated += 1;
        }
    }

    if gated > 0 {
        log::debug!(
            "Range gate [{:.1}, {:.1}] Hz zeroed {} of {} frames",
            f0_min,
            f0_max,
            gated,
            contour.len()
        );
    }

    gated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_outlier_removed() {
        let contour = [150.0, 151.0, 300.0, 152.0, 150.0];
        let smoothed = median_smooth(&contour, 3).unwrap();
        assert_eq!(smoothed, vec![150.0, 151.0, 152.0, 152.0, 150.0]);
    }

    #[test]
    fn test_edge_padding_uses_voiced_values() {
        let smoothed = median_smooth(&[100.0, 0.0, 100.0, 100.0, 0.0], 5).unwrap();
        assert_eq!(smoothed, vec![100.0; 5]);
    }

    #[test]
    fn test_unvoiced_contour_stays_unvoiced() {
        let smoothed = median_smooth(&[0.0; 7], 5).unwrap();
        assert_eq!(smoothed, vec![0.0; 7]);
    }

    #[test]
    fn test_long_gap_survives() {
        let contour = [200.0, 200.0, 200.0, 0.0, 0.0, 0.0, 0.0, 200.0, 200.0, 200.0];
        let smoothed = median_smooth(&contour, 3).unwrap();
        assert_eq!(&smoothed[4..6], &[0.0, 0.0]);
        assert_eq!(smoothed.len(), contour.len());
    }

    #[test]
    fn test_window_one_is_identity() {
        let contour = [100.0, 0.0, 250.0];
        assert_eq!(median_smooth(&contour, 1).unwrap(), contour.to_vec());
    }

    #[test]
    fn test_window_longer_than_contour() {
        let smoothed = median_smooth(&[120.0, 130.0], 7).unwrap();
        assert_eq!(smoothed.len(), 2);
        assert!(smoothed.iter().all(|&f| f == 120.0 || f == 130.0));
    }

    #[test]
    fn test_constant_contour_is_fixed_point() {
        let contour = vec![180.0; 9];
        let once = median_smooth(&contour, 5).unwrap();
        let twice = median_smooth(&once, 5).unwrap();
        assert_eq!(once, contour);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_invalid_window() {
        assert!(matches!(
            median_smooth(&[1.0, 2.0], 0),
            Err(AnalysisError::ConfigurationError(_))
        ));
        assert!(matches!(
            median_smooth(&[1.0, 2.0], 4),
            Err(AnalysisError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_empty_contour() {
        assert!(median_smooth(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_range_gate() {
        let mut contour = vec![0.0, 80.0, 120.0, 200.0, 300.0, 301.0, f32::NAN];
        let gated = range_gate(&mut contour, 120.0, 300.0);
        assert_eq!(gated, 3);
        assert_eq!(contour, vec![0.0, 0.0, 120.0, 200.0, 300.0, 0.0, 0.0]);
    }
}
