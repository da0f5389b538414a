//! Peak detection for 1D spectra
//!
//! Local maxima above a height threshold, thinned so that no two kept peaks
//! are closer than a minimum distance. The higher peak wins a conflict.

/// Find peaks in a signal
///
/// # Arguments
///
/// * `signal` - Values to search (e.g. a magnitude spectrum)
/// * `min_height` - Absolute minimum peak value
/// * `min_distance` - Minimum index distance between kept peaks (0 or 1 keeps all)
///
/// # Returns
///
/// `(index, value)` pairs sorted by value, highest first. Ties keep the lower
/// index first.
///
/// # Example
///
/// ```
/// use stratum_pitch::features::rhythm::peak_picking::find_peaks;
///
/// let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
/// let peaks = find_peaks(&signal, 0.5, 2);
/// assert_eq!(peaks, vec![(2, 1.0), (5, 0.9)]);
/// ```
pub fn find_peaks(signal: &[f32], min_height: f32, min_distance: usize) -> Vec<(usize, f32)> {
    if signal.len() < 3 {
        return vec![];
    }

    let last = signal.len() - 1;
    let mut candidates: Vec<(usize, f32)> = signal
        .iter()
        .enumerate()
        .filter(|&(i, &value)| {
            if !value.is_finite() || value < min_height {
                return false;
            }
            let above_left = i == 0 || value > signal[i - 1];
            let above_right = i == last || value > signal[i + 1];
            above_left && above_right
        })
        .map(|(i, &value)| (i, value))
        .collect();

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut peaks: Vec<(usize, f32)> = Vec::with_capacity(candidates.len());
    for (index, value) in candidates {
        let clear = peaks
            .iter()
            .all(|&(kept, _)| kept.abs_diff(index) >= min_distance);
        if clear {
            peaks.push((index, value));
        }
    }

    log::debug!(
        "Found {} peaks in {} values (min_height={:.3}, min_distance={})",
        peaks.len(),
        signal.len(),
        min_height,
        min_distance
    );

    peaks
}
