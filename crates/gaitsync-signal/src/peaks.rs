//! Local extrema detection with minimum-distance pruning.
//!
//! A peak is a sample strictly greater than both neighbors. When two peaks
//! fall within `min_distance` samples of each other, the taller one wins;
//! pruning proceeds tallest-first so a dominant peak suppresses all of its
//! close neighbors before they can suppress anything themselves.

/// Indices of local maxima, at least `min_distance` samples apart.
///
/// Endpoints are never peaks. `min_distance == 0` is treated as 1 (no
/// pruning).
#[must_use]
pub fn find_peaks(signal: &[f64], min_distance: usize) -> Vec<usize> {
    let candidates = local_maxima(signal);
    enforce_distance(signal, candidates, min_distance.max(1))
}

/// Indices of local minima, at least `min_distance` samples apart.
///
/// The deepest valley wins ties, mirroring [`find_peaks`].
#[must_use]
pub fn find_valleys(signal: &[f64], min_distance: usize) -> Vec<usize> {
    let negated: Vec<f64> = signal.iter().map(|v| -v).collect();
    let candidates = local_maxima(&negated);
    enforce_distance(&negated, candidates, min_distance.max(1))
}

fn local_maxima(signal: &[f64]) -> Vec<usize> {
    if signal.len() < 3 {
        return Vec::new();
    }
    (1..signal.len() - 1)
        .filter(|&i| signal[i] > signal[i - 1] && signal[i] > signal[i + 1])
        .collect()
}

/// Keep candidates at least `min_distance` apart, tallest first.
fn enforce_distance(signal: &[f64], candidates: Vec<usize>, min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    let mut by_height: Vec<usize> = candidates.clone();
    by_height.sort_by(|&a, &b| {
        signal[b]
            .partial_cmp(&signal[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<usize> = Vec::with_capacity(candidates.len());
    for idx in by_height {
        if keep
            .iter()
            .all(|&k| idx.abs_diff(k) >= min_distance)
        {
            keep.push(idx);
        }
    }
    keep.sort_unstable();
    keep
}
