//! Small descriptive-statistics helpers on `f64` slices.
//!
//! Sums are sequential so results are bit-reproducible for the same input.

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the two middle values for even lengths).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// `(min, max)` of a slice; `None` when empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut it = values.iter().copied();
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Ascending sort with NaNs treated as equal (callers pass cleaned data).
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Number of distinct values in a slice (exact comparison).
pub fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);
    let mut n = 0;
    let mut prev: Option<f64> = None;
    for v in sorted {
        if prev != Some(v) {
            n += 1;
            prev = Some(v);
        }
    }
    n
}

/// `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (steps as f64 - 1.0);
            (0..steps).map(|i| min + step * i as f64).collect()
        }
    }
}
