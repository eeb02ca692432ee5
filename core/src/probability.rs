//! Probability kernel.
//!
//! Pure functions over slices of `f64` used by every model in the workspace:
//! - `mean` / `median` / `standard_deviation` for score summaries
//! - `independent_union` for the likelihood construction
//! - `cosine` for vector similarity

/// Values closer than this to zero are treated as zero probability.
pub const PROBABILITY_EPSILON: f64 = 1e-5;

/// Arithmetic mean. Returns 0 for an empty slice.
///
/// # Example
/// ```
/// use granite_core::probability::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
/// assert_eq!(mean(&[]), 0.0);
/// ```
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Median of the values after sorting. Even-length input averages the two
/// middle values; empty input returns 0.
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n-1 divisor) around a precomputed mean.
/// Fewer than two values yield 0.
///
/// # Example
/// ```
/// use granite_core::probability::{mean, standard_deviation};
///
/// let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// let sd = standard_deviation(&xs, mean(&xs));
/// assert!((sd - 2.138).abs() < 1e-3);
/// ```
pub fn standard_deviation(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let variance = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    variance.sqrt()
}

/// Probability of the union of independent events: `1 - Π(1 - p)`.
///
/// An empty slice is the empty union, probability 0.
///
/// # Example
/// ```
/// use granite_core::probability::independent_union;
///
/// assert!((independent_union(&[0.5, 0.4, 0.6]) - 0.88).abs() < 1e-12);
/// ```
pub fn independent_union(ps: &[f64]) -> f64 {
    1.0 - ps.iter().map(|p| 1.0 - p).product::<f64>()
}

/// For every index `i`, the independent union of all probabilities except
/// `ps[i]`. Runs in linear time using prefix and suffix products.
///
/// # Example
/// ```
/// use granite_core::probability::{independent_union, independent_union_excluding};
///
/// let ps = [0.5, 0.4, 0.6];
/// let others = independent_union_excluding(&ps);
/// assert!((others[1] - independent_union(&[0.5, 0.6])).abs() < 1e-12);
/// ```
pub fn independent_union_excluding(ps: &[f64]) -> Vec<f64> {
    let n = ps.len();
    let mut suffix = vec![1.0; n + 1];
    for i in (0..n).rev() {
        suffix[i] = suffix[i + 1] * (1.0 - ps[i]);
    }
    let mut prefix = 1.0;
    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        result.push(1.0 - prefix * suffix[i + 1]);
        prefix *= 1.0 - ps[i];
    }
    result
}

/// Cosine similarity between two vectors of equal length.
///
/// Returns 0 when either vector is all zeros. Mismatched lengths compare over
/// the shorter prefix and count the tail toward the norms.
pub fn cosine(u: &[f64], v: &[f64]) -> f64 {
    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    let norm_u = u.iter().map(|a| a * a).sum::<f64>().sqrt();
    let norm_v = v.iter().map(|b| b * b).sum::<f64>().sqrt();
    if norm_u == 0.0 || norm_v == 0.0 {
        return 0.0;
    }
    dot / (norm_u * norm_v)
}

/// True when `p` is within [`PROBABILITY_EPSILON`] of zero.
pub fn is_negligible(p: f64) -> bool {
    p.abs() < PROBABILITY_EPSILON
}
