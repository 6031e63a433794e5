//! Probability blending
//!
//! Averages sets of distributions and blends two averages with a weight.

use crate::types::ProbDist;

/// Weight used when a caller passes one outside `[0, 1]`
pub const DEFAULT_WEIGHT: f64 = 0.5;

/// Label-wise arithmetic mean of `dists`.
///
/// A label missing from some distributions contributes nothing for them but
/// is still divided by the full count. An empty set averages to an empty
/// distribution.
pub fn arithmetic_average(dists: &[&ProbDist]) -> ProbDist {
    let mut total = ProbDist::new();
    if dists.is_empty() {
        return total;
    }

    for dist in dists {
        for (label, prob) in dist.iter() {
            total.accumulate(label, prob);
        }
    }

    total.scaled(1.0 / dists.len() as f64)
}

/// Blend the mean of `current` with the mean of `other`.
///
/// `weight` is the share given to `current`: each mean is scaled by `2k` and
/// `2(1 - k)` respectively, then the two are averaged label-wise. A weight
/// outside `[0, 1]` is replaced by [`DEFAULT_WEIGHT`].
pub fn collect_probs(current: &[&ProbDist], other: &[&ProbDist], weight: f64) -> ProbDist {
    let weight = if (0.0..=1.0).contains(&weight) {
        weight
    } else {
        DEFAULT_WEIGHT
    };

    let current_mean = arithmetic_average(current).scaled(2.0 * weight);
    let other_mean = arithmetic_average(other).scaled(2.0 * (1.0 - weight));

    arithmetic_average(&[&current_mean, &other_mean])
}
