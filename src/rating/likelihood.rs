//! Probability and log-likelihood of rankings under fixed strengths.
//!
//! The "remaining" set at position `p` of a ranking is the suffix
//! `ranking[p..]`. Denominators are summed from scratch over that suffix at
//! every position instead of being maintained by subtraction, so long rankings
//! do not accumulate drift.
//!
//! Callers are expected to have validated the rankings against the length of
//! `strengths`.

use ndarray::Array1;

use super::types::{ItemId, Strengths};

/// Probability of a single ranking. Length 0 or 1 gives 1.0.
pub fn ranking_probability(strengths: &Strengths, ranking: &[ItemId]) -> f64 {
    choice_positions(ranking)
        .map(|pos| {
            let item = ranking[pos];
            strengths[item] / remaining_sum(strengths, &ranking[pos..])
        })
        .product()
}

/// Log-probability of a single ranking, accumulated in log space.
pub fn ranking_log_probability(strengths: &Strengths, ranking: &[ItemId]) -> f64 {
    choice_positions(ranking)
        .map(|pos| {
            let item = ranking[pos];
            strengths[item].ln() - remaining_sum(strengths, &ranking[pos..]).ln()
        })
        .sum()
}

pub fn log_likelihood<R: AsRef<[ItemId]>>(strengths: &Strengths, rankings: &[R]) -> f64 {
    rankings
        .iter()
        .map(|ranking| ranking_log_probability(strengths, ranking.as_ref()))
        .sum()
}

/// Gradient of the log-likelihood with respect to each strength.
pub fn log_likelihood_gradient<R: AsRef<[ItemId]>>(
    strengths: &Strengths,
    rankings: &[R],
) -> Array1<f64> {
    let mut gradient = Array1::<f64>::zeros(strengths.len());

    for ranking in rankings {
        let ranking = ranking.as_ref();
        for pos in choice_positions(ranking) {
            let chosen = ranking[pos];
            let suffix = &ranking[pos..];
            let denominator = remaining_sum(strengths, suffix);

            gradient[chosen] += 1.0 / strengths[chosen];
            for &item in suffix {
                gradient[item] -= 1.0 / denominator;
            }
        }
    }

    gradient
}

pub(crate) fn remaining_sum(strengths: &Strengths, remaining: &[ItemId]) -> f64 {
    remaining.iter().map(|&item| strengths[item]).sum()
}

/// Every position except the terminal one, whose factor is always 1.
pub(crate) fn choice_positions(ranking: &[ItemId]) -> std::ops::Range<usize> {
    0..ranking.len().saturating_sub(1)
}
