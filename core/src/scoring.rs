//! Candidate scoring: how alike is a candidate store's pre-trial behaviour
//! to a trial store's?
//!
//! Two independent similarity measures per metric:
//!   - correlation score: Pearson r over the aligned series, mapped from
//!     [-1, 1] to [0, 1] via (r + 1) / 2;
//!   - magnitude score: 1 - mad / (mad + 1) where mad is the mean absolute
//!     difference of aligned values, so identical series score 1 and the
//!     score falls toward 0 as the gap grows without bound.
//!
//! Composite = arithmetic mean of the two. Each metric is scored on its
//! own; the best sales match need not be the best customer-count match.

use crate::aggregate::MetricTable;
use crate::config::EvalConfig;
use crate::error::{EvalError, EvalResult};
use crate::types::{Metric, Period, StoreId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub store_id: StoreId,
    pub metric: Metric,
    pub correlation_score: f64,
    pub magnitude_score: f64,
}

impl SimilarityScore {
    pub fn composite(&self) -> f64 {
        (self.correlation_score + self.magnitude_score) / 2.0
    }
}

/// Inner-join two period-indexed series on period, in the first series'
/// period order.
pub fn align(a: &[(Period, f64)], b: &[(Period, f64)]) -> Vec<(f64, f64)> {
    let lookup: HashMap<Period, f64> = b.iter().copied().collect();
    a.iter()
        .filter_map(|(period, va)| lookup.get(period).map(|vb| (*va, *vb)))
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    sum / n as f64
}

/// Pearson r over aligned pairs. Errors name the candidate being scored.
fn pearson(pairs: &[(f64, f64)], candidate: StoreId, metric: Metric) -> EvalResult<f64> {
    if pairs.len() < 2 {
        return Err(EvalError::InsufficientData {
            store_id: candidate,
            metric,
            detail: format!("{} overlapping period(s), need at least 2", pairs.len()),
        });
    }
    let mean_x = mean(pairs.iter().map(|(x, _)| *x));
    let mean_y = mean(pairs.iter().map(|(_, y)| *y));
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        // A flat series has no defined correlation with anything.
        return Err(EvalError::DegenerateSeries {
            store_id: candidate,
            metric,
            periods: pairs.len(),
        });
    }
    // The 1/n factors in covariance and variance cancel in the ratio.
    Ok(cov / (var_x * var_y).sqrt())
}

/// Pearson r mapped onto [0, 1].
pub fn correlation_score(
    pairs: &[(f64, f64)],
    candidate: StoreId,
    metric: Metric,
) -> EvalResult<f64> {
    Ok((pearson(pairs, candidate, metric)? + 1.0) / 2.0)
}

/// Bounded similarity from the mean absolute difference of aligned values.
/// 1 iff the series match exactly; approaches 0 as the gap grows.
pub fn magnitude_score(pairs: &[(f64, f64)]) -> f64 {
    let mad = mean(pairs.iter().map(|(x, y)| (x - y).abs()));
    1.0 - mad / (mad + 1.0)
}

/// Score every eligible candidate against one trial store for one metric
/// over the pre-trial window.
///
/// Candidates are all stores in the table except every configured trial
/// store. A candidate whose scoring errors (too little overlap, flat
/// series) is logged and skipped; it never aborts the rest of the pool.
/// The result is in ascending store-id order.
pub fn score_candidates(
    table: &MetricTable,
    config: &EvalConfig,
    trial_store: StoreId,
    metric: Metric,
) -> EvalResult<Vec<SimilarityScore>> {
    let trial_series = table.series_required(trial_store, metric, config.pre_trial)?;
    if trial_series.len() < 2 {
        return Err(EvalError::InsufficientData {
            store_id: trial_store,
            metric,
            detail: format!(
                "trial store has {} pre-trial period(s), need at least 2",
                trial_series.len()
            ),
        });
    }

    let mut scores = Vec::new();
    for candidate in table.stores() {
        if config.trial_stores.contains(&candidate) {
            continue;
        }
        let candidate_series = table.series(candidate, metric, config.pre_trial);
        let pairs = align(&trial_series, &candidate_series);
        let correlation = match correlation_score(&pairs, candidate, metric) {
            Ok(score) => score,
            Err(err) => {
                log::warn!("scoring: skipping candidate {candidate} for trial {trial_store}/{metric}: {err}");
                continue;
            }
        };
        scores.push(SimilarityScore {
            store_id: candidate,
            metric,
            correlation_score: correlation,
            magnitude_score: magnitude_score(&pairs),
        });
    }
    log::debug!(
        "scoring: trial {trial_store}/{metric}: {} candidate(s) scored",
        scores.len()
    );
    Ok(scores)
}
