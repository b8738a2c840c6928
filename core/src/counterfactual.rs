//! Counterfactual scaling and trial-impact estimation.
//!
//! The scaling factor aligns the control store's absolute level to the
//! trial store's over the pre-trial baseline. The scaled series is built
//! for the entire evaluation window, not just the trial months, so the
//! quality of the pre-trial fit is visible before the trial-window
//! projection is trusted.
//!
//! The band around the scaled series is a fixed ±`band_half_width`
//! fraction of each scaled value. A deliberate simplification, not a
//! statistical confidence interval.

use crate::error::{EvalError, EvalResult};
use crate::types::{Metric, Period, StoreId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Denominators with absolute value below this are treated as zero.
pub const NEAR_ZERO: f64 = 1e-9;

/// One period of the scaled comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledCounterfactual {
    pub period: Period,
    pub trial_value: f64,
    pub scaled_control_value: f64,
    pub lower_band: f64,
    pub upper_band: f64,
}

/// One trial-window period of measured uplift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodImpact {
    pub period: Period,
    pub trial_value: f64,
    pub scaled_control_value: f64,
    pub percentage_diff: f64,
    pub absolute_diff: f64,
}

/// Uplift of one trial store versus its scaled control, for one metric.
///
/// `total_percentage_diff` — the headline figure — is computed from the
/// trial-window sums, not by averaging the per-period percentages;
/// `avg_percentage_diff` carries that mean as a secondary figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub trial_store_id: StoreId,
    pub metric: Metric,
    pub control_store_id: StoreId,
    pub scaling_factor: f64,
    pub periods: Vec<PeriodImpact>,
    pub total_trial: f64,
    pub total_scaled_control: f64,
    pub total_absolute_diff: f64,
    pub total_percentage_diff: f64,
    pub avg_percentage_diff: f64,
}

/// Pre-trial mean(trial) / pre-trial mean(control), with the control mean
/// guarded against a zero denominator.
pub fn scaling_factor(
    trial_pretrial: &[(Period, f64)],
    control_pretrial: &[(Period, f64)],
    control_store: StoreId,
    metric: Metric,
) -> EvalResult<f64> {
    let trial_mean = series_mean(trial_pretrial);
    let control_mean = series_mean(control_pretrial);
    if control_mean.abs() < NEAR_ZERO {
        return Err(EvalError::ZeroDenominator {
            store_id: control_store,
            metric,
            context: "pre-trial control mean while deriving the scaling factor".into(),
        });
    }
    Ok(trial_mean / control_mean)
}

fn series_mean(series: &[(Period, f64)]) -> f64 {
    series.iter().map(|(_, v)| v).sum::<f64>() / series.len() as f64
}

/// Scale the control series and join it to the trial series, per period.
/// Periods present in only one of the two series are dropped.
pub fn build_counterfactual(
    trial_series: &[(Period, f64)],
    control_series: &[(Period, f64)],
    factor: f64,
    band_half_width: f64,
) -> Vec<ScaledCounterfactual> {
    let trial: HashMap<Period, f64> = trial_series.iter().copied().collect();
    control_series
        .iter()
        .filter_map(|(period, raw_control)| {
            trial.get(period).map(|trial_value| {
                let scaled = raw_control * factor;
                ScaledCounterfactual {
                    period: *period,
                    trial_value: *trial_value,
                    scaled_control_value: scaled,
                    lower_band: scaled * (1.0 - band_half_width),
                    upper_band: scaled * (1.0 + band_half_width),
                }
            })
        })
        .collect()
}

/// Per-period and aggregate uplift over the trial-window slice of the
/// counterfactual.
///
/// Each period's scaled control value is guarded individually: a zero
/// scaled value makes that period's percentage undefined, and that is an
/// error for this (trial, metric) pair, not an infinity in a report.
pub fn estimate_impact(
    trial_store_id: StoreId,
    metric: Metric,
    control_store_id: StoreId,
    factor: f64,
    trial_window_rows: &[ScaledCounterfactual],
) -> EvalResult<ImpactResult> {
    if trial_window_rows.is_empty() {
        return Err(EvalError::InsufficientData {
            store_id: trial_store_id,
            metric,
            detail: "no overlapping periods in the trial window".into(),
        });
    }

    let mut periods = Vec::with_capacity(trial_window_rows.len());
    let mut total_trial = 0.0;
    let mut total_scaled_control = 0.0;
    for row in trial_window_rows {
        if row.scaled_control_value.abs() < NEAR_ZERO {
            return Err(EvalError::ZeroDenominator {
                store_id: control_store_id,
                metric,
                context: format!("scaled control value for period {}", row.period),
            });
        }
        let absolute_diff = row.trial_value - row.scaled_control_value;
        periods.push(PeriodImpact {
            period: row.period,
            trial_value: row.trial_value,
            scaled_control_value: row.scaled_control_value,
            percentage_diff: absolute_diff / row.scaled_control_value * 100.0,
            absolute_diff,
        });
        total_trial += row.trial_value;
        total_scaled_control += row.scaled_control_value;
    }

    let total_absolute_diff = total_trial - total_scaled_control;
    let avg_percentage_diff =
        periods.iter().map(|p| p.percentage_diff).sum::<f64>() / periods.len() as f64;

    Ok(ImpactResult {
        trial_store_id,
        metric,
        control_store_id,
        scaling_factor: factor,
        total_percentage_diff: total_absolute_diff / total_scaled_control * 100.0,
        total_trial,
        total_scaled_control,
        total_absolute_diff,
        avg_percentage_diff,
        periods,
    })
}
