//! Orchestration: one parametrized evaluation path, run once per
//! (trial store, metric) pair.
//!
//! The unit of failure isolation is a single pair. A pair that cannot be
//! evaluated (no candidates, zero control mean, ...) is reported as skipped
//! with its reason; every other pair still runs.

use crate::aggregate::MetricTable;
use crate::config::EvalConfig;
use crate::counterfactual::{
    build_counterfactual, estimate_impact, scaling_factor, ImpactResult, ScaledCounterfactual,
};
use crate::error::EvalResult;
use crate::scoring::{score_candidates, SimilarityScore};
use crate::selection::{select_control, ControlAssignment};
use crate::types::{Metric, StoreId};
use serde::{Deserialize, Serialize};

/// Everything computed for one (trial store, metric) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialEvaluation {
    pub assignment: ControlAssignment,
    /// Every scoreable candidate, ascending store id.
    pub scores: Vec<SimilarityScore>,
    /// Scaled comparison over the full evaluation window (pre-trial +
    /// trial), so the baseline fit can be checked.
    pub counterfactual: Vec<ScaledCounterfactual>,
    /// Uplift over the trial window only.
    pub impact: ImpactResult,
}

/// Evaluate one trial store for one metric: score candidates, pick the
/// control, scale it, measure uplift.
pub fn evaluate_trial(
    table: &MetricTable,
    config: &EvalConfig,
    trial_store: StoreId,
    metric: Metric,
) -> EvalResult<TrialEvaluation> {
    let scores = score_candidates(table, config, trial_store, metric)?;
    let assignment = select_control(trial_store, metric, &scores)?;
    let control_store = assignment.control_store_id;

    let trial_pretrial = table.series_required(trial_store, metric, config.pre_trial)?;
    let control_pretrial = table.series_required(control_store, metric, config.pre_trial)?;
    let factor = scaling_factor(&trial_pretrial, &control_pretrial, control_store, metric)?;
    log::info!(
        "evaluate: trial {trial_store}/{metric}: scaling factor {factor:.4} against control {control_store}"
    );

    let full_window = config.evaluation_window();
    let trial_full = table.series_required(trial_store, metric, full_window)?;
    let control_full = table.series_required(control_store, metric, full_window)?;
    let counterfactual =
        build_counterfactual(&trial_full, &control_full, factor, config.band_half_width);

    let trial_window_rows: Vec<ScaledCounterfactual> = counterfactual
        .iter()
        .copied()
        .filter(|row| config.trial.contains(row.period))
        .collect();
    let impact = estimate_impact(trial_store, metric, control_store, factor, &trial_window_rows)?;

    Ok(TrialEvaluation {
        assignment,
        scores,
        counterfactual,
        impact,
    })
}

/// The outcome of one (trial store, metric) pair: an evaluation, or the
/// reason it was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialOutcome {
    Evaluated {
        trial_store_id: StoreId,
        metric: Metric,
        evaluation: TrialEvaluation,
    },
    Skipped {
        trial_store_id: StoreId,
        metric: Metric,
        reason: String,
    },
}

impl TrialOutcome {
    pub fn trial_store_id(&self) -> StoreId {
        match self {
            TrialOutcome::Evaluated { trial_store_id, .. }
            | TrialOutcome::Skipped { trial_store_id, .. } => *trial_store_id,
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            TrialOutcome::Evaluated { metric, .. } | TrialOutcome::Skipped { metric, .. } => {
                *metric
            }
        }
    }

    pub fn evaluation(&self) -> Option<&TrialEvaluation> {
        match self {
            TrialOutcome::Evaluated { evaluation, .. } => Some(evaluation),
            TrialOutcome::Skipped { .. } => None,
        }
    }
}

/// Run every configured trial store against every metric.
pub fn run_evaluation(table: &MetricTable, config: &EvalConfig) -> Vec<TrialOutcome> {
    let mut outcomes = Vec::new();
    for &trial_store in &config.trial_stores {
        for metric in Metric::ALL {
            match evaluate_trial(table, config, trial_store, metric) {
                Ok(evaluation) => outcomes.push(TrialOutcome::Evaluated {
                    trial_store_id: trial_store,
                    metric,
                    evaluation,
                }),
                Err(err) => {
                    log::warn!("evaluate: skipping trial {trial_store}/{metric}: {err}");
                    outcomes.push(TrialOutcome::Skipped {
                        trial_store_id: trial_store,
                        metric,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
    outcomes
}
