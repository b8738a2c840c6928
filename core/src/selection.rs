//! Control selection: the top-composite candidate per (trial store, metric).
//!
//! Tie-break policy: candidates arrive in ascending store-id order and the
//! comparison below is strict, so of several candidates sharing the maximum
//! composite the lowest store id wins. Deterministic by construction.

use crate::error::{EvalError, EvalResult};
use crate::scoring::SimilarityScore;
use crate::types::{Metric, StoreId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlAssignment {
    pub trial_store_id: StoreId,
    pub metric: Metric,
    pub control_store_id: StoreId,
    pub composite_score: f64,
}

/// Pick the control store for one (trial store, metric) pair.
pub fn select_control(
    trial_store: StoreId,
    metric: Metric,
    scores: &[SimilarityScore],
) -> EvalResult<ControlAssignment> {
    let mut best: Option<&SimilarityScore> = None;
    for score in scores {
        match best {
            Some(current) if score.composite() <= current.composite() => {}
            _ => best = Some(score),
        }
    }
    let best = best.ok_or_else(|| EvalError::InsufficientData {
        store_id: trial_store,
        metric,
        detail: "no scoreable control candidates".into(),
    })?;
    log::info!(
        "selection: trial {trial_store}/{metric}: control {} (composite {:.4})",
        best.store_id,
        best.composite()
    );
    Ok(ControlAssignment {
        trial_store_id: trial_store,
        metric,
        control_store_id: best.store_id,
        composite_score: best.composite(),
    })
}
