//! Evaluation configuration.
//!
//! Every date boundary and tuning constant of the evaluation lives here
//! rather than as a literal inside the pipeline. The defaults reproduce the
//! canonical scanner-data trial: pre-trial July 2018 through January 2019,
//! trial February through April 2019, trial stores 77, 86 and 88.

use crate::error::{EvalError, EvalResult};
use crate::types::{Period, PeriodWindow, StoreId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Baseline months used for similarity scoring and the scaling factor.
    pub pre_trial: PeriodWindow,
    /// Months during which the intervention ran; impact is measured here.
    pub trial: PeriodWindow,
    /// Stores subjected to the intervention. Each gets its own control
    /// selection; all of them are excluded from every candidate pool.
    pub trial_stores: Vec<StoreId>,
    /// A store must have exactly this many distinct months of data to be
    /// considered at all, as trial or control.
    pub required_periods: usize,
    /// Case-insensitive substring that marks the product category under
    /// evaluation, matched after product-name cleaning.
    pub category_marker: String,
    /// Half-width of the band drawn around the scaled control series,
    /// as a fraction of the scaled value. Fixed by design, not derived.
    pub band_half_width: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            pre_trial: PeriodWindow::new(Period::new(2018, 7), Period::new(2019, 1)),
            trial: PeriodWindow::new(Period::new(2019, 2), Period::new(2019, 4)),
            trial_stores: vec![77, 86, 88],
            required_periods: 12,
            category_marker: "chip".to_string(),
            band_half_width: 0.05,
        }
    }
}

impl EvalConfig {
    /// Load from a JSON file. Missing fields fall back to the defaults.
    pub fn from_file(path: &Path) -> EvalResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config: EvalConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// The full span the counterfactual covers: pre-trial start through
    /// trial end, so the pre-trial fit stays inspectable.
    pub fn evaluation_window(&self) -> PeriodWindow {
        PeriodWindow::new(self.pre_trial.start, self.trial.end)
    }

    pub fn validate(&self) -> EvalResult<()> {
        // Deserialization bypasses PeriodWindow::new, so re-check ordering.
        for (name, window) in [("pre_trial", self.pre_trial), ("trial", self.trial)] {
            if window.start > window.end {
                return Err(EvalError::Config(format!(
                    "{name} window {window} runs backwards"
                )));
            }
        }
        if self.pre_trial.end >= self.trial.start {
            return Err(EvalError::Config(format!(
                "pre-trial window {} overlaps trial window {}",
                self.pre_trial, self.trial
            )));
        }
        if self.trial_stores.is_empty() {
            return Err(EvalError::Config("no trial stores configured".into()));
        }
        if self.pre_trial.len() < 2 {
            return Err(EvalError::Config(
                "pre-trial window must span at least 2 months".into(),
            ));
        }
        if self.required_periods < self.pre_trial.len() {
            return Err(EvalError::Config(format!(
                "required_periods {} shorter than the pre-trial window ({})",
                self.required_periods,
                self.pre_trial.len()
            )));
        }
        if !(self.band_half_width > 0.0 && self.band_half_width < 1.0) {
            return Err(EvalError::Config(format!(
                "band_half_width {} outside (0, 1)",
                self.band_half_width
            )));
        }
        if self.category_marker.is_empty() {
            return Err(EvalError::Config("empty category marker".into()));
        }
        Ok(())
    }
}
