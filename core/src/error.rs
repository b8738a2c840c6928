use crate::types::{Metric, Period, StoreId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    /// A series is too short to work with (fewer than 2 overlapping periods,
    /// or an empty candidate pool after filtering).
    #[error("insufficient data for store {store_id} / {metric}: {detail}")]
    InsufficientData {
        store_id: StoreId,
        metric: Metric,
        detail: String,
    },

    /// A flat (zero-variance) series makes Pearson correlation undefined.
    #[error("degenerate series for store {store_id} / {metric}: zero variance over {periods} periods")]
    DegenerateSeries {
        store_id: StoreId,
        metric: Metric,
        periods: usize,
    },

    /// A denominator came out zero (or near enough) where a ratio is required.
    #[error("zero denominator for store {store_id} / {metric} in {context}")]
    ZeroDenominator {
        store_id: StoreId,
        metric: Metric,
        context: String,
    },

    /// The aggregated table has no rows at all for a requested store.
    #[error("store {store_id} has no rows in the aggregated metric table")]
    MissingSeries { store_id: StoreId },

    /// A (store, period) aggregation group with no distinct customers.
    /// Only reachable through a malformed source; reported, never coerced.
    #[error("store {store_id} period {period}: zero distinct customers in aggregation group")]
    ZeroCustomers { store_id: StoreId, period: Period },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EvalResult<T> = Result<T, EvalError>;
