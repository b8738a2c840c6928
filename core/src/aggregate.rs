//! Metric aggregation: per-transaction records → one row per (store, month).
//!
//! Only stores with a complete history (exactly `required_periods` distinct
//! months in the filtered data) make it into the table. A store with a
//! partial year has no usable baseline, as trial or control, so it is
//! dropped here rather than poisoning every comparison downstream.

use crate::config::EvalConfig;
use crate::error::{EvalError, EvalResult};
use crate::record::{matches_category, TransactionRecord};
use crate::types::{Metric, Period, PeriodWindow, StoreId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One aggregated row. Created once by the aggregator, read-only after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStoreMetric {
    pub store_id: StoreId,
    pub period: Period,
    pub revenue: f64,
    pub customer_count: u64,
    pub transaction_count: u64,
    pub avg_txns_per_customer: f64,
}

impl MonthlyStoreMetric {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::CustomerCount => self.customer_count as f64,
        }
    }
}

/// The aggregated table. BTreeMap keys give deterministic iteration order
/// (store id ascending, then period), which the tie-break rule in control
/// selection relies on.
#[derive(Debug, Clone, Default)]
pub struct MetricTable {
    rows: BTreeMap<(StoreId, Period), MonthlyStoreMetric>,
}

impl MetricTable {
    /// Aggregate category-filtered transactions into monthly rows, keeping
    /// only stores with a complete period history.
    pub fn build(records: &[TransactionRecord], config: &EvalConfig) -> EvalResult<Self> {
        struct Group {
            revenue: f64,
            cards: HashSet<u64>,
            txns: HashSet<u64>,
        }

        let mut groups: BTreeMap<(StoreId, Period), Group> = BTreeMap::new();
        let mut kept = 0usize;
        for record in records {
            if !matches_category(&record.product_name, &config.category_marker) {
                continue;
            }
            kept += 1;
            let key = (record.store_id, Period::from_date(record.date));
            let group = groups.entry(key).or_insert_with(|| Group {
                revenue: 0.0,
                cards: HashSet::new(),
                txns: HashSet::new(),
            });
            group.revenue += record.total_sale_amount;
            group.cards.insert(record.card_id);
            group.txns.insert(record.txn_id);
        }
        log::info!(
            "aggregator: {kept} of {} line items match category '{}'",
            records.len(),
            config.category_marker
        );

        // Eligibility: exactly the required number of distinct months.
        let mut periods_per_store: BTreeMap<StoreId, usize> = BTreeMap::new();
        for (store_id, _) in groups.keys() {
            *periods_per_store.entry(*store_id).or_insert(0) += 1;
        }
        let eligible: BTreeSet<StoreId> = periods_per_store
            .iter()
            .filter(|(_, n)| **n == config.required_periods)
            .map(|(store_id, _)| *store_id)
            .collect();
        let dropped = periods_per_store.len() - eligible.len();
        if dropped > 0 {
            log::info!(
                "aggregator: dropped {dropped} store(s) without exactly {} months of data",
                config.required_periods
            );
        }

        let mut rows = BTreeMap::new();
        for ((store_id, period), group) in groups {
            if !eligible.contains(&store_id) {
                continue;
            }
            let customer_count = group.cards.len() as u64;
            if customer_count == 0 {
                return Err(EvalError::ZeroCustomers { store_id, period });
            }
            let transaction_count = group.txns.len() as u64;
            rows.insert(
                (store_id, period),
                MonthlyStoreMetric {
                    store_id,
                    period,
                    revenue: group.revenue,
                    customer_count,
                    transaction_count,
                    avg_txns_per_customer: transaction_count as f64 / customer_count as f64,
                },
            );
        }
        Ok(Self { rows })
    }

    /// Stores present in the table, ascending.
    pub fn stores(&self) -> Vec<StoreId> {
        let mut out: Vec<StoreId> = self.rows.keys().map(|(store_id, _)| *store_id).collect();
        out.dedup();
        out
    }

    pub fn get(&self, store_id: StoreId, period: Period) -> Option<&MonthlyStoreMetric> {
        self.rows.get(&(store_id, period))
    }

    /// A store's period-indexed series for one metric, restricted to a
    /// window. Months absent from the data are absent from the series.
    pub fn series(
        &self,
        store_id: StoreId,
        metric: Metric,
        window: PeriodWindow,
    ) -> Vec<(Period, f64)> {
        window
            .periods()
            .into_iter()
            .filter_map(|p| self.get(store_id, p).map(|row| (p, row.value(metric))))
            .collect()
    }

    /// Like `series`, but an empty result is promoted to an error naming
    /// the store, so callers need not special-case it.
    pub fn series_required(
        &self,
        store_id: StoreId,
        metric: Metric,
        window: PeriodWindow,
    ) -> EvalResult<Vec<(Period, f64)>> {
        let series = self.series(store_id, metric, window);
        if series.is_empty() {
            return Err(EvalError::MissingSeries { store_id });
        }
        Ok(series)
    }

    pub fn rows(&self) -> impl Iterator<Item = &MonthlyStoreMetric> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Calendar dates in `[from, to]` with no sales at all in the record set.
/// A coverage check on the raw data, before any category filtering.
pub fn missing_sale_dates(
    records: &[TransactionRecord],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    let seen: HashSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let mut out = Vec::new();
    let mut day = from;
    while day <= to {
        if !seen.contains(&day) {
            out.push(day);
        }
        day = day.succ_opt().expect("date range overflow");
    }
    out
}
