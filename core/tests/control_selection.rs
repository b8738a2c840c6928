use scanlift_core::aggregate::MetricTable;
use scanlift_core::config::EvalConfig;
use scanlift_core::error::EvalError;
use scanlift_core::record::TransactionRecord;
use scanlift_core::scoring::score_candidates;
use scanlift_core::selection::select_control;
use scanlift_core::types::{Metric, Period, PeriodWindow};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// One month of activity for one store: `customers` distinct cards, one
/// basket each, revenue split evenly.
fn store_month(
    store_id: u32,
    period: Period,
    revenue: f64,
    customers: u64,
    lines: &mut Vec<TransactionRecord>,
) {
    for i in 0..customers {
        let serial = lines.len() as u64 + 1;
        lines.push(TransactionRecord {
            date: chrono::NaiveDate::from_ymd_opt(period.year, period.month, (i % 28 + 1) as u32)
                .unwrap(),
            store_id,
            card_id: store_id as u64 * 1_000 + i,
            txn_id: serial,
            product_name: "Smiths Crinkle Cut Chips 170g".to_string(),
            quantity: 1,
            total_sale_amount: revenue / customers as f64,
        });
    }
}

/// Twelve months (Jul 2018 – Jun 2019) of revenue for one store, constant
/// customer count.
fn store_year(store_id: u32, monthly_revenue: &[f64; 12], lines: &mut Vec<TransactionRecord>) {
    let year = PeriodWindow::new(Period::new(2018, 7), Period::new(2019, 6));
    for (period, revenue) in year.periods().into_iter().zip(monthly_revenue) {
        store_month(store_id, period, *revenue, 5, lines);
    }
}

const TRIAL_REVENUE: [f64; 12] = [
    100.0, 110.0, 105.0, 120.0, 115.0, 108.0, 112.0, // pre-trial Jul–Jan
    118.0, 116.0, 114.0, 110.0, 109.0,
];

fn halved(values: &[f64; 12]) -> [f64; 12] {
    let mut out = *values;
    for v in &mut out {
        *v /= 2.0;
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A candidate tracking the trial store at exactly half its
/// level correlates perfectly but scores lower on magnitude, so the
/// exact-match candidate must win the control assignment.
#[test]
fn exact_match_beats_perfectly_correlated_half_scale_candidate() {
    let config = EvalConfig {
        trial_stores: vec![77],
        ..EvalConfig::default()
    };
    let mut lines = Vec::new();
    store_year(77, &TRIAL_REVENUE, &mut lines);
    store_year(10, &halved(&TRIAL_REVENUE), &mut lines);
    store_year(20, &TRIAL_REVENUE, &mut lines);
    let table = MetricTable::build(&lines, &config).unwrap();

    let scores = score_candidates(&table, &config, 77, Metric::Revenue).unwrap();
    assert_eq!(scores.len(), 2);

    let half = scores.iter().find(|s| s.store_id == 10).unwrap();
    let exact = scores.iter().find(|s| s.store_id == 20).unwrap();
    // Both shapes are identical, so both correlate perfectly...
    assert!((half.correlation_score - 1.0).abs() < 1e-12);
    assert!((exact.correlation_score - 1.0).abs() < 1e-12);
    // ...but only the exact match earns full magnitude marks.
    assert_eq!(exact.magnitude_score, 1.0);
    assert!(half.magnitude_score < exact.magnitude_score);

    let assignment = select_control(77, Metric::Revenue, &scores).unwrap();
    assert_eq!(assignment.control_store_id, 20);
}

/// Equal composites break toward the lowest store id, deterministically.
#[test]
fn tied_composites_pick_the_lowest_store_id() {
    let config = EvalConfig {
        trial_stores: vec![77],
        ..EvalConfig::default()
    };
    let mut lines = Vec::new();
    store_year(77, &TRIAL_REVENUE, &mut lines);
    store_year(40, &TRIAL_REVENUE, &mut lines);
    store_year(30, &TRIAL_REVENUE, &mut lines);
    let table = MetricTable::build(&lines, &config).unwrap();

    let scores = score_candidates(&table, &config, 77, Metric::Revenue).unwrap();
    let a = scores.iter().find(|s| s.store_id == 30).unwrap();
    let b = scores.iter().find(|s| s.store_id == 40).unwrap();
    assert_eq!(a.composite(), b.composite(), "setup must produce a tie");

    let assignment = select_control(77, Metric::Revenue, &scores).unwrap();
    assert_eq!(assignment.control_store_id, 30);
}

/// A flat-series candidate is skipped as non-competitive rather than
/// scored as zero, and other trial stores never enter the pool.
#[test]
fn degenerate_and_trial_candidates_excluded() {
    let config = EvalConfig {
        trial_stores: vec![77, 86],
        ..EvalConfig::default()
    };
    let mut lines = Vec::new();
    store_year(77, &TRIAL_REVENUE, &mut lines);
    store_year(86, &TRIAL_REVENUE, &mut lines); // other trial store
    store_year(50, &[90.0; 12], &mut lines); // flat revenue, undefined r
    store_year(60, &halved(&TRIAL_REVENUE), &mut lines);
    let table = MetricTable::build(&lines, &config).unwrap();

    let scores = score_candidates(&table, &config, 77, Metric::Revenue).unwrap();
    let ids: Vec<u32> = scores.iter().map(|s| s.store_id).collect();
    assert_eq!(ids, vec![60], "store 50 degenerate, store 86 is a trial store");
}

#[test]
fn empty_candidate_pool_is_insufficient_data() {
    let err = select_control(77, Metric::CustomerCount, &[]).unwrap_err();
    assert!(matches!(
        err,
        EvalError::InsufficientData {
            store_id: 77,
            metric: Metric::CustomerCount,
            ..
        }
    ));
}
