use scanlift_core::aggregate::MetricTable;
use scanlift_core::config::EvalConfig;
use scanlift_core::evaluate::{evaluate_trial, run_evaluation, TrialOutcome};
use scanlift_core::record::TransactionRecord;
use scanlift_core::report::{render_text, EvaluationReport};
use scanlift_core::types::{Metric, Period, PeriodWindow, StoreId};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// One month of activity: `customers` distinct cards, one basket each,
/// revenue split evenly across the lines.
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
            product_name: "Dorito Corn Chips Supreme 380g".to_string(),
            quantity: 1,
            total_sale_amount: revenue / customers as f64,
        });
    }
}

// Baseline shape shared by every store, offset per store so each trial
// store's twin candidate is its unique best match.
const BASE_REVENUE: [f64; 12] = [
    100.0, 110.0, 105.0, 120.0, 115.0, 108.0, 112.0, // Jul–Jan baseline
    118.0, 116.0, 114.0, // Feb–Apr trial months
    110.0, 109.0,
];
const BASE_CUSTOMERS: [u64; 12] = [10, 11, 10, 12, 11, 10, 13, 10, 10, 10, 10, 10];

/// A store's full year, offset per store family so each trial store's twin
/// is its unique best match on both metrics. Trial stores get a 20% lift
/// in the trial months; their twins stay on the baseline.
fn store_year(
    store_id: u32,
    offset: f64,
    cust_offset: u64,
    lifted: bool,
    lines: &mut Vec<TransactionRecord>,
) {
    let year = PeriodWindow::new(Period::new(2018, 7), Period::new(2019, 6));
    let trial = PeriodWindow::new(Period::new(2019, 2), Period::new(2019, 4));
    for (i, period) in year.periods().into_iter().enumerate() {
        let lift = lifted && trial.contains(period);
        let base_customers = BASE_CUSTOMERS[i] + cust_offset;
        let revenue = (BASE_REVENUE[i] + offset) * if lift { 1.2 } else { 1.0 };
        let customers = base_customers + if lift { base_customers / 5 } else { 0 };
        store_month(store_id, period, revenue, customers, lines);
    }
}

fn twin_of(trial: StoreId) -> StoreId {
    match trial {
        77 => 101,
        86 => 102,
        88 => 103,
        _ => unreachable!(),
    }
}

fn build_dataset() -> Vec<TransactionRecord> {
    let mut lines = Vec::new();
    for (trial, offset, cust_offset) in [(77u32, 0.0, 0u64), (86, 200.0, 5), (88, 400.0, 10)] {
        store_year(trial, offset, cust_offset, true, &mut lines);
        store_year(twin_of(trial), offset, cust_offset, false, &mut lines);
    }
    lines
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Full pipeline over three trial stores and their baseline twins: every
/// (trial, metric) pair evaluates, picks its twin as control, and finds
/// the built-in 20% revenue uplift.
#[test]
fn three_trials_two_metrics_end_to_end() {
    let config = EvalConfig::default();
    let table = MetricTable::build(&build_dataset(), &config).unwrap();
    assert_eq!(table.stores().len(), 6);

    let outcomes = run_evaluation(&table, &config);
    assert_eq!(outcomes.len(), 6, "3 trial stores x 2 metrics");

    for outcome in &outcomes {
        let evaluation = outcome.evaluation().unwrap_or_else(|| {
            panic!(
                "pair {}/{} unexpectedly skipped",
                outcome.trial_store_id(),
                outcome.metric()
            )
        });
        let impact = &evaluation.impact;
        assert_eq!(impact.control_store_id, twin_of(impact.trial_store_id));
        // Identical pre-trial series: unit scaling factor, full-score match.
        assert!((impact.scaling_factor - 1.0).abs() < 1e-9);
        assert!((evaluation.assignment.composite_score - 1.0).abs() < 1e-9);
        // Counterfactual spans the whole evaluation window.
        assert_eq!(evaluation.counterfactual.len(), config.evaluation_window().len());
        assert_eq!(impact.periods.len(), config.trial.len());
        // The built-in lift: 20% on revenue, 20% on customer counts.
        assert!(
            (impact.total_percentage_diff - 20.0).abs() < 0.5,
            "{}/{}: expected ~20% uplift, got {:.3}%",
            impact.trial_store_id,
            impact.metric,
            impact.total_percentage_diff
        );
    }
}

/// The unit of failure isolation is one (trial store, metric) pair: a
/// control pool that breaks one metric leaves the other metric's
/// evaluation untouched.
#[test]
fn failure_in_one_metric_does_not_abort_the_other() {
    let config = EvalConfig {
        trial_stores: vec![77],
        ..EvalConfig::default()
    };
    let mut lines = Vec::new();
    store_year(77, 0.0, 0, true, &mut lines);
    // The only candidate: refunds cancel sales every pre-trial month, so
    // its revenue mean is zero while customer counts stay healthy.
    let year = PeriodWindow::new(Period::new(2018, 7), Period::new(2019, 6));
    let zero_mean = [6.0, -6.0, 3.0, -3.0, 9.0, -9.0, 0.0, 5.0, 5.0, 5.0, 5.0, 5.0];
    for (i, period) in year.periods().into_iter().enumerate() {
        store_month(200, period, zero_mean[i], BASE_CUSTOMERS[i], &mut lines);
    }
    let table = MetricTable::build(&lines, &config).unwrap();

    let outcomes = run_evaluation(&table, &config);
    assert_eq!(outcomes.len(), 2);

    let revenue = outcomes.iter().find(|o| o.metric() == Metric::Revenue).unwrap();
    match revenue {
        TrialOutcome::Skipped { reason, .. } => {
            assert!(
                reason.contains("zero denominator"),
                "revenue skip should name the zero denominator, got: {reason}"
            );
        }
        TrialOutcome::Evaluated { .. } => panic!("zero-mean control must not evaluate"),
    }

    let customers = outcomes
        .iter()
        .find(|o| o.metric() == Metric::CustomerCount)
        .unwrap();
    let evaluation = customers
        .evaluation()
        .expect("customer-count metric must still evaluate");
    assert_eq!(evaluation.impact.control_store_id, 200);
}

/// evaluate_trial is the single parametrized path — calling it directly
/// for one pair matches what run_evaluation records for that pair.
#[test]
fn evaluate_trial_matches_run_evaluation() {
    let config = EvalConfig::default();
    let table = MetricTable::build(&build_dataset(), &config).unwrap();

    let direct = evaluate_trial(&table, &config, 86, Metric::Revenue).unwrap();
    let outcomes = run_evaluation(&table, &config);
    let from_run = outcomes
        .iter()
        .find(|o| o.trial_store_id() == 86 && o.metric() == Metric::Revenue)
        .and_then(|o| o.evaluation())
        .unwrap();

    assert_eq!(&direct, from_run);
}

/// The report serializes, round-trips, and renders every outcome.
#[test]
fn report_round_trips_through_json() {
    let config = EvalConfig::default();
    let table = MetricTable::build(&build_dataset(), &config).unwrap();
    let outcomes = run_evaluation(&table, &config);

    let report = EvaluationReport {
        table_rows: table.len(),
        eligible_stores: table.stores().len(),
        config,
        outcomes,
        segments: None,
    };

    let json = serde_json::to_string(&report).unwrap();
    let parsed: EvaluationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.outcomes.len(), report.outcomes.len());
    assert_eq!(parsed.table_rows, report.table_rows);

    let text = render_text(&report);
    for trial in [77, 86, 88] {
        assert!(text.contains(&format!("trial store {trial}")), "missing store {trial}:\n{text}");
    }
    assert!(text.contains("scaled control"));
}
