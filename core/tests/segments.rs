use chrono::NaiveDate;
use scanlift_core::config::EvalConfig;
use scanlift_core::record::{CustomerProfile, TransactionRecord};
use scanlift_core::segments::SegmentBreakdown;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn profile(card_id: u64, lifestage: &str, tier: &str) -> CustomerProfile {
    CustomerProfile {
        card_id,
        lifestage: lifestage.to_string(),
        premium_tier: tier.to_string(),
    }
}

fn line(card_id: u64, product_name: &str, amount: f64) -> TransactionRecord {
    TransactionRecord {
        date: NaiveDate::from_ymd_opt(2018, 9, 14).unwrap(),
        store_id: 1,
        card_id,
        txn_id: card_id * 10,
        product_name: product_name.to_string(),
        quantity: 1,
        total_sale_amount: amount,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn crosstab_counts_distinct_cards_per_segment() {
    let profiles = vec![
        profile(1, "RETIREES", "Budget"),
        profile(2, "RETIREES", "Budget"),
        profile(3, "RETIREES", "Premium"),
        profile(4, "YOUNG FAMILIES", "Budget"),
        // Duplicate card: first profile wins, no double count.
        profile(1, "RETIREES", "Premium"),
    ];
    let breakdown = SegmentBreakdown::build(&[], &profiles, &EvalConfig::default());

    let count = |lifestage: &str, tier: &str| {
        breakdown
            .customer_counts
            .iter()
            .find(|c| c.lifestage == lifestage && c.premium_tier == tier)
            .map(|c| c.customers)
            .unwrap_or(0)
    };
    assert_eq!(count("RETIREES", "Budget"), 2);
    assert_eq!(count("RETIREES", "Premium"), 1);
    assert_eq!(count("YOUNG FAMILIES", "Budget"), 1);
}

#[test]
fn segment_sales_percentages_sum_to_one_hundred() {
    let profiles = vec![
        profile(1, "RETIREES", "Budget"),
        profile(2, "YOUNG FAMILIES", "Mainstream"),
    ];
    let records = vec![
        line(1, "Smiths Chips 170g", 6.0),
        line(1, "Kettle Chips 135g", 4.0),
        line(2, "Dorito Corn Chips 380g", 10.0),
        // Non-category line must not count toward segment sales.
        line(2, "Old El Paso Salsa Dip 300g", 99.0),
    ];
    let breakdown = SegmentBreakdown::build(&records, &profiles, &EvalConfig::default());

    let total: f64 = breakdown.sales.iter().map(|s| s.total_sales).sum();
    assert!((total - 20.0).abs() < 1e-9, "salsa excluded");
    let pct_sum: f64 = breakdown.sales.iter().map(|s| s.sales_pct).sum();
    assert!((pct_sum - 100.0).abs() < 1e-9);

    let retirees = breakdown
        .sales
        .iter()
        .find(|s| s.lifestage == "RETIREES")
        .unwrap();
    assert_eq!(retirees.line_count, 2);
    assert!((retirees.total_sales - 10.0).abs() < 1e-9);
    assert!((retirees.avg_line_value - 5.0).abs() < 1e-9);
    assert!((retirees.sales_pct - 50.0).abs() < 1e-9);
}

#[test]
fn unjoined_lines_are_counted_not_dropped_silently() {
    let profiles = vec![profile(1, "RETIREES", "Budget")];
    let records = vec![
        line(1, "Smiths Chips 170g", 6.0),
        line(999, "Smiths Chips 170g", 3.0), // no profile for this card
    ];
    let breakdown = SegmentBreakdown::build(&records, &profiles, &EvalConfig::default());

    assert_eq!(breakdown.unmatched_lines, 1);
    let total: f64 = breakdown.sales.iter().map(|s| s.total_sales).sum();
    assert!((total - 6.0).abs() < 1e-9);
}
