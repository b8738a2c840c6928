//! Customer segment breakdown — lifestage × premium-tier views over the
//! category-filtered transactions. Sits outside the control-store pipeline;
//! feeds the report only.

use crate::config::EvalConfig;
use crate::record::{matches_category, CustomerProfile, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCustomerCount {
    pub lifestage: String,
    pub premium_tier: String,
    pub customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSales {
    pub lifestage: String,
    pub premium_tier: String,
    pub total_sales: f64,
    /// Share of all matched segment sales, in percent.
    pub sales_pct: f64,
    /// Mean value of a single purchase line in this segment.
    pub avg_line_value: f64,
    pub line_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    /// Lifestage × premium-tier crosstab of distinct card holders.
    pub customer_counts: Vec<SegmentCustomerCount>,
    /// Sales totals and contribution per segment, over category-filtered
    /// lines that join to a profile.
    pub sales: Vec<SegmentSales>,
    /// Category-filtered lines whose card id has no profile row.
    pub unmatched_lines: u64,
}

impl SegmentBreakdown {
    pub fn build(
        records: &[TransactionRecord],
        profiles: &[CustomerProfile],
        config: &EvalConfig,
    ) -> Self {
        // Card id is the unique customer key; keep the first profile per card.
        let mut by_card: HashMap<u64, &CustomerProfile> = HashMap::new();
        for profile in profiles {
            by_card.entry(profile.card_id).or_insert(profile);
        }

        let mut customer_counts: BTreeMap<(String, String), HashSet<u64>> = BTreeMap::new();
        for profile in by_card.values() {
            customer_counts
                .entry((profile.lifestage.clone(), profile.premium_tier.clone()))
                .or_default()
                .insert(profile.card_id);
        }

        struct SalesAcc {
            total: f64,
            lines: u64,
        }
        let mut sales_acc: BTreeMap<(String, String), SalesAcc> = BTreeMap::new();
        let mut unmatched_lines = 0u64;
        for record in records {
            if !matches_category(&record.product_name, &config.category_marker) {
                continue;
            }
            let Some(profile) = by_card.get(&record.card_id) else {
                unmatched_lines += 1;
                continue;
            };
            let acc = sales_acc
                .entry((profile.lifestage.clone(), profile.premium_tier.clone()))
                .or_insert(SalesAcc {
                    total: 0.0,
                    lines: 0,
                });
            acc.total += record.total_sale_amount;
            acc.lines += 1;
        }

        let grand_total: f64 = sales_acc.values().map(|acc| acc.total).sum();
        let sales = sales_acc
            .into_iter()
            .map(|((lifestage, premium_tier), acc)| SegmentSales {
                lifestage,
                premium_tier,
                total_sales: acc.total,
                sales_pct: if grand_total > 0.0 {
                    acc.total / grand_total * 100.0
                } else {
                    0.0
                },
                avg_line_value: acc.total / acc.lines as f64,
                line_count: acc.lines,
            })
            .collect();

        SegmentBreakdown {
            customer_counts: customer_counts
                .into_iter()
                .map(|((lifestage, premium_tier), cards)| SegmentCustomerCount {
                    lifestage,
                    premium_tier,
                    customers: cards.len() as u64,
                })
                .collect(),
            sales,
            unmatched_lines,
        }
    }
}
