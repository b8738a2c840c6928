//! Raw input records and product-name normalization.

use crate::types::{CardId, StoreId, TxnId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One purchase line item, as supplied by the data source. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub store_id: StoreId,
    pub card_id: CardId,
    pub txn_id: TxnId,
    pub product_name: String,
    pub quantity: u32,
    pub total_sale_amount: f64,
}

/// One loyalty-card holder. Used only for the segment breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub card_id: CardId,
    pub lifestage: String,
    pub premium_tier: String,
}

/// Normalize a raw product name for category matching:
/// drop anything that is not alphanumeric or whitespace, drop digit runs
/// (pack sizes), then drop a single trailing unit suffix `g` left behind
/// by a weight like `175g`.
pub fn clean_product_name(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .filter(|c| !c.is_ascii_digit())
        .collect();
    if cleaned.ends_with('g') {
        cleaned.pop();
    }
    cleaned
}

/// Case-insensitive substring match of the category marker against the
/// cleaned product name.
pub fn matches_category(raw_name: &str, marker: &str) -> bool {
    clean_product_name(raw_name)
        .to_lowercase()
        .contains(&marker.to_lowercase())
}
