//! Seeded synthetic dataset, for running the pipeline without the real
//! extract. Same seed, same data — the generator draws everything from one
//! PCG stream in a fixed order.
//!
//! Shape mimics the real extract: a year of data (2018-07 through 2019-06)
//! across a pool of stores including the three trial stores, mostly chip
//! products with some non-category noise, and a mild built-in uplift in
//! the trial stores during the trial months so the evaluation has
//! something to find.

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use scanlift_core::error::EvalResult;
use scanlift_core::record::{CustomerProfile, TransactionRecord};
use scanlift_core::source::TransactionSource;
use scanlift_core::types::{Period, PeriodWindow, StoreId};

const CHIP_PRODUCTS: &[&str] = &[
    "Natural Chip Compny SeaSalt 175g",
    "Smiths Crinkle Cut Chips Chicken 170g",
    "Kettle Sensations Siracha Lime 150g",
    "Dorito Corn Chips Cheese Supreme 380g",
    "Thins Chips Light & Tangy 175g",
];

const OTHER_PRODUCTS: &[&str] = &[
    "Old El Paso Salsa Dip Tomato Mild 300g",
    "Woolworths Mild Salsa 300g",
];

const LIFESTAGES: &[&str] = &[
    "YOUNG SINGLES/COUPLES",
    "YOUNG FAMILIES",
    "OLDER SINGLES/COUPLES",
    "OLDER FAMILIES",
    "RETIREES",
];

const TIERS: &[&str] = &["Budget", "Mainstream", "Premium"];

pub struct SyntheticSource {
    pub seed: u64,
    pub store_count: u32,
    pub trial_stores: Vec<StoreId>,
    pub trial_window: PeriodWindow,
}

impl TransactionSource for SyntheticSource {
    fn transactions(&mut self) -> EvalResult<Vec<TransactionRecord>> {
        Ok(self.generate().0)
    }

    fn customers(&mut self) -> EvalResult<Vec<CustomerProfile>> {
        Ok(self.generate().1)
    }
}

impl SyntheticSource {
    /// Build both tables in one pass from one seeded stream.
    pub fn generate(&self) -> (Vec<TransactionRecord>, Vec<CustomerProfile>) {
        let mut rng = Pcg64Mcg::seed_from_u64(self.seed);
        let mut transactions = Vec::new();
        let mut customers = Vec::new();

        let mut stores: Vec<StoreId> = self.trial_stores.clone();
        let mut next_id = 1;
        while stores.len() < self.store_count as usize {
            if !stores.contains(&next_id) {
                stores.push(next_id);
            }
            next_id += 1;
        }
        stores.sort_unstable();

        let year = PeriodWindow::new(Period::new(2018, 7), Period::new(2019, 6));
        let mut txn_id: u64 = 1;

        for &store in &stores {
            // Per-store base activity level, fixed for the year.
            let base_customers: u64 = rng.gen_range(40..120);
            let price_level: f64 = rng.gen_range(3.0..7.0);

            for card_slot in 0..base_customers {
                let card_id = u64::from(store) * 100_000 + card_slot;
                customers.push(CustomerProfile {
                    card_id,
                    lifestage: LIFESTAGES[rng.gen_range(0..LIFESTAGES.len())].to_string(),
                    premium_tier: TIERS[rng.gen_range(0..TIERS.len())].to_string(),
                });
            }

            for period in year.periods() {
                let in_trial = self.trial_stores.contains(&store)
                    && self.trial_window.contains(period);
                // Trial stores run hotter during the trial months.
                let active = if in_trial {
                    base_customers + base_customers / 5
                } else {
                    base_customers
                };
                for card_slot in 0..active {
                    let card_id = u64::from(store) * 100_000 + card_slot % base_customers;
                    let baskets = rng.gen_range(1u32..=2);
                    for _ in 0..baskets {
                        let day = rng.gen_range(1..=28);
                        let date = NaiveDate::from_ymd_opt(period.year, period.month, day)
                            .expect("day <= 28 is always valid");
                        let chip = rng.gen_bool(0.8);
                        let name = if chip {
                            CHIP_PRODUCTS[rng.gen_range(0..CHIP_PRODUCTS.len())]
                        } else {
                            OTHER_PRODUCTS[rng.gen_range(0..OTHER_PRODUCTS.len())]
                        };
                        let quantity: u32 = rng.gen_range(1..=3);
                        transactions.push(TransactionRecord {
                            date,
                            store_id: store,
                            card_id,
                            txn_id,
                            product_name: name.to_string(),
                            quantity,
                            total_sale_amount: price_level * quantity as f64
                                + rng.gen_range(-0.5..0.5),
                        });
                        txn_id += 1;
                    }
                }
            }
        }

        (transactions, customers)
    }
}
