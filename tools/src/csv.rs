//! Flat-file loader for the scanner-data extract.
//!
//! Two comma-separated files with a header row:
//!   transactions: DATE,STORE_NBR,LYLTY_CARD_NBR,TXN_ID,PROD_NAME,PROD_QTY,TOT_SALES
//!   customers:    LYLTY_CARD_NBR,LIFESTAGE,PREMIUM_CUSTOMER
//!
//! Dates are ISO `YYYY-MM-DD`. Fields never contain embedded commas in
//! this extract, so a plain split is all the parsing there is.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use scanlift_core::error::EvalResult;
use scanlift_core::record::{CustomerProfile, TransactionRecord};
use scanlift_core::source::TransactionSource;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub struct CsvSource {
    pub transactions_path: PathBuf,
    pub customers_path: Option<PathBuf>,
}

impl TransactionSource for CsvSource {
    fn transactions(&mut self) -> EvalResult<Vec<TransactionRecord>> {
        Ok(load_transactions(&self.transactions_path)?)
    }

    fn customers(&mut self) -> EvalResult<Vec<CustomerProfile>> {
        match &self.customers_path {
            Some(path) => Ok(load_customers(path)?),
            None => Ok(Vec::new()),
        }
    }
}

fn data_lines(path: &PathBuf) -> Result<impl Iterator<Item = (usize, std::io::Result<String>)>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    // enumerate from 2: line 1 is the header
    Ok(BufReader::new(file)
        .lines()
        .skip(1)
        .enumerate()
        .map(|(i, line)| (i + 2, line)))
}

pub fn load_transactions(path: &PathBuf) -> Result<Vec<TransactionRecord>> {
    let mut out = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 7 {
            bail!(
                "{}:{line_no}: expected 7 fields, got {}",
                path.display(),
                fields.len()
            );
        }
        let parse = |what: &str| format!("{}:{line_no}: bad {what}", path.display());
        out.push(TransactionRecord {
            date: NaiveDate::parse_from_str(fields[0].trim(), "%Y-%m-%d")
                .with_context(|| parse("DATE"))?,
            store_id: fields[1].trim().parse().with_context(|| parse("STORE_NBR"))?,
            card_id: fields[2]
                .trim()
                .parse()
                .with_context(|| parse("LYLTY_CARD_NBR"))?,
            txn_id: fields[3].trim().parse().with_context(|| parse("TXN_ID"))?,
            product_name: fields[4].trim().to_string(),
            quantity: fields[5].trim().parse().with_context(|| parse("PROD_QTY"))?,
            total_sale_amount: fields[6].trim().parse().with_context(|| parse("TOT_SALES"))?,
        });
    }
    log::info!("csv: loaded {} transaction line(s) from {}", out.len(), path.display());
    Ok(out)
}

pub fn load_customers(path: &PathBuf) -> Result<Vec<CustomerProfile>> {
    let mut out = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 3 {
            bail!(
                "{}:{line_no}: expected 3 fields, got {}",
                path.display(),
                fields.len()
            );
        }
        out.push(CustomerProfile {
            card_id: fields[0]
                .trim()
                .parse()
                .with_context(|| format!("{}:{line_no}: bad LYLTY_CARD_NBR", path.display()))?,
            lifestage: fields[1].trim().to_string(),
            premium_tier: fields[2].trim().to_string(),
        });
    }
    log::info!("csv: loaded {} customer profile(s) from {}", out.len(), path.display());
    Ok(out)
}
