//! trial-runner: headless driver for the scanner-data trial evaluation.
//!
//! Usage:
//!   trial-runner --transactions txns.csv --customers behaviour.csv
//!   trial-runner --synthetic --seed 42 --stores 30
//!   trial-runner --synthetic --out report.json --config eval.json

mod csv;
mod synthetic;

use anyhow::{bail, Result};
use scanlift_core::{
    aggregate::{missing_sale_dates, MetricTable},
    config::EvalConfig,
    evaluate::run_evaluation,
    report::{render_text, EvaluationReport, JsonSink, ReportSink},
    segments::SegmentBreakdown,
    source::TransactionSource,
};
use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let synthetic = args.iter().any(|a| a == "--synthetic");
    let seed = parse_arg(&args, "--seed", 42u64)?;
    let store_count = parse_arg(&args, "--stores", 30u32)?;
    let transactions_path = path_arg(&args, "--transactions");
    let customers_path = path_arg(&args, "--customers");
    let config_path = path_arg(&args, "--config");
    let out_path = path_arg(&args, "--out");

    let config = match &config_path {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };

    let mut source: Box<dyn TransactionSource> = match (synthetic, transactions_path) {
        (true, None) => {
            println!("trial-runner — synthetic dataset (seed {seed}, {store_count} stores)");
            Box::new(synthetic::SyntheticSource {
                seed,
                store_count,
                trial_stores: config.trial_stores.clone(),
                trial_window: config.trial,
            })
        }
        (false, Some(path)) => {
            println!("trial-runner — {}", path.display());
            Box::new(csv::CsvSource {
                transactions_path: path,
                customers_path,
            })
        }
        (true, Some(_)) => bail!("--synthetic and --transactions are mutually exclusive"),
        (false, None) => bail!("need either --transactions <file> or --synthetic"),
    };

    let transactions = source.transactions()?;
    let customers = source.customers()?;

    // Coverage check on the raw extract, before category filtering.
    let full_window = config.evaluation_window();
    if let (Some(first), Some(last)) = (
        transactions.iter().map(|t| t.date).min(),
        transactions.iter().map(|t| t.date).max(),
    ) {
        let gaps = missing_sale_dates(&transactions, first, last);
        if !gaps.is_empty() {
            log::warn!("{} calendar day(s) between {first} and {last} have no sales", gaps.len());
        }
    }

    let table = MetricTable::build(&transactions, &config)?;
    if table.is_empty() {
        bail!("no eligible stores after aggregation; nothing to evaluate");
    }
    log::info!(
        "aggregated {} rows across {} eligible stores over {full_window}",
        table.len(),
        table.stores().len()
    );

    let outcomes = run_evaluation(&table, &config);
    let segments =
        (!customers.is_empty()).then(|| SegmentBreakdown::build(&transactions, &customers, &config));

    let report = EvaluationReport {
        table_rows: table.len(),
        eligible_stores: table.stores().len(),
        config,
        outcomes,
        segments,
    };

    print!("{}", render_text(&report));

    if let Some(path) = out_path {
        JsonSink(File::create(&path)?).write_report(&report)?;
        println!("\nreport written to {}", path.display());
    }

    Ok(())
}

fn parse_arg<T: FromStr + Copy>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match args.windows(2).find(|w| w[0] == flag) {
        Some(w) => match w[1].parse() {
            Ok(v) => Ok(v),
            Err(e) => bail!("bad value for {flag}: {e}"),
        },
        None => Ok(default),
    }
}

fn path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| PathBuf::from(&w[1]))
}
