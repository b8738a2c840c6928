//! scanlift-core — scanner-data trial impact evaluation.
//!
//! A deterministic single-shot batch pipeline: loyalty-card transaction
//! lines go in, per-store monthly metrics come out, each trial store gets
//! a behaviourally-matched control store, and the control's scaled series
//! becomes the counterfactual against which trial uplift is measured.
//!
//! Data flow is strictly one-directional:
//!
//! ```text
//! TransactionRecord ─→ aggregate ─→ scoring ─→ selection ─→ counterfactual
//!                          (evaluate drives the last three per pair)
//! ```
//!
//! Every stage takes immutable inputs and returns a new typed table;
//! nothing mutates a prior stage's output. File formats and rendering live
//! behind the `source` and `report` seams.

pub mod aggregate;
pub mod config;
pub mod counterfactual;
pub mod error;
pub mod evaluate;
pub mod record;
pub mod report;
pub mod scoring;
pub mod segments;
pub mod selection;
pub mod source;
pub mod types;
