//! The reporting seam: a serializable snapshot of everything the pipeline
//! computed, plus a plain-text rendering for terminals. Chart rendering is
//! somebody else's job — a sink consumes this and draws what it likes.

use crate::config::EvalConfig;
use crate::error::EvalResult;
use crate::evaluate::TrialOutcome;
use crate::segments::SegmentBreakdown;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub config: EvalConfig,
    /// Rows in the aggregated metric table and stores surviving the
    /// eligibility filter.
    pub table_rows: usize,
    pub eligible_stores: usize,
    pub outcomes: Vec<TrialOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<SegmentBreakdown>,
}

/// Where a finished report goes.
pub trait ReportSink {
    fn write_report(&mut self, report: &EvaluationReport) -> EvalResult<()>;
}

/// Writes the report as pretty JSON to any `io::Write`.
pub struct JsonSink<W: io::Write>(pub W);

impl<W: io::Write> ReportSink for JsonSink<W> {
    fn write_report(&mut self, report: &EvaluationReport) -> EvalResult<()> {
        serde_json::to_writer_pretty(&mut self.0, report)?;
        self.0.write_all(b"\n")?;
        Ok(())
    }
}

/// Render the report as a terminal-friendly text block.
pub fn render_text(report: &EvaluationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trial impact evaluation");
    let _ = writeln!(
        out,
        "  pre-trial {}  trial {}  {} metric rows over {} eligible stores",
        report.config.pre_trial, report.config.trial, report.table_rows, report.eligible_stores
    );

    for outcome in &report.outcomes {
        let _ = writeln!(out);
        match outcome {
            TrialOutcome::Skipped {
                trial_store_id,
                metric,
                reason,
            } => {
                let _ = writeln!(out, "trial store {trial_store_id} / {metric}: SKIPPED");
                let _ = writeln!(out, "  {reason}");
            }
            TrialOutcome::Evaluated { evaluation, .. } => {
                let impact = &evaluation.impact;
                let _ = writeln!(
                    out,
                    "trial store {} / {}: control store {} (composite {:.4}, scaling factor {:.4})",
                    impact.trial_store_id,
                    impact.metric,
                    impact.control_store_id,
                    evaluation.assignment.composite_score,
                    impact.scaling_factor,
                );
                let _ = writeln!(
                    out,
                    "  {:>8}  {:>14}  {:>16}  {:>8}",
                    "period", "trial", "scaled control", "diff %"
                );
                for p in &impact.periods {
                    let _ = writeln!(
                        out,
                        "  {:>8}  {:>14.2}  {:>16.2}  {:>+8.2}",
                        p.period.to_string(),
                        p.trial_value,
                        p.scaled_control_value,
                        p.percentage_diff,
                    );
                }
                let _ = writeln!(
                    out,
                    "  trial total {:.2} vs scaled control {:.2}: {:+.2} ({:+.2}%), per-period mean {:+.2}%",
                    impact.total_trial,
                    impact.total_scaled_control,
                    impact.total_absolute_diff,
                    impact.total_percentage_diff,
                    impact.avg_percentage_diff,
                );
            }
        }
    }

    if let Some(segments) = &report.segments {
        let _ = writeln!(out);
        let _ = writeln!(out, "segment sales (lifestage / tier):");
        for s in &segments.sales {
            let _ = writeln!(
                out,
                "  {:<24} {:<12} {:>12.2}  {:>6.2}%  avg line {:>7.2}",
                s.lifestage, s.premium_tier, s.total_sales, s.sales_pct, s.avg_line_value,
            );
        }
        if segments.unmatched_lines > 0 {
            let _ = writeln!(
                out,
                "  {} line(s) had no matching customer profile",
                segments.unmatched_lines
            );
        }
    }

    out
}
