//! Markdown rendering for reports, suitable for CI job summaries.
//!
//! Rendering works on the persisted document forms so the `md` subcommand
//! can re-render an artifact without the full result set in memory.

use crossval_types::{
    ComparisonDocument, ComparisonReport, ValidationDocument, ValidationReport, Value,
};
use std::fmt::Write as _;

fn fmt_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn fmt_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3e}"))
}

/// Render a validation report as a markdown summary.
pub fn render_markdown(report: &ValidationReport) -> String {
    render_validation_document(&report.to_document())
}

/// Render a comparison report as a markdown summary.
pub fn render_comparison_markdown(report: &ComparisonReport) -> String {
    render_comparison_document(&report.to_document())
}

pub fn render_validation_document(doc: &ValidationDocument) -> String {
    let mut out = String::new();
    let verdict = if doc.success { "PASS" } else { "FAIL" };

    let _ = writeln!(
        out,
        "## Validation: `{}` vs `{}`: {verdict}",
        doc.implementation_name, doc.reference_name
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} tests, {} passed, {} failed ({:.1}% pass rate) in {:.1} ms",
        doc.total_tests, doc.passed, doc.failed, doc.pass_rate, doc.execution_time_ms
    );
    let _ = writeln!(out);

    let summary = &doc.discrepancy_summary;
    if summary.numeric_tests > 0 {
        let _ = writeln!(out, "| discrepancy | value |");
        let _ = writeln!(out, "|---|---|");
        let _ = writeln!(out, "| numeric tests | {} |", summary.numeric_tests);
        let _ = writeln!(out, "| nonzero | {} |", summary.nonzero);
        let _ = writeln!(out, "| max | {} |", fmt_f64(summary.max));
        let _ = writeln!(out, "| mean | {} |", fmt_f64(summary.mean));
        let _ = writeln!(out, "| median | {} |", fmt_f64(summary.median));
        let _ = writeln!(out);
    }

    if !doc.failed_tests.is_empty() {
        let _ = writeln!(out, "### Failed cases");
        let _ = writeln!(out);
        let _ = writeln!(out, "| case | expected | actual | discrepancy | detail |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for entry in &doc.failed_tests {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                entry.test_name,
                fmt_value(entry.expected.as_ref()),
                fmt_value(entry.actual.as_ref()),
                fmt_f64(entry.discrepancy),
                entry.error.as_deref().unwrap_or("-"),
            );
        }
    }

    out
}

pub fn render_comparison_document(doc: &ComparisonDocument) -> String {
    let mut out = String::new();
    let verdict = if doc.success { "CONSISTENT" } else { "INCONSISTENT" };

    let _ = writeln!(
        out,
        "## Comparison: {}: {verdict}",
        doc.implementation_names.join(", ")
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} cases, {} consistent, {} inconsistent ({:.1}% consistency) in {:.1} ms",
        doc.total_tests, doc.consistent, doc.inconsistent, doc.consistency_rate, doc.execution_time_ms
    );
    let _ = writeln!(out);

    if !doc.inconsistent_cases.is_empty() {
        let summary = &doc.inconsistency_summary;
        let _ = writeln!(
            out,
            "{} numeric, {} non-numeric, {} exception mismatches (max spread {})",
            summary.numeric_mismatches,
            summary.non_numeric_mismatches,
            summary.exception_mismatches,
            fmt_f64(summary.max_discrepancy),
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "| case | spread | detail |");
        let _ = writeln!(out, "|---|---|---|");
        for result in &doc.inconsistent_cases {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                result.case_name,
                fmt_f64(result.max_discrepancy),
                result.message.as_deref().unwrap_or("-"),
            );
        }
    }

    out
}
