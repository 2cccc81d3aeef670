//! Vertical report card for a graded run.

use std::fmt::Write;

use crate::pipeline::GradeReport;

/// Render a graded run as a human-readable card.
pub fn format_report(report: &GradeReport) -> String {
    let mut out = String::new();
    let name = report.product_name.as_deref().unwrap_or(&report.source);
    let result = &report.result;

    let _ = writeln!(out, "=== {name} ===");
    if report.product_name.is_some() {
        let _ = writeln!(out, "{}", report.source);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Grade");
    row(&mut out, "grade", &format!("{} ({})", result.grade, result.color()));
    row(&mut out, "real", &result.real_count.to_string());
    row(&mut out, "fake", &result.fake_count.to_string());
    if let Some(pct) = result.real_pct() {
        row(&mut out, "real share", &format!("{pct:.1}%"));
    }

    let _ = writeln!(out, "Run");
    row(&mut out, "model", report.variant.model_name());
    row(&mut out, "processed table", &report.processed_path.display().to_string());
    if report.skipped > 0 {
        row(&mut out, "skipped (blank)", &report.skipped.to_string());
    }
    out
}

/// Print a graded run to stdout.
pub fn print_report(report: &GradeReport) {
    print!("{}", format_report(report));
}

fn row(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "  {key:<26} {value}");
}
