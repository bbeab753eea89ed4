//! Plain-text rendering of reports and stored findings.

use cscout_analyzer::AnalysisReport;
use cscout_core::{Finding, Fix, FixEdit};
use std::fmt::Write;

fn location(finding: &Finding) -> String {
    if finding.is_file_level() {
        "file".to_string()
    } else {
        format!("line {}", finding.line())
    }
}

fn render_fix(out: &mut String, fix: &Fix) {
    let verb = match fix.edit {
        FixEdit::ReplaceLine => "replace with",
        FixEdit::InsertAfter => "insert after",
    };
    let _ = writeln!(out, "      fix ({verb}): {}", fix.note);
    for line in fix.replacement_text.lines() {
        let _ = writeln!(out, "        + {line}");
    }
}

/// Render one finding and, if present, its fix.
pub fn render_entry(out: &mut String, finding: &Finding, fix: Option<&Fix>) {
    let _ = writeln!(out, "  {:>8}  {finding}", location(finding));
    if let Some(fix) = fix {
        render_fix(out, fix);
    }
}

/// Render a report as a block headed by the source name.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    if !report.has_bugs() {
        let _ = writeln!(out, "{}: no issues found", report.name);
        return out;
    }

    let _ = writeln!(
        out,
        "{}: {} issue(s), {} fix(es) proposed",
        report.name,
        report.entries.len(),
        report.fixes().count()
    );
    for entry in &report.entries {
        render_entry(&mut out, &entry.finding, entry.fix.as_ref());
    }
    out
}
