//! Fix preview: renders what a fix would do, without touching any file.
//!
//! Lines are split on `\n` exactly as the synthesizer numbers them, so
//! `applies_to_line` indexes the same line in both places.

use crate::error::FixError;
use cscout_core::{Fix, FixEdit};
use similar::TextDiff;

/// Apply one fix to an in-memory copy of the source.
pub fn apply_fix(source: &str, fix: &Fix) -> Result<String, FixError> {
    let mut lines: Vec<&str> = source.split('\n').collect();
    let count = lines.len();
    if fix.applies_to_line == 0 || fix.applies_to_line > count {
        return Err(FixError::InvalidLine {
            line: fix.applies_to_line,
            count,
        });
    }

    let idx = fix.applies_to_line - 1;
    match fix.edit {
        FixEdit::ReplaceLine => lines[idx] = fix.replacement_text.as_str(),
        FixEdit::InsertAfter => lines.insert(idx + 1, fix.replacement_text.as_str()),
    }
    Ok(lines.join("\n"))
}

/// Apply several fixes, at most one per line.
///
/// Fixes are applied bottom-up so earlier line numbers stay valid.
pub fn apply_fixes(source: &str, fixes: &[&Fix]) -> Result<String, FixError> {
    let mut sorted: Vec<&Fix> = fixes.to_vec();
    sorted.sort_by(|a, b| b.applies_to_line.cmp(&a.applies_to_line));

    for window in sorted.windows(2) {
        if window[0].applies_to_line == window[1].applies_to_line {
            return Err(FixError::Conflict(window[0].applies_to_line));
        }
    }

    let mut result = source.to_string();
    for fix in sorted {
        result = apply_fix(&result, fix)?;
    }
    Ok(result)
}

/// Unified diff between the source and the source with `fixes` applied.
pub fn generate_patch(path: &str, source: &str, fixes: &[&Fix]) -> Result<String, FixError> {
    let patched = apply_fixes(source, fixes)?;
    let diff = TextDiff::from_lines(source, patched.as_str());

    let mut output = String::new();
    output.push_str(&format!("--- a/{path}\n"));
    output.push_str(&format!("+++ b/{path}\n"));
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&format!("{hunk}"));
    }
    Ok(output)
}
