//! Fix synthesizer: deterministic per-category text rewrites.
//!
//! A fix rewrites or follows exactly one source line. Rewrites are not
//! checked for correctness; they are advisory. Findings with no concrete line
//! (line 0), lines past the end of the source, and categories without a
//! rewrite rule all yield `None`.

use crate::error::FixError;
use cscout_core::{BugCategory, Finding, Fix, FixEdit};
use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

static MALLOC_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\s*=\s*(?:\([^)]*\)\s*)?malloc").expect("malloc pattern is valid")
});
// The source argument may hold one level of nested parentheses and stops at
// the call's own closing paren.
static STRCPY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bstrcpy\s*\(\s*([^,()]+?)\s*,\s*((?:[^()]|\([^()]*\))+?)\s*\)")
        .expect("strcpy pattern is valid")
});
static STRCAT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bstrcat\s*\(\s*([^,()]+?)\s*,\s*((?:[^()]|\([^()]*\))+?)\s*\)")
        .expect("strcat pattern is valid")
});
static GETS_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bgets\s*\(\s*([^()]+?)\s*\)").expect("gets pattern is valid")
});
static DEREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*->").expect("dereference pattern is valid"));
static INT_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bint\s+(\w+)\s*;").expect("declaration pattern is valid"));
static WHILE_TRUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bwhile\s*\(\s*(?:1|true)\s*\)").expect("loop pattern is valid")
});

const LOOP_COMMENT: &str = "// supply a real exit condition";

/// Propose a fix for a finding against the source it was reported in.
pub fn synthesize(finding: &Finding, source_text: &str) -> Option<Fix> {
    match try_synthesize(finding, source_text) {
        Ok(fix) => fix,
        Err(e) => {
            tracing::trace!(category = %finding.category(), "No fix: {}", e);
            None
        }
    }
}

fn try_synthesize(finding: &Finding, source_text: &str) -> Result<Option<Fix>, FixError> {
    let category = finding.category();
    if matches!(
        category,
        BugCategory::MissingReturn | BugCategory::SyntaxError
    ) {
        return Ok(None);
    }

    let line_no = finding.line();
    let line = source_line(source_text, line_no)?;
    let indent = indentation(line);

    let rewrite = match category {
        BugCategory::MemoryLeak => MALLOC_ASSIGN.captures(line).map(|caps| {
            (
                format!("{indent}free({});", &caps[1]),
                FixEdit::InsertAfter,
                "Release the allocation once it is no longer needed",
            )
        }),
        BugCategory::BufferOverflow => bounded_copy(line)
            .map(|(text, note)| (text, FixEdit::ReplaceLine, note)),
        BugCategory::NullPointer => DEREF.captures(line).map(|caps| {
            let var = &caps[1];
            (
                format!(
                    "{indent}if ({var} != NULL) {{\n{indent}    {}\n{indent}}}",
                    line.trim()
                ),
                FixEdit::ReplaceLine,
                "Check the pointer against NULL before dereferencing",
            )
        }),
        // Every bare declaration on the line is initialized, so findings that
        // share a line share one fix.
        BugCategory::UninitializedVar => INT_DECL.is_match(line).then(|| {
            (
                INT_DECL
                    .replace_all(line, |caps: &Captures<'_>| {
                        format!("int {} = 0;", &caps[1])
                    })
                    .into_owned(),
                FixEdit::ReplaceLine,
                "Initialize the variable at its declaration",
            )
        }),
        BugCategory::InfiniteLoop => WHILE_TRUE.find(line).map(|_| {
            let rewritten = WHILE_TRUE.replace(line, NoExpand("while (condition)"));
            (
                format!("{} {LOOP_COMMENT}", rewritten.trim_end()),
                FixEdit::ReplaceLine,
                "Replace the constant condition with a real exit condition",
            )
        }),
        BugCategory::MissingReturn | BugCategory::SyntaxError => None,
    };

    Ok(rewrite.map(|(replacement_text, edit, note)| Fix {
        category,
        applies_to_line: line_no,
        original_text: line.to_string(),
        replacement_text,
        edit,
        note: note.to_string(),
    }))
}

/// Swap an unbounded copy or read for its bounded variant.
fn bounded_copy(line: &str) -> Option<(String, &'static str)> {
    if let Some(caps) = STRCPY_CALL.captures(line) {
        let (dest, src) = (&caps[1], &caps[2]);
        let call = format!("strncpy({dest}, {src}, sizeof({dest}) - 1)");
        return Some((
            STRCPY_CALL.replace(line, NoExpand(&call)).into_owned(),
            "Bound the copy by the destination size",
        ));
    }
    if let Some(caps) = STRCAT_CALL.captures(line) {
        let (dest, src) = (&caps[1], &caps[2]);
        let call = format!("strncat({dest}, {src}, sizeof({dest}) - strlen({dest}) - 1)");
        return Some((
            STRCAT_CALL.replace(line, NoExpand(&call)).into_owned(),
            "Bound the concatenation by the space left in the destination",
        ));
    }
    if let Some(caps) = GETS_CALL.captures(line) {
        let buf = &caps[1];
        let call = format!("fgets({buf}, sizeof({buf}), stdin)");
        return Some((
            GETS_CALL.replace(line, NoExpand(&call)).into_owned(),
            "Read with an explicit buffer size",
        ));
    }
    None
}

/// The 1-indexed line of `source`, where lines are separated by `\n`.
pub(crate) fn source_line(source: &str, line: usize) -> Result<&str, FixError> {
    let count = source.split('\n').count();
    if line == 0 {
        return Err(FixError::InvalidLine { line, count });
    }
    source
        .split('\n')
        .nth(line - 1)
        .ok_or(FixError::InvalidLine { line, count })
}

fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}
