//! Lexical pattern detector: one regex rule per category.
//!
//! Rules are purely textual. An allocation freed in another function is
//! still reported, and a release hidden behind a helper is not noticed.
//! Where a pattern needs to look past its own match, the rule carries a
//! `Suppression` check evaluated on the surrounding text.

use crate::detector::Detector;
use crate::error::DetectError;
use cscout_core::{BugCategory, DetectorKind, Finding, Taxonomy};
use regex::{Captures, Regex};
use std::sync::Arc;

/// Context check that discards an otherwise matching occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suppression {
    None,
    /// `free` appears between the match and the next `}`.
    ReleasedBeforeBlockEnd,
    /// Earlier on the same line the captured variable is already tested
    /// (`var != NULL &&` or `var &&`).
    GuardedOnLine,
    /// The text up to the next `;` assigns with `=`.
    AssignedBeforeNextStatement,
}

#[derive(Debug, Clone)]
struct LexicalRule {
    category: BugCategory,
    pattern: Regex,
    suppression: Suppression,
}

impl LexicalRule {
    fn new(category: BugCategory, pattern: &str, suppression: Suppression) -> Self {
        Self {
            category,
            pattern: Regex::new(pattern).expect("built-in lexical pattern is valid"),
            suppression,
        }
    }

    fn is_suppressed(&self, source: &str, caps: &Captures<'_>) -> bool {
        let Some(whole) = caps.get(0) else {
            return false;
        };
        match self.suppression {
            Suppression::None => false,
            Suppression::ReleasedBeforeBlockEnd => {
                let rest = &source[whole.end()..];
                let block = rest.find('}').map_or(rest, |idx| &rest[..idx]);
                block.contains("free")
            }
            Suppression::GuardedOnLine => {
                let Some(var) = caps.get(1) else {
                    return false;
                };
                let line_start = source[..whole.start()].rfind('\n').map_or(0, |idx| idx + 1);
                let prefix = &source[line_start..whole.start()];
                is_guarded(prefix, var.as_str())
            }
            Suppression::AssignedBeforeNextStatement => {
                let rest = &source[whole.end()..];
                let statement = rest.find(';').map_or(rest, |idx| &rest[..idx]);
                statement.contains('=')
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `prefix` tests `var` ahead of a `&&`, as `var &&` or
/// `var != NULL &&`.
fn is_guarded(prefix: &str, var: &str) -> bool {
    prefix.match_indices(var).any(|(idx, _)| {
        if prefix[..idx].chars().next_back().is_some_and(is_word_char) {
            return false;
        }
        let rest = prefix[idx + var.len()..].trim_start();
        let rest = rest
            .strip_prefix("!=")
            .map(str::trim_start)
            .and_then(|r| r.strip_prefix("NULL"))
            .map_or(rest, str::trim_start);
        rest.starts_with("&&")
    })
}

/// The built-in rule set, in reporting order.
fn default_rules() -> Vec<LexicalRule> {
    vec![
        LexicalRule::new(
            BugCategory::MemoryLeak,
            r"\bmalloc\s*\([^;]*\)[^;]*;",
            Suppression::ReleasedBeforeBlockEnd,
        ),
        LexicalRule::new(
            BugCategory::BufferOverflow,
            r"\b(strcpy|strcat|gets|scanf)\s*\([^;]*\)",
            Suppression::None,
        ),
        LexicalRule::new(
            BugCategory::NullPointer,
            r"(\w+)\s*->\s*\w+",
            Suppression::GuardedOnLine,
        ),
        LexicalRule::new(
            BugCategory::UninitializedVar,
            r"\bint\s+(\w+)\s*;",
            Suppression::AssignedBeforeNextStatement,
        ),
        LexicalRule::new(
            BugCategory::InfiniteLoop,
            r"\bwhile\s*\(\s*(?:1|true)\s*\)|\bfor\s*\(\s*;\s*;\s*\)",
            Suppression::None,
        ),
    ]
}

/// 1-indexed line of a byte offset.
pub(crate) fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Regex-driven detector over raw source text.
pub struct LexicalDetector {
    taxonomy: Arc<Taxonomy>,
    rules: Vec<LexicalRule>,
}

impl LexicalDetector {
    /// Create a detector with the built-in rules.
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            rules: default_rules(),
        }
    }

    /// Scan source text against all rules, rule by rule in order.
    pub fn scan_source(&self, source: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(source) {
                if rule.is_suppressed(source, &caps) {
                    continue;
                }
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let line = line_of(source, whole.start());
                findings.push(Finding::new(
                    &self.taxonomy,
                    rule.category,
                    line,
                    format!("Potential {} detected at line {}", rule.category, line),
                    DetectorKind::Lexical,
                ));
            }
        }

        findings
    }
}

impl Detector for LexicalDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Lexical
    }

    fn detect(&self, source_text: &str) -> Result<Vec<Finding>, DetectError> {
        Ok(self.scan_source(source_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cscout_core::Severity;
    use pretty_assertions::assert_eq;

    fn detector() -> LexicalDetector {
        LexicalDetector::new(Arc::new(Taxonomy::standard()))
    }

    fn hits(source: &str) -> Vec<(BugCategory, usize)> {
        detector()
            .scan_source(source)
            .iter()
            .map(|f| (f.category(), f.line()))
            .collect()
    }

    #[test]
    fn test_unreleased_allocation() {
        let source = "int* ptr = malloc(sizeof(int));\n*ptr = 42;\nreturn ptr;\n";
        assert_eq!(hits(source), vec![(BugCategory::MemoryLeak, 1)]);
    }

    #[test]
    fn test_released_allocation_is_suppressed() {
        let source = "int* ptr = malloc(sizeof(int));\n*ptr = 42;\nfree(ptr);\nreturn 0;\n";
        assert!(hits(source).is_empty());
    }

    #[test]
    fn test_release_after_block_end_does_not_count() {
        let source = "void f() {\n    char *p = malloc(8);\n}\nvoid g(char *p) { free(p); }\n";
        assert_eq!(hits(source), vec![(BugCategory::MemoryLeak, 2)]);
    }

    #[test]
    fn test_unbounded_copy_primitives() {
        let source = "char buffer[5];\nstrcpy(buffer, \"This is too long\");\ngets(line);\n";
        assert_eq!(
            hits(source),
            vec![
                (BugCategory::BufferOverflow, 2),
                (BugCategory::BufferOverflow, 3)
            ]
        );
    }

    #[test]
    fn test_bounded_variants_not_flagged() {
        let source = "strncpy(a, b, 4);\nfgets(line, 80, stdin);\n";
        assert!(hits(source).is_empty());
    }

    #[test]
    fn test_dereference_flagged() {
        let source = "struct Node* node;\nnode->data = 42;\n";
        assert_eq!(hits(source), vec![(BugCategory::NullPointer, 2)]);
    }

    #[test]
    fn test_guarded_dereference_suppressed() {
        assert!(hits("if (node != NULL && node->next) {}\n").is_empty());
        assert!(hits("if (node && node->next) {}\n").is_empty());
    }

    #[test]
    fn test_guard_on_other_variable_does_not_suppress() {
        let source = "if (head && node->next) {}\n";
        assert_eq!(hits(source), vec![(BugCategory::NullPointer, 1)]);
    }

    #[test]
    fn test_guard_needs_whole_variable_name() {
        assert!(is_guarded("if (node  !=  NULL  &&  ", "node"));
        assert!(!is_guarded("if (xnode && ", "node"));
        assert!(!is_guarded("if (node != 0 && ", "node"));
        assert!(!is_guarded("if (node || ", "node"));
        assert_eq!(
            hits("if (other_node && node->next) {}\n"),
            vec![(BugCategory::NullPointer, 1)]
        );
    }

    #[test]
    fn test_uninitialized_int() {
        let source = "int count;\nreturn count;\n";
        assert_eq!(hits(source), vec![(BugCategory::UninitializedVar, 1)]);
    }

    #[test]
    fn test_int_assigned_in_next_statement_suppressed() {
        assert!(hits("int count;\ncount = 3;\n").is_empty());
        assert!(hits("int total = 0;\n").is_empty());
    }

    #[test]
    fn test_literal_true_loops() {
        let source = "while(1) {\n}\nwhile (true) {}\nfor(;;) {}\nwhile (running) {}\n";
        assert_eq!(
            hits(source),
            vec![
                (BugCategory::InfiniteLoop, 1),
                (BugCategory::InfiniteLoop, 3),
                (BugCategory::InfiniteLoop, 4)
            ]
        );
    }

    #[test]
    fn test_order_is_rule_then_match() {
        let source = "while(1) {}\nchar *p = malloc(4);\nstrcpy(p, s);\n";
        assert_eq!(
            hits(source),
            vec![
                (BugCategory::MemoryLeak, 2),
                (BugCategory::BufferOverflow, 3),
                (BugCategory::InfiniteLoop, 1)
            ]
        );
    }

    #[test]
    fn test_description_and_severity() {
        let findings = detector().scan_source("\n\nwhile (1) {}\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].description(),
            "Potential infinite_loop detected at line 3"
        );
        assert_eq!(findings[0].severity(), Severity::Medium);
        assert_eq!(findings[0].detector(), DetectorKind::Lexical);
    }

    #[test]
    fn test_identifiers_containing_keywords_ignored() {
        assert!(hits("my_malloc(4);\nxgets(b);\nprint(1);\n").is_empty());
    }

    #[test]
    fn test_line_of() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 2), 2);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
