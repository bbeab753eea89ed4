//! End-to-end engine behaviour on small C programs.

use cscout_analyzer::{BugEngine, apply_fix, generate_patch};
use cscout_core::{
    BugCategory, ClassifierConfig, DetectionConfig, DetectorKind, Finding, FixEdit, Taxonomy,
};
use cscout_ml::{ClassifierDetector, seed_corpus};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn engine() -> BugEngine {
    let taxonomy = Arc::new(Taxonomy::standard());
    let classifier = Arc::new(ClassifierDetector::new(
        Arc::clone(&taxonomy),
        ClassifierConfig::default(),
    ));
    classifier.train(&seed_corpus()).unwrap();
    BugEngine::new(taxonomy, &DetectionConfig::default(), classifier)
}

fn lexical(findings: &[Finding], category: BugCategory) -> Vec<&Finding> {
    findings
        .iter()
        .filter(|f| f.detector() == DetectorKind::Lexical && f.category() == category)
        .collect()
}

#[test]
fn unreleased_allocation_gets_free_after_it() {
    let engine = engine();
    let source = "int* ptr = malloc(sizeof(int));\n*ptr = 42;\nreturn ptr;\n";
    let findings = engine.analyze(source);

    let leaks = lexical(&findings, BugCategory::MemoryLeak);
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].line(), 1);

    let fix = engine.synthesize(leaks[0], source).unwrap();
    assert_eq!(fix.edit, FixEdit::InsertAfter);
    assert_eq!(fix.replacement_text, "free(ptr);");
    assert_eq!(
        apply_fix(source, &fix).unwrap(),
        "int* ptr = malloc(sizeof(int));\nfree(ptr);\n*ptr = 42;\nreturn ptr;\n"
    );
}

#[test]
fn dereference_gets_null_guard() {
    let engine = engine();
    let source = "struct Node* node;\nnode->data = 42;\n";
    let findings = engine.analyze(source);

    let derefs = lexical(&findings, BugCategory::NullPointer);
    assert_eq!(derefs.len(), 1);
    assert_eq!(derefs[0].line(), 2);

    let fix = engine.synthesize(derefs[0], source).unwrap();
    assert_eq!(
        fix.replacement_text,
        "if (node != NULL) {\n    node->data = 42;\n}"
    );
}

#[test]
fn strcpy_gets_bounded_copy() {
    let engine = engine();
    let source = "char buffer[5];\nstrcpy(buffer, \"This is too long\");\n";
    let findings = engine.analyze(source);

    let overflows = lexical(&findings, BugCategory::BufferOverflow);
    assert_eq!(overflows.len(), 1);
    assert_eq!(overflows[0].line(), 2);

    let fix = engine.synthesize(overflows[0], source).unwrap();
    assert!(fix.replacement_text.starts_with("strncpy(buffer,"));

    let patch = generate_patch("overflow.c", source, &[&fix]).unwrap();
    assert!(patch.contains("-strcpy(buffer, \"This is too long\");"));
}

#[test]
fn missing_return_has_no_fix() {
    let engine = engine();
    let source = "int get_value() { int x = 42; }\n";
    let findings = engine.analyze(source);

    let missing: Vec<_> = findings
        .iter()
        .filter(|f| f.category() == BugCategory::MissingReturn && f.line() > 0)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].detector(), DetectorKind::Structural);
    assert_eq!(missing[0].line(), 1);
    assert!(engine.synthesize(missing[0], source).is_none());
}

#[test]
fn released_allocation_is_not_a_leak() {
    let engine = engine();
    let source = "int* ptr = malloc(sizeof(int));\n*ptr = 42;\nfree(ptr);\nreturn 0;\n";
    let findings = engine.analyze(source);
    assert!(
        findings
            .iter()
            .all(|f| f.category() != BugCategory::MemoryLeak)
    );
}

#[test]
fn unparsable_input_yields_one_structural_syntax_error() {
    let engine = engine();
    let findings = engine.analyze("int main( {\n    while(1) {\n");

    let structural: Vec<_> = findings
        .iter()
        .filter(|f| f.detector() == DetectorKind::Structural)
        .collect();
    assert_eq!(structural.len(), 1);
    assert_eq!(structural[0].category(), BugCategory::SyntaxError);
    assert_eq!(structural[0].line(), 0);

    // The lexical detector still runs on the same text.
    assert_eq!(lexical(&findings, BugCategory::InfiniteLoop).len(), 1);
}

#[test]
fn analysis_is_deterministic() {
    let engine = engine();
    let source = include_str!("fixtures/linked_list.c");
    let first = engine.analyze(source);
    for _ in 0..3 {
        assert_eq!(engine.analyze(source), first);
    }
}

#[test]
fn linked_list_program() {
    let taxonomy = Arc::new(Taxonomy::standard());
    let classifier = Arc::new(ClassifierDetector::new(
        Arc::clone(&taxonomy),
        ClassifierConfig::default(),
    ));
    let detection = DetectionConfig {
        classifier: false,
        ..DetectionConfig::default()
    };
    let engine = BugEngine::new(taxonomy, &detection, classifier);
    let source = include_str!("fixtures/linked_list.c");

    let hits: Vec<(BugCategory, usize)> = engine
        .analyze(source)
        .iter()
        .map(|f| (f.category(), f.line()))
        .collect();
    assert_eq!(
        hits,
        vec![
            (BugCategory::MemoryLeak, 18),
            (BugCategory::BufferOverflow, 48),
            (BugCategory::NullPointer, 11),
            (BugCategory::NullPointer, 12),
            (BugCategory::NullPointer, 13),
            (BugCategory::NullPointer, 19),
            (BugCategory::NullPointer, 20),
            (BugCategory::NullPointer, 46),
            (BugCategory::NullPointer, 49),
            (BugCategory::UninitializedVar, 5),
            (BugCategory::InfiniteLoop, 32),
            (BugCategory::MissingReturn, 37),
        ]
    );
}

#[test]
fn untrained_classifier_contributes_nothing() {
    let taxonomy = Arc::new(Taxonomy::standard());
    let classifier = Arc::new(ClassifierDetector::new(
        Arc::clone(&taxonomy),
        ClassifierConfig::default(),
    ));
    let engine = BugEngine::new(taxonomy, &DetectionConfig::default(), classifier);
    let findings = engine.analyze("while(1) {\n    printf(\"Forever\");\n}\n");
    assert!(
        findings
            .iter()
            .all(|f| f.detector() != DetectorKind::Classifier)
    );
}
