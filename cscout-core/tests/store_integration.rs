//! Integration tests for the SQLite finding store backed by a real file.

use cscout_core::{
    BugCategory, DetectorKind, Finding, FindingStore, Fix, FixEdit, SqliteStore, Taxonomy,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn findings_survive_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("bugs.db");
    let taxonomy = Taxonomy::standard();

    let finding = Finding::new(
        &taxonomy,
        BugCategory::BufferOverflow,
        2,
        "Potential buffer_overflow detected at line 2",
        DetectorKind::Lexical,
    );
    let fix = Fix {
        category: BugCategory::BufferOverflow,
        applies_to_line: 2,
        original_text: "strcpy(buffer, \"This is too long\");".into(),
        replacement_text: "strncpy(buffer, \"This is too long\", sizeof(buffer) - 1);".into(),
        edit: FixEdit::ReplaceLine,
        note: "Use the bounded copy".into(),
    };

    {
        let store = SqliteStore::open(&db_path).unwrap();
        let sample = store
            .store_sample(
                "overflow.c",
                "char buffer[5];\nstrcpy(buffer, \"This is too long\");\n",
                true,
            )
            .unwrap();
        let id = store.store_finding(sample, &finding).unwrap();
        store.store_fix(id, &fix).unwrap();
    }

    let reopened = SqliteStore::open(&db_path).unwrap();
    assert_eq!(reopened.sample_count().unwrap(), 1);
    let results = reopened
        .query_findings(Some(BugCategory::BufferOverflow))
        .unwrap();
    assert_eq!(results, vec![(finding, Some(fix))]);
}

#[test]
fn recorded_samples_become_training_examples() {
    let taxonomy = Taxonomy::standard();
    let store = SqliteStore::in_memory().unwrap();

    let loop_sample = store
        .store_sample("loop.c", "while(1) {\n}\n", true)
        .unwrap();
    store
        .store_finding(
            loop_sample,
            &Finding::new(
                &taxonomy,
                BugCategory::InfiniteLoop,
                1,
                "Potential infinite_loop detected at line 1",
                DetectorKind::Lexical,
            ),
        )
        .unwrap();
    store
        .store_finding(
            loop_sample,
            &Finding::new(
                &taxonomy,
                BugCategory::SyntaxError,
                0,
                "lexical detector failed: boom",
                DetectorKind::Engine,
            ),
        )
        .unwrap();

    let examples = store.training_examples().unwrap();
    assert_eq!(examples.len(), 1);
    assert_eq!(
        examples[0].labels.iter().copied().collect::<Vec<_>>(),
        vec![BugCategory::InfiniteLoop]
    );
}
