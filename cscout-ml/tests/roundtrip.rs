//! Model persistence round trips through the file-backed store.

use cscout_core::{ClassifierConfig, Taxonomy};
use cscout_ml::{ClassifierDetector, FsModelStore, MlError, ModelStore, seed_corpus};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::{Arc, OnceLock};
use tempfile::TempDir;

fn new_detector() -> ClassifierDetector {
    ClassifierDetector::new(Arc::new(Taxonomy::standard()), ClassifierConfig::default())
}

/// A trained detector plus a fresh one loaded from disk, shared across cases.
fn pair() -> &'static (ClassifierDetector, ClassifierDetector) {
    static PAIR: OnceLock<(ClassifierDetector, ClassifierDetector)> = OnceLock::new();
    PAIR.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let store = FsModelStore::new(dir.path());
        let trained = new_detector();
        trained.train(&seed_corpus()).unwrap();
        trained.save(&store, "models/bug_detector.json").unwrap();

        let loaded = new_detector();
        loaded.load(&store, "models/bug_detector.json").unwrap();
        (trained, loaded)
    })
}

#[test]
fn loaded_model_reproduces_confidences_exactly() {
    let (trained, loaded) = pair();
    for example in seed_corpus() {
        let before: Vec<_> = trained
            .predict(&example.source_text)
            .iter()
            .map(|f| (f.category(), f.confidence().unwrap().to_bits()))
            .collect();
        let after: Vec<_> = loaded
            .predict(&example.source_text)
            .iter()
            .map(|f| (f.category(), f.confidence().unwrap().to_bits()))
            .collect();
        assert_eq!(before, after);
    }
}

#[test]
fn saved_file_is_json_with_labels() {
    let dir = TempDir::new().unwrap();
    let store = FsModelStore::new(dir.path());
    let detector = new_detector();
    detector.train(&seed_corpus()).unwrap();
    detector.save(&store, "model.json").unwrap();

    let bytes = store.read("model.json").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["format_version"], 1);
    assert_eq!(value["labels"][0], "memory_leak");
    assert_eq!(value["labels"][6], "syntax_error");
}

#[test]
fn loading_from_empty_directory_is_model_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FsModelStore::new(dir.path());
    let detector = new_detector();
    assert!(matches!(
        detector.load(&store, "models/bug_detector.json"),
        Err(MlError::ModelNotFound(_))
    ));
}

proptest! {
    #[test]
    fn predictions_identical_after_reload(text in "[a-z_ (){};*=>0-9\n-]{0,200}") {
        let (trained, loaded) = pair();
        prop_assert_eq!(trained.predict(&text), loaded.predict(&text));
    }

    #[test]
    fn confidences_within_unit_interval(text in "\\PC{0,120}") {
        let (trained, _) = pair();
        for finding in trained.predict(&text) {
            let p = finding.confidence().unwrap();
            prop_assert!((0.5..=1.0).contains(&p));
            prop_assert_eq!(finding.line(), 0);
        }
    }
}
