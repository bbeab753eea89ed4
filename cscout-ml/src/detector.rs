//! The learned classifier detector.
//!
//! Holds the model as an explicit state machine:
//!
//! ```text
//! Untrained --train/load--> Trained --train/load--> Trained
//! ```
//!
//! Predictions take the read lock and may run concurrently; `train` and `load`
//! swap the whole model under the write lock. A failed `load` leaves the
//! previous state in place.

use crate::error::MlError;
use crate::model::{ClassifierModel, digest};
use crate::model_store::ModelStore;
use chrono::{DateTime, Utc};
use cscout_core::{BugCategory, ClassifierConfig, Finding, Taxonomy, TrainingExample};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
enum ModelState {
    Untrained,
    Trained(Arc<ClassifierModel>),
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub examples: usize,
    pub vocabulary_size: usize,
    /// Positive examples per category.
    pub label_counts: BTreeMap<BugCategory, usize>,
}

/// Metadata about the active model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub trained_examples: usize,
    pub vocabulary_size: usize,
    pub threshold: f64,
    pub trained_at: DateTime<Utc>,
    /// SHA-256 of the serialized model.
    pub checksum: Option<String>,
}

/// Multi-label classifier over whole source texts.
#[derive(Debug)]
pub struct ClassifierDetector {
    taxonomy: Arc<Taxonomy>,
    config: ClassifierConfig,
    state: RwLock<ModelState>,
}

impl ClassifierDetector {
    /// Create an untrained detector.
    pub fn new(taxonomy: Arc<Taxonomy>, config: ClassifierConfig) -> Self {
        Self {
            taxonomy,
            config,
            state: RwLock::new(ModelState::Untrained),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(*self.read_state(), ModelState::Trained(_))
    }

    pub fn model_info(&self) -> Option<ModelInfo> {
        match &*self.read_state() {
            ModelState::Untrained => None,
            ModelState::Trained(model) => Some(ModelInfo {
                trained_examples: model.trained_examples,
                vocabulary_size: model.vectorizer.vocabulary_size(),
                threshold: model.threshold,
                trained_at: model.trained_at,
                checksum: model.checksum().ok(),
            }),
        }
    }

    /// Fit a fresh model and make it active.
    pub fn train(&self, examples: &[TrainingExample]) -> Result<TrainingSummary, MlError> {
        let model = ClassifierModel::fit(&self.taxonomy, examples, &self.config)?;

        let label_counts = self
            .taxonomy
            .categories()
            .iter()
            .map(|&category| (category, examples.iter().filter(|e| e.has(category)).count()))
            .collect();
        let summary = TrainingSummary {
            examples: examples.len(),
            vocabulary_size: model.vectorizer.vocabulary_size(),
            label_counts,
        };

        tracing::info!(
            examples = summary.examples,
            vocabulary = summary.vocabulary_size,
            "Classifier trained"
        );
        *self.write_state() = ModelState::Trained(Arc::new(model));
        Ok(summary)
    }

    /// Predict file-level findings for a source text.
    ///
    /// An untrained detector reports nothing.
    pub fn predict(&self, source_text: &str) -> Vec<Finding> {
        let model = match &*self.read_state() {
            ModelState::Untrained => {
                tracing::debug!("Classifier is untrained, skipping prediction");
                return Vec::new();
            }
            ModelState::Trained(model) => Arc::clone(model),
        };

        model
            .positive(source_text)
            .into_iter()
            .map(|(category, p)| {
                Finding::predicted(
                    &self.taxonomy,
                    category,
                    p,
                    format!("Potential {} detected (confidence {:.2})", category, p),
                )
            })
            .collect()
    }

    /// Persist the active model under `key`.
    pub fn save(&self, store: &dyn ModelStore, key: &str) -> Result<(), MlError> {
        let model = match &*self.read_state() {
            ModelState::Untrained => return Err(MlError::ModelNotTrained),
            ModelState::Trained(model) => Arc::clone(model),
        };
        let bytes = model.to_bytes()?;
        store.write(key, &bytes)?;
        tracing::info!(key, checksum = %digest(&bytes), "Classifier model saved");
        Ok(())
    }

    /// Replace the active model with the one stored under `key`.
    pub fn load(&self, store: &dyn ModelStore, key: &str) -> Result<(), MlError> {
        let bytes = store
            .read(key)?
            .ok_or_else(|| MlError::ModelNotFound(key.to_string()))?;
        let model = ClassifierModel::from_bytes(&bytes, &self.taxonomy)?;

        tracing::info!(
            key,
            checksum = %digest(&bytes),
            examples = model.trained_examples,
            vocabulary = model.vectorizer.vocabulary_size(),
            "Classifier model loaded"
        );
        *self.write_state() = ModelState::Trained(Arc::new(model));
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ModelState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ModelState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
