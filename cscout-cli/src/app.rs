//! Wiring shared by every command: configuration, engine, model, and store.

use anyhow::Context;
use cscout_analyzer::BugEngine;
use cscout_core::{CscoutConfig, FindingStore, SqliteStore, Taxonomy, TrainingExample};
use cscout_ml::{ClassifierDetector, FsModelStore, MlError, TrainingSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct App {
    pub workspace: PathBuf,
    pub config: CscoutConfig,
    pub classifier: Arc<ClassifierDetector>,
    pub engine: Arc<BugEngine>,
    models: FsModelStore,
}

impl App {
    pub fn new(workspace: &Path, config: CscoutConfig) -> Self {
        let taxonomy = Arc::new(Taxonomy::standard());
        let classifier = Arc::new(ClassifierDetector::new(
            Arc::clone(&taxonomy),
            config.classifier.clone(),
        ));
        let engine = Arc::new(BugEngine::new(
            taxonomy,
            &config.detection,
            Arc::clone(&classifier),
        ));

        Self {
            workspace: workspace.to_path_buf(),
            models: FsModelStore::new(workspace),
            config,
            classifier,
            engine,
        }
    }

    fn model_key(&self) -> String {
        self.config.classifier.model_path.to_string_lossy().into_owned()
    }

    pub fn model_path(&self) -> PathBuf {
        CscoutConfig::resolve(&self.workspace, &self.config.classifier.model_path)
    }

    pub fn database_path(&self) -> PathBuf {
        CscoutConfig::resolve(&self.workspace, &self.config.storage.database_path)
    }

    /// Open the finding store, or `None` when storage is disabled.
    pub fn open_store(&self) -> anyhow::Result<Option<SqliteStore>> {
        if !self.config.storage.enabled {
            return Ok(None);
        }
        let path = self.database_path();
        let store = SqliteStore::open(&path)
            .with_context(|| format!("Failed to open finding store at {}", path.display()))?;
        Ok(Some(store))
    }

    /// Load the persisted model; if there is none, train from recorded
    /// samples when the store has any and save the result.
    pub fn load_or_train(&self, store: Option<&dyn FindingStore>) -> anyhow::Result<()> {
        if !self.config.detection.classifier {
            return Ok(());
        }

        match self.classifier.load(&self.models, &self.model_key()) {
            Ok(()) => return Ok(()),
            Err(MlError::ModelNotFound(_)) => {
                tracing::debug!(path = %self.model_path().display(), "No saved model");
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.model_path().display(),
                    "Ignoring unusable model: {}",
                    e
                );
                return Ok(());
            }
        }

        let Some(store) = store else {
            return Ok(());
        };
        let examples = store.training_examples()?;
        if examples.is_empty() {
            tracing::info!("Classifier untrained; run `cscout train` to enable it");
            return Ok(());
        }

        self.train(&examples)?;
        Ok(())
    }

    /// Train on `examples` and persist the model.
    pub fn train(&self, examples: &[TrainingExample]) -> anyhow::Result<TrainingSummary> {
        let summary = self.classifier.train(examples)?;
        self.classifier
            .save(&self.models, &self.model_key())
            .with_context(|| format!("Failed to save model to {}", self.model_path().display()))?;
        Ok(summary)
    }
}
