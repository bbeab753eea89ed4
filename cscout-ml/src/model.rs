//! The persisted classifier model and its serialized format.

use crate::error::MlError;
use crate::logistic::{LogisticUnit, TrainingParams};
use crate::vectorizer::TfidfVectorizer;
use chrono::{DateTime, Utc};
use cscout_core::{BugCategory, ClassifierConfig, Taxonomy, TrainingExample};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Bumped whenever the serialized layout changes incompatibly.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// A fitted multi-label classifier: one logistic unit per taxonomy category,
/// all sharing the same TF-IDF feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierModel {
    pub format_version: u32,
    /// Category per unit, in taxonomy order.
    pub labels: Vec<BugCategory>,
    pub threshold: f64,
    pub vectorizer: TfidfVectorizer,
    pub units: Vec<LogisticUnit>,
    pub trained_examples: usize,
    pub trained_at: DateTime<Utc>,
}

impl ClassifierModel {
    /// Fit a model on labelled examples.
    pub fn fit(
        taxonomy: &Taxonomy,
        examples: &[TrainingExample],
        config: &ClassifierConfig,
    ) -> Result<Self, MlError> {
        if examples.is_empty() {
            return Err(MlError::EmptyCorpus);
        }
        if config.max_features == 0 {
            return Err(MlError::invalid_input("max_features must be positive"));
        }
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(MlError::invalid_input(format!(
                "threshold {} is outside [0, 1]",
                config.threshold
            )));
        }

        let documents: Vec<&str> = examples.iter().map(|e| e.source_text.as_str()).collect();
        let vectorizer = TfidfVectorizer::fit(&documents, config.max_features);
        let features: Vec<Vec<f64>> = documents
            .iter()
            .map(|doc| vectorizer.transform(doc))
            .collect();

        let params = TrainingParams {
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            l2_penalty: config.l2_penalty,
        };

        let units = taxonomy
            .categories()
            .iter()
            .map(|&category| {
                let targets: Vec<bool> = examples.iter().map(|e| e.has(category)).collect();
                LogisticUnit::fit(&features, &targets, &params)
            })
            .collect();

        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            labels: taxonomy.categories().to_vec(),
            threshold: config.threshold,
            vectorizer,
            units,
            trained_examples: examples.len(),
            trained_at: Utc::now(),
        })
    }

    /// Per-category probability for a source text, in label order.
    pub fn probabilities(&self, source_text: &str) -> Vec<(BugCategory, f64)> {
        let row = self.vectorizer.transform(source_text);
        self.labels
            .iter()
            .zip(&self.units)
            .map(|(&category, unit)| (category, unit.probability(&row)))
            .collect()
    }

    /// Categories whose probability reaches the threshold.
    pub fn positive(&self, source_text: &str) -> Vec<(BugCategory, f64)> {
        self.probabilities(source_text)
            .into_iter()
            .filter(|(_, p)| *p >= self.threshold)
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MlError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize and validate a model against the running taxonomy.
    pub fn from_bytes(bytes: &[u8], taxonomy: &Taxonomy) -> Result<Self, MlError> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate(taxonomy)?;
        Ok(model)
    }

    /// SHA-256 of the serialized model, for logging which model is active.
    pub fn checksum(&self) -> Result<String, MlError> {
        Ok(digest(&self.to_bytes()?))
    }

    fn validate(&self, taxonomy: &Taxonomy) -> Result<(), MlError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(MlError::incompatible(format!(
                "format version {} (expected {})",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.labels.as_slice() != taxonomy.categories() {
            return Err(MlError::incompatible(
                "label list does not match the bug taxonomy",
            ));
        }
        if self.units.len() != self.labels.len() {
            return Err(MlError::incompatible(format!(
                "{} units for {} labels",
                self.units.len(),
                self.labels.len()
            )));
        }
        self.vectorizer.validate().map_err(MlError::IncompatibleModel)?;
        let dims = self.vectorizer.vocabulary_size();
        if let Some(unit) = self.units.iter().find(|u| u.weights.len() != dims) {
            return Err(MlError::incompatible(format!(
                "unit has {} weights for a {}-term vocabulary",
                unit.weights.len(),
                dims
            )));
        }
        Ok(())
    }
}

/// Hex SHA-256 of serialized model bytes.
pub(crate) fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
