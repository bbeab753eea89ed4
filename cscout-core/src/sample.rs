//! Labelled training examples for the learned classifier.

use crate::category::BugCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A source text together with the set of bug categories it exhibits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub source_text: String,
    #[serde(default)]
    pub labels: BTreeSet<BugCategory>,
}

impl TrainingExample {
    pub fn new(source_text: impl Into<String>, labels: impl IntoIterator<Item = BugCategory>) -> Self {
        Self {
            source_text: source_text.into(),
            labels: labels.into_iter().collect(),
        }
    }

    /// An example with no defects.
    pub fn clean(source_text: impl Into<String>) -> Self {
        Self::new(source_text, [])
    }

    pub fn has(&self, category: BugCategory) -> bool {
        self.labels.contains(&category)
    }
}
