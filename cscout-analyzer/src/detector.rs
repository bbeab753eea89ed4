//! The detector seam the aggregator runs over.

use crate::error::DetectError;
use cscout_core::{DetectorKind, Finding};
use cscout_ml::ClassifierDetector;

/// A single analysis pass over a source text.
pub trait Detector: Send + Sync {
    /// Which detector family produced the findings.
    fn kind(&self) -> DetectorKind;

    /// Name used in logs and failure diagnostics.
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Run the pass. Parse failures are findings, not errors.
    fn detect(&self, source_text: &str) -> Result<Vec<Finding>, DetectError>;
}

impl Detector for ClassifierDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Classifier
    }

    fn detect(&self, source_text: &str) -> Result<Vec<Finding>, DetectError> {
        Ok(self.predict(source_text))
    }
}
