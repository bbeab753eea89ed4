//! Finding aggregator: runs every enabled detector and concatenates results.
//!
//! Output order is always lexical, structural, classifier, whatever order the
//! detectors finish in. Findings are not deduplicated across detectors: the
//! same defect may legitimately show up once per detector. A detector that
//! fails is reported as one `syntax_error` diagnostic from the engine and the
//! remaining detectors still run.

use crate::detector::Detector;
use crate::error::DetectError;
use crate::fixes;
use crate::lexical::LexicalDetector;
use crate::structural::StructuralDetector;
use cscout_core::{BugCategory, DetectionConfig, DetectorKind, Finding, Fix, Taxonomy};
use cscout_ml::ClassifierDetector;
use std::sync::Arc;

/// The bug detection engine.
pub struct BugEngine {
    taxonomy: Arc<Taxonomy>,
    detectors: Vec<Arc<dyn Detector>>,
    parallel: bool,
}

impl BugEngine {
    /// Build the standard pipeline from detection toggles.
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        detection: &DetectionConfig,
        classifier: Arc<ClassifierDetector>,
    ) -> Self {
        let mut detectors: Vec<Arc<dyn Detector>> = Vec::new();
        if detection.lexical {
            detectors.push(Arc::new(LexicalDetector::new(Arc::clone(&taxonomy))));
        }
        if detection.structural {
            detectors.push(Arc::new(StructuralDetector::new(Arc::clone(&taxonomy))));
        }
        if detection.classifier {
            detectors.push(classifier);
        }

        Self {
            taxonomy,
            detectors,
            parallel: detection.parallel,
        }
    }

    /// Build from an explicit detector list, run in the given order.
    pub fn from_detectors(taxonomy: Arc<Taxonomy>, detectors: Vec<Arc<dyn Detector>>) -> Self {
        Self {
            taxonomy,
            detectors,
            parallel: false,
        }
    }

    /// Run detectors on scoped threads.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Names of the detectors that will run, in order.
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Analyze one source text. Never fails; detector errors become findings.
    pub fn analyze(&self, source_text: &str) -> Vec<Finding> {
        let results: Vec<(&str, Result<Vec<Finding>, DetectError>)> = if self.parallel {
            self.run_parallel(source_text)
        } else {
            self.detectors
                .iter()
                .map(|detector| (detector.name(), detector.detect(source_text)))
                .collect()
        };

        let mut findings = Vec::new();
        for (name, result) in results {
            match result {
                Ok(found) => {
                    tracing::debug!(detector = name, count = found.len(), "Detector finished");
                    findings.extend(found);
                }
                Err(e) => {
                    tracing::warn!(detector = name, error = %e, "Detector failed");
                    findings.push(self.failure_finding(name, &e.to_string()));
                }
            }
        }
        findings
    }

    /// Propose a fix for a finding from this engine.
    pub fn synthesize(&self, finding: &Finding, source_text: &str) -> Option<Fix> {
        fixes::synthesize(finding, source_text)
    }

    /// Analyze and pair each finding with its proposed fix.
    pub fn analyze_with_fixes(&self, source_text: &str) -> Vec<(Finding, Option<Fix>)> {
        self.analyze(source_text)
            .into_iter()
            .map(|finding| {
                let fix = self.synthesize(&finding, source_text);
                (finding, fix)
            })
            .collect()
    }

    fn run_parallel<'a>(
        &'a self,
        source_text: &str,
    ) -> Vec<(&'a str, Result<Vec<Finding>, DetectError>)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .detectors
                .iter()
                .map(|detector| {
                    let handle = scope.spawn(move || detector.detect(source_text));
                    (detector.name(), handle)
                })
                .collect();

            // Joined in spawn order so output order matches the sequential path.
            handles
                .into_iter()
                .map(|(name, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| Err(DetectError::Other("detector panicked".into())));
                    (name, result)
                })
                .collect()
        })
    }

    fn failure_finding(&self, detector: &str, error: &str) -> Finding {
        Finding::new(
            &self.taxonomy,
            BugCategory::SyntaxError,
            0,
            format!("{detector} detector failed: {error}"),
            DetectorKind::Engine,
        )
    }
}
