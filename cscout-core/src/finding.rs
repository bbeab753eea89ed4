//! Finding and fix records: the canonical output of every detector.
//!
//! Findings carry no ids or timestamps so that repeated analyses of the same
//! text compare equal; storage keys come from [`Finding::fingerprint`].

use crate::category::{BugCategory, Severity, Taxonomy};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Which component produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Lexical,
    Structural,
    Classifier,
    /// Diagnostics raised by the aggregator when a detector fails.
    Engine,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Lexical => "lexical",
            DetectorKind::Structural => "structural",
            DetectorKind::Classifier => "classifier",
            DetectorKind::Engine => "engine",
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(DetectorKind::Lexical),
            "structural" => Ok(DetectorKind::Structural),
            "classifier" => Ok(DetectorKind::Classifier),
            "engine" => Ok(DetectorKind::Engine),
            other => Err(CoreError::UnknownDetector(other.to_string())),
        }
    }
}

/// A likely defect in a source file.
///
/// Fields are read-only; severity always comes from the taxonomy table and
/// `confidence` is only present on classifier findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    category: BugCategory,
    /// 1-indexed line, or 0 for file-level findings.
    line: usize,
    description: String,
    severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    detector: DetectorKind,
}

impl Finding {
    /// A finding attached to a concrete line (or line 0 for file-level).
    pub fn new(
        taxonomy: &Taxonomy,
        category: BugCategory,
        line: usize,
        description: impl Into<String>,
        detector: DetectorKind,
    ) -> Self {
        Self {
            category,
            line,
            description: description.into(),
            severity: taxonomy.severity_of(category),
            confidence: None,
            detector,
        }
    }

    /// A file-level classifier finding carrying the positive-class probability.
    pub fn predicted(
        taxonomy: &Taxonomy,
        category: BugCategory,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            line: 0,
            description: description.into(),
            severity: taxonomy.severity_of(category),
            confidence: Some(confidence.clamp(0.0, 1.0)),
            detector: DetectorKind::Classifier,
        }
    }

    /// Rebuild a finding exactly as it was recorded.
    pub(crate) fn restore(
        category: BugCategory,
        line: usize,
        description: String,
        severity: Severity,
        confidence: Option<f64>,
        detector: DetectorKind,
    ) -> Self {
        Self {
            category,
            line,
            description,
            severity,
            confidence,
            detector,
        }
    }

    pub fn category(&self) -> BugCategory {
        self.category
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn detector(&self) -> DetectorKind {
        self.detector
    }

    /// True when the finding names no specific line.
    pub fn is_file_level(&self) -> bool {
        self.line == 0
    }

    /// SHA-256 over the identifying fields, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.category.as_str().as_bytes());
        hasher.update(self.line.to_le_bytes());
        hasher.update(self.description.as_bytes());
        hasher.update(self.detector.as_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.category, self.detector, self.description
        )?;
        if let Some(confidence) = self.confidence {
            write!(f, " [confidence {confidence:.2}]")?;
        }
        Ok(())
    }
}

/// How a fix's replacement text relates to the original line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixEdit {
    /// The replacement text stands in for the original line.
    ReplaceLine,
    /// The replacement text goes on a new line after the original.
    InsertAfter,
}

impl FixEdit {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixEdit::ReplaceLine => "replace_line",
            FixEdit::InsertAfter => "insert_after",
        }
    }
}

impl FromStr for FixEdit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace_line" => Ok(FixEdit::ReplaceLine),
            "insert_after" => Ok(FixEdit::InsertAfter),
            other => Err(CoreError::UnknownFixEdit(other.to_string())),
        }
    }
}

/// An advisory textual rewrite for one finding. Never applied automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub category: BugCategory,
    /// 1-indexed line the fix targets.
    pub applies_to_line: usize,
    /// The line as it appears in the source.
    pub original_text: String,
    pub replacement_text: String,
    pub edit: FixEdit,
    /// Short human-readable explanation.
    pub note: String,
}
