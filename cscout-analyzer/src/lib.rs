//! # cscout Analyzer
//!
//! The C bug detection engine. Three detectors run over each source text:
//!
//! - **Lexical**: one regex rule per category, reported per line.
//! - **Structural**: a tree-sitter C parse, reporting syntax errors and
//!   functions that may not return a value.
//! - **Classifier**: the learned model from `cscout-ml`, reporting file-level
//!   findings with a confidence.
//!
//! [`BugEngine`] concatenates their findings in that order, and the fix
//! synthesizer proposes an advisory one-line rewrite per finding where a
//! rule exists.

pub mod aggregator;
pub mod detector;
pub mod error;
pub mod fixes;
pub mod lexical;
pub mod pipeline;
pub mod preview;
pub mod structural;

pub use aggregator::BugEngine;
pub use detector::Detector;
pub use error::{DetectError, FixError};
pub use fixes::synthesize;
pub use lexical::LexicalDetector;
pub use pipeline::{AnalysisReport, ReportEntry, record_analysis, record_report};
pub use preview::{apply_fix, apply_fixes, generate_patch};
pub use structural::StructuralDetector;
