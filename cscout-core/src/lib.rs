//! # cscout Core
//!
//! Shared vocabulary for the cscout bug detection engine: the closed set of
//! bug categories and their severities, the finding and fix records every
//! detector produces, layered configuration, and the persistence collaborators
//! (SQLite finding store, atomic file writes, source provider).

pub mod category;
pub mod config;
pub mod error;
pub mod finding;
pub mod persistence;
pub mod sample;
pub mod source;
pub mod store;

// Re-export commonly used types at the crate root.
pub use category::{BugCategory, Severity, Taxonomy};
pub use config::{
    ClassifierConfig, CscoutConfig, DetectionConfig, StorageConfig, load_config,
};
pub use error::{CoreError, StoreError};
pub use finding::{DetectorKind, Finding, Fix, FixEdit};
pub use sample::TrainingExample;
pub use store::{FindingStore, SqliteStore};
