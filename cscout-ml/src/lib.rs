//! # cscout ML
//!
//! The learned classifier detector: a TF-IDF vectorizer over identifier-like
//! tokens feeding one logistic regression per bug category. Models are plain
//! JSON blobs persisted through a [`ModelStore`], and the detector itself is an
//! explicit `Untrained -> Trained` state machine behind a read/write lock so
//! predictions can run concurrently.

pub mod corpus;
pub mod detector;
pub mod error;
pub mod logistic;
pub mod model;
pub mod model_store;
pub mod vectorizer;

pub use corpus::{load_examples, seed_corpus};
pub use detector::{ClassifierDetector, ModelInfo, TrainingSummary};
pub use error::MlError;
pub use logistic::{LogisticUnit, TrainingParams};
pub use model::{ClassifierModel, MODEL_FORMAT_VERSION};
pub use model_store::{FsModelStore, InMemoryModelStore, ModelStore};
pub use vectorizer::TfidfVectorizer;
