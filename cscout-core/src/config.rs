//! Configuration system for cscout.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/cscout/config.toml` and/or `.cscout/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CscoutConfig {
    /// Which detectors the aggregator runs.
    pub detection: DetectionConfig,
    /// Learned classifier hyper-parameters and model location.
    pub classifier: ClassifierConfig,
    /// Finding store settings.
    pub storage: StorageConfig,
}

/// Detector toggles for the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub lexical: bool,
    pub structural: bool,
    pub classifier: bool,
    /// Run the detectors on scoped threads. Output order is unaffected.
    pub parallel: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lexical: true,
            structural: true,
            classifier: true,
            parallel: false,
        }
    }
}

/// Learned classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Vocabulary cap for the TF-IDF vectorizer.
    pub max_features: usize,
    /// Full-batch gradient descent iterations per category.
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty on the weights (not the bias).
    pub l2_penalty: f64,
    /// Probability at or above which a category is predicted.
    pub threshold: f64,
    /// Model file, relative paths resolve against the workspace.
    pub model_path: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            epochs: 500,
            learning_rate: 1.0,
            l2_penalty: 1e-3,
            threshold: 0.5,
            model_path: PathBuf::from("models/bug_detector.json"),
        }
    }
}

/// Finding store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Record analyzed samples, findings, and fixes.
    pub enabled: bool,
    /// SQLite database, relative paths resolve against the workspace.
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: PathBuf::from("bugs.db"),
        }
    }
}

impl CscoutConfig {
    /// Resolve a possibly relative path against the workspace root.
    pub fn resolve(workspace: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            workspace.join(path)
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "cscout", "cscout")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `CSCOUT_`)
/// 2. Workspace-local config (`.cscout/config.toml`)
/// 3. User config (`~/.config/cscout/config.toml`)
/// 4. Built-in defaults
pub fn load_config(workspace: Option<&Path>) -> Result<CscoutConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(CscoutConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".cscout").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // CSCOUT_CLASSIFIER__THRESHOLD, CSCOUT_DETECTION__PARALLEL, etc.
    figment = figment.merge(Env::prefixed("CSCOUT_").split("__"));

    figment.extract().map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CscoutConfig::default();
        assert!(config.detection.lexical);
        assert!(config.detection.structural);
        assert!(config.detection.classifier);
        assert!(!config.detection.parallel);
        assert_eq!(config.classifier.max_features, 1000);
        assert_eq!(config.classifier.threshold, 0.5);
        assert_eq!(config.storage.database_path, PathBuf::from("bugs.db"));
    }

    #[test]
    fn test_workspace_config_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg_dir = dir.path().join(".cscout");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[detection]\nclassifier = false\n\n[classifier]\nmax_features = 50\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert!(!config.detection.classifier);
        assert!(config.detection.lexical);
        assert_eq!(config.classifier.max_features, 50);
    }

    #[test]
    fn test_workspace_layer_keeps_unset_sections() {
        let dir = TempDir::new().unwrap();
        let cfg_dir = dir.path().join(".cscout");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[storage]\nenabled = false\n\n[classifier]\nthreshold = 0.7\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert!(!config.storage.enabled);
        assert_eq!(config.storage.database_path, PathBuf::from("bugs.db"));
        assert_eq!(config.classifier.threshold, 0.7);
        assert_eq!(config.classifier.max_features, 1000);
    }

    #[test]
    fn test_partial_toml_deserializes_with_defaults() {
        let config: CscoutConfig = toml::from_str("[storage]\nenabled = false\n").unwrap();
        assert!(!config.storage.enabled);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let ws = Path::new("/work");
        assert_eq!(
            CscoutConfig::resolve(ws, Path::new("bugs.db")),
            PathBuf::from("/work/bugs.db")
        );
        assert_eq!(
            CscoutConfig::resolve(ws, Path::new("/tmp/bugs.db")),
            PathBuf::from("/tmp/bugs.db")
        );
    }
}
