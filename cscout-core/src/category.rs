//! Bug taxonomy: the closed set of categories every detector reports in.
//!
//! The category list is a compile-time constant. Components never consult a
//! global registry; they receive a [`Taxonomy`] at construction and derive
//! severities from its static table.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A kind of defect the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugCategory {
    MemoryLeak,
    BufferOverflow,
    NullPointer,
    UninitializedVar,
    InfiniteLoop,
    MissingReturn,
    SyntaxError,
}

impl BugCategory {
    /// Every category, in label-space order.
    pub const ALL: [BugCategory; 7] = [
        BugCategory::MemoryLeak,
        BugCategory::BufferOverflow,
        BugCategory::NullPointer,
        BugCategory::UninitializedVar,
        BugCategory::InfiniteLoop,
        BugCategory::MissingReturn,
        BugCategory::SyntaxError,
    ];

    /// Return the canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BugCategory::MemoryLeak => "memory_leak",
            BugCategory::BufferOverflow => "buffer_overflow",
            BugCategory::NullPointer => "null_pointer",
            BugCategory::UninitializedVar => "uninitialized_var",
            BugCategory::InfiniteLoop => "infinite_loop",
            BugCategory::MissingReturn => "missing_return",
            BugCategory::SyntaxError => "syntax_error",
        }
    }
}

impl std::fmt::Display for BugCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BugCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BugCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Return the display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(CoreError::UnknownSeverity(other.to_string())),
        }
    }
}

/// The category vocabulary plus its severity table.
///
/// Constructed once (usually via [`Taxonomy::standard`]) and shared behind an
/// `Arc` by every detector, the classifier label space, and the fix synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<BugCategory>,
    severities: BTreeMap<BugCategory, Severity>,
}

impl Taxonomy {
    /// The standard vocabulary with the fixed category→severity table.
    pub fn standard() -> Self {
        let severities = BugCategory::ALL
            .iter()
            .map(|&category| {
                let severity = match category {
                    BugCategory::MemoryLeak
                    | BugCategory::BufferOverflow
                    | BugCategory::NullPointer
                    | BugCategory::SyntaxError => Severity::High,
                    BugCategory::UninitializedVar | BugCategory::InfiniteLoop => Severity::Medium,
                    BugCategory::MissingReturn => Severity::Low,
                };
                (category, severity)
            })
            .collect();

        Self {
            categories: BugCategory::ALL.to_vec(),
            severities,
        }
    }

    /// Categories in label-space order.
    pub fn categories(&self) -> &[BugCategory] {
        &self.categories
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Severity assigned to every finding of `category`.
    pub fn severity_of(&self, category: BugCategory) -> Severity {
        self.severities
            .get(&category)
            .copied()
            .unwrap_or(Severity::Medium)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_roundtrip() {
        for category in BugCategory::ALL {
            assert_eq!(category.as_str().parse::<BugCategory>().unwrap(), category);
        }
        assert!("use_after_free".parse::<BugCategory>().is_err());
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&BugCategory::UninitializedVar).unwrap();
        assert_eq!(json, "\"uninitialized_var\"");
    }

    #[test]
    fn test_standard_severity_table() {
        let taxonomy = Taxonomy::standard();
        assert_eq!(taxonomy.severity_of(BugCategory::MemoryLeak), Severity::High);
        assert_eq!(taxonomy.severity_of(BugCategory::BufferOverflow), Severity::High);
        assert_eq!(taxonomy.severity_of(BugCategory::NullPointer), Severity::High);
        assert_eq!(taxonomy.severity_of(BugCategory::SyntaxError), Severity::High);
        assert_eq!(
            taxonomy.severity_of(BugCategory::UninitializedVar),
            Severity::Medium
        );
        assert_eq!(taxonomy.severity_of(BugCategory::InfiniteLoop), Severity::Medium);
        assert_eq!(taxonomy.severity_of(BugCategory::MissingReturn), Severity::Low);
    }

    #[test]
    fn test_label_order_matches_all() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.categories(), &BugCategory::ALL);
        assert_eq!(taxonomy.categories()[0].as_str(), "memory_leak");
        assert_eq!(taxonomy.categories()[6].as_str(), "syntax_error");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!("medium".parse::<Severity>().unwrap(), Severity::Medium);
    }
}
