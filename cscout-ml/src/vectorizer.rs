//! TF-IDF vectorizer over identifier-like tokens.
//!
//! Tokens are runs of two or more word characters in the lowercased text.
//! The vocabulary keeps the `max_features` most frequent terms across the
//! corpus (ties broken by term order) and assigns column indices in
//! alphabetical order. Once fitted the vocabulary is frozen; unknown terms
//! contribute nothing to a vector.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Split text into lowercased word tokens of length two or more.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A fitted TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Vocabulary in column order (alphabetical).
    terms: Vec<String>,
    /// Smoothed inverse document frequency per column.
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and IDF weights on a corpus.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Self {
        let mut corpus_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let tokens = tokenize(doc.as_ref());
            let mut seen: Vec<&str> = Vec::new();
            for token in &tokens {
                *corpus_counts.entry(token.clone()).or_insert(0) += 1;
                if !seen.contains(&token.as_str()) {
                    seen.push(token);
                    *doc_freq.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = corpus_counts.into_iter().collect();
        // BTreeMap iteration is already term-ordered, so a stable sort keeps ties by term.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        Self { terms, idf }
    }

    /// Transform a document into an L2-normalised dense TF-IDF vector.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0f64; self.terms.len()];
        for token in tokenize(text) {
            if let Ok(idx) = self.terms.binary_search(&token) {
                vector[idx] += 1.0;
            }
        }

        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    /// Number of columns produced by [`transform`](Self::transform).
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Check the invariants a deserialized vectorizer must satisfy.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.terms.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but {} idf weights",
                self.terms.len(),
                self.idf.len()
            ));
        }
        if self.terms.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("vocabulary is not strictly sorted".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_drops_single_chars() {
        assert_eq!(
            tokenize("int* PTR = malloc(sizeof(int)); x = 1;"),
            vec!["int", "ptr", "malloc", "sizeof", "int"]
        );
    }

    #[test]
    fn test_fit_vocabulary_is_alphabetical() {
        let vectorizer = TfidfVectorizer::fit(&["while loop", "malloc free", "while"], 100);
        assert_eq!(
            vectorizer.terms(),
            &["free", "loop", "malloc", "while"].map(String::from)
        );
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = ["alpha alpha beta", "alpha gamma gamma delta"];
        let vectorizer = TfidfVectorizer::fit(&docs, 2);
        // alpha:3, gamma:2, then beta/delta tie at 1.
        assert_eq!(vectorizer.terms(), &["alpha", "gamma"].map(String::from));
    }

    #[test]
    fn test_max_features_ties_broken_by_term() {
        let docs = ["zeta beta", "alpha"];
        let vectorizer = TfidfVectorizer::fit(&docs, 2);
        assert_eq!(vectorizer.terms(), &["alpha", "beta"].map(String::from));
    }

    #[test]
    fn test_smoothed_idf() {
        let docs = ["malloc free", "malloc"];
        let vectorizer = TfidfVectorizer::fit(&docs, 10);
        // n = 2; malloc in both docs, free in one.
        let free_idf = (3.0f64 / 2.0).ln() + 1.0;
        assert_eq!(vectorizer.idf(), &[free_idf, 1.0]);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let vectorizer = TfidfVectorizer::fit(&["strcpy buffer", "gets buffer buffer"], 10);
        let v = vectorizer.transform("strcpy(buffer, src); gets(buffer);");
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_unknown_terms_is_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&["malloc free"], 10);
        assert_eq!(vectorizer.transform("completely unseen words"), vec![0.0, 0.0]);
    }

    #[test]
    fn test_validate_rejects_mismatched_lengths() {
        let vectorizer = TfidfVectorizer {
            terms: vec!["a1".into(), "b2".into()],
            idf: vec![1.0],
        };
        assert!(vectorizer.validate().is_err());
    }
}
