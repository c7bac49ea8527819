// TF-IDF Vectorizer
// Joint vector space over 1-gram and 2-gram token features

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::models::TokenSequence;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimilarityError {
    #[error("document has no tokens after normalization")]
    EmptyDocument,
    #[error("no features remain after document-frequency pruning")]
    EmptyVocabulary,
    #[error("candidate vector has zero norm")]
    DegenerateVector,
}

#[derive(Debug, Copy, Clone)]
pub struct VectorizerSettings {
    pub max_features: usize,
    /// Proportion of documents above which a feature is dropped.
    pub max_document_frequency: f64,
}

impl Default for VectorizerSettings {
    fn default() -> Self {
        Self {
            max_features: 1000,
            max_document_frequency: 0.8,
        }
    }
}

/// L2-normalized sparse row: (feature index, weight), sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

fn ngram_counts(tokens: &TokenSequence) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let words = tokens.tokens();
    for w in words {
        *counts.entry(w.clone()).or_insert(0) += 1;
    }
    for pair in words.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

/// Highest document count a feature may have and still be kept. Never
/// below 2, so features shared by the two sides of a pairwise comparison
/// are retained.
fn max_doc_count(n_docs: usize, max_df: f64) -> usize {
    ((max_df * n_docs as f64).floor() as usize).max(2)
}

/// Build one vector space from all `docs` and return their TF-IDF rows.
pub fn fit_transform(
    docs: &[TokenSequence],
    settings: &VectorizerSettings,
) -> Result<Vec<SparseVector>, SimilarityError> {
    let n_docs = docs.len();
    let doc_counts: Vec<BTreeMap<String, usize>> = docs.iter().map(ngram_counts).collect();

    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for counts in &doc_counts {
        for (term, count) in counts {
            *df.entry(term.as_str()).or_insert(0) += 1;
            *totals.entry(term.as_str()).or_insert(0) += count;
        }
    }

    let ceiling = max_doc_count(n_docs, settings.max_document_frequency);
    let mut kept: Vec<&str> = df
        .iter()
        .filter(|(_, d)| **d >= 1 && **d <= ceiling)
        .map(|(t, _)| *t)
        .collect();

    if kept.len() > settings.max_features {
        // Most frequent first; ties broken alphabetically for stability.
        kept.sort_by(|a, b| totals[b].cmp(&totals[a]).then_with(|| a.cmp(b)));
        kept.truncate(settings.max_features);
        kept.sort_unstable();
    }

    if kept.is_empty() {
        return Err(SimilarityError::EmptyVocabulary);
    }

    let index: HashMap<&str, usize> = kept.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let idf: Vec<f64> = kept
        .iter()
        .map(|t| ((1.0 + n_docs as f64) / (1.0 + df[t] as f64)).ln() + 1.0)
        .collect();

    let rows = doc_counts
        .iter()
        .map(|counts| {
            let mut row: SparseVector = counts
                .iter()
                .filter_map(|(term, &tf)| {
                    index.get(term.as_str()).map(|&i| (i, tf as f64 * idf[i]))
                })
                .collect();
            row.sort_unstable_by_key(|(i, _)| *i);
            let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in row.iter_mut() {
                    *w /= norm;
                }
            }
            row
        })
        .collect();

    Ok(rows)
}

/// Cosine similarity of two sparse rows (0 when either is empty).
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    let na = a.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    let nb = b.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(text: &str) -> TokenSequence {
        TokenSequence::new(text.split_whitespace().map(str::to_string).collect())
    }

    #[test]
    fn test_identical_documents_are_parallel() {
        let docs = vec![seq("alpha beta gamma"), seq("alpha beta gamma")];
        let rows = fit_transform(&docs, &VectorizerSettings::default()).unwrap();
        assert!((cosine(&rows[0], &rows[1]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_documents_are_orthogonal() {
        let docs = vec![seq("alpha beta"), seq("gamma delta")];
        let rows = fit_transform(&docs, &VectorizerSettings::default()).unwrap();
        assert_eq!(cosine(&rows[0], &rows[1]), 0.0);
    }

    #[test]
    fn test_partial_overlap_pairwise_weights() {
        // 5 shared features (idf 1) vs 2 unique per side (idf ln(3/2)+1).
        let docs = vec![seq("alpha beta gamma delta"), seq("alpha beta gamma epsilon")];
        let rows = fit_transform(&docs, &VectorizerSettings::default()).unwrap();
        let unique = (1.5f64).ln() + 1.0;
        let expected = 5.0 / (5.0 + 2.0 * unique * unique);
        assert!((cosine(&rows[0], &rows[1]) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_features_in_too_many_documents_are_pruned() {
        let docs = vec![
            seq("common one"),
            seq("common two"),
            seq("common three"),
            seq("common four"),
            seq("common five"),
        ];
        let rows = fit_transform(&docs, &VectorizerSettings::default()).unwrap();
        // "common" appears in 5/5 documents; only the distinct terms survive.
        assert_eq!(cosine(&rows[0], &rows[1]), 0.0);
    }

    #[test]
    fn test_all_pruned_is_error() {
        let docs = vec![seq("same"), seq("same"), seq("same"), seq("same")];
        assert_eq!(
            fit_transform(&docs, &VectorizerSettings::default()),
            Err(SimilarityError::EmptyVocabulary)
        );
        assert_eq!(
            fit_transform(&[], &VectorizerSettings::default()),
            Err(SimilarityError::EmptyVocabulary)
        );
    }

    #[test]
    fn test_max_features_cap() {
        let settings = VectorizerSettings {
            max_features: 2,
            max_document_frequency: 1.0,
        };
        let docs = vec![seq("aa aa aa bb bb cc"), seq("dd")];
        let rows = fit_transform(&docs, &settings).unwrap();
        // Kept: "aa" (3) and "aa aa" (2) beat "bb" (2) alphabetically.
        assert_eq!(rows[0].len(), 2);
        assert!(rows[1].is_empty());
    }

    #[test]
    fn test_max_doc_count_floor() {
        assert_eq!(max_doc_count(2, 0.8), 2);
        assert_eq!(max_doc_count(3, 0.8), 2);
        assert_eq!(max_doc_count(62, 0.8), 49);
    }
}
