// Similarity Detector
// Originality of a candidate text against a snapshot of prior submissions
//
// Pairwise mode rebuilds the vector space from the two documents under
// comparison; batch mode builds a single space from the candidate plus the
// whole corpus. The two spaces carry different IDF statistics, so the modes
// can return different scores for the same pair. Both are kept as-is.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{
    CorpusEntry, OriginalityVerdict, PairwiseComparison, SimilarityMode, SimilarityReport,
    TokenSequence,
};
use crate::services::config_store::{ModerationConfig, SimilarityStrategy};
use crate::services::text_processor::{excerpt, Tokenizer};
use super::vectorizer::{cosine, fit_transform, SimilarityError, VectorizerSettings};

/// Weight of history when blending an author's rolling originality.
const ORIGINALITY_HISTORY_WEIGHT: f64 = 0.8;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Rolling author originality: the first score is taken as-is, later
/// scores move the average by 20%.
pub fn blend_originality(previous: Option<f64>, new_score: f64) -> f64 {
    match previous {
        None => new_score,
        Some(prev) => {
            prev * ORIGINALITY_HISTORY_WEIGHT + new_score * (1.0 - ORIGINALITY_HISTORY_WEIGHT)
        }
    }
}

pub struct SimilarityEngine {
    config: Arc<ModerationConfig>,
    tokenizer: Arc<Tokenizer>,
}

impl SimilarityEngine {
    pub fn new(config: Arc<ModerationConfig>, tokenizer: Arc<Tokenizer>) -> Self {
        Self { config, tokenizer }
    }

    fn settings(&self) -> VectorizerSettings {
        VectorizerSettings {
            max_features: self.config.max_features,
            max_document_frequency: self.config.max_document_frequency,
        }
    }

    fn select_mode(&self, corpus_len: usize) -> SimilarityMode {
        match self.config.similarity_mode {
            SimilarityStrategy::Pairwise => SimilarityMode::Pairwise,
            SimilarityStrategy::Batch => SimilarityMode::Batch,
            SimilarityStrategy::Auto if corpus_len > self.config.batch_cutoff => SimilarityMode::Batch,
            SimilarityStrategy::Auto => SimilarityMode::Pairwise,
        }
    }

    fn score_tokens(&self, a: &TokenSequence, b: &TokenSequence) -> Result<f64, SimilarityError> {
        if a.is_empty() || b.is_empty() {
            return Err(SimilarityError::EmptyDocument);
        }
        let rows = fit_transform(&[a.clone(), b.clone()], &self.settings())?;
        if rows[0].is_empty() {
            return Err(SimilarityError::DegenerateVector);
        }
        Ok(cosine(&rows[0], &rows[1]) * 100.0)
    }

    /// Fail-open: any computational failure is logged and scored as 0.
    fn fail_open(&self, result: Result<f64, SimilarityError>) -> f64 {
        match result {
            Ok(score) => score,
            Err(SimilarityError::EmptyDocument) => {
                debug!("similarity.empty_document");
                0.0
            }
            Err(e) => {
                warn!(error = %e, "similarity.fail_open");
                0.0
            }
        }
    }

    /// Similarity of two arbitrary texts, 0-100.
    pub fn try_pairwise(&self, text1: &str, text2: &str) -> Result<f64, SimilarityError> {
        let a = self.tokenizer.normalize(text1);
        let b = self.tokenizer.normalize(text2);
        self.score_tokens(&a, &b)
    }

    pub fn pairwise(&self, text1: &str, text2: &str) -> f64 {
        round2(self.fail_open(self.try_pairwise(text1, text2)))
    }

    pub fn pairwise_comparison(&self, text1: &str, text2: &str) -> PairwiseComparison {
        let score = self.pairwise(text1, text2);
        PairwiseComparison {
            score,
            is_similar: score >= self.config.similarity_threshold,
            threshold: self.config.similarity_threshold,
        }
    }

    /// Highest similarity of `text` against `corpus`, skipping `exclude_id`.
    pub fn compare_to_corpus(
        &self,
        text: &str,
        corpus: &[CorpusEntry],
        exclude_id: Option<i64>,
    ) -> SimilarityReport {
        let entries: Vec<&CorpusEntry> = corpus
            .iter()
            .filter(|e| Some(e.id) != exclude_id)
            .collect();
        let mode = self.select_mode(entries.len());

        if entries.is_empty() {
            return self.build_report(0.0, mode, None);
        }

        let candidate = self.tokenizer.normalize(text);
        if candidate.is_empty() {
            debug!("similarity.candidate_without_tokens");
            return self.build_report(0.0, mode, None);
        }

        let best = match mode {
            SimilarityMode::Pairwise => self.best_pairwise(&candidate, &entries),
            SimilarityMode::Batch => match self.try_batch(&candidate, &entries) {
                Ok(best) => best,
                Err(e) => {
                    warn!(error = %e, corpus = entries.len(), "similarity.batch_failed, falling back to pairwise");
                    return self.report_from_best(
                        self.best_pairwise(&candidate, &entries),
                        SimilarityMode::Pairwise,
                        &entries,
                    );
                }
            },
        };

        self.report_from_best(best, mode, &entries)
    }

    fn report_from_best(
        &self,
        best: Option<(f64, usize)>,
        mode: SimilarityMode,
        entries: &[&CorpusEntry],
    ) -> SimilarityReport {
        match best {
            Some((score, idx)) if score > 0.0 => self.build_report(score, mode, Some(entries[idx])),
            _ => self.build_report(0.0, mode, None),
        }
    }

    fn best_pairwise(&self, candidate: &TokenSequence, entries: &[&CorpusEntry]) -> Option<(f64, usize)> {
        let mut best: Option<(f64, usize)> = None;
        for (idx, entry) in entries.iter().enumerate() {
            let other = self.tokenizer.normalize(&entry.content);
            let score = self.fail_open(self.score_tokens(candidate, &other));
            if score > best.map_or(0.0, |(s, _)| s) {
                best = Some((score, idx));
            }
        }
        best
    }

    fn try_batch(
        &self,
        candidate: &TokenSequence,
        entries: &[&CorpusEntry],
    ) -> Result<Option<(f64, usize)>, SimilarityError> {
        let mut docs = vec![candidate.clone()];
        let mut positions = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            let tokens = self.tokenizer.normalize(&entry.content);
            if !tokens.is_empty() {
                docs.push(tokens);
                positions.push(idx);
            }
        }
        if positions.is_empty() {
            return Ok(None);
        }

        let rows = fit_transform(&docs, &self.settings())?;
        if rows[0].is_empty() {
            return Err(SimilarityError::DegenerateVector);
        }

        let mut best: Option<(f64, usize)> = None;
        for (row, &idx) in rows[1..].iter().zip(positions.iter()) {
            let score = cosine(&rows[0], row) * 100.0;
            if score > best.map_or(0.0, |(s, _)| s) {
                best = Some((score, idx));
            }
        }
        debug!(corpus = entries.len(), documents = docs.len(), "similarity.batch_scored");
        Ok(best)
    }

    fn build_report(
        &self,
        score: f64,
        mode: SimilarityMode,
        matched: Option<&CorpusEntry>,
    ) -> SimilarityReport {
        let score = round2(score.clamp(0.0, 100.0));
        let (verdict, reason, recommendation) = if score >= self.config.similarity_threshold {
            (
                OriginalityVerdict::Duplicate,
                format!("Similarity with an existing comment is too high ({:.1}%)", score),
                "Try to express your own view in your own words",
            )
        } else if score >= self.config.originality_warning_threshold {
            (
                OriginalityVerdict::Warning,
                format!("Partly similar to an existing comment ({:.1}%)", score),
                "Add more of your own insight and a distinct point of view",
            )
        } else {
            (
                OriginalityVerdict::Original,
                "Good originality".to_string(),
                "Keep expressing yourself in your own way",
            )
        };

        SimilarityReport {
            score,
            originality: round2((100.0 - score).max(0.0)),
            verdict,
            reason,
            recommendation: recommendation.to_string(),
            mode,
            matched_entry_id: matched.map(|e| e.id),
            matched_excerpt: matched.map(|e| excerpt(&e.content, self.config.excerpt_chars)),
        }
    }
}
