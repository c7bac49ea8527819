// Moderation Pipeline
// Stateless per-submission coordinator: validate -> quality + similarity -> decision
//
// The corpus snapshot is read once per call. Two submissions evaluated
// concurrently are each compared against a corpus that does not contain the
// other, so near-duplicates can both pass; callers needing stronger
// guarantees must serialize corpus writes against comparisons.

use std::sync::Arc;
use tracing::info;

use crate::error::ModerationError;
use crate::models::{
    CommentEvaluation, CommentPreview, ContentType, CorpusEntry, Decision, PairwiseComparison,
    PriorState, QualityReport, QualityStats, ReflectionEvaluation, ReflectionIndicators,
};
use crate::services::config_store::ModerationConfig;
use crate::services::quality_checker::QualityChecker;
use crate::services::similarity::SimilarityEngine;
use crate::services::text_processor::Tokenizer;
use crate::services::vocabulary::Vocabulary;
use super::decision::{decide_comment, decide_reflection, ensure_reevaluable, manual_review};

pub struct ModerationPipeline {
    config: Arc<ModerationConfig>,
    tokenizer: Arc<Tokenizer>,
    quality: QualityChecker,
    similarity: SimilarityEngine,
}

impl ModerationPipeline {
    pub fn new(config: ModerationConfig) -> Result<Self, ModerationError> {
        config.validate()?;
        let vocabulary = Arc::new(Vocabulary::from_config(&config.vocabulary));
        Ok(Self::assemble(Arc::new(config), vocabulary))
    }

    pub fn with_defaults() -> Self {
        let config = ModerationConfig::default();
        let vocabulary = Arc::new(Vocabulary::from_config(&config.vocabulary));
        Self::assemble(Arc::new(config), vocabulary)
    }

    fn assemble(config: Arc<ModerationConfig>, vocabulary: Arc<Vocabulary>) -> Self {
        let tokenizer = Arc::new(Tokenizer::new(vocabulary));
        Self {
            quality: QualityChecker::new(config.clone(), tokenizer.clone()),
            similarity: SimilarityEngine::new(config.clone(), tokenizer.clone()),
            config,
            tokenizer,
        }
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    pub fn quality_checker(&self) -> &QualityChecker {
        &self.quality
    }

    pub fn similarity_engine(&self) -> &SimilarityEngine {
        &self.similarity
    }

    /// Trimmed text, or a validation error when empty or too short.
    fn validate<'a>(&self, text: &'a str, content_type: ContentType) -> Result<&'a str, ModerationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ModerationError::Validation(format!("{} content is empty", content_type)));
        }
        let min_chars = self.config.minimum_chars(content_type);
        if text.chars().count() < min_chars {
            return Err(ModerationError::Validation(format!(
                "{} content must be at least {} characters",
                content_type, min_chars
            )));
        }
        Ok(text)
    }

    fn run_comment(
        &self,
        text: &str,
        corpus: &[CorpusEntry],
        exclude_id: Option<i64>,
    ) -> Result<CommentEvaluation, ModerationError> {
        let text = self.validate(text, ContentType::Comment)?;
        let quality = self.quality.score_quality(text, ContentType::Comment);
        let similarity = self.similarity.compare_to_corpus(text, corpus, exclude_id);
        let decision = decide_comment(&quality, &similarity, &self.config);
        Ok(CommentEvaluation {
            quality,
            similarity,
            decision,
        })
    }

    pub fn evaluate_comment(
        &self,
        text: &str,
        author_id: i64,
        parent_id: Option<i64>,
        corpus: &[CorpusEntry],
    ) -> Result<CommentEvaluation, ModerationError> {
        let evaluation = self.run_comment(text, corpus, None)?;
        info!(
            author_id,
            parent_id = ?parent_id,
            quality = evaluation.quality.score,
            similarity = evaluation.similarity.score,
            status = %evaluation.decision.status,
            "moderation.comment_evaluated"
        );
        Ok(evaluation)
    }

    /// Predict the outcome without any side effects on the caller's behalf.
    pub fn preview_comment(
        &self,
        text: &str,
        corpus: &[CorpusEntry],
    ) -> Result<CommentPreview, ModerationError> {
        let evaluation = self.run_comment(text, corpus, None)?;
        let mut recommendations = evaluation.quality.suggestions.clone();
        recommendations.push(evaluation.similarity.recommendation.clone());
        Ok(CommentPreview {
            quality: evaluation.quality,
            similarity: evaluation.similarity,
            predicted: evaluation.decision,
            recommendations,
        })
    }

    /// Re-run the pipeline for an edited comment, ignoring its own corpus entry.
    pub fn reevaluate_comment(
        &self,
        prior: PriorState,
        entry_id: i64,
        text: &str,
        corpus: &[CorpusEntry],
    ) -> Result<CommentEvaluation, ModerationError> {
        ensure_reevaluable(prior)?;
        let evaluation = self.run_comment(text, corpus, Some(entry_id))?;
        info!(
            entry_id,
            previous = %prior.status,
            status = %evaluation.decision.status,
            "moderation.comment_reevaluated"
        );
        Ok(evaluation)
    }

    fn run_reflection(
        &self,
        text: &str,
        watch_completion: f64,
    ) -> Result<ReflectionEvaluation, ModerationError> {
        let text = self.validate(text, ContentType::Reflection)?;
        if !watch_completion.is_finite() {
            return Err(ModerationError::Validation(format!(
                "watch completion must be a finite percentage, got {}",
                watch_completion
            )));
        }
        let watch_completion = watch_completion.clamp(0.0, 100.0);
        let quality = self.quality.score_quality(text, ContentType::Reflection);
        let decision = decide_reflection(&quality, watch_completion, &self.config);
        let indicators = self.reflection_indicators(text);
        Ok(ReflectionEvaluation {
            quality,
            decision,
            indicators,
            watch_completion,
        })
    }

    pub fn evaluate_reflection(
        &self,
        text: &str,
        video_id: i64,
        watch_completion: f64,
    ) -> Result<ReflectionEvaluation, ModerationError> {
        let evaluation = self.run_reflection(text, watch_completion)?;
        info!(
            video_id,
            quality = evaluation.quality.score,
            watch_completion = evaluation.watch_completion,
            status = %evaluation.decision.status,
            "moderation.reflection_evaluated"
        );
        Ok(evaluation)
    }

    pub fn preview_reflection(
        &self,
        text: &str,
        watch_completion: f64,
    ) -> Result<ReflectionEvaluation, ModerationError> {
        self.run_reflection(text, watch_completion)
    }

    pub fn reevaluate_reflection(
        &self,
        prior: PriorState,
        text: &str,
        watch_completion: f64,
    ) -> Result<ReflectionEvaluation, ModerationError> {
        ensure_reevaluable(prior)?;
        self.run_reflection(text, watch_completion)
    }

    pub fn manual_review(
        &self,
        prior: PriorState,
        approved: bool,
        feedback: &str,
    ) -> Result<Decision, ModerationError> {
        let decision = manual_review(prior, approved, feedback)?;
        info!(
            content_type = %prior.content_type,
            previous = %prior.status,
            status = %decision.status,
            "moderation.manual_review"
        );
        Ok(decision)
    }

    pub fn score_quality(&self, text: &str, content_type: ContentType) -> QualityReport {
        self.quality.score_quality(text, content_type)
    }

    pub fn pairwise_similarity(&self, text1: &str, text2: &str) -> f64 {
        self.similarity.pairwise(text1, text2)
    }

    pub fn pairwise_comparison(&self, text1: &str, text2: &str) -> PairwiseComparison {
        self.similarity.pairwise_comparison(text1, text2)
    }

    pub fn quality_stats(&self) -> QualityStats {
        self.quality.stats()
    }

    fn reflection_indicators(&self, text: &str) -> ReflectionIndicators {
        let vocab = self.tokenizer.vocabulary();
        let segmented = self.tokenizer.segment(text);
        let tokens = segmented.tokens();
        let lowered = text.to_lowercase();
        let has_thought_words = tokens.iter().any(|t| vocab.is_thought(t));
        ReflectionIndicators {
            has_thought_words,
            has_specific_examples: vocab.has_example_marker(&lowered),
            has_questions: vocab.has_question(&lowered, tokens),
        }
    }
}
