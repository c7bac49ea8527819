// Quality Checker Service
// Additive 0-100 quality scoring for comments and reflections

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::models::{
    ContentType, QualityDetails, QualityLevel, QualityReport, QualityStats, QualitySubscores,
};
use super::config_store::ModerationConfig;
use super::text_processor::{longest_char_run, split_sentences, Tokenizer};

const LENGTH_POINTS: u32 = 20;
const GRAMMAR_BASE: u32 = 15;
const MAX_SCORE: f64 = 100.0;

const SUGGEST_THOUGHT: &str = "Add more personal insight and reflection";
const SUGGEST_SPECIFICITY: &str = "Add concrete examples and specific details";
const SUGGEST_DIVERSITY: &str = "Use more varied wording and sentence structure";
const SUGGEST_EMOTION: &str = "Share more of your own feelings and experience";
const SUGGEST_REFLECTION: &str = "Reflect on specific parts of the video content";
const ISSUE_GRAMMAR: &str = "Check grammar and punctuation";
const ISSUE_EMPTY: &str = "Content is empty";

/// Any Unicode decimal digit, full-width forms included.
fn digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d").expect("digit regex"))
}

fn has_terminal_punctuation(text: &str) -> bool {
    text.chars().any(|c| matches!(c, '。' | '！' | '？' | '.' | '!' | '?'))
}

/// Cased characters exist and all share one case.
fn is_uniform_case(text: &str) -> bool {
    let mut upper = 0usize;
    let mut lower = 0usize;
    for ch in text.chars() {
        if ch.is_uppercase() {
            upper += 1;
        } else if ch.is_lowercase() {
            lower += 1;
        }
    }
    (upper > 0) != (lower > 0)
}

fn thought_points(count: usize) -> u32 {
    match count {
        0 => 0,
        1..=2 => 10,
        3..=5 => 20,
        _ => 25,
    }
}

fn emotion_points(count: usize) -> u32 {
    match count {
        0 => 0,
        1..=2 => 5,
        3..=4 => 10,
        _ => 15,
    }
}

fn diversity_points(ratio: f64, avg_tokens_per_sentence: f64) -> u32 {
    let mut score = if ratio > 0.6 {
        15
    } else if ratio > 0.4 {
        10
    } else if ratio > 0.2 {
        5
    } else {
        0
    };
    if avg_tokens_per_sentence > 5.0 {
        score += 5;
    }
    score.min(20)
}

fn grammar_points(text: &str) -> u32 {
    let mut score = GRAMMAR_BASE as i32;
    if !has_terminal_punctuation(text) {
        score -= 3;
    }
    if longest_char_run(text) >= 4 {
        score -= 2;
    }
    if is_uniform_case(text) {
        score -= 1;
    }
    let full_width = text.matches('！').count();
    let ascii = text.matches('!').count();
    if full_width > 3 || ascii > 3 {
        score -= 2;
    }
    score.max(0) as u32
}

pub struct QualityChecker {
    config: Arc<ModerationConfig>,
    tokenizer: Arc<Tokenizer>,
}

impl QualityChecker {
    pub fn new(config: Arc<ModerationConfig>, tokenizer: Arc<Tokenizer>) -> Self {
        Self { config, tokenizer }
    }

    /// Score `text` for the given content type. Deterministic.
    pub fn score_quality(&self, text: &str, content_type: ContentType) -> QualityReport {
        let text = text.trim();
        if text.is_empty() {
            return self.build_report(
                QualitySubscores::default(),
                vec![ISSUE_EMPTY.to_string()],
                vec![],
                QualityDetails::default(),
            );
        }

        let vocab = self.tokenizer.vocabulary();
        let segmented = self.tokenizer.segment(text);
        let words = segmented.tokens();
        let lowered = text.to_lowercase();

        let char_count = text.chars().count();
        let sentence_count = split_sentences(text).len().max(1);
        let unique: HashSet<&str> = words.iter().map(|w| w.as_str()).collect();
        let unique_ratio = if words.is_empty() {
            0.0
        } else {
            unique.len() as f64 / words.len() as f64
        };

        let mut issues = Vec::new();
        let mut suggestions = Vec::new();
        let mut sub = QualitySubscores::default();

        // 1. Length
        let min_chars = self.config.minimum_chars(content_type);
        if char_count < min_chars {
            issues.push(format!("Content is too short, at least {} characters required", min_chars));
        } else {
            sub.length = LENGTH_POINTS;
        }

        // 2. Thought depth
        sub.thought = thought_points(words.iter().filter(|w| vocab.is_thought(w)).count());
        if sub.thought < 10 {
            suggestions.push(SUGGEST_THOUGHT.to_string());
        }

        // 3. Specificity
        let mut specificity = 0;
        if words.iter().any(|w| vocab.is_descriptive(w)) {
            specificity += 10;
        }
        if vocab.has_example_marker(&lowered) {
            specificity += 10;
        }
        if digit_re().is_match(text) {
            specificity += 5;
        }
        sub.specificity = specificity.min(20);
        if sub.specificity < 10 {
            suggestions.push(SUGGEST_SPECIFICITY.to_string());
        }

        // 4. Expression diversity
        sub.diversity = if words.is_empty() {
            0
        } else {
            diversity_points(unique_ratio, words.len() as f64 / sentence_count as f64)
        };
        if sub.diversity < 10 {
            suggestions.push(SUGGEST_DIVERSITY.to_string());
        }

        // 5. Emotional expression
        sub.emotion = emotion_points(words.iter().filter(|w| vocab.is_emotion(w)).count());
        if sub.emotion < 5 {
            suggestions.push(SUGGEST_EMOTION.to_string());
        }

        // 6. Grammar and format
        sub.grammar = grammar_points(text);
        if sub.grammar < 10 {
            issues.push(ISSUE_GRAMMAR.to_string());
        }

        // 7. Reflection-only bonus
        if content_type == ContentType::Reflection {
            let mut bonus = 0;
            if vocab.has_video_reference(&lowered, words) {
                bonus += 5;
            }
            if vocab.has_question(&lowered, words) {
                bonus += 3;
            }
            if vocab.has_comparison(&lowered, words) {
                bonus += 5;
            }
            sub.type_bonus = bonus;
            if bonus < 5 {
                suggestions.push(SUGGEST_REFLECTION.to_string());
            }
        }

        let details = QualityDetails {
            char_count,
            sentence_count,
            token_count: words.len(),
            unique_token_ratio: unique_ratio,
        };

        debug!(
            content_type = %content_type,
            chars = char_count,
            tokens = words.len(),
            total = sub.total(),
            "quality.scored"
        );

        self.build_report(sub, issues, suggestions, details)
    }

    pub fn score_batch(&self, texts: &[&str], content_type: ContentType) -> Vec<QualityReport> {
        texts
            .iter()
            .map(|t| self.score_quality(t, content_type))
            .collect()
    }

    pub fn stats(&self) -> QualityStats {
        let vocab = self.tokenizer.vocabulary();
        QualityStats {
            threshold: self.config.quality_threshold,
            thought_words_count: vocab.thought_len(),
            emotion_words_count: vocab.emotion_len(),
            descriptive_words_count: vocab.descriptive_len(),
            stopwords_count: vocab.stopwords_len(),
        }
    }

    fn build_report(
        &self,
        subscores: QualitySubscores,
        issues: Vec<String>,
        suggestions: Vec<String>,
        details: QualityDetails,
    ) -> QualityReport {
        let score = (subscores.total() as f64).clamp(0.0, MAX_SCORE);
        QualityReport {
            score,
            passed: score >= self.config.quality_threshold,
            level: QualityLevel::from_score(score),
            subscores,
            issues,
            suggestions,
            details,
        }
    }
}
