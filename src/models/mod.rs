// Moderation Data Models
// Reports exchanged between the pipeline stages and returned to callers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============ Submissions ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Comment,
    Reflection,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Comment => "comment",
            ContentType::Reflection => "reflection",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(val: &str) -> Result<Self, Self::Err> {
        match val.trim().to_lowercase().as_str() {
            "comment" => Ok(Self::Comment),
            "reflection" => Ok(Self::Reflection),
            other => Err(format!("unknown content type: {}", other)),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient per-request submission; never persisted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    pub text: String,
    pub content_type: ContentType,
    pub author_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub video_id: Option<i64>,
}

/// A prior submission eligible for originality comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusEntry {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub author_id: Option<i64>,
}

impl CorpusEntry {
    pub fn new(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            author_id: None,
        }
    }
}

/// Ordered normalized tokens derived from a submission text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenSequence(Vec<String>);

impl TokenSequence {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

// ============ Quality ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySubscores {
    pub length: u32,
    pub thought: u32,
    pub specificity: u32,
    pub diversity: u32,
    pub emotion: u32,
    pub grammar: u32,
    /// Only non-zero for reflections.
    pub type_bonus: u32,
}

impl QualitySubscores {
    pub fn total(&self) -> u32 {
        self.length
            + self.thought
            + self.specificity
            + self.diversity
            + self.emotion
            + self.grammar
            + self.type_bonus
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityDetails {
    pub char_count: usize,
    pub sentence_count: usize,
    pub token_count: usize,
    pub unique_token_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub score: f64,
    pub passed: bool,
    pub level: QualityLevel,
    pub subscores: QualitySubscores,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub details: QualityDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStats {
    pub threshold: f64,
    pub thought_words_count: usize,
    pub emotion_words_count: usize,
    pub descriptive_words_count: usize,
    pub stopwords_count: usize,
}

// ============ Similarity ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    Pairwise,
    Batch,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginalityVerdict {
    Original,
    Warning,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityReport {
    /// Highest similarity against the corpus, 0-100.
    pub score: f64,
    pub originality: f64,
    pub verdict: OriginalityVerdict,
    pub reason: String,
    pub recommendation: String,
    pub mode: SimilarityMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_entry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseComparison {
    pub score: f64,
    pub is_similar: bool,
    pub threshold: f64,
}

// ============ Decision ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ModerationStatus::Pending)
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub status: ModerationStatus,
    pub reason: String,
    pub auto_decided: bool,
}

/// Current state of a stored submission, as known to the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorState {
    pub content_type: ContentType,
    pub status: ModerationStatus,
}

// ============ Evaluations ============

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionIndicators {
    pub has_thought_words: bool,
    pub has_specific_examples: bool,
    pub has_questions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEvaluation {
    pub quality: QualityReport,
    pub similarity: SimilarityReport,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPreview {
    pub quality: QualityReport,
    pub similarity: SimilarityReport,
    pub predicted: Decision,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionEvaluation {
    pub quality: QualityReport,
    pub decision: Decision,
    pub indicators: ReflectionIndicators,
    pub watch_completion: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(QualityLevel::from_score(80.0), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(79.9), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(60.0), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(40.0), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_score(39.0), QualityLevel::Poor);
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(" Comment ".parse::<ContentType>(), Ok(ContentType::Comment));
        assert_eq!("reflection".parse::<ContentType>(), Ok(ContentType::Reflection));
        assert!("video".parse::<ContentType>().is_err());
        assert_eq!(ContentType::Reflection.to_string(), "reflection");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ModerationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert!(ModerationStatus::Approved.is_terminal());
        assert!(!ModerationStatus::Pending.is_terminal());
    }

    #[test]
    fn test_corpus_entry_deserializes_without_author() {
        let entry: CorpusEntry = serde_json::from_str(r#"{"id": 7, "content": "hello"}"#).unwrap();
        assert_eq!(entry.id, 7);
        assert!(entry.author_id.is_none());
    }
}
