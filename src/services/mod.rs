// Content Moderation Services
// Scoring, similarity and decision services behind the moderation pipeline

pub mod config_store;
pub mod vocabulary;
pub mod text_processor;
pub mod quality_checker;
pub mod similarity;
pub mod moderation;

pub use config_store::*;
pub use vocabulary::Vocabulary;
pub use text_processor::{clean_text, excerpt, split_sentences, Tokenizer};
pub use quality_checker::QualityChecker;
pub use similarity::{blend_originality, SimilarityEngine, SimilarityError};
pub use moderation::{
    decide_comment,
    decide_reflection,
    ensure_reevaluable,
    manual_review,
    ModerationPipeline,
};
