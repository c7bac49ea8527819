// Moderation Module
// Decision rules and the per-submission pipeline:
// - decision: rule tables and manual review state checks
// - pipeline: validate, score, compare, decide

pub mod decision;
pub mod pipeline;

pub use decision::{decide_comment, decide_reflection, ensure_reevaluable, manual_review};
pub use pipeline::ModerationPipeline;
