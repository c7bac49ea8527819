// Decision Rules
// Rule tables turning quality / similarity / watch progress into a moderation status.
// Rules are evaluated top to bottom; the first match wins.

use crate::error::ModerationError;
use crate::models::{ContentType, Decision, ModerationStatus, PriorState, QualityReport, SimilarityReport};
use crate::services::config_store::ModerationConfig;

const COMMENT_AUTO_APPROVE_QUALITY: f64 = 80.0;
const COMMENT_AUTO_APPROVE_SIMILARITY: f64 = 20.0;
const COMMENT_REVIEW_QUALITY: f64 = 60.0;
const COMMENT_REVIEW_SIMILARITY: f64 = 40.0;
const REFLECTION_EXCELLENT: f64 = 85.0;
const REFLECTION_GOOD: f64 = 70.0;

fn auto(status: ModerationStatus, reason: String) -> Decision {
    Decision {
        status,
        reason,
        auto_decided: true,
    }
}

pub fn decide_comment(
    quality: &QualityReport,
    similarity: &SimilarityReport,
    config: &ModerationConfig,
) -> Decision {
    if similarity.score >= config.similarity_threshold {
        return auto(
            ModerationStatus::Rejected,
            format!("similarity too high ({:.1}%)", similarity.score),
        );
    }

    if !quality.passed {
        return auto(
            ModerationStatus::Rejected,
            format!("quality below threshold (score: {})", quality.score),
        );
    }

    if quality.score >= COMMENT_AUTO_APPROVE_QUALITY
        && similarity.score < COMMENT_AUTO_APPROVE_SIMILARITY
    {
        return auto(
            ModerationStatus::Approved,
            "high quality and originality".to_string(),
        );
    }

    if quality.score >= COMMENT_REVIEW_QUALITY && similarity.score < COMMENT_REVIEW_SIMILARITY {
        return Decision {
            status: ModerationStatus::Pending,
            reason: "needs manual review".to_string(),
            auto_decided: false,
        };
    }

    auto(
        ModerationStatus::Rejected,
        "insufficient quality or originality".to_string(),
    )
}

pub fn decide_reflection(
    quality: &QualityReport,
    watch_completion: f64,
    config: &ModerationConfig,
) -> Decision {
    if quality.score < config.quality_threshold {
        let mut reason = format!("quality below threshold (score: {})", quality.score);
        if !quality.suggestions.is_empty() {
            reason.push_str(". Suggestions: ");
            reason.push_str(&quality.suggestions.join("; "));
        }
        return auto(ModerationStatus::Rejected, reason);
    }

    // Unknown progress (NaN) counts as unfinished.
    if watch_completion.is_nan() || watch_completion < config.min_watch_completion {
        return auto(
            ModerationStatus::Rejected,
            format!(
                "please finish watching the video first (current progress: {:.1}%)",
                watch_completion
            ),
        );
    }

    if quality.score >= REFLECTION_EXCELLENT {
        return auto(
            ModerationStatus::Approved,
            "excellent reflection, approved automatically".to_string(),
        );
    }

    if quality.score >= REFLECTION_GOOD {
        return auto(ModerationStatus::Approved, "good reflection".to_string());
    }

    // Borderline: meant for manual review, but approved as submitted.
    Decision {
        status: ModerationStatus::Approved,
        reason: "reflection submitted, thanks for sharing your thoughts".to_string(),
        auto_decided: false,
    }
}

/// Reviewer override. Comments must be pending; reflections may be
/// reviewed in any state.
pub fn manual_review(
    prior: PriorState,
    approved: bool,
    feedback: &str,
) -> Result<Decision, ModerationError> {
    if prior.content_type == ContentType::Comment && prior.status != ModerationStatus::Pending {
        return Err(ModerationError::InvalidState {
            content_type: prior.content_type,
            status: prior.status,
            action: "manually reviewed",
        });
    }

    let feedback = feedback.trim();
    let reason = if !feedback.is_empty() {
        feedback.to_string()
    } else if approved {
        "approved by reviewer".to_string()
    } else {
        "rejected by reviewer".to_string()
    };

    Ok(Decision {
        status: if approved {
            ModerationStatus::Approved
        } else {
            ModerationStatus::Rejected
        },
        reason,
        auto_decided: false,
    })
}

/// Approved submissions cannot go back through the automatic path.
pub fn ensure_reevaluable(prior: PriorState) -> Result<(), ModerationError> {
    if prior.status == ModerationStatus::Approved {
        return Err(ModerationError::InvalidState {
            content_type: prior.content_type,
            status: prior.status,
            action: "re-evaluated",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        OriginalityVerdict, QualityDetails, QualityLevel, QualitySubscores, SimilarityMode,
    };

    fn quality(score: f64, config: &ModerationConfig) -> QualityReport {
        QualityReport {
            score,
            passed: score >= config.quality_threshold,
            level: QualityLevel::from_score(score),
            subscores: QualitySubscores::default(),
            issues: vec![],
            suggestions: vec!["Add concrete examples and specific details".to_string()],
            details: QualityDetails::default(),
        }
    }

    fn similarity(score: f64) -> SimilarityReport {
        SimilarityReport {
            score,
            originality: 100.0 - score,
            verdict: OriginalityVerdict::Original,
            reason: String::new(),
            recommendation: String::new(),
            mode: SimilarityMode::Pairwise,
            matched_entry_id: None,
            matched_excerpt: None,
        }
    }

    #[test]
    fn test_comment_rule_order() {
        let config = ModerationConfig::default();
        let d = decide_comment(&quality(100.0, &config), &similarity(60.0), &config);
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert!(d.reason.starts_with("similarity too high"));

        let d = decide_comment(&quality(59.0, &config), &similarity(0.0), &config);
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert!(d.reason.starts_with("quality below threshold"));

        let d = decide_comment(&quality(80.0, &config), &similarity(19.9), &config);
        assert_eq!(d.status, ModerationStatus::Approved);
        assert!(d.auto_decided);

        let d = decide_comment(&quality(80.0, &config), &similarity(20.0), &config);
        assert_eq!(d.status, ModerationStatus::Pending);
        assert!(!d.auto_decided);

        let d = decide_comment(&quality(65.0, &config), &similarity(45.0), &config);
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert_eq!(d.reason, "insufficient quality or originality");
    }

    #[test]
    fn test_comment_threshold_comes_from_config() {
        let config = ModerationConfig {
            similarity_threshold: 70.0,
            ..ModerationConfig::default()
        };
        let d = decide_comment(&quality(90.0, &config), &similarity(65.0), &config);
        assert_eq!(d.reason, "insufficient quality or originality");
    }

    #[test]
    fn test_decisions_are_total() {
        let config = ModerationConfig::default();
        let mut q = 0.0;
        while q <= 100.0 {
            let mut s = 0.0;
            while s <= 100.0 {
                let d = decide_comment(&quality(q, &config), &similarity(s), &config);
                assert!(!d.reason.is_empty());
                s += 2.5;
            }
            for watch in [0.0, 40.0, 79.9, 80.0, 100.0] {
                let d = decide_reflection(&quality(q, &config), watch, &config);
                assert!(!d.reason.is_empty());
            }
            q += 2.5;
        }
    }

    #[test]
    fn test_similarity_rejection_precedes_quality() {
        let config = ModerationConfig::default();
        for s in [60.0, 75.0, 100.0] {
            let d = decide_comment(&quality(100.0, &config), &similarity(s), &config);
            assert_eq!(d.status, ModerationStatus::Rejected);
        }
    }

    #[test]
    fn test_reflection_rules() {
        let config = ModerationConfig::default();
        let d = decide_reflection(&quality(50.0, &config), 100.0, &config);
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert!(d.reason.contains("Suggestions: Add concrete examples"));

        let d = decide_reflection(&quality(95.0, &config), 40.0, &config);
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert!(d.reason.contains("finish watching"));

        let d = decide_reflection(&quality(95.0, &config), f64::NAN, &config);
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert!(d.reason.contains("finish watching"));

        let d = decide_reflection(&quality(85.0, &config), 80.0, &config);
        assert_eq!(d.status, ModerationStatus::Approved);
        assert!(d.reason.starts_with("excellent"));

        let d = decide_reflection(&quality(70.0, &config), 90.0, &config);
        assert_eq!(d.reason, "good reflection");

        let d = decide_reflection(&quality(60.0, &config), 90.0, &config);
        assert_eq!(d.status, ModerationStatus::Approved);
        assert!(!d.auto_decided);
    }

    #[test]
    fn test_manual_review_rules() {
        let pending = PriorState {
            content_type: ContentType::Comment,
            status: ModerationStatus::Pending,
        };
        let d = manual_review(pending, true, "  nice point ").unwrap();
        assert_eq!(d.status, ModerationStatus::Approved);
        assert_eq!(d.reason, "nice point");
        assert!(!d.auto_decided);

        let d = manual_review(pending, false, "").unwrap();
        assert_eq!(d.status, ModerationStatus::Rejected);
        assert_eq!(d.reason, "rejected by reviewer");

        let approved_comment = PriorState {
            content_type: ContentType::Comment,
            status: ModerationStatus::Approved,
        };
        let err = manual_review(approved_comment, false, "spam").unwrap_err();
        assert!(err.is_invalid_state());

        let approved_reflection = PriorState {
            content_type: ContentType::Reflection,
            status: ModerationStatus::Approved,
        };
        assert!(manual_review(approved_reflection, false, "off topic").is_ok());
    }

    #[test]
    fn test_ensure_reevaluable() {
        let rejected = PriorState {
            content_type: ContentType::Comment,
            status: ModerationStatus::Rejected,
        };
        assert!(ensure_reevaluable(rejected).is_ok());

        let approved = PriorState {
            content_type: ContentType::Reflection,
            status: ModerationStatus::Approved,
        };
        assert!(ensure_reevaluable(approved).unwrap_err().is_invalid_state());
    }
}
