// Moderation Errors
// Failures surfaced to callers of the moderation pipeline

use thiserror::Error;

use crate::models::{ContentType, ModerationStatus};
use crate::services::config_store::ConfigError;

#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid state: {content_type} in state {status} cannot be {action}")]
    InvalidState {
        content_type: ContentType,
        status: ModerationStatus,
        action: &'static str,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ModerationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ModerationError::Validation(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ModerationError::InvalidState { .. })
    }
}
