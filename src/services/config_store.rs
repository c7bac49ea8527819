// Configuration Storage Service
// Moderation thresholds, vocabulary extras, config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "moderation.json";
const BACKUP_KEEP: usize = 10;

pub const ENV_QUALITY_THRESHOLD: &str = "MODERATION_QUALITY_THRESHOLD";
pub const ENV_SIMILARITY_THRESHOLD: &str = "MODERATION_SIMILARITY_THRESHOLD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config validation error: {0}")]
    Validation(String),
    #[error("env var invalid: {key}={value}")]
    EnvInvalid { key: String, value: String },
}

/// How the similarity engine picks its vector space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityStrategy {
    /// Pairwise up to `batch_cutoff` corpus entries, batch above it.
    #[default]
    Auto,
    Pairwise,
    Batch,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyConfig {
    #[serde(default)]
    pub extra_thought_words: Vec<String>,
    #[serde(default)]
    pub extra_emotion_words: Vec<String>,
    #[serde(default)]
    pub extra_descriptive_words: Vec<String>,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationConfig {
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_originality_warning")]
    pub originality_warning_threshold: f64,
    #[serde(default = "default_min_comment_chars")]
    pub min_comment_chars: usize,
    #[serde(default = "default_min_reflection_chars")]
    pub min_reflection_chars: usize,
    #[serde(default = "default_min_watch_completion")]
    pub min_watch_completion: f64,
    #[serde(default = "default_batch_cutoff")]
    pub batch_cutoff: usize,
    #[serde(default)]
    pub similarity_mode: SimilarityStrategy,
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_max_df")]
    pub max_document_frequency: f64,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            similarity_threshold: default_similarity_threshold(),
            originality_warning_threshold: default_originality_warning(),
            min_comment_chars: default_min_comment_chars(),
            min_reflection_chars: default_min_reflection_chars(),
            min_watch_completion: default_min_watch_completion(),
            batch_cutoff: default_batch_cutoff(),
            similarity_mode: SimilarityStrategy::Auto,
            max_features: default_max_features(),
            max_document_frequency: default_max_df(),
            excerpt_chars: default_excerpt_chars(),
            vocabulary: VocabularyConfig::default(),
        }
    }
}

fn default_quality_threshold() -> f64 { 60.0 }
fn default_similarity_threshold() -> f64 { 60.0 }
fn default_originality_warning() -> f64 { 40.0 }
fn default_min_comment_chars() -> usize { 10 }
fn default_min_reflection_chars() -> usize { 50 }
fn default_min_watch_completion() -> f64 { 80.0 }
fn default_batch_cutoff() -> usize { 50 }
fn default_max_features() -> usize { 1000 }
fn default_max_df() -> f64 { 0.8 }
fn default_excerpt_chars() -> usize { 100 }

fn check_percent(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be within 0-100, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Parse a percentage override from an environment value.
pub fn parse_threshold(key: &str, value: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::EnvInvalid {
        key: key.to_string(),
        value: value.to_string(),
    };
    let parsed: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !(0.0..=100.0).contains(&parsed) {
        return Err(invalid());
    }
    Ok(parsed)
}

impl ModerationConfig {
    pub fn minimum_chars(&self, content_type: crate::models::ContentType) -> usize {
        match content_type {
            crate::models::ContentType::Comment => self.min_comment_chars,
            crate::models::ContentType::Reflection => self.min_reflection_chars,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_percent("qualityThreshold", self.quality_threshold)?;
        check_percent("similarityThreshold", self.similarity_threshold)?;
        check_percent("originalityWarningThreshold", self.originality_warning_threshold)?;
        check_percent("minWatchCompletion", self.min_watch_completion)?;

        if self.originality_warning_threshold > self.similarity_threshold {
            return Err(ConfigError::Validation(
                "originalityWarningThreshold must not exceed similarityThreshold".to_string(),
            ));
        }
        if self.min_comment_chars == 0 || self.min_reflection_chars == 0 {
            return Err(ConfigError::Validation(
                "minimum lengths must be positive".to_string(),
            ));
        }
        if self.max_features == 0 {
            return Err(ConfigError::Validation("maxFeatures must be positive".to_string()));
        }
        if !(self.max_document_frequency > 0.0 && self.max_document_frequency <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "maxDocumentFrequency must be within (0, 1], got {}",
                self.max_document_frequency
            )));
        }
        Ok(())
    }

    /// Apply `MODERATION_*_THRESHOLD` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(ENV_QUALITY_THRESHOLD) {
            self.quality_threshold = parse_threshold(ENV_QUALITY_THRESHOLD, &raw)?;
        }
        if let Ok(raw) = std::env::var(ENV_SIMILARITY_THRESHOLD) {
            self.similarity_threshold = parse_threshold(ENV_SIMILARITY_THRESHOLD, &raw)?;
        }
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ModerationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join(CONFIG_FILE_NAME);
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("content-moderation"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Load configuration from file; a missing file yields defaults.
    pub fn load(&self) -> Result<ModerationConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(ModerationConfig::default());
        }
        ModerationConfig::from_json_file(&self.config_file)
    }

    /// Save configuration to file
    pub fn save(&self, config: &ModerationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("moderation_{}.json", timestamp));
        fs::copy(&self.config_file, &backup_file)?;

        self.cleanup_old_backups(&backup_dir, BACKUP_KEEP)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "content-moderation-{}-{}-{}",
            tag,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_default_config() {
        let config = ModerationConfig::default();
        assert_eq!(config.quality_threshold, 60.0);
        assert_eq!(config.similarity_threshold, 60.0);
        assert_eq!(config.min_comment_chars, 10);
        assert_eq!(config.min_reflection_chars, 50);
        assert_eq!(config.batch_cutoff, 50);
        assert_eq!(config.similarity_mode, SimilarityStrategy::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ModerationConfig =
            serde_json::from_str(r#"{"similarityThreshold": 70, "similarityMode": "batch"}"#).unwrap();
        assert_eq!(config.similarity_threshold, 70.0);
        assert_eq!(config.quality_threshold, 60.0);
        assert_eq!(config.similarity_mode, SimilarityStrategy::Batch);
        assert_eq!(config.max_features, 1000);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let config = ModerationConfig {
            similarity_threshold: 120.0,
            ..ModerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = ModerationConfig {
            max_document_frequency: 0.0,
            ..ModerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold(ENV_QUALITY_THRESHOLD, " 65 ").unwrap(), 65.0);
        assert!(matches!(
            parse_threshold(ENV_QUALITY_THRESHOLD, "abc"),
            Err(ConfigError::EnvInvalid { .. })
        ));
        assert!(parse_threshold(ENV_SIMILARITY_THRESHOLD, "101").is_err());
    }

    #[test]
    fn test_store_roundtrip_and_backup() {
        let dir = temp_dir("store");
        let store = ConfigStore::new(dir.clone());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.quality_threshold, 60.0);

        let mut config = ModerationConfig::default();
        config.quality_threshold = 65.0;
        store.save(&config).unwrap();
        config.quality_threshold = 70.0;
        store.save(&config).unwrap();

        assert_eq!(store.load().unwrap().quality_threshold, 70.0);
        let backups = fs::read_dir(dir.join("backups")).unwrap().count();
        assert_eq!(backups, 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
