//! YAML configuration file support for jobmatch.
//!
//! All stage configurations (text, lexical, semantic, matcher) can be defined
//! in a single YAML file and loaded at runtime.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! text:
//!   version: 1
//!   normalize_unicode: true
//!   lowercase: true
//!   strip_punctuation: false
//!
//! lexical:
//!   version: 1
//!   max_features: 2000
//!   ngram_min: 1
//!   ngram_max: 2
//!   use_parallel: false
//!
//! semantic:
//!   mode: "hash"
//!   dim: 384
//!   normalize: true
//!
//! matcher:
//!   top_k: 5
//!   alpha: 0.6
//!   keyword_boost: 0.15
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use jm_lexical::LexicalConfig;
use jm_match::MatchConfig;
use jm_semantic::SemanticConfig;
use jm_text::TextConfig;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole ranking pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobmatchConfig {
    /// Configuration format version.
    #[serde(default = "default_config_version")]
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Text pipeline configuration.
    #[serde(default)]
    pub text: TextConfig,

    /// TF-IDF configuration.
    #[serde(default)]
    pub lexical: LexicalConfig,

    /// Embedding backend configuration.
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Ranker tuning knobs.
    #[serde(default)]
    pub matcher: MatchConfig,
}

fn default_config_version() -> String {
    "1.0".to_string()
}

impl JobmatchConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: JobmatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.text
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.lexical
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.semantic
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(())
    }
}

impl Default for JobmatchConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            name: None,
            text: TextConfig::default(),
            lexical: LexicalConfig::default(),
            semantic: SemanticConfig::default(),
            matcher: MatchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
text:
  version: 1
  lowercase: true
lexical:
  version: 1
  max_features: 500
"#;

        let config = JobmatchConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert!(config.text.lowercase);
        assert_eq!(config.lexical.max_features, 500);
        assert_eq!(config.matcher.top_k, 5);
    }

    #[test]
    fn load_from_file() {
        let yaml = r#"
version: "1.0"
matcher:
  alpha: 0.4
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = JobmatchConfig::from_file(temp_file.path()).unwrap();
        assert!((config.matcher.alpha - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn default_config_is_valid() {
        let config = JobmatchConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unsupported_version_rejected() {
        let yaml = r#"
version: "9"
"#;
        let result = JobmatchConfig::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn matcher_validation_propagates() {
        let yaml = r#"
version: "1.0"
matcher:
  alpha: 1.5
"#;
        let result = JobmatchConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("alpha"));
    }

    #[test]
    fn semantic_validation_propagates() {
        let yaml = r#"
version: "1.0"
semantic:
  mode: "quantum"
"#;
        let result = JobmatchConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("mode"));
    }

    #[test]
    fn full_yaml_roundtrip() {
        let yaml = r#"
version: "1.0"
name: "production"
text:
  version: 1
  normalize_unicode: true
  lowercase: true
  strip_punctuation: false

lexical:
  version: 1
  max_features: 2000
  ngram_min: 1
  ngram_max: 2
  use_parallel: false

semantic:
  mode: "hash"
  dim: 384
  normalize: true

matcher:
  top_k: 5
  alpha: 0.6
  keyword_boost: 0.15
"#;

        let config = JobmatchConfig::from_yaml(yaml).unwrap();
        assert!(config.text.normalize_unicode);
        assert_eq!(config.lexical.max_features, 2000);
        assert_eq!(config.semantic.mode, "hash");
        assert_eq!(config.semantic.dim, 384);
        assert_eq!(config.matcher.top_k, 5);
    }
}
