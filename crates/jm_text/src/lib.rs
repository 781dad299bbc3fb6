//! # jobmatch text canonicalization
//!
//! Turns raw resume/posting text into the deterministic token stream the
//! lexical and semantic models consume. The pipeline is:
//!
//! - **Unicode normalization** (NFKC by default) so visually-equivalent
//!   input produces identical tokens.
//! - **Whitespace collapsing**: CR/LF and tab runs become single spaces.
//! - **Tokenization**: lowercase word tokens. Skill-bearing punctuation
//!   (`+`, `#`, `.`, `-`) is kept inside tokens so "c++", "node.js" and
//!   "scikit-learn" survive as single terms; everything else delimits.
//! - **N-gram expansion**: unigrams and space-joined bigrams feed the
//!   TF-IDF vocabulary.
//!
//! Determinism matters here: the same text must always produce the same
//! tokens, because corpus snapshots are compared by content fingerprint
//! ([`hash_text`]) and match results must be reproducible across runs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

/// Small built-in English stopword list, trimmed to the words that show up
/// in virtually every resume and posting without carrying signal.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "to", "was", "were", "will", "with",
];

/// Configuration for text canonicalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextConfig {
    /// Semantic version of the canonicalization configuration.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Apply Unicode NFKC normalization before tokenizing.
    #[serde(default = "default_true")]
    pub normalize_unicode: bool,
    /// Lowercase all tokens.
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Treat skill punctuation (`+ # . -`) as delimiters too, yielding pure
    /// alphanumeric tokens.
    #[serde(default)]
    pub strip_punctuation: bool,
    /// Drop [`STOPWORDS`] from the token stream.
    #[serde(default)]
    pub remove_stopwords: bool,
}

const fn default_version() -> u32 {
    1
}

const fn default_true() -> bool {
    true
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            lowercase: true,
            strip_punctuation: false,
            remove_stopwords: false,
        }
    }
}

impl TextConfig {
    /// Validate the configuration. Version 0 is reserved and invalid.
    pub fn validate(&self) -> Result<(), TextError> {
        if self.version == 0 {
            return Err(TextError::InvalidConfig(
                "text config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Errors surfaced by the text layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("invalid text config: {0}")]
    InvalidConfig(String),
}

/// Normalize whitespace (and optionally Unicode form) in raw text.
///
/// CR/LF become spaces, whitespace runs collapse to a single space, and the
/// result is trimmed. Character case is left untouched; lowercasing happens
/// in [`tokenize`] so display text stays readable.
pub fn clean_text(input: &str, cfg: &TextConfig) -> String {
    let normalized: String = if cfg.normalize_unicode {
        input.nfkc().collect()
    } else {
        input.to_string()
    };

    let mut out = String::with_capacity(normalized.len());
    for segment in normalized.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(segment);
    }
    out
}

/// Split canonical text into lowercase word tokens.
///
/// A token is a maximal run of alphanumeric characters, optionally including
/// `+`, `#`, `.` and `-` (unless `strip_punctuation` is set). Leading and
/// trailing `.`/`-` are trimmed so sentence-final words do not grow a dot,
/// while "c++" and "f#" keep their suffixes. Tokens without any alphanumeric
/// character are discarded.
pub fn tokenize(input: &str, cfg: &TextConfig) -> Vec<String> {
    let cleaned = clean_text(input, cfg);
    let mut tokens = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String, tokens: &mut Vec<String>| {
        if current.is_empty() {
            return;
        }
        // '.' is Po and would survive a dash-only trim; ASCII '-' and the
        // unicode dash family go through the Pd category.
        let trimmed = current.trim_matches(|c: char| c == '.' || c.is_punctuation_dash());
        if trimmed.chars().any(char::is_alphanumeric) {
            tokens.push(trimmed.to_string());
        }
        current.clear();
    };

    for ch in cleaned.chars() {
        let keep = if ch.is_alphanumeric() {
            true
        } else if matches!(ch, '+' | '#' | '.' | '-') {
            !cfg.strip_punctuation
        } else {
            false
        };

        if keep {
            if cfg.lowercase {
                current.extend(ch.to_lowercase());
            } else {
                current.push(ch);
            }
        } else {
            flush(&mut current, &mut tokens);
        }
    }
    flush(&mut current, &mut tokens);

    if cfg.remove_stopwords {
        tokens.retain(|t| !STOPWORDS.contains(&t.as_str()));
    }
    tokens
}

/// Expand a token stream into n-grams for `n` in `min_n..=max_n`.
///
/// Multi-token grams are space-joined, so the bigram of `["aws", "docker"]`
/// is the single term `"aws docker"`.
pub fn ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let mut grams = Vec::new();
    if min_n == 0 || max_n < min_n {
        return grams;
    }
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

/// SHA-256 hex digest of text. Used for corpus snapshot fingerprints.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace() {
        let cfg = TextConfig::default();
        let out = clean_text("  Senior\r\nPython   Developer\t ", &cfg);
        assert_eq!(out, "Senior Python Developer");
    }

    #[test]
    fn unicode_equivalence() {
        let cfg = TextConfig::default();
        let composed = tokenize("Caf\u{00E9} manager", &cfg);
        let decomposed = tokenize("Cafe\u{0301} manager", &cfg);
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn tokenize_keeps_skill_punctuation() {
        let cfg = TextConfig::default();
        let tokens = tokenize("C++ and Node.js, scikit-learn. F# too!", &cfg);
        assert_eq!(
            tokens,
            vec!["c++", "and", "node.js", "scikit-learn", "f#", "too"]
        );
    }

    #[test]
    fn tokenize_trims_sentence_final_dots() {
        let cfg = TextConfig::default();
        let tokens = tokenize("Docker experience. AWS daily.", &cfg);
        assert_eq!(tokens, vec!["docker", "experience", "aws", "daily"]);
    }

    #[test]
    fn strip_punctuation_yields_plain_tokens() {
        let cfg = TextConfig {
            strip_punctuation: true,
            ..TextConfig::default()
        };
        let tokens = tokenize("C++ and Node.js", &cfg);
        assert_eq!(tokens, vec!["c", "and", "node", "js"]);
    }

    #[test]
    fn stopword_removal_is_opt_in() {
        let with = TextConfig::default();
        let without = TextConfig {
            remove_stopwords: true,
            ..TextConfig::default()
        };
        assert_eq!(
            tokenize("python and aws", &with),
            vec!["python", "and", "aws"]
        );
        assert_eq!(tokenize("python and aws", &without), vec!["python", "aws"]);
    }

    #[test]
    fn ngrams_unigrams_and_bigrams() {
        let tokens: Vec<String> = ["senior", "python", "developer"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let grams = ngrams(&tokens, 1, 2);
        assert_eq!(
            grams,
            vec![
                "senior",
                "python",
                "developer",
                "senior python",
                "python developer"
            ]
        );
    }

    #[test]
    fn ngrams_degenerate_ranges() {
        let tokens: Vec<String> = vec!["solo".to_string()];
        assert!(ngrams(&tokens, 0, 2).is_empty());
        assert!(ngrams(&tokens, 2, 1).is_empty());
        assert_eq!(ngrams(&tokens, 1, 3), vec!["solo".to_string()]);
    }

    #[test]
    fn hash_text_is_deterministic_and_content_sensitive() {
        assert_eq!(hash_text("alpha"), hash_text("alpha"));
        assert_ne!(hash_text("alpha"), hash_text("beta"));
    }

    #[test]
    fn zero_version_config_rejected() {
        let cfg = TextConfig {
            version: 0,
            ..TextConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(TextError::InvalidConfig(_))));
    }
}
