//! Filter configuration.
//!
//! The two deployed front-ends disagreed on reserved tokens, character
//! stripping and threshold. Both behaviours are kept as named presets so the
//! configuration that matches a given model's training is chosen explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::SpamThreshold;
use crate::error::ConfigError;
use crate::vocab::{ReservedTokens, Vocabulary};
use crate::DEFAULT_ENCODING_LENGTH;

/// Which characters survive the stripping step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    /// Any Unicode letter or digit.
    #[default]
    Unicode,
    /// `a-z` and `0-9` only; other letters are dropped.
    Ascii,
}

impl CharClass {
    /// Whether `c` (already lowercased) is kept as part of a word.
    pub fn keeps(&self, c: char) -> bool {
        match self {
            Self::Unicode => c.is_alphanumeric(),
            Self::Ascii => c.is_ascii_lowercase() || c.is_ascii_digit(),
        }
    }
}

/// Encoder settings: reserved tokens, START handling, and output width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub include_start_token: bool,
    pub start_token: u32,
    pub unknown_token: u32,
    pub pad_token: u32,
    pub encoding_length: usize,
    #[serde(default)]
    pub char_class: CharClass,
}

impl EncoderConfig {
    /// START prepended, UNKNOWN and PAD taken from `reserved`.
    pub fn with_start_token(reserved: &ReservedTokens) -> Self {
        Self {
            include_start_token: true,
            start_token: reserved.start,
            unknown_token: reserved.unknown,
            pad_token: reserved.pad,
            encoding_length: DEFAULT_ENCODING_LENGTH,
            char_class: CharClass::Unicode,
        }
    }

    /// No START; unknown words and padding both encode as 0.
    pub fn zero_tokens() -> Self {
        Self {
            include_start_token: false,
            start_token: 0,
            unknown_token: 0,
            pad_token: 0,
            encoding_length: DEFAULT_ENCODING_LENGTH,
            char_class: CharClass::Ascii,
        }
    }
}

/// Everything the filter needs besides the vocabulary and the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub encoder: EncoderConfig,
    pub threshold: SpamThreshold,
}

impl FilterConfig {
    /// Comment-relay front-end: START token, distinct UNKNOWN/PAD, `> 0.75`.
    pub fn start_token_variant(reserved: &ReservedTokens) -> Self {
        Self {
            encoder: EncoderConfig::with_start_token(reserved),
            threshold: SpamThreshold::new(0.75, false),
        }
    }

    /// Standalone checker front-end: no START, UNKNOWN = PAD = 0, `>= 0.815`.
    pub fn zero_token_variant() -> Self {
        Self {
            encoder: EncoderConfig::zero_tokens(),
            threshold: SpamThreshold::new(0.815, true),
        }
    }

    /// Load from a JSON file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable settings.
    ///
    /// UNKNOWN == PAD is allowed but logged: the classifier can no longer tell
    /// an out-of-vocabulary word from padding, and whether that matches the
    /// deployed model's training needs confirming by its owner.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder.encoding_length == 0 {
            return Err(ConfigError::ZeroEncodingLength);
        }

        let t = self.threshold.value;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::ThresholdOutOfRange(t));
        }

        let e = &self.encoder;
        if e.include_start_token && (e.start_token == e.pad_token || e.start_token == e.unknown_token) {
            return Err(ConfigError::StartCollision(e.start_token));
        }

        if self.encoder.unknown_token == self.encoder.pad_token {
            warn!(
                token = self.encoder.pad_token,
                "unknown and pad tokens are the same value; out-of-vocabulary words are indistinguishable from padding"
            );
        }

        Ok(())
    }

    /// Reject structural tokens that the vocabulary also hands out to a word.
    pub fn check_against(&self, vocab: &Vocabulary) -> Result<(), ConfigError> {
        let e = &self.encoder;
        let mut roles = vec![("unknown", e.unknown_token), ("pad", e.pad_token)];
        if e.include_start_token {
            roles.push(("start", e.start_token));
        }

        for (role, token) in roles {
            if vocab.contains_token(token) {
                return Err(ConfigError::TokenInVocabulary { role, token });
            }
        }
        Ok(())
    }
}
