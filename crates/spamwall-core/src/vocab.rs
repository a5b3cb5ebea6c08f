//! Fixed word → token vocabulary.
//!
//! Built once at startup from a dictionary resource and never mutated. Two
//! resource shapes are accepted:
//!
//! - dictionary form: `{"start": 1, "pad": 0, "unknown": 2, "lookup": {"i": 3, ...}}`
//! - word-list form: `["i", "check", ...]`, where a word's token is its
//!   position + 1 and every reserved token is 0.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::VocabError;

/// Token values reserved for structural roles rather than vocabulary words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedTokens {
    pub start: u32,
    pub pad: u32,
    pub unknown: u32,
}

impl ReservedTokens {
    /// Word-list resources carry no reserved tokens; everything collapses to 0.
    pub const ZERO: Self = Self {
        start: 0,
        pad: 0,
        unknown: 0,
    };

    pub fn contains(&self, token: u32) -> bool {
        token == self.start || token == self.pad || token == self.unknown
    }
}

impl Default for ReservedTokens {
    fn default() -> Self {
        Self {
            start: 1,
            pad: 0,
            unknown: 2,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Resource {
    Dictionary {
        start: u32,
        pad: u32,
        unknown: u32,
        lookup: HashMap<String, u32>,
    },
    WordList(Vec<String>),
}

/// Immutable mapping from lowercase word to token.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    lookup: HashMap<String, u32>,
    reserved: ReservedTokens,
}

impl Vocabulary {
    /// Build from an explicit word → token map.
    ///
    /// Rejects zero indices, indices that collide with a reserved token, and
    /// words that are not already lowercase.
    pub fn new(lookup: HashMap<String, u32>, reserved: ReservedTokens) -> Result<Self, VocabError> {
        for (word, &index) in &lookup {
            if *word != word.to_lowercase() {
                return Err(VocabError::NotLowercase(word.clone()));
            }
            if index == 0 {
                return Err(VocabError::ZeroIndex(word.clone()));
            }
            if reserved.contains(index) {
                return Err(VocabError::ReservedCollision {
                    word: word.clone(),
                    index,
                });
            }
        }

        Ok(Self { lookup, reserved })
    }

    /// Build from an ordered word list: token = position + 1.
    ///
    /// A repeated word keeps its first position.
    pub fn from_word_list<I, S>(words: I, reserved: ReservedTokens) -> Result<Self, VocabError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lookup = HashMap::new();
        for (position, word) in words.into_iter().enumerate() {
            lookup.entry(word.into()).or_insert(position as u32 + 1);
        }

        Self::new(lookup, reserved)
    }

    /// Load a JSON vocabulary resource in either dictionary or word-list form.
    pub fn load(path: &Path) -> Result<Self, VocabError> {
        if !path.exists() {
            return Err(VocabError::NotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let vocab = Self::from_json(&text)?;

        info!(
            words = vocab.len(),
            path = %path.display(),
            "loaded vocabulary"
        );
        Ok(vocab)
    }

    /// Parse a JSON vocabulary resource held in memory.
    pub fn from_json(text: &str) -> Result<Self, VocabError> {
        match serde_json::from_str::<Resource>(text)? {
            Resource::Dictionary {
                start,
                pad,
                unknown,
                lookup,
            } => Self::new(lookup, ReservedTokens { start, pad, unknown }),
            Resource::WordList(words) => Self::from_word_list(words, ReservedTokens::ZERO),
        }
    }

    /// Exact-string lookup. Callers lowercase before asking.
    pub fn get(&self, word: &str) -> Option<u32> {
        self.lookup.get(word).copied()
    }

    /// Whether any word maps to `token`.
    pub fn contains_token(&self, token: u32) -> bool {
        self.lookup.values().any(|&index| index == token)
    }

    pub fn reserved(&self) -> ReservedTokens {
        self.reserved
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
