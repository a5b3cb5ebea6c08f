//! Text → fixed-length token sequence, the classifier's input contract.
//!
//! 1. lowercase
//! 2. drop every character that is neither alphanumeric nor whitespace
//!    (dropped, not replaced: `"a,b"` becomes the single word `"ab"`)
//! 3. split on whitespace
//! 4. optionally prepend START
//! 5. map words to vocabulary tokens, UNKNOWN otherwise
//! 6. pad with PAD / truncate the tail to the encoding length
//!
//! Every step must match what the model saw during training, so none of this
//! is tunable beyond [`EncoderConfig`].

use std::sync::Arc;

use tracing::debug;

use crate::config::EncoderConfig;
use crate::vocab::Vocabulary;

/// Fixed-length token sequence produced by [`Encoder::encode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenSequence(Vec<u32>);

impl TokenSequence {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u32> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

impl From<TokenSequence> for Vec<u32> {
    fn from(seq: TokenSequence) -> Self {
        seq.0
    }
}

impl std::fmt::Display for TokenSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{token}")?;
        }
        write!(f, "]")
    }
}

/// Deterministic, pure encoder over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct Encoder {
    vocab: Arc<Vocabulary>,
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(vocab: Arc<Vocabulary>, config: &EncoderConfig) -> Self {
        Self {
            vocab,
            config: config.clone(),
        }
    }

    pub fn encoding_length(&self) -> usize {
        self.config.encoding_length
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Lowercase and strip everything but alphanumerics and whitespace.
    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
            .chars()
            .filter(|&c| c.is_whitespace() || self.config.char_class.keeps(c))
            .collect()
    }

    /// Normalized words in order, empty fragments dropped.
    pub fn words(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    /// Encode `text` into exactly [`encoding_length`](Self::encoding_length) tokens.
    pub fn encode(&self, text: &str) -> TokenSequence {
        let len = self.config.encoding_length;
        let mut tokens = Vec::with_capacity(len);

        if self.config.include_start_token {
            tokens.push(self.config.start_token);
        }

        let room = len.saturating_sub(tokens.len());
        let unknown = self.config.unknown_token;
        tokens.extend(
            self.words(text)
                .iter()
                .take(room)
                .map(|word| self.vocab.get(word).unwrap_or(unknown)),
        );

        // Pads short input; also trims START when the length is below 1.
        tokens.resize(len, self.config.pad_token);

        let seq = TokenSequence(tokens);
        debug!(tokens = %seq, "encoded comment");
        seq
    }

    pub fn encode_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<TokenSequence> {
        texts.iter().map(|t| self.encode(t.as_ref())).collect()
    }
}
