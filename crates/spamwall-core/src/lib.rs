//! Core types: vocabulary, fixed-length token encoder, filter configuration,
//! and the comment payload shared by the inference and sync layers.

pub mod classify;
pub mod comment;
pub mod config;
pub mod encoder;
mod error;
pub mod vocab;

pub use classify::{Classification, SpamThreshold};
pub use comment::{COMMENT_EVENT, CommentEvent, REMOTE_COMMENT_EVENT};
pub use config::{CharClass, EncoderConfig, FilterConfig};
pub use encoder::{Encoder, TokenSequence};
pub use error::{ConfigError, VocabError};
pub use vocab::{ReservedTokens, Vocabulary};

/// Number of tokens the classifier's input tensor expects, in both shipped variants.
pub const DEFAULT_ENCODING_LENGTH: usize = 20;
