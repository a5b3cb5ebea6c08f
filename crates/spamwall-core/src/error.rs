use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("vocabulary file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("word {word:?} maps to reserved token {index}")]
    ReservedCollision { word: String, index: u32 },

    #[error("word {0:?} maps to index 0")]
    ZeroIndex(String),

    #[error("word {0:?} is not lowercase and can never match")]
    NotLowercase(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("encoding length must be at least 1")]
    ZeroEncodingLength,

    #[error("spam threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f32),

    #[error("start token {0} is also the pad or unknown token")]
    StartCollision(u32),

    #[error("{role} token {token} is also a vocabulary word's index")]
    TokenInVocabulary { role: &'static str, token: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
