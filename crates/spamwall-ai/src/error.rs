use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model artifact not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("cannot load model from {0}: remote artifacts need the `http` feature")]
    UnsupportedLocation(String),

    #[error("unexpected model output shape {shape:?} for batch of {batch}")]
    OutputShape { shape: Vec<i64>, batch: usize },

    #[error("token sequences in one batch must share a length")]
    RaggedBatch,

    #[error("model returned no prediction")]
    EmptyOutput,

    #[error("onnx runtime error: {0}")]
    Runtime(String),

    #[error("model session lock poisoned")]
    Poisoned,

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Server { status: u16, url: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("inference task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
