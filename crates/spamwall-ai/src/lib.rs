//! Inference layer: the model seam, ONNX Runtime adapter, lazily loaded model
//! handle, and the session that runs a comment through encode → infer →
//! threshold → relay.

mod error;
mod filter;
mod handle;
mod loader;
mod model;
#[cfg(feature = "onnx")]
mod onnx;
mod session;

pub use error::InferenceError;
pub use filter::SpamFilter;
pub use handle::{ModelHandle, ModelStatus};
pub use loader::{ArtifactLocation, ModelLoader};
pub use model::{SpamModel, TokenDtype, spam_probabilities};
#[cfg(feature = "onnx")]
pub use loader::OnnxLoader;
#[cfg(feature = "onnx")]
pub use onnx::OnnxSpamModel;
pub use session::{DEFAULT_USERNAME, PostOutcome, Session, SessionError};
