//! ONNX Runtime adapter for a pretrained spam classifier.
//!
//! The artifact is a single `.onnx` file with one input of shape
//! `[batch, encoding_length]` and one output of shape `[batch, 2]` (softmax)
//! or `[batch, 1]` (sigmoid).

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use spamwall_core::TokenSequence;
use tracing::info;

use crate::error::InferenceError;
use crate::model::{SpamModel, TokenDtype, spam_probabilities};

fn runtime(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Runtime(e.to_string())
}

/// Spam classifier backed by an ONNX Runtime session.
pub struct OnnxSpamModel {
    // `Session::run` needs `&mut`, the model is shared read-only.
    session: Mutex<Session>,
    dtype: TokenDtype,
}

impl OnnxSpamModel {
    /// Load from an `.onnx` file on disk.
    pub fn from_file(path: &Path, dtype: TokenDtype) -> Result<Self, InferenceError> {
        if !path.exists() {
            return Err(InferenceError::NotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(runtime)?
            .commit_from_file(path)
            .map_err(runtime)?;

        info!(model = %path.display(), ?dtype, "loaded spam model");
        Ok(Self::with_session(session, dtype))
    }

    /// Load from artifact bytes already in memory (e.g. fetched over HTTP).
    pub fn from_memory(bytes: &[u8], dtype: TokenDtype) -> Result<Self, InferenceError> {
        let session = Session::builder()
            .map_err(runtime)?
            .commit_from_memory(bytes)
            .map_err(runtime)?;

        info!(bytes = bytes.len(), ?dtype, "loaded spam model from memory");
        Ok(Self::with_session(session, dtype))
    }

    fn with_session(session: Session, dtype: TokenDtype) -> Self {
        Self {
            session: Mutex::new(session),
            dtype,
        }
    }
}

impl SpamModel for OnnxSpamModel {
    fn predict(&self, batch: &[TokenSequence]) -> Result<Vec<f32>, InferenceError> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let width = batch[0].len();
        if batch.iter().any(|seq| seq.len() != width) {
            return Err(InferenceError::RaggedBatch);
        }

        let shape = [batch.len() as i64, width as i64];
        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;

        let outputs = match self.dtype {
            TokenDtype::Float32 => {
                let data: Vec<f32> = batch
                    .iter()
                    .flat_map(|seq| seq.iter().map(|&t| t as f32))
                    .collect();
                let tensor = Tensor::from_array((shape, data.into_boxed_slice())).map_err(runtime)?;
                session.run(ort::inputs![tensor]).map_err(runtime)?
            }
            TokenDtype::Int64 => {
                let data: Vec<i64> = batch
                    .iter()
                    .flat_map(|seq| seq.iter().map(|&t| t as i64))
                    .collect();
                let tensor = Tensor::from_array((shape, data.into_boxed_slice())).map_err(runtime)?;
                session.run(ort::inputs![tensor]).map_err(runtime)?
            }
        };

        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>().map_err(runtime)?;
        let dims: &[i64] = output_shape;
        spam_probabilities(dims, output_data, batch.len())
    }
}
