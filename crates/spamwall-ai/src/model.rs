//! The classifier seam.
//!
//! The network is an opaque pretrained artifact; all this crate knows is that
//! it takes a `[batch, encoding_length]` token tensor and returns a
//! distribution over {not-spam, spam} per row.

use spamwall_core::TokenSequence;

use crate::error::InferenceError;

/// A loaded spam classifier.
pub trait SpamModel: Send + Sync {
    /// Spam probability for each sequence, in input order.
    fn predict(&self, batch: &[TokenSequence]) -> Result<Vec<f32>, InferenceError>;
}

/// Element type of the model's input tensor.
///
/// Keras embedding layers exported through TF.js or tf2onnx take `float32`
/// token ids, so that is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenDtype {
    #[default]
    Float32,
    Int64,
}

impl std::str::FromStr for TokenDtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f32" | "float32" => Ok(Self::Float32),
            "i64" | "int64" => Ok(Self::Int64),
            other => Err(format!("unknown token dtype {other:?} (expected f32 or i64)")),
        }
    }
}

/// Pull the spam column out of a flat model output.
///
/// `[batch, 2]` is a softmax over {not-spam, spam}: column 1 is taken.
/// `[batch, 1]` or `[batch]` is a single sigmoid unit: taken as is.
pub fn spam_probabilities(
    shape: &[i64],
    data: &[f32],
    batch: usize,
) -> Result<Vec<f32>, InferenceError> {
    let bad_shape = || InferenceError::OutputShape {
        shape: shape.to_vec(),
        batch,
    };

    let width = match shape {
        [rows] if *rows as usize == batch => 1,
        [rows, cols] if *rows as usize == batch && (*cols == 1 || *cols == 2) => *cols as usize,
        _ => return Err(bad_shape()),
    };

    if data.len() != batch * width {
        return Err(bad_shape());
    }

    Ok(data
        .chunks_exact(width)
        .map(|row| row[width - 1])
        .collect())
}
