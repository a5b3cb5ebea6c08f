//! Where the model artifact lives and how to turn it into a [`SpamModel`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::model::SpamModel;
#[cfg(feature = "onnx")]
use crate::model::TokenDtype;
#[cfg(feature = "onnx")]
use crate::onnx::OnnxSpamModel;

/// A model artifact on disk or behind a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    Path(PathBuf),
    Url(String),
}

impl FromStr for ArtifactLocation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.to_string()))
        } else {
            Ok(Self::Path(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => write!(f, "{u}"),
        }
    }
}

/// Produces a model on demand. Called at most once per successful load by
/// [`ModelHandle`](crate::ModelHandle).
#[async_trait]
pub trait ModelLoader: Send + Sync {
    type Model: SpamModel + 'static;

    async fn load(&self) -> Result<Self::Model, InferenceError>;
}

/// Loads an [`OnnxSpamModel`] from an [`ArtifactLocation`].
#[cfg(feature = "onnx")]
#[derive(Debug, Clone)]
pub struct OnnxLoader {
    pub location: ArtifactLocation,
    pub dtype: TokenDtype,
}

#[cfg(feature = "onnx")]
impl OnnxLoader {
    pub fn new(location: ArtifactLocation, dtype: TokenDtype) -> Self {
        Self { location, dtype }
    }
}

#[cfg(feature = "onnx")]
#[async_trait]
impl ModelLoader for OnnxLoader {
    type Model = OnnxSpamModel;

    async fn load(&self) -> Result<OnnxSpamModel, InferenceError> {
        let dtype = self.dtype;
        match &self.location {
            ArtifactLocation::Path(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || OnnxSpamModel::from_file(&path, dtype)).await?
            }
            ArtifactLocation::Url(url) => {
                let bytes = fetch_artifact(url).await?;
                tokio::task::spawn_blocking(move || OnnxSpamModel::from_memory(&bytes, dtype))
                    .await?
            }
        }
    }
}

/// Download model bytes. No retry and no timeout: a stalled fetch stays pending.
#[cfg(all(feature = "onnx", feature = "http"))]
async fn fetch_artifact(url: &str) -> Result<Vec<u8>, InferenceError> {
    tracing::info!(url = %url, "fetching spam model");
    let resp = reqwest::get(url).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(InferenceError::Server {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = resp.bytes().await?;
    tracing::info!(url = %url, bytes = bytes.len(), "fetched spam model");
    Ok(bytes.to_vec())
}

#[cfg(all(feature = "onnx", not(feature = "http")))]
async fn fetch_artifact(url: &str) -> Result<Vec<u8>, InferenceError> {
    Err(InferenceError::UnsupportedLocation(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_and_path() {
        assert_eq!(
            "https://example.com/model.onnx".parse::<ArtifactLocation>().unwrap(),
            ArtifactLocation::Url("https://example.com/model.onnx".into())
        );
        assert_eq!(
            "./models/spam/model.onnx".parse::<ArtifactLocation>().unwrap(),
            ArtifactLocation::Path(PathBuf::from("./models/spam/model.onnx"))
        );
    }

    #[test]
    fn display_round_trips() {
        let loc: ArtifactLocation = "http://localhost:8080/model.onnx".parse().unwrap();
        assert_eq!(loc.to_string(), "http://localhost:8080/model.onnx");
    }

    #[cfg(feature = "onnx")]
    #[tokio::test]
    async fn onnx_loader_reports_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let loader = OnnxLoader::new(
            ArtifactLocation::Path(tmp.path().join("model.onnx")),
            TokenDtype::Float32,
        );
        assert!(matches!(loader.load().await, Err(InferenceError::NotFound(_))));
    }

    #[cfg(all(feature = "onnx", not(feature = "http")))]
    #[tokio::test]
    async fn url_without_http_feature_is_unsupported() {
        let loader = OnnxLoader::new(
            ArtifactLocation::Url("https://example.com/model.onnx".into()),
            TokenDtype::Float32,
        );
        assert!(matches!(
            loader.load().await,
            Err(InferenceError::UnsupportedLocation(_))
        ));
    }
}
