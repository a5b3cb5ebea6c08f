//! A posting session: who is commenting, which model judges them, and where
//! accepted comments go.
//!
//! At most one post is in flight per session. A second submit while the first
//! is still classifying is rejected rather than queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use spamwall_core::{Classification, CommentEvent};
use spamwall_sync::{ChannelError, CommentChannel};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::InferenceError;
use crate::filter::SpamFilter;
use crate::handle::ModelHandle;
use crate::loader::ModelLoader;

pub const DEFAULT_USERNAME: &str = "Anonymous";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("comment is empty")]
    EmptyComment,
    #[error("a comment is already being processed")]
    Busy,
    #[error("spam model unavailable: {0}")]
    ModelUnavailable(#[source] InferenceError),
    #[error("classification failed: {0}")]
    Inference(#[source] InferenceError),
    #[error("could not relay comment: {0}")]
    Channel(#[from] ChannelError),
}

/// What happened to a posted comment.
#[derive(Debug, Clone, PartialEq)]
pub enum PostOutcome {
    /// Not spam; relayed to other clients as `event`.
    Accepted {
        event: CommentEvent,
        classification: Classification,
    },
    /// Spam; nothing was published.
    Suppressed { classification: Classification },
}

impl PostOutcome {
    pub fn classification(&self) -> &Classification {
        match self {
            Self::Accepted { classification, .. } | Self::Suppressed { classification } => {
                classification
            }
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Clears the busy flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| SessionError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Session<L: ModelLoader, C: CommentChannel> {
    username: String,
    filter: SpamFilter,
    model: Arc<ModelHandle<L>>,
    channel: C,
    in_flight: AtomicBool,
}

impl<L: ModelLoader, C: CommentChannel> Session<L, C> {
    pub fn new(filter: SpamFilter, model: Arc<ModelHandle<L>>, channel: C) -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            filter,
            model,
            channel,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.set_username(username);
        self
    }

    /// Blank names fall back to [`DEFAULT_USERNAME`].
    pub fn set_username(&mut self, username: impl Into<String>) {
        let username = username.into();
        let trimmed = username.trim();
        self.username = if trimmed.is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            trimmed.to_string()
        };
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn model(&self) -> &ModelHandle<L> {
        &self.model
    }

    pub fn filter(&self) -> &SpamFilter {
        &self.filter
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Load the model now instead of on the first post.
    pub async fn preload(&self) -> Result<(), SessionError> {
        self.model
            .get_or_load()
            .await
            .map(|_| ())
            .map_err(SessionError::ModelUnavailable)
    }

    /// Classify without publishing.
    pub async fn check(&self, text: &str) -> Result<Classification, SessionError> {
        let text = non_empty(text)?;
        let _guard = InFlight::acquire(&self.in_flight)?;
        self.classify(text).await
    }

    /// Classify `text` and, unless it is spam, relay it to other clients.
    pub async fn post(&self, text: &str) -> Result<PostOutcome, SessionError> {
        let text = non_empty(text)?;
        let _guard = InFlight::acquire(&self.in_flight)?;

        let classification = self.classify(text).await?;
        if classification.is_spam {
            info!(
                user = %self.username,
                probability = classification.probability,
                "comment suppressed as spam"
            );
            return Ok(PostOutcome::Suppressed { classification });
        }

        let event = CommentEvent::new(&self.username, local_timestamp(), text);
        self.channel.publish(event.clone()).await?;
        debug!(user = %self.username, "comment relayed");

        Ok(PostOutcome::Accepted {
            event,
            classification,
        })
    }

    async fn classify(&self, text: &str) -> Result<Classification, SessionError> {
        let model = self
            .model
            .get_or_load()
            .await
            .map_err(SessionError::ModelUnavailable)?;

        self.filter
            .classify_blocking(model, text)
            .await
            .map_err(SessionError::Inference)
    }
}

fn non_empty(text: &str) -> Result<&str, SessionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(SessionError::EmptyComment)
    } else {
        Ok(trimmed)
    }
}

/// Display time at the posting client, e.g. `15/10/2026, 09:30:00`.
fn local_timestamp() -> String {
    chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string()
}
