//! JSON wire envelope: `{"event": "comment", "data": {...}}`.

use serde::{Deserialize, Serialize};
use spamwall_core::{COMMENT_EVENT, CommentEvent, REMOTE_COMMENT_EVENT};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("clients may not emit {0:?} events")]
    UnexpectedEvent(&'static str),
    #[error("relay has shut down")]
    Closed,
}

/// A named event on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChannelEvent {
    /// Emitted by a client whose comment passed the spam check.
    #[serde(rename = "comment")]
    Comment(CommentEvent),
    /// Delivered to every other client.
    #[serde(rename = "remoteComment")]
    RemoteComment(CommentEvent),
}

impl ChannelEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Comment(_) => COMMENT_EVENT,
            Self::RemoteComment(_) => REMOTE_COMMENT_EVENT,
        }
    }

    pub fn payload(&self) -> &CommentEvent {
        match self {
            Self::Comment(c) | Self::RemoteComment(c) => c,
        }
    }

    pub fn into_payload(self) -> CommentEvent {
        match self {
            Self::Comment(c) | Self::RemoteComment(c) => c,
        }
    }

    pub fn to_json(&self) -> Result<String, ChannelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(frame: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommentEvent {
        CommentEvent::new("Anonymous", "15/10/2026, 09:30:00", "great video")
    }

    #[test]
    fn envelope_uses_event_names() {
        let json = ChannelEvent::Comment(sample()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], COMMENT_EVENT);
        assert_eq!(value["data"]["comment"], "great video");

        let json = ChannelEvent::RemoteComment(sample()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], REMOTE_COMMENT_EVENT);
    }

    #[test]
    fn name_matches_serialized_tag() {
        for event in [
            ChannelEvent::Comment(sample()),
            ChannelEvent::RemoteComment(sample()),
        ] {
            let value: serde_json::Value =
                serde_json::from_str(&event.to_json().unwrap()).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }

    #[test]
    fn parses_browser_frame() {
        let frame = r#"{"event":"comment","data":{"username":"jo","timestamp":"now","comment":"hi"}}"#;
        let event = ChannelEvent::from_json(frame).unwrap();
        assert_eq!(event, ChannelEvent::Comment(CommentEvent::new("jo", "now", "hi")));
    }

    #[test]
    fn rejects_unknown_event() {
        let frame = r#"{"event":"typing","data":{"username":"jo","timestamp":"now","comment":"hi"}}"#;
        assert!(matches!(
            ChannelEvent::from_json(frame),
            Err(ChannelError::Json(_))
        ));
    }
}
