//! Comment payload relayed between clients.

use serde::{Deserialize, Serialize};

/// Outbound event name: a locally accepted comment.
pub const COMMENT_EVENT: &str = "comment";

/// Inbound event name: a comment accepted by some other client.
pub const REMOTE_COMMENT_EVENT: &str = "remoteComment";

/// A comment that passed the spam check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEvent {
    pub username: String,
    /// Local display time at the posting client, not machine-parsed.
    pub timestamp: String,
    pub comment: String,
}

impl CommentEvent {
    pub fn new(
        username: impl Into<String>,
        timestamp: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            timestamp: timestamp.into(),
            comment: comment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_match_wire_schema() {
        let event = CommentEvent::new("Anonymous", "15/10/2026, 09:30:00", "nice post");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["username"], "Anonymous");
        assert_eq!(json["timestamp"], "15/10/2026, 09:30:00");
        assert_eq!(json["comment"], "nice post");
    }
}
