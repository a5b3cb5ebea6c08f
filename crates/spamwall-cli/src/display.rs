//! Plain-text rendering for comments, verdicts, and model status.

use spamwall_ai::ModelStatus;
use spamwall_core::{Classification, CommentEvent};

/// Longest comment excerpt shown on a verdict line.
const EXCERPT_CHARS: usize = 60;

/// A comment list item: name and time on one line, the text indented below.
pub fn comment_item(event: &CommentEvent) -> String {
    format!(
        "{} · {}\n  {}",
        event.username, event.timestamp, event.comment
    )
}

/// One verdict row: label, probability, and the start of the text.
pub fn verdict_line(text: &str, classification: &Classification) -> String {
    let label = if classification.is_spam { "SPAM" } else { "ok" };
    format!(
        "{label:<5} {:>7}  {}",
        classification.percent(),
        excerpt(text)
    )
}

pub fn status_line(status: &ModelStatus) -> String {
    match status {
        ModelStatus::NotLoaded => "model not loaded".to_string(),
        ModelStatus::Loading => "loading model...".to_string(),
        ModelStatus::Ready => "model loaded and ready".to_string(),
        ModelStatus::Failed(e) => format!("model failed to load: {e}"),
    }
}

fn excerpt(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= EXCERPT_CHARS {
        single_line
    } else {
        let cut: String = single_line.chars().take(EXCERPT_CHARS - 1).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_item_layout() {
        let event = CommentEvent::new("alice", "15/10/2026, 09:30:00", "first!");
        assert_eq!(
            comment_item(&event),
            "alice · 15/10/2026, 09:30:00\n  first!"
        );
    }

    #[test]
    fn verdict_line_labels_spam() {
        let c = Classification {
            probability: 0.9,
            is_spam: true,
        };
        assert_eq!(verdict_line("buy now", &c), "SPAM   90.00%  buy now");

        let c = Classification {
            probability: 0.05,
            is_spam: false,
        };
        assert!(verdict_line("hi", &c).starts_with("ok "));
    }

    #[test]
    fn long_text_is_shortened() {
        let text = "word ".repeat(40);
        let line = excerpt(&text);
        assert_eq!(line.chars().count(), EXCERPT_CHARS);
        assert!(line.ends_with('…'));
    }

    #[test]
    fn multiline_text_is_flattened() {
        assert_eq!(excerpt("one\ntwo\t three"), "one two three");
    }

    #[test]
    fn failed_status_includes_reason() {
        let line = status_line(&ModelStatus::Failed("not found".into()));
        assert!(line.contains("not found"));
    }
}
