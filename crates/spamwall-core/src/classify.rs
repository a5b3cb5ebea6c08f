use serde::{Deserialize, Serialize};

/// Probability cutoff above which a comment is treated as spam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpamThreshold {
    pub value: f32,
    /// `true` compares with `>=`, `false` with `>`.
    #[serde(default)]
    pub inclusive: bool,
}

impl SpamThreshold {
    pub const fn new(value: f32, inclusive: bool) -> Self {
        Self { value, inclusive }
    }

    pub fn is_spam(&self, probability: f32) -> bool {
        if self.inclusive {
            probability >= self.value
        } else {
            probability > self.value
        }
    }
}

/// Spam probability for one comment and the decision derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub probability: f32,
    pub is_spam: bool,
}

impl Classification {
    pub fn from_probability(probability: f32, threshold: &SpamThreshold) -> Self {
        Self {
            probability,
            is_spam: threshold.is_spam(probability),
        }
    }

    /// Probability as a percentage with two decimals, e.g. `"81.50%"`.
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}
