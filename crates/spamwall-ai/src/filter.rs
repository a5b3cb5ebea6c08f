use std::sync::Arc;

use spamwall_core::{Classification, Encoder, FilterConfig, SpamThreshold, Vocabulary};

use crate::error::InferenceError;
use crate::model::SpamModel;

/// Encoder plus threshold: everything between raw text and a spam decision
/// except the model itself.
#[derive(Debug, Clone)]
pub struct SpamFilter {
    encoder: Encoder,
    threshold: SpamThreshold,
}

impl SpamFilter {
    pub fn new(encoder: Encoder, threshold: SpamThreshold) -> Self {
        Self { encoder, threshold }
    }

    pub fn from_config(vocab: Arc<Vocabulary>, config: &FilterConfig) -> Self {
        Self::new(Encoder::new(vocab, &config.encoder), config.threshold)
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn threshold(&self) -> SpamThreshold {
        self.threshold
    }

    pub fn classify<M: SpamModel + ?Sized>(
        &self,
        model: &M,
        text: &str,
    ) -> Result<Classification, InferenceError> {
        self.classify_batch(model, &[text])?
            .pop()
            .ok_or(InferenceError::EmptyOutput)
    }

    pub fn classify_batch<M: SpamModel + ?Sized, S: AsRef<str>>(
        &self,
        model: &M,
        texts: &[S],
    ) -> Result<Vec<Classification>, InferenceError> {
        let batch = self.encoder.encode_batch(texts);
        let probabilities = model.predict(&batch)?;
        if probabilities.len() != texts.len() {
            return Err(InferenceError::EmptyOutput);
        }

        Ok(probabilities
            .into_iter()
            .map(|p| Classification::from_probability(p, &self.threshold))
            .collect())
    }

    /// [`classify`](Self::classify) on the blocking pool, for async callers.
    pub async fn classify_blocking<M: SpamModel + 'static>(
        &self,
        model: Arc<M>,
        text: &str,
    ) -> Result<Classification, InferenceError> {
        let tokens = self.encoder.encode(text);
        let probabilities =
            tokio::task::spawn_blocking(move || model.predict(std::slice::from_ref(&tokens)))
                .await??;

        probabilities
            .first()
            .map(|&p| Classification::from_probability(p, &self.threshold))
            .ok_or(InferenceError::EmptyOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spamwall_core::{ReservedTokens, TokenSequence};

    /// Spam iff the sequence contains `token`.
    struct Keyword(u32);

    impl SpamModel for Keyword {
        fn predict(&self, batch: &[TokenSequence]) -> Result<Vec<f32>, InferenceError> {
            Ok(batch
                .iter()
                .map(|seq| if seq.iter().any(|&t| t == self.0) { 0.97 } else { 0.03 })
                .collect())
        }
    }

    struct Silent;

    impl SpamModel for Silent {
        fn predict(&self, _: &[TokenSequence]) -> Result<Vec<f32>, InferenceError> {
            Ok(vec![])
        }
    }

    fn filter() -> SpamFilter {
        let vocab = Vocabulary::from_word_list(["subscribe", "free"], ReservedTokens::ZERO).unwrap();
        SpamFilter::from_config(Arc::new(vocab), &FilterConfig::zero_token_variant())
    }

    #[test]
    fn classifies_against_threshold() {
        let filter = filter();
        let model = Keyword(2);

        let spam = filter.classify(&model, "FREE stuff!!!").unwrap();
        assert!(spam.is_spam);
        assert_eq!(spam.probability, 0.97);

        let ham = filter.classify(&model, "nice video").unwrap();
        assert!(!ham.is_spam);
    }

    #[test]
    fn batch_preserves_order() {
        let filter = filter();
        let results = filter
            .classify_batch(&Keyword(1), &["hello", "subscribe now", "bye"])
            .unwrap();
        let flags: Vec<bool> = results.iter().map(|c| c.is_spam).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn missing_prediction_is_an_error() {
        let err = filter().classify(&Silent, "hello").unwrap_err();
        assert!(matches!(err, InferenceError::EmptyOutput));
    }

    #[tokio::test]
    async fn classify_blocking_matches_sync() {
        let filter = filter();
        let model = Arc::new(Keyword(2));
        let blocking = filter.classify_blocking(model.clone(), "free").await.unwrap();
        let sync = filter.classify(model.as_ref(), "free").unwrap();
        assert_eq!(blocking, sync);
    }
}
