//! Lazily initialized, shared model.
//!
//! The first caller triggers the load; concurrent callers wait on that same
//! load instead of starting their own; later callers get the cached model.
//! A failed load leaves the handle empty so the next caller tries again.

use std::sync::Arc;

use tokio::sync::{OnceCell, watch};
use tracing::{info, warn};

use crate::error::InferenceError;
use crate::loader::ModelLoader;

/// Load state, for status indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    NotLoaded,
    Loading,
    Ready,
    Failed(String),
}

pub struct ModelHandle<L: ModelLoader> {
    loader: L,
    model: OnceCell<Arc<L::Model>>,
    status: watch::Sender<ModelStatus>,
}

impl<L: ModelLoader> ModelHandle<L> {
    pub fn new(loader: L) -> Self {
        let (status, _) = watch::channel(ModelStatus::NotLoaded);
        Self {
            loader,
            model: OnceCell::new(),
            status,
        }
    }

    pub fn status(&self) -> ModelStatus {
        self.status.borrow().clone()
    }

    /// Watch load-state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ModelStatus> {
        self.status.subscribe()
    }

    /// The model if it has already been loaded.
    pub fn get(&self) -> Option<Arc<L::Model>> {
        self.model.get().cloned()
    }

    /// Return the loaded model, loading it first if needed.
    pub async fn get_or_load(&self) -> Result<Arc<L::Model>, InferenceError> {
        self.model
            .get_or_try_init(|| async {
                self.status.send_replace(ModelStatus::Loading);
                info!("loading spam model");

                match self.loader.load().await {
                    Ok(model) => {
                        self.status.send_replace(ModelStatus::Ready);
                        Ok(Arc::new(model))
                    }
                    Err(e) => {
                        warn!(error = %e, "spam model failed to load");
                        self.status.send_replace(ModelStatus::Failed(e.to_string()));
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use spamwall_core::TokenSequence;

    use crate::model::SpamModel;

    struct Constant(f32);

    impl SpamModel for Constant {
        fn predict(&self, batch: &[TokenSequence]) -> Result<Vec<f32>, InferenceError> {
            Ok(vec![self.0; batch.len()])
        }
    }

    /// Counts loads; fails the first `fail_first` of them.
    struct CountingLoader {
        loads: Arc<AtomicUsize>,
        fail_first: usize,
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        type Model = Constant;

        async fn load(&self) -> Result<Constant, InferenceError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if n < self.fail_first {
                Err(InferenceError::NotFound("model.onnx".into()))
            } else {
                Ok(Constant(0.5))
            }
        }
    }

    fn handle(fail_first: usize) -> (ModelHandle<CountingLoader>, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            loads: loads.clone(),
            fail_first,
        };
        (ModelHandle::new(loader), loads)
    }

    #[tokio::test]
    async fn loads_once_and_reuses() {
        let (handle, loads) = handle(0);
        assert_eq!(handle.status(), ModelStatus::NotLoaded);
        assert!(handle.get().is_none());

        let first = handle.get_or_load().await.unwrap();
        let second = handle.get_or_load().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), ModelStatus::Ready);
        assert!(handle.get().is_some());
    }

    #[tokio::test]
    async fn concurrent_first_use_loads_once() {
        let (handle, loads) = handle(0);

        let results = futures::future::join_all((0..8).map(|_| handle.get_or_load())).await;

        assert!(results.iter().all(Result::is_ok));
        let first = results[0].as_ref().unwrap();
        assert!(results.iter().all(|m| Arc::ptr_eq(first, m.as_ref().unwrap())));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_next_call() {
        let (handle, loads) = handle(1);

        assert!(handle.get_or_load().await.is_err());
        assert!(matches!(handle.status(), ModelStatus::Failed(_)));
        assert!(handle.get().is_none());

        handle.get_or_load().await.unwrap();
        assert_eq!(handle.status(), ModelStatus::Ready);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let (handle, _) = handle(0);
        let mut rx = handle.subscribe();
        assert_eq!(*rx.borrow_and_update(), ModelStatus::NotLoaded);

        handle.get_or_load().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ModelStatus::Ready);
    }
}
