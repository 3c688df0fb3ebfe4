use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::Result;
use crate::services::ml_model_service::TrainedModel;

struct CachedModel {
    fingerprint: String,
    model: Arc<TrainedModel>,
}

/// Holds the most recent trained model, keyed by the fingerprint of the
/// datasets it was trained on
#[derive(Clone, Default)]
pub struct ModelCacheService {
    slot: Arc<RwLock<Option<CachedModel>>>,
}

impl ModelCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached model for `fingerprint`, training and storing a new
    /// one when the cache is empty or was built from different data.
    ///
    /// Training runs under the write lock so concurrent callers with the same
    /// fingerprint train once. A failed training leaves the cache untouched.
    pub fn get_or_train<F>(&self, fingerprint: &str, train: F) -> Result<Arc<TrainedModel>>
    where
        F: FnOnce() -> Result<TrainedModel>,
    {
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = slot.as_ref().filter(|c| c.fingerprint == fingerprint) {
                debug!("Model cache hit for {}", fingerprint);
                return Ok(Arc::clone(&cached.model));
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref().filter(|c| c.fingerprint == fingerprint) {
            return Ok(Arc::clone(&cached.model));
        }

        info!("Training model for dataset fingerprint {}", fingerprint);
        let model = Arc::new(train()?);
        *slot = Some(CachedModel {
            fingerprint: fingerprint.to_string(),
            model: Arc::clone(&model),
        });
        Ok(model)
    }

    /// Replace the cached model unconditionally
    pub fn store(&self, fingerprint: &str, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CachedModel {
            fingerprint: fingerprint.to_string(),
            model: Arc::clone(&model),
        });
        model
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("Model cache invalidated");
        }
    }

    pub fn current_fingerprint(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.fingerprint.clone())
    }
}
