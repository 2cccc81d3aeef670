//! Per-variant classifier cache.
//!
//! Loading a checkpoint dominates run latency, so each variant is loaded at
//! most once and the handle is shared for the rest of the process. Weights
//! are read-only after load; the inner mutex only guards the runtime session,
//! which needs exclusive access during a forward pass.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reviewgrade_core::ModelVariant;
use tracing::{debug, info};

use crate::ModelLoadError;

/// Lazily populated map from variant to a shared classifier handle.
pub struct ClassifierCache<C> {
    loaded: Mutex<HashMap<ModelVariant, Arc<Mutex<C>>>>,
}

impl<C> Default for ClassifierCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ClassifierCache<C> {
    pub fn new() -> Self {
        Self {
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached classifier for `variant`, calling `load` on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn get_or_load<F>(
        &self,
        variant: ModelVariant,
        load: F,
    ) -> Result<Arc<Mutex<C>>, ModelLoadError>
    where
        F: FnOnce() -> Result<C, ModelLoadError>,
    {
        // Held across the load so two callers never load the same variant twice.
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = loaded.get(&variant) {
            debug!(%variant, "classifier cache hit");
            return Ok(Arc::clone(handle));
        }
        let handle = Arc::new(Mutex::new(load()?));
        loaded.insert(variant, Arc::clone(&handle));
        info!(%variant, "classifier cached");
        Ok(handle)
    }

    pub fn is_loaded(&self, variant: ModelVariant) -> bool {
        self.loaded
            .lock()
            .map(|m| m.contains_key(&variant))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn loads_each_variant_once() {
        let cache = ClassifierCache::<u32>::new();
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(7)
        };

        let a = cache.get_or_load(ModelVariant::Bert, load).unwrap();
        let b = cache.get_or_load(ModelVariant::Bert, load).unwrap();
        assert_eq!(loads.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));

        cache.get_or_load(ModelVariant::XlNet, load).unwrap();
        assert_eq!(loads.get(), 2);
        assert!(cache.is_loaded(ModelVariant::XlNet));
    }

    #[test]
    fn failed_load_is_retried() {
        let cache = ClassifierCache::<u32>::new();
        let err = cache
            .get_or_load(ModelVariant::Bert, || {
                Err(ModelLoadError::new("model_checkpoints/Bert", "model.onnx not found"))
            })
            .unwrap_err();
        assert!(err.to_string().contains("model_checkpoints/Bert"));
        assert!(!cache.is_loaded(ModelVariant::Bert));

        let handle = cache.get_or_load(ModelVariant::Bert, || Ok(1)).unwrap();
        assert_eq!(*handle.lock().unwrap(), 1);
    }
}
