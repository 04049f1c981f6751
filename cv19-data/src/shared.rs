//! A dataset handle that can be reloaded while readers are using it.
//!
//! Readers take an `Arc` snapshot and keep using it for the whole request;
//! a reload builds the replacement completely before swapping it in, so a
//! reader sees either the old dataset or the new one, never a mix.

use cv19_core::Result;
use log::{info, warn};
use std::sync::{Arc, PoisonError, RwLock};

use crate::dataset::Dataset;

/// Cheaply cloneable handle to the current [`Dataset`].
#[derive(Clone, Default)]
pub struct SharedDataset {
    current: Arc<RwLock<Arc<Dataset>>>,
}

impl SharedDataset {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(dataset))),
        }
    }

    /// The dataset in effect right now.
    pub fn snapshot(&self) -> Arc<Dataset> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in `dataset`, returning the one it replaced.
    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let replacement = Arc::new(dataset);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, replacement)
    }

    /// Run `load` and swap its result in. If it fails the current dataset
    /// stays in effect and the error is returned.
    pub fn reload_with<F>(&self, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        match load() {
            Ok(dataset) => {
                info!(
                    "reload: {} rows through {}",
                    dataset.len(),
                    dataset.latest_date().unwrap_or("-")
                );
                self.replace(dataset);
                Ok(self.snapshot())
            }
            Err(e) => {
                warn!("reload failed, keeping the previous dataset: {}", e);
                Err(e)
            }
        }
    }
}
