use std::sync::Arc;

use crate::db::{MemoryRecommendationStore, RecommendationStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self { store }
    }

    /// State backed by a fresh in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRecommendationStore::new()))
    }

    pub fn store(&self) -> &dyn RecommendationStore {
        self.store.as_ref()
    }
}
