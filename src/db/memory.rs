use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Recommendation, RecommendationFilter},
};

use super::RecommendationStore;

/// In-process store keyed by id.
///
/// Ids start at 1 and are never reused, even after a delete.
#[derive(Default)]
pub struct MemoryRecommendationStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    rows: BTreeMap<i32, Recommendation>,
    last_id: i32,
}

impl MemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationStore for MemoryRecommendationStore {
    async fn insert(&self, recommendation: &Recommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        let stored = Recommendation {
            id: Some(id),
            ..recommendation.clone()
        };
        inner.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, recommendation: &Recommendation) -> AppResult<Option<Recommendation>> {
        let Some(id) = recommendation.id else {
            return Ok(None);
        };
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|row| {
            *row = recommendation.clone();
            row.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn get(&self, id: i32) -> AppResult<Option<Recommendation>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.write().await.rows.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
