//! Persistence for recommendations.
//!
//! Every model operation goes through a [`RecommendationStore`] handle that is
//! created once at startup and shared through the application state.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Recommendation, RecommendationFilter},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecommendationStore;
pub use postgres::{create_pool, PgRecommendationStore};

/// Storage backend for recommendation rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Inserts the business fields of `recommendation` and returns the stored row with its new id
    async fn insert(&self, recommendation: &Recommendation) -> AppResult<Recommendation>;

    /// Overwrites the row matching `recommendation.id`; `None` when no such row exists
    async fn update(&self, recommendation: &Recommendation) -> AppResult<Option<Recommendation>>;

    /// Removes the row with `id`, returning whether one existed
    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn get(&self, id: i32) -> AppResult<Option<Recommendation>>;

    /// Returns every row accepted by `filter`, in no particular order
    async fn list(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>>;

    /// Removes every row
    async fn clear(&self) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
