use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::AppResult,
    models::{Recommendation, RecommendationFilter},
};

use super::RecommendationStore;

/// Column list shared across queries
const COLUMNS: &str =
    "id, product_id, customer_id, recommend_type, recommend_product_id, rec_success";

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Recommendation rows in the `recommendations` table
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations, creating the table if absent
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Drops and recreates the schema
    pub async fn recreate_schema(&self) -> anyhow::Result<()> {
        sqlx::query("DROP TABLE IF EXISTS recommendations")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
            .execute(&self.pool)
            .await?;
        self.migrate().await
    }
}

#[async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn insert(&self, recommendation: &Recommendation) -> AppResult<Recommendation> {
        let query = format!(
            "INSERT INTO recommendations
                (product_id, customer_id, recommend_type, recommend_product_id, rec_success)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Recommendation>(&query)
            .bind(recommendation.product_id)
            .bind(recommendation.customer_id)
            .bind(&recommendation.recommend_type)
            .bind(recommendation.recommend_product_id)
            .bind(recommendation.rec_success)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, recommendation: &Recommendation) -> AppResult<Option<Recommendation>> {
        let query = format!(
            "UPDATE recommendations SET
                product_id = $2,
                customer_id = $3,
                recommend_type = $4,
                recommend_product_id = $5,
                rec_success = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Recommendation>(&query)
            .bind(recommendation.id)
            .bind(recommendation.product_id)
            .bind(recommendation.customer_id)
            .bind(&recommendation.recommend_type)
            .bind(recommendation.recommend_product_id)
            .bind(recommendation.rec_success)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Recommendation>> {
        let query = format!("SELECT {COLUMNS} FROM recommendations WHERE id = $1");
        let row = sqlx::query_as::<_, Recommendation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        // A NULL parameter leaves its column unconstrained
        let query = format!(
            "SELECT {COLUMNS} FROM recommendations
             WHERE ($1::INTEGER IS NULL OR product_id = $1)
               AND ($2::INTEGER IS NULL OR customer_id = $2)
               AND ($3::INTEGER IS NULL OR recommend_product_id = $3)
               AND ($4::VARCHAR IS NULL OR recommend_type = $4)
               AND ($5::INTEGER IS NULL OR rec_success BETWEEN $5 AND $6)
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, Recommendation>(&query)
            .bind(filter.product_id)
            .bind(filter.customer_id)
            .bind(filter.recommend_product_id)
            .bind(filter.recommend_type.as_deref())
            .bind(filter.rec_success.map(|range| range.min()))
            .bind(filter.rec_success.map(|range| range.max()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn clear(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM recommendations")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SuccessRange;

    async fn seeded_store(pool: PgPool) -> PgRecommendationStore {
        let store = PgRecommendationStore::new(pool);
        store.migrate().await.unwrap();
        for (product_id, recommend_type, rec_success) in
            [(6, "Cross-Sell", 0), (6, "Up-Sell", 1), (7, "Cross-Sell", 1)]
        {
            store
                .insert(&Recommendation::new(product_id, 201, recommend_type, 888, rec_success))
                .await
                .unwrap();
        }
        store
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_insert_assigns_id(pool: PgPool) {
        let store = seeded_store(pool).await;
        let created = store
            .insert(&Recommendation::new(1, 2, "Up-Sell", 3, 0))
            .await
            .unwrap();
        assert!(created.id.is_some());
        assert_eq!(store.get(created.id.unwrap()).await.unwrap(), Some(created));
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_list_applies_filters(pool: PgPool) {
        let store = seeded_store(pool).await;

        let all = store.list(&RecommendationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let filter = RecommendationFilter {
            product_id: Some(6),
            rec_success: Some(SuccessRange::new(1, 1).unwrap()),
            ..Default::default()
        };
        let found = store.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].recommend_type, "Up-Sell");
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_update_and_delete_missing_rows(pool: PgPool) {
        let store = seeded_store(pool).await;
        let ghost = Recommendation {
            id: Some(9999),
            ..Recommendation::new(1, 2, "Up-Sell", 3, 0)
        };
        assert_eq!(store.update(&ghost).await.unwrap(), None);
        assert!(!store.delete(9999).await.unwrap());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_negative_success_rejected_by_constraint(pool: PgPool) {
        let store = seeded_store(pool).await;
        let err = store
            .insert(&Recommendation::new(1, 2, "Up-Sell", 3, -1))
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
