use serde_json::{json, Map, Value};

use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult, DataValidationError},
};

use super::RecommendationFilter;

/// Width of the `recommend_type` column
pub const RECOMMEND_TYPE_MAX_LEN: usize = 63;

/// Expected JSON type of a recommendation field and where it is stored
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A whole number that fits in 32 bits
    Integer(fn(&mut Recommendation, i32)),
    /// A string of at most `max_len` characters
    Text {
        max_len: usize,
        set: fn(&mut Recommendation, String),
    },
}

/// One entry of the recommendation schema
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Client-writable fields, in the order they are checked
pub const SCHEMA: [FieldSpec; 5] = [
    FieldSpec {
        name: "product_id",
        kind: FieldKind::Integer(|rec, v| rec.product_id = v),
    },
    FieldSpec {
        name: "customer_id",
        kind: FieldKind::Integer(|rec, v| rec.customer_id = v),
    },
    FieldSpec {
        name: "recommend_type",
        kind: FieldKind::Text {
            max_len: RECOMMEND_TYPE_MAX_LEN,
            set: |rec, v| rec.recommend_type = v,
        },
    },
    FieldSpec {
        name: "recommend_product_id",
        kind: FieldKind::Integer(|rec, v| rec.recommend_product_id = v),
    },
    FieldSpec {
        name: "rec_success",
        kind: FieldKind::Integer(|rec, v| rec.rec_success = v),
    },
];

impl FieldSpec {
    /// Checks a raw JSON value against this field's kind and stores it on `target`
    fn apply_to(
        &self,
        value: &Value,
        target: &mut Recommendation,
    ) -> Result<(), DataValidationError> {
        match self.kind {
            FieldKind::Integer(set) => {
                let number = value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| {
                        DataValidationError::new(format!(
                            "Invalid Recommendation: {} must be an integer",
                            self.name
                        ))
                    })?;
                set(target, number);
            }
            FieldKind::Text { max_len, set } => {
                let text = value.as_str().ok_or_else(|| {
                    DataValidationError::new(format!(
                        "Invalid Recommendation: {} must be a string",
                        self.name
                    ))
                })?;
                if text.chars().count() > max_len {
                    return Err(DataValidationError::new(format!(
                        "Invalid Recommendation: {} must be at most {} characters",
                        self.name, max_len
                    )));
                }
                set(target, text.to_string());
            }
        }
        Ok(())
    }
}

/// A stored suggestion of a companion product for a customer
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Recommendation {
    /// Assigned by the store on create
    pub id: Option<i32>,
    pub product_id: i32,
    pub customer_id: i32,
    /// Free text category such as "Cross-Sell" or "Up-Sell"
    pub recommend_type: String,
    pub recommend_product_id: i32,
    /// Number of times this recommendation was liked
    pub rec_success: i32,
}

impl Recommendation {
    pub fn new(
        product_id: i32,
        customer_id: i32,
        recommend_type: impl Into<String>,
        recommend_product_id: i32,
        rec_success: i32,
    ) -> Self {
        Self {
            id: None,
            product_id,
            customer_id,
            recommend_type: recommend_type.into(),
            recommend_product_id,
            rec_success,
        }
    }

    /// Populates every business field from a JSON object.
    ///
    /// All schema fields must be present with the right type; the first
    /// violation is reported. Unknown keys and any `id` are ignored.
    pub fn deserialize(&mut self, data: &Value) -> Result<&mut Self, DataValidationError> {
        self.apply(data, true)?;
        Ok(self)
    }

    /// Overwrites only the schema fields present in `data`
    pub fn merge(&mut self, data: &Value) -> Result<&mut Self, DataValidationError> {
        self.apply(data, false)?;
        Ok(self)
    }

    fn apply(&mut self, data: &Value, require_all: bool) -> Result<(), DataValidationError> {
        let object = as_object(data)?;
        let mut staged = self.clone();
        for field in SCHEMA.iter() {
            match object.get(field.name) {
                Some(value) => field.apply_to(value, &mut staged)?,
                None if require_all => {
                    return Err(DataValidationError::new(format!(
                        "Invalid Recommendation: missing {}",
                        field.name
                    )))
                }
                None => {}
            }
        }
        staged.validate()?;
        *self = staged;
        Ok(())
    }

    /// Checks invariants that go beyond field types
    pub fn validate(&self) -> Result<(), DataValidationError> {
        if self.rec_success < 0 {
            return Err(DataValidationError::new(
                "Invalid Recommendation: rec_success must be non-negative",
            ));
        }
        if self.recommend_type.chars().count() > RECOMMEND_TYPE_MAX_LEN {
            return Err(DataValidationError::new(format!(
                "Invalid Recommendation: recommend_type must be at most {RECOMMEND_TYPE_MAX_LEN} characters"
            )));
        }
        Ok(())
    }

    pub fn serialize(&self) -> Value {
        json!({
            "id": self.id,
            "product_id": self.product_id,
            "customer_id": self.customer_id,
            "recommend_type": self.recommend_type,
            "recommend_product_id": self.recommend_product_id,
            "rec_success": self.rec_success,
        })
    }

    /// Persists a new row and records the assigned id
    pub async fn create(&mut self, store: &dyn RecommendationStore) -> AppResult<()> {
        tracing::info!(product_id = self.product_id, "Creating recommendation");
        self.validate()?;
        self.id = None;
        let created = store.insert(self).await?;
        self.id = created.id;
        Ok(())
    }

    /// Replaces every stored field with the current in-memory values
    pub async fn update(&mut self, store: &dyn RecommendationStore) -> AppResult<()> {
        let id = self.id.ok_or_else(|| {
            DataValidationError::new("Invalid Recommendation: update called with empty id field")
        })?;
        tracing::info!(id, "Saving recommendation");
        self.validate()?;
        match store.update(self).await? {
            Some(saved) => {
                *self = saved;
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    /// Removes the stored row; succeeds when nothing is stored
    pub async fn delete(&self, store: &dyn RecommendationStore) -> AppResult<()> {
        let Some(id) = self.id else {
            return Ok(());
        };
        tracing::info!(id, "Deleting recommendation");
        let removed = store.delete(id).await?;
        if !removed {
            tracing::debug!(id, "Recommendation was already absent");
        }
        Ok(())
    }

    /// Adds one to `rec_success` and persists the change
    pub async fn like(&mut self, store: &dyn RecommendationStore) -> AppResult<()> {
        self.rec_success = self.rec_success.checked_add(1).ok_or_else(|| {
            DataValidationError::new("Invalid Recommendation: rec_success is at its maximum")
        })?;
        self.update(store).await
    }

    pub async fn find(store: &dyn RecommendationStore, id: i32) -> AppResult<Option<Self>> {
        tracing::info!(id, "Processing lookup for recommendation");
        store.get(id).await
    }

    pub async fn find_by_filters(
        store: &dyn RecommendationStore,
        filter: &RecommendationFilter,
    ) -> AppResult<Vec<Self>> {
        tracing::info!(?filter, "Processing recommendation query");
        store.list(filter).await
    }

    pub async fn all(store: &dyn RecommendationStore) -> AppResult<Vec<Self>> {
        Self::find_by_filters(store, &RecommendationFilter::default()).await
    }
}

fn as_object(data: &Value) -> Result<&Map<String, Value>, DataValidationError> {
    data.as_object().ok_or_else(|| {
        DataValidationError::new("Invalid Recommendation: body of request contained bad or no data")
    })
}

/// Error for a lookup of an id with no stored row
pub fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Recommendation with id '{id}' was not found."))
}
