use crate::error::AppError;

use super::Recommendation;

/// Inclusive bounds on `rec_success`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessRange {
    min: i32,
    max: i32,
}

impl SuccessRange {
    /// Builds a range, rejecting `min > max`
    pub fn new(min: i32, max: i32) -> Result<Self, AppError> {
        if min > max {
            return Err(AppError::Range(format!(
                "rec_success_min ({min}) must not exceed rec_success_max ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Criteria for `Recommendation::find_by_filters`.
///
/// Every `None` field leaves that column unconstrained; present fields are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub product_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub recommend_product_id: Option<i32>,
    /// Case-sensitive exact match
    pub recommend_type: Option<String>,
    pub rec_success: Option<SuccessRange>,
}

impl RecommendationFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, recommendation: &Recommendation) -> bool {
        self.product_id.map_or(true, |v| recommendation.product_id == v)
            && self.customer_id.map_or(true, |v| recommendation.customer_id == v)
            && self
                .recommend_product_id
                .map_or(true, |v| recommendation.recommend_product_id == v)
            && self
                .recommend_type
                .as_deref()
                .map_or(true, |v| recommendation.recommend_type == v)
            && self
                .rec_success
                .map_or(true, |range| range.contains(recommendation.rec_success))
    }
}
