//! Query string parsing for the recommendation list endpoint.

use serde::Deserialize;

use crate::{
    error::{AppError, DataValidationError},
    models::{RecommendationFilter, SuccessRange},
};

/// Raw `GET /recommendations` parameters.
///
/// Values stay as strings so malformed numbers surface as our own 400 body
/// rather than the extractor's rejection. Blank values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<String>,
    pub customer_id: Option<String>,
    pub recommend_product_id: Option<String>,
    pub recommend_type: Option<String>,
    pub product_name: Option<String>,
    pub recommendation_name: Option<String>,
    pub rec_success_min: Option<String>,
    pub rec_success_max: Option<String>,
}

impl ListQuery {
    /// Parameters accepted but not backed by a column
    pub fn unmatched_names(&self) -> Vec<(&'static str, &str)> {
        [
            ("product_name", present(&self.product_name)),
            ("recommendation_name", present(&self.recommendation_name)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_integer(name: &str, value: &Option<String>) -> Result<Option<i32>, AppError> {
    present(value)
        .map(|raw| {
            raw.parse::<i32>().map_err(|_| {
                AppError::Validation(DataValidationError::new(format!(
                    "Invalid query parameter: {name} must be an integer, got '{raw}'"
                )))
            })
        })
        .transpose()
}

fn parse_bound(name: &str, raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::Range(format!("{name} must be an integer, got '{raw}'")))
}

fn parse_success_range(query: &ListQuery) -> Result<Option<SuccessRange>, AppError> {
    match (present(&query.rec_success_min), present(&query.rec_success_max)) {
        (None, None) => Ok(None),
        (Some(min), Some(max)) => {
            let min = parse_bound("rec_success_min", min)?;
            let max = parse_bound("rec_success_max", max)?;
            SuccessRange::new(min, max).map(Some)
        }
        (Some(_), None) => Err(AppError::Range(
            "rec_success_min requires rec_success_max".to_string(),
        )),
        (None, Some(_)) => Err(AppError::Range(
            "rec_success_max requires rec_success_min".to_string(),
        )),
    }
}

impl TryFrom<&ListQuery> for RecommendationFilter {
    type Error = AppError;

    fn try_from(query: &ListQuery) -> Result<Self, Self::Error> {
        Ok(RecommendationFilter {
            product_id: parse_integer("product_id", &query.product_id)?,
            customer_id: parse_integer("customer_id", &query.customer_id)?,
            recommend_product_id: parse_integer(
                "recommend_product_id",
                &query.recommend_product_id,
            )?,
            recommend_type: present(&query.recommend_type).map(str::to_string),
            rec_success: parse_success_range(query)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let object: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(object)).unwrap()
    }

    #[test]
    fn test_empty_query_is_empty_filter() {
        let filter = RecommendationFilter::try_from(&ListQuery::default()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_equality_parameters() {
        let filter = RecommendationFilter::try_from(&query(&[
            ("product_id", "6"),
            ("customer_id", "201"),
            ("recommend_type", "Cross-Sell"),
        ]))
        .unwrap();
        assert_eq!(filter.product_id, Some(6));
        assert_eq!(filter.customer_id, Some(201));
        assert_eq!(filter.recommend_type.as_deref(), Some("Cross-Sell"));
        assert_eq!(filter.rec_success, None);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let filter =
            RecommendationFilter::try_from(&query(&[("product_id", ""), ("rec_success_min", " ")]))
                .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_non_numeric_id_is_validation_error() {
        let err = RecommendationFilter::try_from(&query(&[("customer_id", "abc")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("customer_id"));
    }

    #[test]
    fn test_range_requires_both_bounds() {
        let err = RecommendationFilter::try_from(&query(&[("rec_success_min", "1")])).unwrap_err();
        assert!(matches!(err, AppError::Range(_)));
        let err = RecommendationFilter::try_from(&query(&[("rec_success_max", "1")])).unwrap_err();
        assert!(matches!(err, AppError::Range(_)));
    }

    #[test]
    fn test_range_rejects_bad_bounds() {
        let err = RecommendationFilter::try_from(&query(&[
            ("rec_success_min", "one"),
            ("rec_success_max", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Range(_)));

        let err = RecommendationFilter::try_from(&query(&[
            ("rec_success_min", "3"),
            ("rec_success_max", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Range(_)));
    }

    #[test]
    fn test_valid_range() {
        let filter = RecommendationFilter::try_from(&query(&[
            ("rec_success_min", "1"),
            ("rec_success_max", "1"),
        ]))
        .unwrap();
        assert_eq!(filter.rec_success, Some(SuccessRange::new(1, 1).unwrap()));
    }

    #[test]
    fn test_unmatched_names_reported() {
        let q = query(&[("product_name", "treat"), ("recommendation_name", "")]);
        assert_eq!(q.unmatched_names(), vec![("product_name", "treat")]);
    }
}
