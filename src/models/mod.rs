pub mod filter;
pub mod recommendation;

pub use filter::{RecommendationFilter, SuccessRange};
pub use recommendation::{not_found, FieldKind, FieldSpec, Recommendation, SCHEMA};
