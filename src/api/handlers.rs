use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, Method, StatusCode, Uri},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult, DataValidationError},
    middleware::request_id::RequestId,
    models::{not_found, Recommendation, RecommendationFilter},
};

use super::{query::ListQuery, AppState};

pub const COLLECTION_PATH: &str = "/recommendations";

/// Parses a path id; a parse failure is a client error, not a missing record
fn parse_id(raw: &str) -> AppResult<i32> {
    raw.trim().parse::<i32>().map_err(|_| {
        AppError::Validation(DataValidationError::new(format!(
            "Invalid recommendation id '{raw}': must be an integer"
        )))
    })
}

async fn load(state: &AppState, id: i32) -> AppResult<Recommendation> {
    Recommendation::find(state.store(), id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Root URL metadata
pub async fn index() -> Json<Value> {
    tracing::info!("Request for Root URL");
    Json(json!({
        "name": "Recommendation REST API Service",
        "version": "1.0",
        "paths": COLLECTION_PATH,
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": 200, "message": "Healthy" }))
}

/// Lists recommendations narrowed by the query string
pub async fn list_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Value>>> {
    tracing::info!(request_id = %request_id, "Request for recommendation list");
    let Query(query) = query?;

    for (name, value) in query.unmatched_names() {
        tracing::debug!(request_id = %request_id, name, value, "Ignoring filter with no matching column");
    }

    let filter = RecommendationFilter::try_from(&query)?;
    if filter.is_empty() {
        tracing::debug!(request_id = %request_id, "No filters supplied, listing all");
    }
    let recommendations = Recommendation::find_by_filters(state.store(), &filter).await?;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Returning recommendations"
    );
    Ok(Json(
        recommendations.iter().map(Recommendation::serialize).collect(),
    ))
}

/// Retrieves a single recommendation
pub async fn get_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw_id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(raw_id) = raw_id?;
    let id = parse_id(&raw_id)?;
    tracing::info!(request_id = %request_id, id, "Request to retrieve a recommendation");

    let recommendation = load(&state, id).await?;
    Ok(Json(recommendation.serialize()))
}

/// Creates a recommendation from a complete JSON body
pub async fn create_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(request_id = %request_id, "Request to create a recommendation");
    let Json(data) = payload?;

    let mut recommendation = Recommendation::default();
    recommendation.deserialize(&data)?;
    recommendation.create(state.store()).await?;

    let id = recommendation
        .id
        .ok_or_else(|| AppError::Internal("store returned a row without an id".to_string()))?;
    tracing::info!(request_id = %request_id, id, "Recommendation saved");

    let location = format!("{COLLECTION_PATH}/{id}");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(recommendation.serialize()),
    ))
}

/// Applies the supplied fields to an existing recommendation
pub async fn update_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Path(raw_id) = raw_id?;
    let id = parse_id(&raw_id)?;
    tracing::info!(request_id = %request_id, id, "Request to update a recommendation");
    let Json(data) = payload?;

    let mut recommendation = load(&state, id).await?;
    recommendation.merge(&data)?;
    recommendation.update(state.store()).await?;

    Ok(Json(recommendation.serialize()))
}

/// Adds one to a recommendation's success counter
pub async fn like_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw_id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(raw_id) = raw_id?;
    let id = parse_id(&raw_id)?;
    tracing::info!(request_id = %request_id, id, "Request to like a recommendation");

    let mut recommendation = load(&state, id).await?;
    recommendation.like(state.store()).await?;

    tracing::info!(
        request_id = %request_id,
        id,
        rec_success = recommendation.rec_success,
        "Recommendation liked"
    );
    Ok(Json(recommendation.serialize()))
}

/// Deletes a recommendation; absent ids are not an error
pub async fn delete_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw_id: Result<Path<String>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(raw_id) = raw_id?;
    let id = parse_id(&raw_id)?;
    tracing::info!(request_id = %request_id, id, "Request to delete a recommendation");

    if let Some(recommendation) = Recommendation::find(state.store(), id).await? {
        recommendation.delete(state.store()).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// JSON 405 for a routed path hit with an unsupported method
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!(
        "Method {method} is not allowed on '{}'.",
        uri.path()
    ))
}

/// JSON 404 for unrouted paths
pub async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("The requested path '{}' was not found.", uri.path()))
}
