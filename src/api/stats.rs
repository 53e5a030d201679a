//! Reporting endpoints. All aggregation lives in `services::stats_service`.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{domain_error, ApiError};
use crate::db::AppState;
use crate::models::borrow_item::{STATUS_BORROWED, STATUS_LATE, STATUS_RETURNED};
use crate::services::stats_service;

#[derive(Deserialize)]
pub struct MonthYearQuery {
    pub month: u32,
    pub year: i32,
}

#[derive(Deserialize)]
pub struct FilterQuery {
    pub status: String,
    pub month: u32,
    pub year: i32,
}

pub async fn age_distribution(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let buckets = stats_service::age_distribution(&state.db)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(buckets)))
}

pub async fn most_borrowed(
    State(state): State<AppState>,
    Query(query): Query<MonthYearQuery>,
) -> Result<Json<Value>, ApiError> {
    let report = stats_service::most_borrowed_in_month(&state.db, query.month, query.year)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn top_liked(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = stats_service::top_by_likes(&state.db)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn top_commented(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = stats_service::top_by_comments(&state.db)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn most_borrowed_books(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = stats_service::top_by_status(&state.db, STATUS_BORROWED)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn most_returned(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = stats_service::top_by_status(&state.db, STATUS_RETURNED)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn most_late(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = stats_service::top_by_status(&state.db, STATUS_LATE)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn monthly_activity(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = stats_service::monthly_activity(&state.db)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!({ "monthly_statistics": report })))
}

pub async fn filter_items(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Value>, ApiError> {
    let report = stats_service::filter_items(&state.db, &query.status, query.month, query.year)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(report)))
}

pub async fn total_interactions(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let totals = stats_service::total_interactions(&state.db)
        .await
        .map_err(domain_error)?;
    Ok(Json(json!(totals)))
}
