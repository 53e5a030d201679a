//! Borrow ledger endpoints. All business rules live in
//! `services::borrow_service`; this module only shapes requests and
//! responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{domain_error, ApiError};
use crate::db::AppState;
use crate::domain::DomainError;
use crate::models::borrow_request::BorrowRequestDto;
use crate::services::borrow_service::{self, DATE_FMT};

pub async fn create_borrow_request(
    State(state): State<AppState>,
    Json(payload): Json<BorrowRequestDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let saved = borrow_service::create_request(
        &state.db,
        payload.reader_id,
        payload.borrow_date,
        payload.expected_return_date,
    )
    .await
    .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "request": saved }))))
}

pub async fn delete_borrow_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    borrow_service::delete_borrow_request(&state.db, id)
        .await
        .map_err(domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub request_id: i32,
    pub book_id: Option<i32>,
    pub note: Option<String>,
}

pub async fn create_borrow_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let item =
        borrow_service::create_borrow_item(&state.db, payload.request_id, payload.book_id, payload.note)
            .await
            .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "item": item }))))
}

#[derive(Deserialize)]
pub struct ReturnItemRequest {
    /// %Y-%m-%d; defaults to today.
    pub actual_return_date: Option<String>,
}

pub async fn return_borrow_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReturnItemRequest>,
) -> Result<Json<Value>, ApiError> {
    let actual_date = match payload.actual_return_date {
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FMT).map_err(|e| {
            domain_error(DomainError::Validation(format!("invalid date '{}': {}", s, e)))
        })?,
        None => Local::now().date_naive(),
    };

    let item = borrow_service::record_return(&state.db, id, actual_date)
        .await
        .map_err(domain_error)?;

    Ok(Json(json!({
        "item": item,
        "message": "Book returned successfully"
    })))
}

#[derive(Deserialize)]
pub struct BulkBorrowRequest {
    pub reader_id: i32,
    pub book_ids: Vec<i32>,
}

pub async fn bulk_borrow(
    State(state): State<AppState>,
    Json(payload): Json<BulkBorrowRequest>,
) -> Result<Json<Value>, ApiError> {
    let borrowed = borrow_service::bulk_borrow(&state.db, payload.reader_id, &payload.book_ids)
        .await
        .map_err(domain_error)?;

    let message = format!("{} books borrowed successfully.", borrowed.len());
    Ok(Json(json!({
        "borrowed_books": borrowed,
        "message": message
    })))
}

#[derive(Deserialize)]
pub struct BulkReturnRequest {
    pub reader_id: i32,
    pub item_ids: Vec<i32>,
}

pub async fn bulk_return(
    State(state): State<AppState>,
    Json(payload): Json<BulkReturnRequest>,
) -> Result<Json<Value>, ApiError> {
    let returned = borrow_service::bulk_return(&state.db, payload.reader_id, &payload.item_ids)
        .await
        .map_err(domain_error)?;

    let message = format!("{} books returned successfully.", returned.len());
    Ok(Json(json!({
        "returned_books": returned,
        "message": message
    })))
}
