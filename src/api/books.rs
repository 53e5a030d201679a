use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::db::AppState;
use crate::models::book::{self, BookDto, Entity as Book};
use crate::models::category::Entity as Category;

/// Active catalog only; soft-deleted books stay out of the listing.
pub async fn list_books(State(state): State<AppState>) -> impl IntoResponse {
    let books = Book::find()
        .filter(book::Column::IsActive.eq(true))
        .all(&state.db)
        .await
        .unwrap_or(vec![]);
    (StatusCode::OK, Json(books)).into_response()
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<BookDto>,
) -> impl IntoResponse {
    let category = Category::find_by_id(payload.category_id)
        .one(&state.db)
        .await
        .unwrap_or(None);
    if category.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid category id" })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut active: book::ActiveModel = payload.into();
    active.copies_out = Set(0);
    active.total_borrow_count = Set(0);
    active.created_at = Set(now.clone());
    active.updated_at = Set(now);

    match active.insert(&state.db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    let book = Book::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match book {
        Some(book) => (StatusCode::OK, Json(book)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: Option<i32>,
    pub category_id: Option<i32>,
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookRequest>,
) -> impl IntoResponse {
    let book = Book::find_by_id(id).one(&state.db).await.unwrap_or(None);
    let Some(book) = book else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response();
    };

    let mut active: book::ActiveModel = book.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(author) = payload.author {
        active.author = Set(author);
    }
    if let Some(publisher) = payload.publisher {
        active.publisher = Set(Some(publisher));
    }
    if let Some(year) = payload.publication_year {
        active.publication_year = Set(Some(year));
    }
    if let Some(total_copies) = payload.total_copies {
        active.total_copies = Set(total_copies);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&state.db).await {
        Ok(model) => (StatusCode::OK, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Soft delete. A book with interactions keeps its row; only the active
/// flag drops.
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    let book = Book::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match book {
        Some(book) => {
            let mut active: book::ActiveModel = book.into();
            active.is_active = Set(false);
            active.updated_at = Set(chrono::Utc::now().to_rfc3339());
            match active.update(&state.db).await {
                Ok(_) => (
                    StatusCode::NO_CONTENT,
                    Json(json!({ "message": "Book marked as inactive" })),
                )
                    .into_response(),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response(),
            }
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response(),
    }
}

pub async fn recent_books(State(state): State<AppState>) -> impl IntoResponse {
    let books = Book::find()
        .order_by_desc(book::Column::Id)
        .paginate(&state.db, 5)
        .fetch_page(0)
        .await
        .unwrap_or(vec![]);
    (StatusCode::OK, Json(books)).into_response()
}

/// Total available copies across the catalog.
pub async fn book_count(State(state): State<AppState>) -> impl IntoResponse {
    let books = Book::find().all(&state.db).await.unwrap_or(vec![]);
    let total_books: i64 = books.iter().map(|b| b.total_copies as i64).sum();
    (StatusCode::OK, Json(json!({ "total_books": total_books }))).into_response()
}

pub async fn books_by_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let category = Category::find_by_id(id).one(&state.db).await.unwrap_or(None);
    if category.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Category not found" })),
        )
            .into_response();
    }

    let books = Book::find()
        .filter(book::Column::CategoryId.eq(id))
        .all(&state.db)
        .await
        .unwrap_or(vec![]);
    (StatusCode::OK, Json(books)).into_response()
}
