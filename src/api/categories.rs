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
use crate::models::book::{self, Entity as Book};
use crate::models::category::{self, Entity as Category};

#[derive(Deserialize)]
pub struct CategoryPayload {
    name: String,
}

pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let categories = Category::find().all(&state.db).await.unwrap_or(vec![]);
    (StatusCode::OK, Json(categories)).into_response()
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> impl IntoResponse {
    let now = chrono::Utc::now().to_rfc3339();
    let category = category::ActiveModel {
        name: Set(payload.name),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match category.insert(&state.db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryPayload>,
) -> impl IntoResponse {
    let category = Category::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match category {
        Some(category) => {
            let mut active: category::ActiveModel = category.into();
            active.name = Set(payload.name);
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
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Category not found" })),
        )
            .into_response(),
    }
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let category = Category::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match category {
        Some(category) => match category.delete(&state.db).await {
            Ok(_) => (
                StatusCode::NO_CONTENT,
                Json(json!({ "message": "Category deleted" })),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
        },
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Category not found" })),
        )
            .into_response(),
    }
}

/// Books per category, with titles, for the staff dashboard.
pub async fn category_stats(State(state): State<AppState>) -> impl IntoResponse {
    let categories = Category::find().all(&state.db).await.unwrap_or(vec![]);

    let mut result = Vec::with_capacity(categories.len());
    for category in categories {
        let books = Book::find()
            .filter(book::Column::CategoryId.eq(category.id))
            .all(&state.db)
            .await
            .unwrap_or(vec![]);

        result.push(json!({
            "name": category.name,
            "book_count": books.len(),
            "books": books.iter().map(|b| b.title.clone()).collect::<Vec<_>>(),
        }));
    }

    (StatusCode::OK, Json(result)).into_response()
}
