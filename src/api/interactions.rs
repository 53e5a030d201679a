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
use crate::models::book::Entity as Book;
use crate::models::comment::{self, Entity as Comment};
use crate::models::interaction::{CommentView, LikeView, ShareView};
use crate::models::like::{self, Entity as Like};
use crate::models::share;
use crate::models::user::Entity as User;

#[derive(Deserialize)]
pub struct LikeRequest {
    pub user_id: i32,
}

/// Toggle: an existing like for (user, book) is removed, otherwise one is
/// created. The unique constraint keeps duplicates out either way.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
    Json(payload): Json<LikeRequest>,
) -> impl IntoResponse {
    let book = Book::find_by_id(book_id).one(&state.db).await.unwrap_or(None);
    if book.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response();
    }

    let existing = Like::find()
        .filter(like::Column::UserId.eq(payload.user_id))
        .filter(like::Column::BookId.eq(book_id))
        .one(&state.db)
        .await
        .unwrap_or(None);

    match existing {
        Some(like) => match like.delete(&state.db).await {
            Ok(_) => (StatusCode::NO_CONTENT, Json(json!({ "detail": "Unliked" }))).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
        },
        None => {
            let now = chrono::Utc::now().to_rfc3339();
            let like = like::ActiveModel {
                user_id: Set(payload.user_id),
                book_id: Set(book_id),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            match like.insert(&state.db).await {
                Ok(model) => {
                    (StatusCode::CREATED, Json(LikeView::from(model))).into_response()
                }
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response(),
            }
        }
    }
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
) -> impl IntoResponse {
    let comments = Comment::find()
        .filter(comment::Column::BookId.eq(book_id))
        .all(&state.db)
        .await
        .unwrap_or(vec![]);

    let views: Vec<CommentView> = comments.into_iter().map(CommentView::from).collect();
    (StatusCode::OK, Json(views)).into_response()
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub user_id: i32,
    pub content: String,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> impl IntoResponse {
    let book = Book::find_by_id(book_id).one(&state.db).await.unwrap_or(None);
    if book.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response();
    }
    let user = User::find_by_id(payload.user_id)
        .one(&state.db)
        .await
        .unwrap_or(None);
    if user.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let comment = comment::ActiveModel {
        user_id: Set(payload.user_id),
        book_id: Set(book_id),
        content: Set(payload.content),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match comment.insert(&state.db).await {
        Ok(model) => (StatusCode::CREATED, Json(CommentView::from(model))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct ShareRequest {
    pub user_id: i32,
    pub message: Option<String>,
}

pub async fn create_share(
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
    Json(payload): Json<ShareRequest>,
) -> impl IntoResponse {
    let book = Book::find_by_id(book_id).one(&state.db).await.unwrap_or(None);
    if book.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let share = share::ActiveModel {
        user_id: Set(payload.user_id),
        book_id: Set(book_id),
        message: Set(payload.message),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match share.insert(&state.db).await {
        Ok(model) => (StatusCode::CREATED, Json(ShareView::from(model))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
