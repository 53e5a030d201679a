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
use crate::models::user::{self, derive_access_flags, Entity as User, ROLE_READER};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub phone: Option<String>,
    pub birth_year: Option<i32>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub phone: Option<String>,
    pub birth_year: Option<i32>,
    pub role: Option<String>,
}

pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    let users = User::find().all(&state.db).await.unwrap_or(vec![]);
    (StatusCode::OK, Json(users)).into_response()
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let role = payload.role.unwrap_or_else(|| ROLE_READER.to_string());
    let (is_staff, is_superuser) = derive_access_flags(&role);

    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        username: Set(payload.username),
        phone: Set(payload.phone),
        birth_year: Set(payload.birth_year),
        role: Set(role),
        is_staff: Set(is_staff),
        is_superuser: Set(is_superuser),
        is_active: Set(true),
        borrowed_count: Set(0),
        returned_count: Set(0),
        overdue_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match user.insert(&state.db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    let user = User::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match user {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let user = User::find_by_id(id).one(&state.db).await.unwrap_or(None);
    let Some(user) = user else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response();
    };

    let role = payload.role.unwrap_or_else(|| user.role.clone());
    // Flags are recomputed from the role on every save.
    let (is_staff, is_superuser) = derive_access_flags(&role);

    let mut active: user::ActiveModel = user.into();
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(birth_year) = payload.birth_year {
        active.birth_year = Set(Some(birth_year));
    }
    active.role = Set(role);
    active.is_staff = Set(is_staff);
    active.is_superuser = Set(is_superuser);
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

pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    let user = User::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match user {
        Some(user) => match user.delete(&state.db).await {
            Ok(_) => (
                StatusCode::NO_CONTENT,
                Json(json!({ "message": "User deleted" })),
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
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
    }
}

pub async fn lock_user(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    let user = User::find_by_id(id).one(&state.db).await.unwrap_or(None);
    match user {
        Some(user) => {
            let mut active: user::ActiveModel = user.into();
            active.is_active = Set(false);
            active.updated_at = Set(chrono::Utc::now().to_rfc3339());
            match active.update(&state.db).await {
                Ok(_) => (
                    StatusCode::OK,
                    Json(json!({ "status": "Account locked" })),
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
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
    }
}
