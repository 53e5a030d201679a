pub mod books;
pub mod borrows;
pub mod categories;
pub mod health;
pub mod interactions;
pub mod payments;
pub mod stats;
pub mod users;

use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db::AppState;
use crate::domain::DomainError;

pub(crate) type ApiError = (StatusCode, Json<Value>);

/// Typed errors live in the services; HTTP shapes exist only here.
pub(crate) fn domain_error(e: DomainError) -> ApiError {
    let status = match &e {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::Database(_) | DomainError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            axum::routing::patch(categories::update_category).delete(categories::delete_category),
        )
        .route("/categories/stats", get(categories::category_stats))
        .route("/categories/:id/books", get(books::books_by_category))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/recent", get(books::recent_books))
        .route("/books/count", get(books::book_count))
        .route(
            "/books/:id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        // Interactions
        .route("/books/:id/like", post(interactions::toggle_like))
        .route(
            "/books/:id/comments",
            get(interactions::list_comments).post(interactions::create_comment),
        )
        .route("/books/:id/share", post(interactions::create_share))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/lock", post(users::lock_user))
        // Borrow ledger
        .route("/borrow-requests", post(borrows::create_borrow_request))
        .route(
            "/borrow-requests/:id",
            delete(borrows::delete_borrow_request),
        )
        .route("/borrow-items", post(borrows::create_borrow_item))
        .route("/borrow-items/:id/return", put(borrows::return_borrow_item))
        .route("/borrows/bulk", post(borrows::bulk_borrow))
        .route("/returns/bulk", post(borrows::bulk_return))
        // Statistics
        .route("/stats/ages", get(stats::age_distribution))
        .route("/stats/most-borrowed", get(stats::most_borrowed))
        .route("/stats/top-liked", get(stats::top_liked))
        .route("/stats/top-commented", get(stats::top_commented))
        .route("/stats/most-borrowed-books", get(stats::most_borrowed_books))
        .route("/stats/most-returned", get(stats::most_returned))
        .route("/stats/most-late", get(stats::most_late))
        .route("/stats/monthly", get(stats::monthly_activity))
        .route("/stats/items", get(stats::filter_items))
        .route("/stats/interactions", get(stats::total_interactions))
        // Payments
        .route("/payments/momo/order", post(payments::momo_order))
        .route("/payments/zalopay/order", post(payments::zalopay_order))
        .with_state(state)
}
