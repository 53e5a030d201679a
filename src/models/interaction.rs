//! Shared shape of the three social interaction records.
//!
//! Like, Comment and Share each tie one user to one book with a timestamp
//! pair. Instead of an inheritance hierarchy this is a plain struct embedded
//! (flattened) into the three concrete views.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub user_id: i32,
    pub book_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct LikeView {
    pub id: i32,
    #[serde(flatten)]
    pub interaction: Interaction,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    #[serde(flatten)]
    pub interaction: Interaction,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ShareView {
    pub id: i32,
    #[serde(flatten)]
    pub interaction: Interaction,
    pub message: Option<String>,
}

impl From<super::like::Model> for LikeView {
    fn from(m: super::like::Model) -> Self {
        Self {
            id: m.id,
            interaction: Interaction {
                user_id: m.user_id,
                book_id: m.book_id,
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        }
    }
}

impl From<super::comment::Model> for CommentView {
    fn from(m: super::comment::Model) -> Self {
        Self {
            id: m.id,
            interaction: Interaction {
                user_id: m.user_id,
                book_id: m.book_id,
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            content: m.content,
        }
    }
}

impl From<super::share::Model> for ShareView {
    fn from(m: super::share::Model) -> Self {
        Self {
            id: m.id,
            interaction: Interaction {
                user_id: m.user_id,
                book_id: m.book_id,
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            message: m.message,
        }
    }
}
