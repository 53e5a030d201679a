//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! They are mapped to HTTP status codes only at the API boundary.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message
    Validation(String),
    /// Operation blocked by current state (deletion guard, exhausted
    /// capacity mid-batch)
    Conflict(String),
    /// Database/persistence error
    Database(String),
    /// Payment gateway returned a non-success response or failed in transit
    Gateway(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Gateway(msg) => write!(f, "Gateway error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in the service layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
