//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: {0}")]
    InvalidNodeType(u8),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
}
