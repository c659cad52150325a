//! Error types for query assembly

use thiserror::Error;

/// Errors that can occur while assembling a query
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryBuilderError {
    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl QueryBuilderError {
    pub fn invalid_modifier(msg: impl Into<String>) -> Self {
        Self::InvalidModifier(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QueryBuilderError>;
