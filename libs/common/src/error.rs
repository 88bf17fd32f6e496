//! Custom error types for the common library

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Errors produced while talking to the relational store
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while establishing a database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred while executing a query
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred while applying schema migrations
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
