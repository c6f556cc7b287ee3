//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while connecting to MongoDB
    #[error("Database connection error: {0}")]
    Connection(#[source] MongoError),

    /// Error occurred while running a command or query
    #[error("Database query error: {0}")]
    Query(#[source] MongoError),

    /// A unique index rejected the write
    #[error("Duplicate key: {0}")]
    Duplicate(#[source] MongoError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

const DUPLICATE_KEY_CODE: i32 = 11000;

impl DatabaseError {
    /// Classify a failed write, separating unique index violations
    pub fn from_write(err: MongoError) -> Self {
        let duplicate = matches!(
            err.kind.as_ref(),
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY_CODE
        );

        if duplicate {
            DatabaseError::Duplicate(err)
        } else {
            DatabaseError::Query(err)
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
