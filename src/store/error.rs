//! Error types for the store module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to open or connect to the database
    #[error("Connection error: {0}")]
    Connection(String),

    /// Failed to create or migrate the schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// A query failed to execute
    #[error("Query error: {0}")]
    Query(String),

    /// A transaction failed to start or commit
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Stored data could not be read back
    #[error("Data error: {0}")]
    Data(String),
}

impl From<DbError> for CrateError {
    fn from(err: DbError) -> Self {
        CrateError::Database(err.to_string())
    }
}
