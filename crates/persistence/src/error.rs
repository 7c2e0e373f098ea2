//! Persistence error type (§7): one closed enum at the crate boundary, with
//! scylla's own error types wrapped rather than flattened to strings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to connect to ScyllaDB: {0}")]
    Connection(#[from] scylla::transport::errors::NewSessionError),

    #[error("query failed: {0}")]
    Query(#[from] scylla::transport::errors::QueryError),

    #[error("schema error: {0}")]
    SchemaError(String),

    #[error("row data did not match the expected shape: {0}")]
    InvalidData(String),

    #[error("no {entity} found for key '{key}'")]
    NotFound { entity: &'static str, key: String },
}

impl PersistenceError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound { entity, key: key.into() }
    }
}
