//! Error types for DDLSync

use thiserror::Error;

/// Result type for DDLSync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for DDLSync
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("No handler registered for DDL name: {0}")]
    UnboundHandler(String),

    #[error("DDL name '{ddl_name}' already bound to {existing_schema:?}.{existing_table}, cannot re-bind to {schema:?}.{table}")]
    IdentityCollision {
        ddl_name: String,
        existing_schema: Option<String>,
        existing_table: String,
        schema: Option<String>,
        table: String,
    },

    #[error("Reconciliation error: {0}")]
    ReconcileError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Convert TOML deserialization errors to DDLSync errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
