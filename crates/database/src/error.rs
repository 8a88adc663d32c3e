use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    /// Any fault raised by the driver or the server. The message is the
    /// driver's own, passed through unchanged.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("employee {0} not found")]
    NotFound(i64),

    #[error("employee {0} not found or already inactive")]
    NotActive(i64),

    #[error("{0}")]
    InvalidInput(#[from] core_types::CoreError),
}
