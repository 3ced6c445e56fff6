use thiserror::Error;

/// Failure surface for every [`crate::Db`] method. Workers turn this into
/// a [`coord_types::ClassifiedError`] at the call site via [`DbError::retryable`].
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("row {what} not found")]
    NotFound { what: &'static str },

    #[error("invalid status string {value:?} for column {column}")]
    InvalidStatus { column: &'static str, value: String },
}

impl DbError {
    /// True for a unique-index violation (e.g. the partial unique index
    /// on `withdrawal_queue.withdrawal_request_id`): the caller lost a
    /// benign race against a concurrent projection of the same row, not
    /// a real failure (§4.7 "prevents duplicate enqueue under concurrent
    /// projection").
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// Connection-level and timeout failures are worth retrying; a
    /// constraint violation or bad enum string is not (§4.2's retry loop
    /// only ever wraps the former).
    pub fn retryable(&self) -> bool {
        match self {
            DbError::Sqlx(e) => !matches!(
                e,
                sqlx::Error::ColumnNotFound(_)
                    | sqlx::Error::TypeNotFound { .. }
                    | sqlx::Error::Protocol(_)
            ),
            DbError::Migrate(_) => false,
            DbError::NotFound { .. } => false,
            DbError::InvalidStatus { .. } => false,
        }
    }
}
