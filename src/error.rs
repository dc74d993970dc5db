use thiserror::Error;

/// Errors surfaced by the ledger jobs.
///
/// Per-record failures during a batch are not represented here — they are
/// logged and counted by the services and never abort the batch. `AppError`
/// is reserved for failures that make a whole unit (one tenant's write, one
/// record's insert) or a whole command unrunnable.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    BadRequest(String),
}
