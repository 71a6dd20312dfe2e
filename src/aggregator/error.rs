use thiserror::Error;

pub type Result<T> = std::result::Result<T, AggregateError>;

/// Failure kinds surfaced by the aggregation pipeline. All are fatal:
/// the orchestrator aborts and the working directory is removed.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt shard {file}: {message}")]
    CorruptShard { file: String, message: String },

    #[error("parse error in shard {file}: {message}")]
    Parse { file: String, message: String },

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
