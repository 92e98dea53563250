use thiserror::Error;

/// Failures of one analysis pass. There are no retries anywhere: the input
/// is an immutable result store and every one of these is deterministic, so
/// each aborts the pass and propagates to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to open result store {path}: {reason}")]
    ConnectionFailed { path: String, reason: String },

    #[error("malformed numeric value {value:?} for parameter {key:?}")]
    MalformedValue { key: String, value: String },

    #[error("expected {expected} coordinate tokens in {path:?}, found {found}")]
    CoordinateTokens {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("connection closed at {key:?} with zero total duration")]
    ZeroDuration { key: String },

    #[error("no {metric} samples recorded")]
    EmptyDistribution { metric: &'static str },

    #[error("result store query failed: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
