//! Engine error taxonomy.
//!
//! Recoverable data-quality events (malformed ticker rows, missing boundary
//! entries, market-cap source failures) are logged and skipped at the call
//! site; everything here ends the operation that raised it.

/// Top-level error type for cryptodca.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("http error: {reason}")]
    Http { reason: String },

    #[error("exchange api error ({status}): {reason}")]
    Api { status: u16, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid value for {name}: {reason}")]
    ConfigInvalid { name: String, reason: String },

    #[error("no account holds {currency}")]
    MissingAccount { currency: String },

    #[error("total score is zero, no valid allocation")]
    NoAllocation,

    #[error("malformed product id {id}, expected BASE-QUOTE")]
    BadProductId { id: String },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. }
            | EngineError::MissingAccount { .. } => 2,
            EngineError::Http { .. } | EngineError::Api { .. } => 3,
            EngineError::Store { .. } => 4,
            EngineError::NoAllocation | EngineError::BadProductId { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
