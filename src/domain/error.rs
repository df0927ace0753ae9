//! Domain error types.

/// Top-level error type for gorktrader.
#[derive(Debug, thiserror::Error)]
pub enum GorkError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("unknown strategy variant {id} (expected 1-4)")]
    UnknownVariant { id: i64 },

    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("no price data in {path}")]
    NoData { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&GorkError> for std::process::ExitCode {
    fn from(err: &GorkError) -> Self {
        let code: u8 = match err {
            GorkError::Io(_) => 1,
            GorkError::ConfigParse { .. }
            | GorkError::ConfigMissing { .. }
            | GorkError::ConfigInvalid { .. } => 2,
            GorkError::DataLoad { .. } => 3,
            GorkError::InvalidParameter { .. } | GorkError::UnknownVariant { .. } => 4,
            GorkError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
