//! Domain error types.

/// Structural problems in an algorithm definition.
///
/// Raised before any event is evaluated; never confused with "no trades".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("output node {id:?} not found in definition")]
    MissingOutputNode { id: String },

    #[error("node {id:?} not found in definition")]
    UnknownNode { id: String },

    #[error("duplicate node id {id:?}")]
    DuplicateNode { id: String },

    #[error("edge {from:?} -> {to:?} references unknown node {missing:?}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("cycle detected through node {node:?}")]
    Cycle { node: String },
}

/// Top-level error type for eventtrader.
#[derive(Debug, thiserror::Error)]
pub enum EventTraderError {
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

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("event corpus error: {reason}")]
    Corpus { reason: String },

    #[error("algorithm store error: {reason}")]
    Store { reason: String },

    #[error("algorithm {id:?} not found")]
    NotFound { id: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EventTraderError> for std::process::ExitCode {
    fn from(err: &EventTraderError) -> Self {
        let code: u8 = match err {
            EventTraderError::Io(_) => 1,
            EventTraderError::ConfigParse { .. }
            | EventTraderError::ConfigMissing { .. }
            | EventTraderError::ConfigInvalid { .. } => 2,
            EventTraderError::Store { .. } | EventTraderError::NotFound { .. } => 3,
            EventTraderError::Definition(_) | EventTraderError::Json(_) => 4,
            EventTraderError::Corpus { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
