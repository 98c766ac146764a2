/// Convenience result type used across Stagehand.
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Top-level error taxonomy used by sequencer APIs.
#[derive(thiserror::Error, Debug)]
pub enum StagehandError {
    /// Malformed declaration values (durations, eases, positions, stagger).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unresolvable element or marker references. No sequence is produced.
    #[error("construction error: {0}")]
    Construction(String),

    /// The host surface is not mounted yet. Retry once it is.
    #[error("surface not ready: {0}")]
    NotReady(String),

    /// Errors when serializing or deserializing definitions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StagehandError {
    /// Build a [`StagehandError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StagehandError::Construction`] value.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Build a [`StagehandError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`StagehandError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for the "not yet" condition a host should retry rather than report.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

impl From<serde_json::Error> for StagehandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
