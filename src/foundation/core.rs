use std::fmt;

use crate::foundation::error::{StagehandError, StagehandResult};

/// Tolerance used when comparing resolved timeline instants.
pub const TIME_EPSILON: f64 = 1e-9;

/// Identifier of a Visual Element owned by the host surface.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Wrap any string-like identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reject NaN/inf and negative seconds.
pub(crate) fn validate_secs(value: f64, field: &str) -> StagehandResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(StagehandError::validation(format!(
            "{field} must be finite and >= 0 (got {value})"
        )));
    }
    Ok(())
}

/// Reject NaN/inf property values.
pub(crate) fn validate_finite(value: f64, field: &str) -> StagehandResult<()> {
    if !value.is_finite() {
        return Err(StagehandError::validation(format!(
            "{field} must be finite (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
