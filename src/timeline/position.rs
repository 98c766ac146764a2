use std::{fmt, str::FromStr};

use crate::foundation::error::{StagehandError, StagehandResult};

/// Where a step starts on the timeline.
///
/// Serialized as a number (absolute seconds) or a string:
///
/// | text            | meaning                                              |
/// |-----------------|------------------------------------------------------|
/// | `">"`           | when the previous transition ends (default)          |
/// | `"<"`           | together with the previous transition's start        |
/// | `"-=0.5"`       | overlap the previous transition's end by 0.5s        |
/// | `"+=0.5"`       | 0.5s gap after the previous transition's end         |
/// | `"2.5"`         | absolute, 2.5s from sequence start                   |
/// | `"name"`        | at marker `name`                                     |
/// | `"name+=0.5"`   | 0.5s after marker `name` (`-=` for before)           |
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "PositionRepr", into = "PositionRepr")]
pub enum Position {
    /// Immediately following the previous transition.
    #[default]
    AfterPrevious,
    /// Starting with the previous transition.
    WithPrevious,
    /// Overlapping the previous transition's tail by this many seconds.
    Overlap(f64),
    /// Gap of this many seconds after the previous transition.
    Gap(f64),
    /// Seconds from sequence start.
    Absolute(f64),
    /// Relative to a named marker declared earlier.
    Marker {
        /// Marker name.
        name: String,
        /// Seconds after the marker (negative for before).
        offset: f64,
    },
}

impl Position {
    /// Seconds from sequence start.
    pub fn at(secs: f64) -> Self {
        Self::Absolute(secs)
    }

    /// `offset` seconds after marker `name` (negative for before).
    pub fn marker(name: impl Into<String>, offset: f64) -> Self {
        Self::Marker {
            name: name.into(),
            offset,
        }
    }

    /// Offsets finite, relative amounts non-negative, marker names well-formed.
    pub fn validate(&self) -> StagehandResult<()> {
        let (value, what) = match self {
            Self::AfterPrevious | Self::WithPrevious => return Ok(()),
            Self::Overlap(v) => (*v, "overlap"),
            Self::Gap(v) => (*v, "gap"),
            Self::Absolute(v) => (*v, "absolute position"),
            Self::Marker { name, offset } => {
                validate_marker_name(name)?;
                if !offset.is_finite() {
                    return Err(StagehandError::validation(format!(
                        "offset from marker '{name}' must be finite"
                    )));
                }
                return Ok(());
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(StagehandError::validation(format!(
                "{what} must be finite and >= 0 (got {value})"
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_marker_name(name: &str) -> StagehandResult<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return Err(StagehandError::validation(format!(
            "invalid marker name '{name}'"
        )));
    }
    if name.contains("+=") || name.contains("-=") || name.parse::<f64>().is_ok() {
        return Err(StagehandError::validation(format!(
            "marker name '{name}' is ambiguous with a position"
        )));
    }
    Ok(())
}

fn parse_secs(raw: &str, text: &str) -> StagehandResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StagehandError::validation(format!("malformed position '{text}'")))
}

impl FromStr for Position {
    type Err = StagehandError;

    fn from_str(s: &str) -> StagehandResult<Self> {
        let text = s.trim();
        let pos = match text {
            "" | ">" => Self::AfterPrevious,
            "<" => Self::WithPrevious,
            _ => {
                if let Some(rest) = text.strip_prefix("-=") {
                    Self::Overlap(parse_secs(rest, text)?)
                } else if let Some(rest) = text.strip_prefix("+=") {
                    Self::Gap(parse_secs(rest, text)?)
                } else if let Ok(v) = text.parse::<f64>() {
                    Self::Absolute(v)
                } else if let Some(idx) = text.find("+=").or_else(|| text.find("-=")) {
                    let (name, rel) = text.split_at(idx);
                    let magnitude = parse_secs(&rel[2..], text)?;
                    let offset = if rel.starts_with('-') {
                        -magnitude
                    } else {
                        magnitude
                    };
                    Self::marker(name.trim(), offset)
                } else {
                    Self::marker(text, 0.0)
                }
            }
        };
        pos.validate()?;
        Ok(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterPrevious => f.write_str(">"),
            Self::WithPrevious => f.write_str("<"),
            Self::Overlap(v) => write!(f, "-={v}"),
            Self::Gap(v) => write!(f, "+={v}"),
            Self::Absolute(v) => write!(f, "{v}"),
            Self::Marker { name, offset } => {
                if *offset == 0.0 {
                    f.write_str(name)
                } else if *offset > 0.0 {
                    write!(f, "{name}+={offset}")
                } else {
                    write!(f, "{name}-={}", -offset)
                }
            }
        }
    }
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Secs(f64),
    Text(String),
}

impl TryFrom<PositionRepr> for Position {
    type Error = StagehandError;

    fn try_from(value: PositionRepr) -> StagehandResult<Self> {
        match value {
            PositionRepr::Secs(v) => {
                let pos = Self::Absolute(v);
                pos.validate()?;
                Ok(pos)
            }
            PositionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Position> for PositionRepr {
    fn from(value: Position) -> Self {
        match value {
            Position::Absolute(v) => Self::Secs(v),
            other => Self::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/position.rs"]
mod tests;
