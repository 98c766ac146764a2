use std::{fmt, str::FromStr};

use crate::foundation::error::{StagehandError, StagehandResult};

/// Easing curve mapping linear progress in `[0, 1]` to eased progress.
///
/// Serialized by name. Besides the snake-case variant names, the common
/// `family.direction` spellings are accepted (`"power2.inOut"`, `"sine.out"`, `"none"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// No easing.
    Linear,
    /// Quadratic, accelerating.
    InQuad,
    #[default]
    /// Quadratic, decelerating.
    OutQuad,
    /// Quadratic, both ends.
    InOutQuad,
    /// Cubic, accelerating.
    InCubic,
    /// Cubic, decelerating.
    OutCubic,
    /// Cubic, both ends.
    InOutCubic,
    /// Quartic, accelerating.
    InQuart,
    /// Quartic, decelerating.
    OutQuart,
    /// Quartic, both ends.
    InOutQuart,
    /// Sinusoidal, accelerating.
    InSine,
    /// Sinusoidal, decelerating.
    OutSine,
    /// Sinusoidal, both ends.
    InOutSine,
    /// Exponential, accelerating.
    InExpo,
    /// Exponential, decelerating.
    OutExpo,
    /// Exponential, both ends.
    InOutExpo,
    /// Pulls back before moving forward.
    InBack,
    /// Overshoots, then settles.
    OutBack,
}

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;

impl Ease {
    /// Eased progress for `t`, clamped to `[0, 1]` first.
    pub fn apply(self, t: f64) -> f64 {
        let t = crate::foundation::math::clamp01(t);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
            Self::InSine => 1.0 - (t * std::f64::consts::FRAC_PI_2).cos(),
            Self::OutSine => (t * std::f64::consts::FRAC_PI_2).sin(),
            Self::InOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
            Self::InExpo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExpo => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::OutBack => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
        }
    }

    /// Canonical snake-case name, also used for serialization.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "in_quad",
            Self::OutQuad => "out_quad",
            Self::InOutQuad => "in_out_quad",
            Self::InCubic => "in_cubic",
            Self::OutCubic => "out_cubic",
            Self::InOutCubic => "in_out_cubic",
            Self::InQuart => "in_quart",
            Self::OutQuart => "out_quart",
            Self::InOutQuart => "in_out_quart",
            Self::InSine => "in_sine",
            Self::OutSine => "out_sine",
            Self::InOutSine => "in_out_sine",
            Self::InExpo => "in_expo",
            Self::OutExpo => "out_expo",
            Self::InOutExpo => "in_out_expo",
            Self::InBack => "in_back",
            Self::OutBack => "out_back",
        }
    }

    const ALL: [Self; 18] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
        Self::InBack,
        Self::OutBack,
    ];
}

fn parse_family(family: &str, direction: &str) -> Option<Ease> {
    // (in, out, in_out); a bare family name means "out".
    let (i, o, io) = match family {
        "power1" | "quad" => (Ease::InQuad, Ease::OutQuad, Ease::InOutQuad),
        "power2" | "cubic" => (Ease::InCubic, Ease::OutCubic, Ease::InOutCubic),
        "power3" | "quart" => (Ease::InQuart, Ease::OutQuart, Ease::InOutQuart),
        "sine" => (Ease::InSine, Ease::OutSine, Ease::InOutSine),
        "expo" => (Ease::InExpo, Ease::OutExpo, Ease::InOutExpo),
        "back" => (Ease::InBack, Ease::OutBack, Ease::OutBack),
        _ => return None,
    };
    match direction {
        "in" => Some(i),
        "" | "out" => Some(o),
        "inout" if family != "back" => Some(io),
        _ => None,
    }
}

impl FromStr for Ease {
    type Err = StagehandError;

    fn from_str(s: &str) -> StagehandResult<Self> {
        let raw = s.trim();
        if let Some(ease) = Self::ALL.into_iter().find(|e| e.name() == raw) {
            return Ok(ease);
        }

        let lower = raw.to_ascii_lowercase();
        if matches!(lower.as_str(), "none" | "linear" | "power0") {
            return Ok(Self::Linear);
        }
        let (family, direction) = lower.split_once('.').unwrap_or((lower.as_str(), ""));
        parse_family(family, direction)
            .ok_or_else(|| StagehandError::validation(format!("unknown ease '{raw}'")))
    }
}

impl TryFrom<String> for Ease {
    type Error = StagehandError;

    fn try_from(value: String) -> StagehandResult<Self> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(value: Ease) -> Self {
        value.name().to_owned()
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
