use indexmap::IndexMap;

use crate::{
    animation::{ease::Ease, stagger::Stagger},
    foundation::core::{ElementId, validate_finite, validate_secs},
    foundation::error::{StagehandError, StagehandResult},
    scene::geometry::GeometrySpec,
    timeline::position::{Position, validate_marker_name},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete, declarative sequence definition.
///
/// Definitions are pure data: they can be built with [`crate::SequenceBuilder`] or loaded
/// from JSON, and are turned into a [`crate::Timeline`] by resolution.
pub struct SequenceDef {
    /// Name for authoring/debugging.
    #[serde(default)]
    pub name: String,
    /// Ordered transitions and markers.
    pub steps: Vec<Step>,
    /// How many times the cycle runs.
    #[serde(default)]
    pub repeat: RepeatPolicy,
    /// Trailing pause appended to every cycle, in seconds.
    #[serde(default)]
    pub repeat_delay: f64,
    /// Rest values randomized once per mount.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<GeometrySpec>,
    /// Text shown in place of the animation in static render mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// One declaration in a sequence.
pub enum Step {
    /// Interpolate properties over a duration.
    Tween(TweenDef),
    /// Jump properties to values (zero duration).
    Set(SetDef),
    /// Record a named point on the timeline.
    Marker(MarkerDef),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// One element or an ordered collection of elements.
pub enum Targets {
    /// A single element.
    One(ElementId),
    /// A collection; stagger applies in this order.
    Many(Vec<ElementId>),
}

impl Targets {
    /// Targets in declaration order.
    pub fn as_slice(&self) -> &[ElementId] {
        match self {
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }
}

impl From<&str> for Targets {
    fn from(value: &str) -> Self {
        Self::One(ElementId::from(value))
    }
}

impl From<ElementId> for Targets {
    fn from(value: ElementId) -> Self {
        Self::One(value)
    }
}

impl<T: Into<ElementId>> From<Vec<T>> for Targets {
    fn from(value: Vec<T>) -> Self {
        Self::Many(value.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A timed transition of one or more properties toward target values.
pub struct TweenDef {
    /// Elements to animate.
    pub targets: Targets,
    /// Property name to target value.
    pub props: IndexMap<String, f64>,
    /// Seconds per element.
    pub duration: f64,
    /// Easing curve.
    #[serde(default)]
    pub ease: Ease,
    /// Start position.
    #[serde(default)]
    pub position: Position,
    /// Per-element delay across collection targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
    /// Marker recorded at this transition's resolved start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Instantly assign property values.
pub struct SetDef {
    /// Elements to assign.
    pub targets: Targets,
    /// Property name to value.
    pub props: IndexMap<String, f64>,
    /// When the values jump.
    #[serde(default)]
    pub position: Position,
    /// Marker recorded at this step's resolved start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<SetDef> for TweenDef {
    fn from(set: SetDef) -> Self {
        Self {
            targets: set.targets,
            props: set.props,
            duration: 0.0,
            ease: Ease::Linear,
            position: set.position,
            stagger: None,
            label: set.label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A named marker. Without a position it lands at the current end of the timeline.
pub struct MarkerDef {
    /// Marker name.
    pub name: String,
    /// Explicit position; the current timeline end when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Repeat policy of a sequence.
pub enum RepeatPolicy {
    /// Play the cycle this many additional times (0 plays it once).
    Count(u32),
    /// Loop until cancelled.
    Infinite,
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl RepeatPolicy {
    /// Whether the cycle with zero-based index `cycle` may run.
    pub fn allows_cycle(self, cycle: u64) -> bool {
        match self {
            Self::Count(n) => cycle <= u64::from(n),
            Self::Infinite => true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// What to do when two transitions drive one property during intersecting windows.
pub enum OverlapPolicy {
    /// The later-declared transition governs the shared region.
    #[default]
    LastDeclaredWins,
    /// Fail construction.
    Reject,
}

fn validate_props(props: &IndexMap<String, f64>, ctx: &str) -> StagehandResult<()> {
    if props.is_empty() {
        return Err(StagehandError::validation(format!(
            "{ctx} must animate at least one property"
        )));
    }
    for (name, value) in props {
        if name.trim().is_empty() {
            return Err(StagehandError::validation(format!(
                "{ctx} has an empty property name"
            )));
        }
        validate_finite(*value, &format!("{ctx} property '{name}'"))?;
    }
    Ok(())
}

impl TweenDef {
    /// Check this tween in isolation.
    pub fn validate(&self) -> StagehandResult<()> {
        if self.targets.as_slice().is_empty() {
            return Err(StagehandError::validation("tween must have at least one target"));
        }
        validate_props(&self.props, "tween")?;
        validate_secs(self.duration, "tween duration")?;
        self.position.validate()?;
        if let Some(stagger) = &self.stagger {
            stagger.validate()?;
        }
        if let Some(label) = &self.label {
            validate_marker_name(label)?;
        }
        Ok(())
    }
}

impl SequenceDef {
    /// Check every declaration in isolation. Reference resolution happens later.
    pub fn validate(&self) -> StagehandResult<()> {
        validate_secs(self.repeat_delay, "repeat_delay")?;
        for (idx, step) in self.steps.iter().enumerate() {
            let res = match step {
                Step::Tween(t) => t.validate(),
                Step::Set(s) => TweenDef::from(s.clone()).validate(),
                Step::Marker(m) => {
                    validate_marker_name(&m.name).and_then(|()| match &m.position {
                        Some(p) => p.validate(),
                        None => Ok(()),
                    })
                }
            };
            res.map_err(|e| match e {
                StagehandError::Validation(msg) => {
                    StagehandError::validation(format!("step {idx}: {msg}"))
                }
                other => other,
            })?;
        }
        for spec in &self.geometry {
            spec.validate()?;
        }
        Ok(())
    }

    /// Parse a definition from JSON text.
    pub fn from_json(text: &str) -> StagehandResult<Self> {
        let def: Self = serde_json::from_str(text)?;
        def.validate()?;
        Ok(def)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
