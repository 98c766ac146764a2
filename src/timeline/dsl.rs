use indexmap::IndexMap;

use crate::{
    animation::{ease::Ease, stagger::Stagger},
    foundation::error::StagehandResult,
    scene::geometry::GeometrySpec,
    timeline::model::{MarkerDef, RepeatPolicy, SequenceDef, SetDef, Step, Targets, TweenDef},
    timeline::position::Position,
};

/// Builder for [`SequenceDef`](crate::SequenceDef).
pub struct SequenceBuilder {
    name: String,
    steps: Vec<Step>,
    repeat: RepeatPolicy,
    repeat_delay: f64,
    geometry: Vec<GeometrySpec>,
    caption: Option<String>,
}

impl SequenceBuilder {
    /// Create a builder for a new sequence.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            repeat: RepeatPolicy::default(),
            repeat_delay: 0.0,
            geometry: Vec::new(),
            caption: None,
        }
    }

    /// Append a transition.
    pub fn tween(mut self, tween: impl Into<TweenDef>) -> Self {
        self.steps.push(Step::Tween(tween.into()));
        self
    }

    /// Append an instant assignment.
    pub fn set(
        mut self,
        targets: impl Into<Targets>,
        props: impl IntoIterator<Item = (&'static str, f64)>,
        position: Position,
    ) -> Self {
        self.steps.push(Step::Set(SetDef {
            targets: targets.into(),
            props: collect_props(props),
            position,
            label: None,
        }));
        self
    }

    /// Append a marker at the current end of the timeline.
    pub fn marker(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Marker(MarkerDef {
            name: name.into(),
            position: None,
        }));
        self
    }

    /// Append a marker at an explicit position.
    pub fn marker_at(mut self, name: impl Into<String>, position: Position) -> Self {
        self.steps.push(Step::Marker(MarkerDef {
            name: name.into(),
            position: Some(position),
        }));
        self
    }

    /// Set the repeat policy.
    pub fn repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = repeat;
        self
    }

    /// Trailing pause before the next cycle.
    pub fn repeat_delay(mut self, secs: f64) -> Self {
        self.repeat_delay = secs;
        self
    }

    /// Add a randomized rest value.
    pub fn geometry(mut self, spec: GeometrySpec) -> Self {
        self.geometry.push(spec);
        self
    }

    /// Text for static render mode.
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Build and validate the final [`SequenceDef`](crate::SequenceDef).
    pub fn build(self) -> StagehandResult<SequenceDef> {
        let def = SequenceDef {
            name: self.name,
            steps: self.steps,
            repeat: self.repeat,
            repeat_delay: self.repeat_delay,
            geometry: self.geometry,
            caption: self.caption,
        };
        def.validate()?;
        Ok(def)
    }
}

/// Builder for one [`TweenDef`](crate::TweenDef).
pub struct TweenBuilder {
    def: TweenDef,
}

/// Start a tween of `targets` lasting `duration` seconds.
pub fn tween(targets: impl Into<Targets>, duration: f64) -> TweenBuilder {
    TweenBuilder {
        def: TweenDef {
            targets: targets.into(),
            props: IndexMap::new(),
            duration,
            ease: Ease::default(),
            position: Position::default(),
            stagger: None,
            label: None,
        },
    }
}

impl TweenBuilder {
    /// Target value for one property.
    pub fn to(mut self, property: impl Into<String>, value: f64) -> Self {
        self.def.props.insert(property.into(), value);
        self
    }

    /// Easing curve.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.def.ease = ease;
        self
    }

    /// Start position.
    pub fn at(mut self, position: Position) -> Self {
        self.def.position = position;
        self
    }

    /// Per-element delay across the targets.
    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.def.stagger = Some(stagger);
        self
    }

    /// Record marker `name` at this tween's start.
    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.def.label = Some(name.into());
        self
    }
}

impl From<TweenBuilder> for TweenDef {
    fn from(builder: TweenBuilder) -> Self {
        builder.def
    }
}

fn collect_props(props: impl IntoIterator<Item = (&'static str, f64)>) -> IndexMap<String, f64> {
    props
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/dsl.rs"]
mod tests;
