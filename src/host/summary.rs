use std::fmt;

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    foundation::core::ElementId,
    foundation::error::StagehandResult,
    host::mount::MountOpts,
    scene::{geometry::DrawnGeometry, surface::RestValues},
    timeline::{model::SequenceDef, resolve::Timeline},
};

/// One animated property in its finished state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SummaryEntry {
    /// Animated element.
    pub element: ElementId,
    /// Animated property.
    pub property: String,
    /// Value once every transition finished.
    pub value: f64,
}

/// Non-animated description of a sequence's end state, presented in static render mode.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct StaticSummary {
    /// Caption from the definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// One entry per animated property, in channel order.
    pub entries: Vec<SummaryEntry>,
}

impl StaticSummary {
    /// End state of `timeline`: every channel sampled once all transitions finished.
    pub fn from_timeline(timeline: &Timeline, caption: Option<String>) -> Self {
        let entries = timeline
            .end_values()
            .into_iter()
            .map(|v| SummaryEntry {
                element: v.element.clone(),
                property: v.property.to_owned(),
                value: v.value,
            })
            .collect();
        Self { caption, entries }
    }

    /// Caption only, for definitions that cannot be resolved.
    pub fn caption_only(def: &SequenceDef) -> Self {
        Self {
            caption: def.caption.clone(),
            entries: Vec::new(),
        }
    }

    /// Summarize `def` against `rest` without touching any surface.
    ///
    /// Geometry is drawn with the same seed a mount would use. A definition that fails to
    /// resolve still yields its caption.
    pub fn for_definition<V>(def: &SequenceDef, rest: &V, opts: &MountOpts) -> Self
    where
        V: RestValues + ?Sized,
    {
        match Self::try_for_definition(def, rest, opts) {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(name = %def.name, error = %err, "static summary without end state");
                Self::caption_only(def)
            }
        }
    }

    fn try_for_definition<V>(def: &SequenceDef, rest: &V, opts: &MountOpts) -> StagehandResult<Self>
    where
        V: RestValues + ?Sized,
    {
        let mut rng = StdRng::seed_from_u64(opts.seed);
        let drawn = DrawnGeometry::draw(&def.geometry, rest, &mut rng)?;
        let timeline = Timeline::resolve(def, &drawn.overlay(rest), opts.overlap)?;
        Ok(Self::from_timeline(&timeline, def.caption.clone()))
    }

    /// Neither caption nor entries.
    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.entries.is_empty()
    }

    /// Text form: the caption, then one `element.property = value` line per entry.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StaticSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(caption) = &self.caption {
            writeln!(f, "{caption}")?;
        }
        for e in &self.entries {
            writeln!(f, "{}.{} = {:.3}", e.element, e.property, e.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/summary.rs"]
mod tests;
