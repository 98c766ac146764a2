use indexmap::IndexMap;

use crate::{
    animation::ease::Ease,
    foundation::core::{ElementId, TIME_EPSILON},
    foundation::error::{StagehandError, StagehandResult},
    foundation::math::{lerp, progress},
    scene::surface::RestValues,
    timeline::model::{OverlapPolicy, RepeatPolicy, SequenceDef, Step, TweenDef},
    timeline::position::Position,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A fully resolved, linear timeline.
///
/// Every segment carries absolute start/end times in seconds from 0 and the value it
/// interpolates from. Sampling is a pure function of time.
pub struct Timeline {
    /// Sequence name copied from the definition.
    pub name: String,
    /// Marker positions in order of first declaration.
    pub markers: IndexMap<String, f64>,
    /// One channel per animated element property, in order of first touch.
    pub channels: Vec<Channel>,
    /// End of the last transition.
    pub active_duration: f64,
    /// Trailing pause appended to every cycle.
    pub repeat_delay: f64,
    /// Repeat policy copied from the definition.
    pub repeat: RepeatPolicy,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// All segments driving one property of one element.
pub struct Channel {
    /// Animated element.
    pub element: ElementId,
    /// Animated property.
    pub property: String,
    /// Declared rest value.
    pub rest: f64,
    /// Sorted by `(start, order)`.
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One element's share of one transition on one property.
pub struct Segment {
    /// Absolute start in seconds.
    pub start: f64,
    /// Absolute end in seconds; equal to `start` for a set.
    pub end: f64,
    /// Value left by earlier segments at `start` (or the rest value).
    pub from: f64,
    /// Target value.
    pub to: f64,
    /// Easing curve.
    pub ease: Ease,
    /// Index of the declaring step; higher wins inside overlapping windows.
    pub order: usize,
}

impl Segment {
    fn is_active(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    fn value_at(&self, t: f64) -> f64 {
        let p = self.ease.apply(progress(t, self.start, self.end - self.start));
        lerp(self.from, self.to, p)
    }
}

/// Value of a property at `t` given its rest value and segments.
///
/// An active segment with the highest declaration order governs; with none active, the
/// segment that finished last leaves its target value; before any segment, the rest value.
fn sample_segments(rest: f64, segments: &[Segment], t: f64) -> f64 {
    let mut active: Option<&Segment> = None;
    let mut finished: Option<&Segment> = None;
    for seg in segments {
        if seg.start > t {
            continue;
        }
        if seg.is_active(t) {
            if active.is_none_or(|a| seg.order > a.order) {
                active = Some(seg);
            }
        } else if finished.is_none_or(|f| (seg.end, seg.order) > (f.end, f.order)) {
            finished = Some(seg);
        }
    }

    match (active, finished) {
        (Some(seg), _) => seg.value_at(t),
        (None, Some(seg)) => seg.to,
        (None, None) => rest,
    }
}

impl Channel {
    /// Value of this channel at `t` seconds into a cycle.
    pub fn sample(&self, t: f64) -> f64 {
        sample_segments(self.rest, &self.segments, t)
    }

    /// Earliest segment start.
    pub fn first_start(&self) -> Option<f64> {
        self.segments.first().map(|s| s.start)
    }
}

/// A value computed for one channel.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChannelValue<'a> {
    /// Element of the channel.
    pub element: &'a ElementId,
    /// Property of the channel.
    pub property: &'a str,
    /// Computed value.
    pub value: f64,
}

struct RawSegment {
    start: f64,
    end: f64,
    to: f64,
    ease: Ease,
    order: usize,
}

/// Span of the most recently declared transition, for relative positions.
#[derive(Clone, Copy)]
struct Span {
    start: f64,
    end: f64,
}

fn resolve_position(
    position: &Position,
    prev: Option<Span>,
    markers: &IndexMap<String, f64>,
) -> StagehandResult<f64> {
    let prev_end = prev.map_or(0.0, |p| p.end);
    let at = match position {
        Position::AfterPrevious => prev_end,
        Position::WithPrevious => prev.map_or(0.0, |p| p.start),
        Position::Overlap(d) => prev_end - d,
        Position::Gap(d) => prev_end + d,
        Position::Absolute(t) => *t,
        Position::Marker { name, offset } => {
            let Some(base) = markers.get(name) else {
                return Err(StagehandError::construction(format!(
                    "position references marker '{name}' which is not defined at this point"
                )));
            };
            base + offset
        }
    };
    Ok(at.max(0.0))
}

impl Timeline {
    /// Resolve `def` against the rest state in `rest` into an absolute timeline.
    ///
    /// Fails as a whole on any unresolved element, property or marker reference; no
    /// partial timeline is produced.
    #[tracing::instrument(skip(def, rest), fields(name = %def.name))]
    pub fn resolve<V>(def: &SequenceDef, rest: &V, overlap: OverlapPolicy) -> StagehandResult<Self>
    where
        V: RestValues + ?Sized,
    {
        def.validate()?;

        let mut markers: IndexMap<String, f64> = IndexMap::new();
        let mut raw: IndexMap<(ElementId, String), (f64, Vec<RawSegment>)> = IndexMap::new();
        let mut prev: Option<Span> = None;
        let mut timeline_end = 0.0_f64;

        for (order, step) in def.steps.iter().enumerate() {
            let set_tween;
            let tween: &TweenDef = match step {
                Step::Marker(m) => {
                    let at = match &m.position {
                        Some(p) => resolve_position(p, prev, &markers)?,
                        None => timeline_end,
                    };
                    markers.insert(m.name.clone(), at);
                    continue;
                }
                Step::Tween(t) => t,
                Step::Set(s) => {
                    set_tween = TweenDef::from(s.clone());
                    &set_tween
                }
            };

            let start = resolve_position(&tween.position, prev, &markers)?;
            if let Some(label) = &tween.label {
                markers.insert(label.clone(), start);
            }

            let targets = tween.targets.as_slice();
            let offsets = match &tween.stagger {
                Some(stagger) => stagger.offsets(targets.len())?,
                None => vec![0.0; targets.len()],
            };

            let mut end = start;
            for (element, offset) in targets.iter().zip(offsets) {
                if !rest.contains_element(element) {
                    return Err(StagehandError::construction(format!(
                        "step {order} targets unknown element '{element}'"
                    )));
                }
                let seg_start = start + offset;
                let seg_end = seg_start + tween.duration;
                end = end.max(seg_end);

                for (property, to) in &tween.props {
                    let key = (element.clone(), property.clone());
                    if !raw.contains_key(&key) {
                        let Some(rest_value) = rest.rest_value(element, property) else {
                            return Err(StagehandError::construction(format!(
                                "element '{element}' declares no rest value for '{property}'"
                            )));
                        };
                        raw.insert(key.clone(), (rest_value, Vec::new()));
                    }
                    if let Some((_, segs)) = raw.get_mut(&key) {
                        segs.push(RawSegment {
                            start: seg_start,
                            end: seg_end,
                            to: *to,
                            ease: tween.ease,
                            order,
                        });
                    }
                }
            }

            prev = Some(Span { start, end });
            timeline_end = timeline_end.max(end);
        }

        let mut channels = Vec::with_capacity(raw.len());
        for ((element, property), (rest_value, mut segs)) in raw {
            segs.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.order.cmp(&b.order)));
            check_overlaps(&element, &property, &segs, overlap)?;

            let mut segments: Vec<Segment> = Vec::with_capacity(segs.len());
            for s in segs {
                let from = sample_segments(rest_value, &segments, s.start);
                segments.push(Segment {
                    start: s.start,
                    end: s.end,
                    from,
                    to: s.to,
                    ease: s.ease,
                    order: s.order,
                });
            }
            channels.push(Channel {
                element,
                property,
                rest: rest_value,
                segments,
            });
        }

        tracing::debug!(
            channels = channels.len(),
            markers = markers.len(),
            active_duration = timeline_end,
            "resolved timeline"
        );

        Ok(Self {
            name: def.name.clone(),
            markers,
            channels,
            active_duration: timeline_end,
            repeat_delay: def.repeat_delay,
            repeat: def.repeat,
        })
    }

    /// Length of one cycle: last transition end plus the trailing pause.
    pub fn duration(&self) -> f64 {
        self.active_duration + self.repeat_delay
    }

    /// Absolute position of a marker.
    pub fn marker(&self, name: &str) -> Option<f64> {
        self.markers.get(name).copied()
    }

    /// Channel driving `property` of `element`.
    pub fn channel(&self, element: &ElementId, property: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| &c.element == element && c.property == property)
    }

    /// Every channel's value at `t` seconds into a cycle, from one consistent instant.
    pub fn sample(&self, t: f64) -> Vec<ChannelValue<'_>> {
        self.channels
            .iter()
            .map(|c| ChannelValue {
                element: &c.element,
                property: &c.property,
                value: c.sample(t),
            })
            .collect()
    }

    /// Every channel at its rest value.
    pub fn rest_values(&self) -> Vec<ChannelValue<'_>> {
        self.channels
            .iter()
            .map(|c| ChannelValue {
                element: &c.element,
                property: &c.property,
                value: c.rest,
            })
            .collect()
    }

    /// Values once every transition has finished.
    pub fn end_values(&self) -> Vec<ChannelValue<'_>> {
        self.sample(self.active_duration)
    }

    /// Earliest instant any segment starts, if any transition exists.
    pub fn first_transition_start(&self) -> Option<f64> {
        self.channels
            .iter()
            .filter_map(Channel::first_start)
            .min_by(f64::total_cmp)
    }
}

fn check_overlaps(
    element: &ElementId,
    property: &str,
    sorted: &[RawSegment],
    policy: OverlapPolicy,
) -> StagehandResult<()> {
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            if b.start >= a.end - TIME_EPSILON {
                break;
            }
            // Zero-length sets never share a window with positive length.
            if b.end - b.start <= TIME_EPSILON || a.end - a.start <= TIME_EPSILON {
                continue;
            }
            match policy {
                OverlapPolicy::Reject => {
                    return Err(StagehandError::construction(format!(
                        "steps {} and {} both drive '{element}.{property}' during [{:.3}, {:.3})",
                        a.order,
                        b.order,
                        b.start,
                        a.end.min(b.end)
                    )));
                }
                OverlapPolicy::LastDeclaredWins => {
                    tracing::warn!(
                        element = %element,
                        property,
                        first = a.order,
                        second = b.order,
                        "overlapping transitions on one property; later declaration wins"
                    );
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolve.rs"]
mod tests;
