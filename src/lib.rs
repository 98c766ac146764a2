//! Stagehand is a small declarative sequencer for timed visual transitions.
//!
//! A [`SequenceDef`] lists tweens, sets and markers. Resolution turns it into a linear
//! [`Timeline`] with absolute times per element property, and a [`Player`] samples that
//! timeline along one cooperative clock, writing values to a host [`Surface`].
//!
//! # Pipeline overview
//!
//! 1. **Declare**: [`SequenceBuilder`] or JSON -> `SequenceDef`
//! 2. **Resolve**: `SequenceDef + rest values -> Timeline` (markers, stagger, overlap policy)
//! 3. **Mount**: [`mount`] draws seeded geometry, wires the [`MotionSignal`] and returns a
//!    [`Presentation`] (a running [`Sequencer`] or a [`StaticSummary`])
//! 4. **Tick**: the host drives `Sequencer::tick`/`frame`; every write happens there
//!
//! Resolution and sampling are pure. Construction failures never touch the surface.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod foundation;
mod host;
mod playback;
mod scene;
mod timeline;

pub use animation::ease::Ease;
pub use animation::stagger::{Stagger, StaggerFrom};
pub use foundation::core::ElementId;
pub use foundation::error::{StagehandError, StagehandResult};
pub use host::mount::{MountOpts, PendingMount, Presentation, Sequencer, mount, mount_or_static};
pub use host::signal::{FixedMotion, MotionPreference, MotionSignal, Subscription};
pub use host::summary::{StaticSummary, SummaryEntry};
pub use playback::player::{PlaybackState, Player};
pub use scene::geometry::{DrawnGeometry, GeometryOverlay, GeometrySpec};
pub use scene::surface::{RestValues, Scene, Surface, VisualElement};
pub use timeline::dsl::{SequenceBuilder, TweenBuilder, tween};
pub use timeline::model::{
    MarkerDef, OverlapPolicy, RepeatPolicy, SequenceDef, SetDef, Step, Targets, TweenDef,
};
pub use timeline::position::Position;
pub use timeline::resolve::{Channel, ChannelValue, Segment, Timeline};
