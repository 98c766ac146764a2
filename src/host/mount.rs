use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    foundation::error::{StagehandError, StagehandResult},
    host::{
        signal::{MotionSignal, Subscription},
        summary::StaticSummary,
    },
    playback::player::{PlaybackState, Player},
    scene::{geometry::DrawnGeometry, surface::Surface},
    timeline::{
        model::{OverlapPolicy, SequenceDef},
        resolve::Timeline,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Host-controlled flags read once at mount time.
pub struct MountOpts {
    /// Present a [`StaticSummary`] instead of constructing a sequencer.
    pub static_render: bool,
    /// Seed for randomized initial geometry.
    pub seed: u64,
    /// Handling of overlapping windows on one property.
    pub overlap: OverlapPolicy,
}

/// What the host should present for one mounted definition.
#[derive(Debug)]
pub enum Presentation {
    /// A running sequence.
    Animated(Sequencer),
    /// Static render mode: the end state as text.
    Static(StaticSummary),
}

impl Presentation {
    /// `true` for [`Presentation::Static`].
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }

    /// The running sequence, if animated.
    pub fn sequencer(&self) -> Option<&Sequencer> {
        match self {
            Self::Animated(s) => Some(s),
            Self::Static(_) => None,
        }
    }

    /// Mutable access to the running sequence, if animated.
    pub fn sequencer_mut(&mut self) -> Option<&mut Sequencer> {
        match self {
            Self::Animated(s) => Some(s),
            Self::Static(_) => None,
        }
    }

    /// The static summary, if static.
    pub fn summary(&self) -> Option<&StaticSummary> {
        match self {
            Self::Static(s) => Some(s),
            Self::Animated(_) => None,
        }
    }
}

/// A mounted, running sequence: one [`Player`] plus its reduced-motion listener.
///
/// Cancelling (or dropping) releases the listener. The host keeps driving it through
/// [`Sequencer::tick`] or [`Sequencer::frame`].
#[derive(Debug)]
pub struct Sequencer {
    player: Rc<RefCell<Player>>,
    deferred: Rc<Cell<Option<bool>>>,
    subscription: Option<Subscription>,
}

fn reconcile(player: &mut Player, reduced: bool) {
    if reduced {
        player.pause();
    } else {
        player.restart();
    }
}

impl Sequencer {
    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.player.borrow().state()
    }

    /// Zero-based index of the running cycle.
    pub fn cycle(&self) -> u64 {
        self.player.borrow().cycle()
    }

    /// The resolved timeline being played.
    pub fn timeline(&self) -> Rc<Timeline> {
        Rc::clone(self.player.borrow().timeline())
    }

    /// Whether [`Sequencer::cancel`] ran.
    pub fn is_cancelled(&self) -> bool {
        self.player.borrow().is_cancelled()
    }

    /// Whether the last permitted cycle ran to the end.
    pub fn is_finished(&self) -> bool {
        self.player.borrow().is_finished()
    }

    /// Advance by `dt` seconds and write the resulting values.
    ///
    /// A preference change that arrived during the previous tick is reconciled first.
    pub fn tick<S: Surface + ?Sized>(&mut self, dt: f64, surface: &mut S) {
        let mut player = self.player.borrow_mut();
        if let Some(reduced) = self.deferred.take() {
            reconcile(&mut player, reduced);
        }
        player.tick(dt, surface);
    }

    /// Advance to an absolute clock reading; see [`Player::frame`].
    pub fn frame<S: Surface + ?Sized>(&mut self, timestamp: f64, surface: &mut S) {
        let mut player = self.player.borrow_mut();
        if let Some(reduced) = self.deferred.take() {
            reconcile(&mut player, reduced);
        }
        player.frame(timestamp, surface);
    }

    /// See [`Player::play`].
    pub fn play(&mut self) {
        self.player.borrow_mut().play();
    }

    /// See [`Player::pause`].
    pub fn pause(&mut self) {
        self.player.borrow_mut().pause();
    }

    /// See [`Player::seek`].
    pub fn seek(&mut self, t: f64) {
        self.player.borrow_mut().seek(t);
    }

    /// See [`Player::restart`].
    pub fn restart(&mut self) {
        self.player.borrow_mut().restart();
    }

    /// Stop playback for good and release the reduced-motion listener. Idempotent.
    pub fn cancel(&mut self) {
        if let Ok(mut player) = self.player.try_borrow_mut() {
            player.cancel();
        }
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Construct a sequencer for `def` on `surface`.
///
/// Static render mode short-circuits before anything else. Otherwise an unmounted surface
/// is [`StagehandError::NotReady`], and validation or reference failures leave the surface
/// untouched. On success the surface holds the drawn geometry and the sequence's rest
/// state; playback starts unless `motion` prefers reduced motion.
#[tracing::instrument(skip_all, fields(name = %def.name))]
pub fn mount<S, M>(
    def: &SequenceDef,
    surface: &mut S,
    motion: &M,
    opts: &MountOpts,
) -> StagehandResult<Presentation>
where
    S: Surface + ?Sized,
    M: MotionSignal + ?Sized,
{
    if opts.static_render {
        tracing::debug!("static render mode");
        return Ok(Presentation::Static(StaticSummary::for_definition(
            def, &*surface, opts,
        )));
    }
    if !surface.is_mounted() {
        return Err(StagehandError::not_ready(format!(
            "surface for sequence '{}' is not mounted",
            def.name
        )));
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let drawn = DrawnGeometry::draw(&def.geometry, &*surface, &mut rng)?;
    let timeline = Timeline::resolve(def, &drawn.overlay(&*surface), opts.overlap)?;

    drawn.apply(surface);
    let mut player = Player::new(timeline);
    player.apply_rest(surface);

    let reduced = motion.prefers_reduced_motion();
    if reduced {
        player.pause();
    } else {
        player.play();
    }
    tracing::debug!(
        reduced,
        duration = player.timeline().duration(),
        "sequencer mounted"
    );

    let player = Rc::new(RefCell::new(player));
    let deferred = Rc::new(Cell::new(None));
    let subscription = motion.subscribe(Box::new({
        let player = Rc::downgrade(&player);
        let deferred = Rc::clone(&deferred);
        move |reduced| {
            let Some(player) = player.upgrade() else {
                return;
            };
            match player.try_borrow_mut() {
                Ok(mut player) => reconcile(&mut player, reduced),
                // Busy inside a tick; applied at the start of the next one.
                Err(_) => deferred.set(Some(reduced)),
            }
        }
    }));

    Ok(Presentation::Animated(Sequencer {
        player,
        deferred,
        subscription: Some(subscription),
    }))
}

/// [`mount`], presenting the caption-only summary when the definition cannot be
/// constructed. [`StagehandError::NotReady`] is still returned for the host to retry.
pub fn mount_or_static<S, M>(
    def: &SequenceDef,
    surface: &mut S,
    motion: &M,
    opts: &MountOpts,
) -> StagehandResult<Presentation>
where
    S: Surface + ?Sized,
    M: MotionSignal + ?Sized,
{
    match mount(def, surface, motion, opts) {
        Err(err @ (StagehandError::Validation(_) | StagehandError::Construction(_))) => {
            tracing::warn!(name = %def.name, error = %err, "falling back to static presentation");
            Ok(Presentation::Static(StaticSummary::caption_only(def)))
        }
        other => other,
    }
}

/// A construction deferred until the host surface mounts.
#[derive(Clone, Debug)]
pub struct PendingMount {
    def: SequenceDef,
    opts: MountOpts,
    attempts: u32,
}

impl PendingMount {
    /// Defer mounting `def` with `opts`.
    pub fn new(def: SequenceDef, opts: MountOpts) -> Self {
        Self {
            def,
            opts,
            attempts: 0,
        }
    }

    /// Number of polls that found the surface not ready.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Try to mount. `Ok(None)` means the surface is not ready yet; poll again later.
    pub fn poll<S, M>(&mut self, surface: &mut S, motion: &M) -> StagehandResult<Option<Presentation>>
    where
        S: Surface + ?Sized,
        M: MotionSignal + ?Sized,
    {
        match mount(&self.def, surface, motion, &self.opts) {
            Ok(p) => Ok(Some(p)),
            Err(err) if err.is_not_ready() => {
                self.attempts += 1;
                tracing::trace!(attempts = self.attempts, "surface not ready");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/mount.rs"]
mod tests;
