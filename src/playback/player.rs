use std::rc::Rc;

use crate::{
    foundation::{core::TIME_EPSILON, math::approx_eq},
    scene::surface::Surface,
    timeline::{model::RepeatPolicy, resolve::Timeline},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
/// Observable playback state of one running sequence.
pub struct PlaybackState {
    /// Seconds into the current cycle.
    pub current_time: f64,
    /// Advancing on every tick.
    pub is_playing: bool,
    /// Explicitly paused; `current_time` is frozen.
    pub is_paused: bool,
}

/// Drives one [`Timeline`] along a single cooperative clock.
///
/// All property writes happen inside [`Player::tick`] (or the explicit `apply*` calls),
/// computed from one `current_time` snapshot. `play`/`pause`/`cancel` only flip state and
/// are idempotent.
#[derive(Debug)]
pub struct Player {
    timeline: Rc<Timeline>,
    state: PlaybackState,
    cycle: u64,
    finished: bool,
    cancelled: bool,
    restore_rest: bool,
    dirty: bool,
    last_timestamp: Option<f64>,
}

impl Player {
    /// A player idle at time 0.
    pub fn new(timeline: impl Into<Rc<Timeline>>) -> Self {
        Self {
            timeline: timeline.into(),
            state: PlaybackState::default(),
            cycle: 0,
            finished: false,
            cancelled: false,
            restore_rest: false,
            dirty: false,
            last_timestamp: None,
        }
    }

    /// The timeline being played.
    pub fn timeline(&self) -> &Rc<Timeline> {
        &self.timeline
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Zero-based index of the running cycle.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether [`Player::cancel`] ran.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The last permitted cycle ran to the end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Resume advancing. At the end of a cycle this wraps to 0 when the repeat policy
    /// allows another cycle, and the rest state is re-applied on the next tick.
    pub fn play(&mut self) {
        if self.cancelled || self.finished || self.state.is_playing {
            return;
        }
        let duration = self.timeline.duration();
        let at_end = self.state.current_time >= duration
            || approx_eq(self.state.current_time, duration, TIME_EPSILON);
        if duration > 0.0 && at_end {
            if !self.timeline.repeat.allows_cycle(self.cycle + 1) {
                return;
            }
            self.cycle += 1;
            self.state.current_time = 0.0;
            self.restore_rest = true;
            self.dirty = true;
        }
        self.state.is_playing = true;
        self.state.is_paused = false;
        self.last_timestamp = None;
    }

    /// Freeze `current_time`; element properties keep their last computed values.
    pub fn pause(&mut self) {
        if self.cancelled || self.state.is_paused {
            return;
        }
        self.state.is_playing = false;
        self.state.is_paused = true;
        self.last_timestamp = None;
    }

    /// Jump back to time 0 of the first cycle and play.
    pub fn restart(&mut self) {
        if self.cancelled {
            return;
        }
        self.state.current_time = 0.0;
        self.cycle = 0;
        self.finished = false;
        self.restore_rest = true;
        self.dirty = true;
        self.state.is_paused = false;
        self.state.is_playing = true;
        self.last_timestamp = None;
    }

    /// Move to `t` seconds into the current cycle; rendered on the next tick.
    pub fn seek(&mut self, t: f64) {
        if self.cancelled {
            return;
        }
        let t = if t.is_finite() { t } else { 0.0 };
        self.state.current_time = t.clamp(0.0, self.timeline.duration());
        self.finished = false;
        self.dirty = true;
    }

    /// Stop for good. Later calls of any kind are no-ops and write nothing.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.restore_rest = false;
        self.dirty = false;
        self.last_timestamp = None;
        tracing::debug!(name = %self.timeline.name, "playback cancelled");
    }

    /// Advance by `dt` seconds of real time and write the resulting values.
    pub fn tick<S: Surface + ?Sized>(&mut self, dt: f64, surface: &mut S) {
        if self.cancelled {
            return;
        }
        if self.state.is_playing {
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            self.advance(dt);
            self.dirty = true;
        }
        if self.dirty {
            if self.restore_rest {
                self.apply_rest(surface);
                self.restore_rest = false;
            }
            self.apply(surface);
            self.dirty = false;
        }
    }

    /// Advance using an absolute clock reading, as delivered by a display-refresh callback.
    ///
    /// The first frame after construction, `play` or `pause` only records the timestamp.
    pub fn frame<S: Surface + ?Sized>(&mut self, timestamp: f64, surface: &mut S) {
        let dt = match self.last_timestamp {
            Some(last) if self.state.is_playing => (timestamp - last).max(0.0),
            _ => 0.0,
        };
        if self.state.is_playing {
            self.last_timestamp = Some(timestamp);
        }
        self.tick(dt, surface);
    }

    fn advance(&mut self, dt: f64) {
        let duration = self.timeline.duration();
        let t = self.state.current_time + dt;

        if duration <= 0.0 {
            self.complete(0.0);
            return;
        }
        if t < duration {
            self.state.current_time = t;
            return;
        }

        let wraps = (t / duration).floor();
        let target_cycle = self.cycle.saturating_add(wraps as u64);
        if self.timeline.repeat.allows_cycle(target_cycle) {
            self.cycle = target_cycle;
            self.state.current_time = t - wraps * duration;
            self.restore_rest = true;
            tracing::debug!(
                name = %self.timeline.name,
                cycle = self.cycle,
                "cycle wrapped"
            );
        } else {
            if let RepeatPolicy::Count(n) = self.timeline.repeat {
                self.cycle = u64::from(n);
            }
            self.complete(duration);
        }
    }

    fn complete(&mut self, at: f64) {
        self.state.current_time = at;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.finished = true;
        tracing::debug!(name = %self.timeline.name, "playback finished");
    }

    /// Write every channel's value at the current time.
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.cancelled {
            return;
        }
        for v in self.timeline.sample(self.state.current_time) {
            surface.write(v.element, v.property, v.value);
        }
    }

    /// Write every channel's rest value.
    pub fn apply_rest<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.cancelled {
            return;
        }
        for v in self.timeline.rest_values() {
            surface.write(v.element, v.property, v.value);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
