use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;

/// Observable "prefers reduced motion" preference.
///
/// Injected into [`crate::mount`] so that nothing reads a process-wide setting directly.
pub trait MotionSignal {
    /// Current preference.
    fn prefers_reduced_motion(&self) -> bool;

    /// Register `listener` for every later change. The listener stays registered until the
    /// returned [`Subscription`] is dropped.
    fn subscribe(&self, listener: Box<dyn FnMut(bool)>) -> Subscription;
}

/// Scoped registration of a listener; releases it on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Run `release` when the subscription ends.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release, for signals that never change.
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Release now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

type Listener = Rc<RefCell<Box<dyn FnMut(bool)>>>;

#[derive(Default)]
struct PreferenceInner {
    reduced: bool,
    generation: u64,
    next_id: u64,
    listeners: IndexMap<u64, Listener>,
}

/// Settable [`MotionSignal`]. Clones share one preference and one listener set.
#[derive(Clone, Default)]
pub struct MotionPreference {
    inner: Rc<RefCell<PreferenceInner>>,
}

impl MotionPreference {
    /// A preference starting at `reduced`.
    pub fn new(reduced: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PreferenceInner {
                reduced,
                ..PreferenceInner::default()
            })),
        }
    }

    /// Change the preference and notify listeners synchronously, in registration order.
    /// Setting the current value again notifies nobody.
    ///
    /// A listener may call `set` again. The nested change is delivered right away and the
    /// outer delivery stops, so no listener sees an older value after a newer one.
    pub fn set(&self, reduced: bool) {
        let (generation, listeners): (u64, Vec<Listener>) = {
            let mut inner = self.inner.borrow_mut();
            if inner.reduced == reduced {
                return;
            }
            inner.reduced = reduced;
            inner.generation += 1;
            (inner.generation, inner.listeners.values().cloned().collect())
        };
        tracing::debug!(reduced, listeners = listeners.len(), "motion preference changed");

        for listener in listeners {
            if self.inner.borrow().generation != generation {
                tracing::debug!(reduced, "motion preference superseded during notification");
                return;
            }
            // The listener currently running the outer delivery is skipped for the nested one.
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (&mut **callback)(reduced);
            }
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl fmt::Debug for MotionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MotionPreference")
            .field("reduced", &inner.reduced)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl MotionSignal for MotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.inner.borrow().reduced
    }

    fn subscribe(&self, listener: Box<dyn FnMut(bool)>) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.insert(id, Rc::new(RefCell::new(listener)));
            id
        };
        let weak: Weak<RefCell<PreferenceInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.shift_remove(&id);
            }
        })
    }
}

/// A preference that never changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedMotion(pub bool);

impl MotionSignal for FixedMotion {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }

    fn subscribe(&self, _listener: Box<dyn FnMut(bool)>) -> Subscription {
        Subscription::detached()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/signal.rs"]
mod tests;
