use std::cell::Cell;

use super::*;

fn recorder() -> (Rc<RefCell<Vec<bool>>>, Box<dyn FnMut(bool)>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, Box::new(move |v| sink.borrow_mut().push(v)))
}

#[test]
fn preference_notifies_on_change_only() {
    let pref = MotionPreference::new(false);
    let (seen, listener) = recorder();
    let _sub = pref.subscribe(listener);

    pref.set(false);
    pref.set(true);
    pref.set(true);
    pref.set(false);

    assert_eq!(*seen.borrow(), vec![true, false]);
    assert!(!pref.prefers_reduced_motion());
}

#[test]
fn dropping_subscription_unregisters() {
    let pref = MotionPreference::new(false);
    let (seen, listener) = recorder();
    let sub = pref.subscribe(listener);
    assert_eq!(pref.listener_count(), 1);

    drop(sub);
    assert_eq!(pref.listener_count(), 0);
    pref.set(true);
    assert!(seen.borrow().is_empty());
}

#[test]
fn explicit_unsubscribe_releases_once() {
    let released = Rc::new(Cell::new(0));
    let counter = Rc::clone(&released);
    let sub = Subscription::new(move || counter.set(counter.get() + 1));
    sub.unsubscribe();
    assert_eq!(released.get(), 1);
}

#[test]
fn clones_share_listeners() {
    let pref = MotionPreference::new(false);
    let other = pref.clone();
    let (seen, listener) = recorder();
    let _sub = other.subscribe(listener);
    pref.set(true);
    assert!(other.prefers_reduced_motion());
    assert_eq!(*seen.borrow(), vec![true]);
}

#[test]
fn listener_may_unsubscribe_itself_during_notification() {
    let pref = MotionPreference::new(false);
    let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let inner_slot = Rc::clone(&slot);
    let sub = pref.subscribe(Box::new(move |_| {
        inner_slot.borrow_mut().take();
    }));
    *slot.borrow_mut() = Some(sub);

    pref.set(true);
    assert_eq!(pref.listener_count(), 0);
}

#[test]
fn nested_set_wins_over_outer_delivery() {
    let pref = MotionPreference::new(false);
    let host = pref.clone();
    let _revert = pref.subscribe(Box::new(move |reduced| {
        if reduced {
            host.set(false);
        }
    }));
    let (seen, listener) = recorder();
    let _sub = pref.subscribe(listener);

    pref.set(true);
    assert!(!pref.prefers_reduced_motion());
    assert_eq!(*seen.borrow(), vec![false]);
    assert_eq!(seen.borrow().last().copied(), Some(pref.prefers_reduced_motion()));
}

#[test]
fn listeners_before_nested_set_see_both_values_in_order() {
    let pref = MotionPreference::new(false);
    let (early, listener) = recorder();
    let _early = pref.subscribe(listener);
    let host = pref.clone();
    let _revert = pref.subscribe(Box::new(move |reduced| {
        if reduced {
            host.set(false);
        }
    }));
    let (late, listener) = recorder();
    let _late = pref.subscribe(listener);

    pref.set(true);
    assert_eq!(*early.borrow(), vec![true, false]);
    assert_eq!(*late.borrow(), vec![false]);
}

#[test]
fn subscription_outliving_preference_is_harmless() {
    let pref = MotionPreference::new(false);
    let (_seen, listener) = recorder();
    let sub = pref.subscribe(listener);
    drop(pref);
    drop(sub);
}

#[test]
fn fixed_motion_never_changes() {
    let fixed = FixedMotion(true);
    assert!(fixed.prefers_reduced_motion());
    let (_seen, listener) = recorder();
    let sub = fixed.subscribe(listener);
    assert!(format!("{sub:?}").contains("false"));
}
