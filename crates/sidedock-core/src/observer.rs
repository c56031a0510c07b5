#![forbid(unsafe_code)]

//! Viewport breakpoint observer with push-based change notification.
//!
//! # Design
//!
//! [`BreakpointObserver`] evaluates a boolean media predicate ("is the
//! layout wide enough") over the last reported [`Viewport`]. The host feeds
//! it from its native resize notification via
//! [`set_viewport`](BreakpointObserver::set_viewport); there is no polling.
//! Subscribers hear about the boolean only when it flips.
//!
//! State lives in shared `Rc<RefCell<..>>` storage: cloning the observer
//! yields another handle to the same predicate, value and subscriber list.
//!
//! # Invariants
//!
//! 1. [`subscribe`](BreakpointObserver::subscribe) delivers the current
//!    value to the new callback before returning.
//! 2. A viewport change that leaves the predicate result unchanged notifies
//!    nobody and does not bump the version.
//! 3. Subscribers are notified in registration order.
//! 4. After [`ObserverSubscription::unsubscribe`] (or drop) returns, the
//!    callback is never invoked again, even if a notification pass that
//!    already collected it is still running.
//! 5. If a callback changes the viewport re-entrantly, the outer pass stops
//!    and the nested pass delivers the newer value to everyone, so no
//!    subscriber sees a stale value after a fresh one.
//!
//! # Failure Modes
//!
//! None. Predicates are total; callbacks run with no borrow held, so they
//! may read the observer or change its viewport.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;
use web_time::Instant;

use super::{Breakpoints, MediaRule, Viewport};

type Predicate = Rc<dyn Fn(Viewport) -> bool>;

/// A registered callback plus its liveness flag.
struct Subscriber {
    active: Cell<bool>,
    callback: Box<dyn Fn(bool)>,
}

struct ObserverInner {
    predicate: Predicate,
    viewport: Viewport,
    matches: bool,
    version: u64,
    /// Weak handles; the strong side lives in each [`ObserverSubscription`].
    subscribers: Vec<Weak<Subscriber>>,
}

/// Watches a boolean predicate over the viewport and notifies on change.
#[derive(Clone)]
pub struct BreakpointObserver {
    inner: Rc<RefCell<ObserverInner>>,
}

impl fmt::Debug for BreakpointObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("BreakpointObserver")
            .field("viewport", &inner.viewport)
            .field("matches", &inner.matches)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl BreakpointObserver {
    /// Observe an arbitrary predicate, starting from `viewport`.
    #[must_use]
    pub fn new(predicate: impl Fn(Viewport) -> bool + 'static, viewport: Viewport) -> Self {
        let predicate: Predicate = Rc::new(predicate);
        let matches = predicate(viewport);
        Self {
            inner: Rc::new(RefCell::new(ObserverInner {
                predicate,
                viewport,
                matches,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Wide when `viewport.width >= threshold`, the `(min-width: Npx)` query.
    #[must_use]
    pub fn min_width(threshold: u16, viewport: Viewport) -> Self {
        Self::new(move |vp| vp.width >= threshold, viewport)
    }

    /// Wide when the width's tier satisfies `rule`.
    #[must_use]
    pub fn from_rule(breakpoints: Breakpoints, rule: MediaRule, viewport: Viewport) -> Self {
        let breakpoints = breakpoints.normalized();
        Self::new(
            move |vp| rule.holds(breakpoints.classify_width(vp.width)),
            viewport,
        )
    }

    /// Current predicate result.
    #[must_use]
    pub fn matches(&self) -> bool {
        self.inner.borrow().matches
    }

    /// Last reported viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.inner.borrow().viewport
    }

    /// Number of predicate flips observed so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Live subscriber count (dropped guards are excluded even before pruning).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|s| s.active.get())
            .count()
    }

    /// Report a new viewport. Returns `true` if the predicate flipped.
    pub fn set_viewport(&self, viewport: Viewport) -> bool {
        let predicate = Rc::clone(&self.inner.borrow().predicate);
        let matches = predicate(viewport);
        {
            let mut inner = self.inner.borrow_mut();
            inner.viewport = viewport;
            if inner.matches == matches {
                return false;
            }
            inner.matches = matches;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Subscribe to predicate changes.
    ///
    /// The callback is invoked with the current value before this returns,
    /// then once per flip until the returned guard is unsubscribed or dropped.
    pub fn subscribe(&self, callback: impl Fn(bool) + 'static) -> ObserverSubscription {
        let entry = Rc::new(Subscriber {
            active: Cell::new(true),
            callback: Box::new(callback),
        });
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.push(Rc::downgrade(&entry));
            inner.matches
        };
        (entry.callback)(current);
        ObserverSubscription { entry: Some(entry) }
    }

    fn notify(&self) {
        let (subscribers, value, version) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let live: Vec<Rc<Subscriber>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (live, inner.matches, inner.version)
        };
        if subscribers.is_empty() {
            return;
        }

        let started = Instant::now();
        let mut delivered = 0_u64;
        for sub in &subscribers {
            if self.inner.borrow().version != version {
                // A callback changed the viewport; the nested pass owns delivery.
                break;
            }
            if sub.active.get() {
                (sub.callback)(value);
                delivered += 1;
            }
        }
        trace!(
            matches = value,
            delivered,
            duration_us = started.elapsed().as_micros() as u64,
            "breakpoint change delivered"
        );
    }
}

/// Guard for a [`BreakpointObserver`] callback.
///
/// Dropping the guard unsubscribes. [`unsubscribe`](Self::unsubscribe) may
/// be called any number of times, including from within the callback's own
/// notification pass.
pub struct ObserverSubscription {
    entry: Option<Rc<Subscriber>>,
}

impl ObserverSubscription {
    /// Stop receiving notifications. Idempotent.
    pub fn unsubscribe(&mut self) {
        if let Some(entry) = self.entry.take() {
            entry.active.set(false);
        }
    }

    /// Whether this guard is still subscribed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entry.is_some()
    }
}

impl Drop for ObserverSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for ObserverSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
