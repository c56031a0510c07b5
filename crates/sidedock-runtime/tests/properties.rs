//! Behavioural properties of the collapse controller.
//!
//! 1. Reconciliation is idempotent: a repeated breakpoint value changes
//!    nothing and writes nothing.
//! 2. A preference chosen while wide survives a narrow → wide round trip.
//! 3. Mounting on a narrow viewport collapses without snapshotting.
//! 4. Controlled panels keep the controlled value; toggles are proposed.
//! 5. A failing store never breaks toggles or transitions, and wide
//!    choices survive the session in memory.
//! 6. Random input sequences keep the invariants above.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use sidedock_core::{BreakpointObserver, PanelId, Viewport};
use sidedock_runtime::{
    MemoryPreferences, PanelConfig, PanelManager, PreferenceStore, StorageError, StorageResult,
};

const WIDE: Viewport = Viewport::new(1280, 800);
const NARROW: Viewport = Viewport::new(600, 800);

fn observer(viewport: Viewport) -> BreakpointObserver {
    BreakpointObserver::min_width(900, viewport)
}

/// Store that records write counts and can be switched into failure.
#[derive(Clone, Default)]
struct ProbeStore {
    inner: MemoryPreferences,
    writes: Rc<Cell<usize>>,
    failing: Rc<Cell<bool>>,
}

impl PreferenceStore for ProbeStore {
    fn get(&self, panel: &PanelId) -> StorageResult<Option<bool>> {
        if self.failing.get() {
            return Err(StorageError::unavailable("probe"));
        }
        self.inner.get(panel)
    }

    fn set(&mut self, panel: &PanelId, collapsed: bool) -> StorageResult<()> {
        if self.failing.get() {
            return Err(StorageError::unavailable("probe"));
        }
        self.writes.set(self.writes.get() + 1);
        self.inner.set(panel, collapsed)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.inner.clear()
    }
}

fn two_panel_manager(
    viewport: Viewport,
    store: &ProbeStore,
) -> (PanelManager, BreakpointObserver, Rc<Cell<usize>>) {
    let obs = observer(viewport);
    let events = Rc::new(Cell::new(0));
    let counter = Rc::clone(&events);
    let manager = PanelManager::builder()
        .panel(PanelConfig::new("left"))
        .panel(PanelConfig::new("right"))
        .observer(obs.clone())
        .preference_store(store.clone())
        .on_visibility_change(move |_, _| counter.set(counter.get() + 1))
        .build()
        .unwrap();
    (manager, obs, events)
}

#[test]
fn repeated_transition_is_idempotent() {
    let store = ProbeStore::default();
    let (manager, obs, events) = two_panel_manager(WIDE, &store);

    obs.set_viewport(NARROW);
    let state = manager.visibility();
    let writes = store.writes.get();
    let count = events.get();

    // Still narrow: no edge.
    assert!(!obs.set_viewport(Viewport::new(500, 800)));
    assert_eq!(manager.visibility(), state);
    assert_eq!(store.writes.get(), writes);
    assert_eq!(events.get(), count);

    obs.set_viewport(WIDE);
    let state = manager.visibility();
    assert!(!obs.set_viewport(Viewport::new(1600, 900)));
    assert_eq!(manager.visibility(), state);
}

#[test]
fn preference_survives_round_trip() {
    let store = ProbeStore::default();
    let (manager, obs, _) = two_panel_manager(WIDE, &store);

    manager.toggle("left").unwrap();
    obs.set_viewport(NARROW);
    assert_eq!(manager.get_visibility("left"), Ok(true));
    obs.set_viewport(WIDE);
    assert_eq!(manager.get_visibility("left"), Ok(true));
    assert_eq!(manager.get_visibility("right"), Ok(false));
}

#[test]
fn narrow_mount_is_not_an_edge() {
    let store = ProbeStore::default();
    let (manager, obs, events) = two_panel_manager(NARROW, &store);

    assert!(manager.visibility().all_collapsed());
    assert_eq!(store.writes.get(), 0);
    assert_eq!(events.get(), 2);

    // Nothing was snapshotted, so widening falls back to defaults.
    obs.set_viewport(WIDE);
    assert!(manager.is_visible("left") && manager.is_visible("right"));
}

#[test]
fn controlled_value_wins_and_toggle_is_proposed() {
    let proposed: Rc<RefCell<Vec<bool>>> = Rc::default();
    let sink = Rc::clone(&proposed);
    let obs = observer(WIDE);
    let manager = PanelManager::builder()
        .panel(
            PanelConfig::new("left")
                .controlled(Some(true))
                .on_change(move |c| sink.borrow_mut().push(c)),
        )
        .panel(PanelConfig::new("right"))
        .observer(obs.clone())
        .build()
        .unwrap();
    proposed.borrow_mut().clear();

    manager.toggle("left").unwrap();
    manager.toggle("left").unwrap();
    assert_eq!(manager.get_visibility("left"), Ok(true));
    assert_eq!(*proposed.borrow(), vec![false, false]);

    // Narrowing wants collapsed, which it already is: no proposal.
    obs.set_viewport(NARROW);
    assert_eq!(proposed.borrow().len(), 2);

    // The host accepts a proposal by updating the controlled value.
    manager.set_collapsed("left", false).unwrap();
    assert_eq!(manager.get_visibility("left"), Ok(false));
}

#[test]
fn failing_store_is_isolated() {
    let store = ProbeStore::default();
    store.failing.set(true);
    let (manager, obs, _) = two_panel_manager(WIDE, &store);

    manager.toggle("left").unwrap();
    assert_eq!(manager.get_visibility("left"), Ok(true));
    obs.set_viewport(NARROW);
    assert!(manager.visibility().all_collapsed());
    manager.toggle("right").unwrap();
    assert_eq!(manager.get_visibility("right"), Ok(false));
    // The wide choice is kept in memory; the narrow toggle was transient.
    obs.set_viewport(WIDE);
    assert_eq!(manager.get_visibility("left"), Ok(true));
    assert!(manager.is_visible("right"));

    // Recovery mid-session: writes work again.
    store.failing.set(false);
    manager.toggle("right").unwrap();
    assert_eq!(store.inner.get(&PanelId::right()).unwrap(), Some(true));
}

// ── Random sequences ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Wide(bool),
    Toggle(usize),
    ToggleAll,
    Control(usize, Option<bool>),
    Fail(bool),
}

const IDS: [&str; 3] = ["left", "right", "inspector"];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<bool>().prop_map(Op::Wide),
        3 => (0..IDS.len()).prop_map(Op::Toggle),
        1 => Just(Op::ToggleAll),
        1 => (0..IDS.len(), proptest::option::of(any::<bool>()))
            .prop_map(|(i, v)| Op::Control(i, v)),
        1 => any::<bool>().prop_map(Op::Fail),
    ]
}

proptest! {
    #[test]
    fn random_sequences_keep_invariants(
        defaults in proptest::array::uniform3(any::<bool>()),
        start_wide in any::<bool>(),
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let store = ProbeStore::default();
        let obs = observer(if start_wide { WIDE } else { NARROW });
        let manager = PanelManager::builder()
            .panels(IDS.iter().zip(defaults).map(|(id, d)| PanelConfig::new(*id).default_collapsed(d)))
            .observer(obs.clone())
            .preference_store(store.clone())
            .build()
            .unwrap();
        let mut controlled: [Option<bool>; 3] = [None; 3];
        let mut remembered: [Option<bool>; 3] = [None; 3];
        let mut wide = start_wide;

        for op in ops {
            let before = manager.visibility();
            let writes = store.writes.get();
            match op {
                Op::Wide(next) => {
                    obs.set_viewport(if next { WIDE } else { NARROW });
                    if next == wide {
                        prop_assert_eq!(manager.visibility(), before);
                        prop_assert_eq!(store.writes.get(), writes);
                    } else if !next {
                        for (i, id) in IDS.iter().enumerate() {
                            remembered[i] = before.is_collapsed(id);
                            if controlled[i].is_none() {
                                prop_assert_eq!(manager.get_visibility(id), Ok(true));
                            }
                        }
                    } else {
                        for (i, id) in IDS.iter().enumerate() {
                            if controlled[i].is_none() {
                                let stored = if store.failing.get() {
                                    None
                                } else {
                                    store.inner.get(&PanelId::new(*id)).unwrap()
                                };
                                let expected =
                                    remembered[i].or(stored).unwrap_or(defaults[i]);
                                prop_assert_eq!(manager.get_visibility(id), Ok(expected));
                            }
                        }
                    }
                    wide = next;
                }
                Op::Toggle(i) => {
                    manager.toggle(IDS[i]).unwrap();
                    if controlled[i].is_none() {
                        prop_assert_eq!(
                            manager.get_visibility(IDS[i]),
                            Ok(!before.is_collapsed(IDS[i]).unwrap())
                        );
                    }
                    if !wide {
                        prop_assert_eq!(store.writes.get(), writes);
                    } else if controlled[i].is_none() {
                        remembered[i] = manager.get_visibility(IDS[i]).ok();
                    }
                }
                Op::ToggleAll => {
                    manager.toggle_all();
                    if wide {
                        for (i, id) in IDS.iter().enumerate() {
                            if controlled[i].is_none() {
                                remembered[i] = manager.get_visibility(id).ok();
                            }
                        }
                    }
                }
                Op::Control(i, value) => {
                    manager.set_controlled(IDS[i], value).unwrap();
                    if wide && value.is_some() && value != controlled[i] {
                        remembered[i] = value;
                    }
                    controlled[i] = value;
                }
                Op::Fail(on) => store.failing.set(on),
            }

            prop_assert_eq!(manager.is_wide(), wide);
            for (i, id) in IDS.iter().enumerate() {
                if let Some(value) = controlled[i] {
                    prop_assert_eq!(manager.get_visibility(id), Ok(value));
                }
            }
        }
    }
}
