//! The collapse controller.
//!
//! [`PanelManager`] owns every panel's collapsed flag and reconciles it
//! against three inputs: the wide/narrow value of a [`BreakpointObserver`],
//! user toggles, and controlled overrides from the host.
//!
//! # Transitions
//!
//! | Input | Effect |
//! |-------|--------|
//! | first breakpoint value (mount) | narrow: collapse all; wide: stored preference, else default |
//! | wide → narrow | snapshot every panel into the store, then collapse all |
//! | narrow → wide | restore each panel from the store, else default |
//! | repeated breakpoint value | nothing |
//! | toggle | flip; persisted only while wide |
//! | controlled value | shown as-is; persisted while wide |
//!
//! A controlled panel never changes on its own. Toggles and edges that would
//! move it are delivered to `on_change` and listeners as proposals instead.
//!
//! # Re-entrancy
//!
//! Inputs are queued. A toggle issued from inside a notification callback
//! runs after the input that triggered the callback has been fully applied.
//! No `RefCell` borrow is held while callbacks run.
//!
//! # Example
//!
//! ```
//! use sidedock_core::{BreakpointObserver, Viewport};
//! use sidedock_runtime::{PanelConfig, PanelManager};
//!
//! let observer = BreakpointObserver::min_width(900, Viewport::new(1280, 800));
//! let manager = PanelManager::builder()
//!     .panel(PanelConfig::new("left"))
//!     .panel(PanelConfig::new("right"))
//!     .observer(observer.clone())
//!     .build()
//!     .unwrap();
//!
//! manager.toggle("left").unwrap();
//! assert_eq!(manager.get_visibility("left"), Ok(true));
//!
//! observer.set_viewport(Viewport::new(600, 800));
//! assert!(manager.visibility().all_collapsed());
//!
//! observer.set_viewport(Viewport::new(1280, 800));
//! assert!(manager.is_visible("right"));
//! assert!(!manager.is_visible("left"));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use sidedock_core::{BreakpointObserver, ObserverSubscription, PanelId, Viewport, VisibilityMap};
use tracing::{debug, debug_span, trace};

use crate::error::PanelError;
use crate::preference::{BackedPreferences, MemoryPreferences, PreferenceStore, StorageBackend};

pub type Result<T> = std::result::Result<T, PanelError>;

type ChangeCallback = Rc<dyn Fn(bool)>;
type VisibilityListener = Rc<dyn Fn(&PanelId, bool)>;

// ── Configuration ────────────────────────────────────────────────────────

/// Registration of one panel with a [`PanelManager`].
#[derive(Clone)]
pub struct PanelConfig {
    pub id: PanelId,
    /// Used on wide viewports when no preference is stored.
    pub default_collapsed: bool,
    /// When set, the host owns the flag and the manager only proposes.
    pub controlled_collapsed: Option<bool>,
    /// Non-collapsible panels ignore toggles but still collapse when narrow.
    pub collapsible: bool,
    on_change: Option<ChangeCallback>,
}

impl PanelConfig {
    /// An expanded-by-default, collapsible, uncontrolled panel.
    #[must_use]
    pub fn new(id: impl Into<PanelId>) -> Self {
        Self {
            id: id.into(),
            default_collapsed: false,
            controlled_collapsed: None,
            collapsible: true,
            on_change: None,
        }
    }

    #[must_use]
    pub fn default_collapsed(mut self, collapsed: bool) -> Self {
        self.default_collapsed = collapsed;
        self
    }

    #[must_use]
    pub fn controlled(mut self, collapsed: Option<bool>) -> Self {
        self.controlled_collapsed = collapsed;
        self
    }

    #[must_use]
    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    /// Invoked with the panel's new (or, when controlled, proposed) flag.
    #[must_use]
    pub fn on_change(mut self, callback: impl Fn(bool) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelConfig")
            .field("id", &self.id)
            .field("default_collapsed", &self.default_collapsed)
            .field("controlled_collapsed", &self.controlled_collapsed)
            .field("collapsible", &self.collapsible)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

// ── Reconciliation ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Breakpoint(bool),
    Toggle(usize),
    ToggleAll,
    Control(usize, Option<bool>),
    ClearPreferences,
}

/// One notification owed to a panel's callback and the listeners.
#[derive(Debug, Clone, Copy)]
struct Change {
    panel: usize,
    collapsed: bool,
}

struct PanelState {
    config: PanelConfig,
    collapsed: bool,
}

struct Controller {
    panels: Vec<PanelState>,
    index: FxHashMap<PanelId, usize>,
    /// Last reconciled breakpoint value; `None` until mounted.
    memo: Option<bool>,
    store: Box<dyn PreferenceStore>,
    /// Preferences remembered this session; outlives store write failures.
    remembered: FxHashMap<PanelId, bool>,
}

impl Controller {
    fn new(configs: Vec<PanelConfig>, store: Box<dyn PreferenceStore>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, config) in configs.iter().enumerate() {
            if index.insert(config.id.clone(), i).is_some() {
                return Err(PanelError::DuplicatePanel {
                    id: config.id.clone(),
                });
            }
        }
        let panels = configs
            .into_iter()
            .map(|config| PanelState {
                collapsed: config
                    .controlled_collapsed
                    .unwrap_or(config.default_collapsed),
                config,
            })
            .collect();
        Ok(Self {
            panels,
            index,
            memo: None,
            store,
            remembered: FxHashMap::default(),
        })
    }

    fn is_wide(&self) -> bool {
        self.memo == Some(true)
    }

    fn visibility(&self) -> VisibilityMap {
        self.panels
            .iter()
            .map(|p| (p.config.id.clone(), p.collapsed))
            .collect()
    }

    fn apply(&mut self, input: Input) -> Vec<Change> {
        let _span = debug_span!("sidedock.reconcile", ?input).entered();
        let mut changes = Vec::new();
        match input {
            Input::Breakpoint(wide) => self.breakpoint(wide, &mut changes),
            Input::Toggle(i) => self.toggle(i, &mut changes),
            Input::ToggleAll => self.toggle_all(&mut changes),
            Input::Control(i, value) => self.control(i, value, &mut changes),
            Input::ClearPreferences => {
                self.remembered.clear();
                if let Err(err) = self.store.clear() {
                    debug!(error = %err, "preference clear failed");
                }
            }
        }
        changes
    }

    fn breakpoint(&mut self, wide: bool, changes: &mut Vec<Change>) {
        match self.memo.replace(wide) {
            None => self.mount(wide, changes),
            Some(previous) if previous == wide => trace!(wide, "breakpoint unchanged"),
            Some(_) if wide => self.widen(changes),
            Some(_) => self.narrow(changes),
        }
    }

    /// Initial sync. Every panel is notified once; nothing is persisted.
    fn mount(&mut self, wide: bool, changes: &mut Vec<Change>) {
        for i in 0..self.panels.len() {
            let desired = if wide { self.restored(i) } else { true };
            let panel = &mut self.panels[i];
            if panel.config.controlled_collapsed.is_none() {
                panel.collapsed = desired;
            }
            changes.push(Change {
                panel: i,
                collapsed: desired,
            });
        }
        debug!(wide, panels = self.panels.len(), "panels mounted");
    }

    fn narrow(&mut self, changes: &mut Vec<Change>) {
        for i in 0..self.panels.len() {
            self.remember(i, self.panels[i].collapsed);
            self.drive(i, true, changes);
        }
        debug!(changed = changes.len(), "layout narrowed; panels collapsed");
    }

    fn widen(&mut self, changes: &mut Vec<Change>) {
        for i in 0..self.panels.len() {
            let desired = self.restored(i);
            self.drive(i, desired, changes);
        }
        debug!(changed = changes.len(), "layout widened; preferences restored");
    }

    fn toggle(&mut self, i: usize, changes: &mut Vec<Change>) {
        let panel = &self.panels[i];
        if !panel.config.collapsible {
            trace!(panel = %panel.config.id, "toggle ignored; panel is not collapsible");
            return;
        }
        let desired = !panel.collapsed;
        trace!(panel = %panel.config.id, collapsed = desired, "toggle");
        self.choose(i, desired, changes);
    }

    fn toggle_all(&mut self, changes: &mut Vec<Change>) {
        let targets: Vec<usize> = (0..self.panels.len())
            .filter(|&i| self.panels[i].config.collapsible)
            .collect();
        if targets.is_empty() {
            return;
        }
        let desired = !targets.iter().all(|&i| self.panels[i].collapsed);
        trace!(collapsed = desired, panels = targets.len(), "toggle all");
        for i in targets {
            self.choose(i, desired, changes);
        }
    }

    fn control(&mut self, i: usize, value: Option<bool>, changes: &mut Vec<Change>) {
        let panel = &mut self.panels[i];
        let Some(collapsed) = value else {
            if panel.config.controlled_collapsed.take().is_some() {
                trace!(panel = %panel.config.id, "control released");
            }
            return;
        };
        if panel.config.controlled_collapsed.replace(collapsed) == Some(collapsed) {
            return;
        }
        if panel.collapsed != collapsed {
            panel.collapsed = collapsed;
            changes.push(Change { panel: i, collapsed });
        }
        if self.is_wide() {
            self.remember(i, collapsed);
        }
    }

    /// A user choice: move the panel, and remember it while wide.
    fn choose(&mut self, i: usize, desired: bool, changes: &mut Vec<Change>) {
        self.drive(i, desired, changes);
        if self.is_wide() && self.panels[i].config.controlled_collapsed.is_none() {
            self.remember(i, desired);
        }
    }

    /// Move panel `i` toward `desired`, or propose it when controlled.
    fn drive(&mut self, i: usize, desired: bool, changes: &mut Vec<Change>) {
        let panel = &mut self.panels[i];
        match panel.config.controlled_collapsed {
            Some(current) if current != desired => {
                trace!(panel = %panel.config.id, collapsed = desired, "proposing to controlled panel");
                changes.push(Change {
                    panel: i,
                    collapsed: desired,
                });
            }
            Some(_) => {}
            None if panel.collapsed != desired => {
                panel.collapsed = desired;
                changes.push(Change {
                    panel: i,
                    collapsed: desired,
                });
            }
            None => {}
        }
    }

    /// Preference remembered this session, else stored, else the default.
    fn restored(&self, i: usize) -> bool {
        let config = &self.panels[i].config;
        if let Some(&collapsed) = self.remembered.get(&config.id) {
            return collapsed;
        }
        match self.store.get(&config.id) {
            Ok(stored) => stored.unwrap_or(config.default_collapsed),
            Err(err) => {
                debug!(panel = %config.id, error = %err, "preference read failed; using default");
                config.default_collapsed
            }
        }
    }

    fn remember(&mut self, i: usize, collapsed: bool) {
        let id = &self.panels[i].config.id;
        self.remembered.insert(id.clone(), collapsed);
        if let Err(err) = self.store.set(id, collapsed) {
            debug!(panel = %id, error = %err, "preference write failed; continuing in memory");
        }
    }
}

struct Shared {
    controller: RefCell<Controller>,
    pending: RefCell<VecDeque<Input>>,
    draining: Cell<bool>,
    listeners: RefCell<Vec<VisibilityListener>>,
}

struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Shared {
    fn lookup(&self, id: &str) -> Result<usize> {
        self.controller
            .borrow()
            .index
            .get(id)
            .copied()
            .ok_or_else(|| PanelError::UnknownPanel {
                id: PanelId::new(id),
            })
    }

    fn submit(&self, input: Input) {
        self.pending.borrow_mut().push_back(input);
        if self.draining.replace(true) {
            trace!(?input, "input queued behind in-flight reconciliation");
            return;
        }
        let _guard = DrainGuard(&self.draining);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(input) = next else {
                break;
            };
            let changes = self.controller.borrow_mut().apply(input);
            self.deliver(&changes);
        }
    }

    fn deliver(&self, changes: &[Change]) {
        for change in changes {
            let (id, callback) = {
                let controller = self.controller.borrow();
                let config = &controller.panels[change.panel].config;
                (config.id.clone(), config.on_change.clone())
            };
            if let Some(callback) = callback {
                callback(change.collapsed);
            }
            let listeners: Vec<VisibilityListener> = self.listeners.borrow().clone();
            for listener in &listeners {
                listener(&id, change.collapsed);
            }
        }
    }

    fn toggle(&self, id: &str) -> Result<()> {
        let i = self.lookup(id)?;
        self.submit(Input::Toggle(i));
        Ok(())
    }

    fn set_controlled(&self, id: &str, value: Option<bool>) -> Result<()> {
        let i = self.lookup(id)?;
        self.submit(Input::Control(i, value));
        Ok(())
    }

    fn get_visibility(&self, id: &str) -> Result<bool> {
        let i = self.lookup(id)?;
        Ok(self.controller.borrow().panels[i].collapsed)
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Builder for [`PanelManager`].
#[derive(Default)]
pub struct PanelManagerBuilder {
    panels: Vec<PanelConfig>,
    observer: Option<BreakpointObserver>,
    store: Option<Box<dyn PreferenceStore>>,
    listeners: Vec<VisibilityListener>,
}

impl PanelManagerBuilder {
    #[must_use]
    pub fn panel(mut self, config: PanelConfig) -> Self {
        self.panels.push(config);
        self
    }

    #[must_use]
    pub fn panels(mut self, configs: impl IntoIterator<Item = PanelConfig>) -> Self {
        self.panels.extend(configs);
        self
    }

    /// The wide/narrow source. Without one the layout is always wide.
    #[must_use]
    pub fn observer(mut self, observer: BreakpointObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Persist preferences through `backend` under `key`.
    #[must_use]
    pub fn storage<B: StorageBackend + 'static>(self, backend: B, key: impl Into<String>) -> Self {
        self.preference_store(BackedPreferences::new(backend, key))
    }

    /// Use any store. Defaults to [`MemoryPreferences`].
    #[must_use]
    pub fn preference_store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    #[must_use]
    pub fn on_visibility_change(mut self, listener: impl Fn(&PanelId, bool) + 'static) -> Self {
        self.listeners.push(Rc::new(listener));
        self
    }

    /// Register the panels and mount against the observer's current value.
    pub fn build(self) -> Result<PanelManager> {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryPreferences::new()));
        let controller = Controller::new(self.panels, store)?;
        let observer = self
            .observer
            .unwrap_or_else(|| BreakpointObserver::new(|_| true, Viewport::default()));

        let shared = Rc::new(Shared {
            controller: RefCell::new(controller),
            pending: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
            listeners: RefCell::new(self.listeners),
        });
        let weak = Rc::downgrade(&shared);
        let subscription = observer.subscribe(move |wide| {
            if let Some(shared) = weak.upgrade() {
                shared.submit(Input::Breakpoint(wide));
            }
        });

        Ok(PanelManager {
            shared,
            observer,
            subscription: RefCell::new(Some(subscription)),
        })
    }
}

// ── Manager ──────────────────────────────────────────────────────────────

/// Owns panel visibility for one page.
///
/// Dropping the manager unsubscribes it from its observer.
pub struct PanelManager {
    shared: Rc<Shared>,
    observer: BreakpointObserver,
    subscription: RefCell<Option<ObserverSubscription>>,
}

impl PanelManager {
    #[must_use]
    pub fn builder() -> PanelManagerBuilder {
        PanelManagerBuilder::default()
    }

    /// Flip a panel. Persisted when wide; ignored for non-collapsible panels.
    pub fn toggle(&self, id: &str) -> Result<()> {
        self.shared.toggle(id)
    }

    /// Expand every collapsible panel if all are collapsed, else collapse them.
    pub fn toggle_all(&self) {
        self.shared.submit(Input::ToggleAll);
    }

    /// Take control of a panel's flag.
    pub fn set_collapsed(&self, id: &str, collapsed: bool) -> Result<()> {
        self.shared.set_controlled(id, Some(collapsed))
    }

    /// Set or, with `None`, release the controlled flag of a panel.
    pub fn set_controlled(&self, id: &str, collapsed: Option<bool>) -> Result<()> {
        self.shared.set_controlled(id, collapsed)
    }

    /// Forget every stored preference.
    pub fn reset_preferences(&self) {
        self.shared.submit(Input::ClearPreferences);
    }

    /// `true` when the panel is collapsed.
    pub fn get_visibility(&self, id: &str) -> Result<bool> {
        self.shared.get_visibility(id)
    }

    /// Whether the panel is known and expanded.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.get_visibility(id) == Ok(false)
    }

    #[must_use]
    pub fn visibility(&self) -> VisibilityMap {
        self.shared.controller.borrow().visibility()
    }

    #[must_use]
    pub fn is_wide(&self) -> bool {
        self.shared.controller.borrow().is_wide()
    }

    #[must_use]
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.shared
            .controller
            .borrow()
            .panels
            .iter()
            .map(|p| p.config.id.clone())
            .collect()
    }

    #[must_use]
    pub fn observer(&self) -> &BreakpointObserver {
        &self.observer
    }

    /// Forward a resize to the observer. Returns whether wide/narrow flipped.
    pub fn set_viewport(&self, viewport: Viewport) -> bool {
        self.observer.set_viewport(viewport)
    }

    /// Add a host listener, called for every change and proposal.
    pub fn on_visibility_change(&self, listener: impl Fn(&PanelId, bool) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// A weak handle for use inside callbacks.
    #[must_use]
    pub fn handle(&self) -> PanelHandle {
        PanelHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Stop following the observer. Idempotent.
    pub fn dispose(&self) {
        if let Some(mut subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
            debug!("panel manager disposed");
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.subscription.borrow().is_none()
    }
}

impl Drop for PanelManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for PanelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelManager")
            .field("visibility", &self.visibility())
            .field("is_wide", &self.is_wide())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Non-owning handle to a [`PanelManager`].
///
/// Holding a handle inside `on_change` or a listener does not keep the
/// manager alive; once it is dropped every call returns
/// [`PanelError::Disposed`].
#[derive(Clone)]
pub struct PanelHandle {
    shared: Weak<Shared>,
}

impl PanelHandle {
    fn shared(&self) -> Result<Rc<Shared>> {
        self.shared.upgrade().ok_or(PanelError::Disposed)
    }

    pub fn toggle(&self, id: &str) -> Result<()> {
        self.shared()?.toggle(id)
    }

    pub fn toggle_all(&self) -> Result<()> {
        self.shared()?.submit(Input::ToggleAll);
        Ok(())
    }

    pub fn set_collapsed(&self, id: &str, collapsed: bool) -> Result<()> {
        self.shared()?.set_controlled(id, Some(collapsed))
    }

    pub fn set_controlled(&self, id: &str, collapsed: Option<bool>) -> Result<()> {
        self.shared()?.set_controlled(id, collapsed)
    }

    pub fn get_visibility(&self, id: &str) -> Result<bool> {
        self.shared()?.get_visibility(id)
    }

    pub fn visibility(&self) -> Result<VisibilityMap> {
        Ok(self.shared()?.controller.borrow().visibility())
    }
}

impl fmt::Debug for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHandle")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}
