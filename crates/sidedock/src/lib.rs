#![forbid(unsafe_code)]

//! Sidedock public facade crate.
//!
//! Re-exports the types a host needs from the internal crates, offers
//! [`Page`] to drive a manager and a compositor from one resize entry point,
//! and a small prelude for day-to-day use.
//!
//! ```
//! use sidedock::prelude::*;
//!
//! let page = Page::from_config(
//!     &ManagerConfig::default(),
//!     MemoryStorage::new(),
//!     Viewport::new(1280, 800),
//! )
//! .unwrap();
//! assert!(page.arrangement().panel_rect("left").is_some());
//!
//! let narrow = page.resize(Viewport::new(700, 800));
//! assert!(narrow.panel_rect("left").is_none());
//! ```

// --- Core re-exports -------------------------------------------------------

pub use sidedock_core::{
    Breakpoint, BreakpointObserver, Breakpoints, MediaRule, ObserverSubscription, PanelId, Rect,
    Side, Sides, Viewport, VisibilityMap,
};

// --- Layout re-exports -----------------------------------------------------

pub use sidedock_layout::{
    Arrangement, BarSpec, LayoutCompositor, LayoutSpec, PanelSizing, PanelSlot, Placement, Region,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use sidedock_runtime::{
    BackedPreferences, ConfigError, FileStorage, ManagerConfig, MemoryPreferences, MemoryStorage,
    PanelConfig, PanelError, PanelHandle, PanelManager, PanelManagerBuilder, PreferenceStore,
    StorageBackend, StorageError,
};

#[cfg(feature = "runtime")]
mod page;
#[cfg(feature = "runtime")]
pub use page::Page;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Arrangement, BreakpointObserver, LayoutCompositor, LayoutSpec, PanelId, Rect, Region,
        Side, Viewport, VisibilityMap,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        ConfigError, ManagerConfig, MemoryStorage, Page, PanelConfig, PanelError, PanelManager,
        runtime,
    };

    pub use crate::{core, layout};
}

pub use sidedock_core as core;
pub use sidedock_layout as layout;
#[cfg(feature = "runtime")]
pub use sidedock_runtime as runtime;
