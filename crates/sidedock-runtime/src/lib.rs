#![forbid(unsafe_code)]

//! Runtime: the collapse controller and everything it needs around it.
//!
//! # Role in Sidedock
//! `sidedock-runtime` decides which panels are collapsed. [`PanelManager`]
//! follows a [`BreakpointObserver`](sidedock_core::BreakpointObserver),
//! remembers the user's choices through a [`PreferenceStore`], and publishes
//! a [`VisibilityMap`](sidedock_core::VisibilityMap) for the compositor in
//! `sidedock-layout`.
//!
//! # Modules
//! - [`controller`]: [`PanelManager`], its builder, and [`PanelHandle`].
//! - [`preference`]: stores, the persisted record, and storage backends.
//! - [`config`]: [`ManagerConfig`] loaded from TOML or JSON.
//! - [`logging`]: `tracing-subscriber` setup from [`LoggingConfig`].
//! - [`error`]: error types.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod preference;

pub use config::{LayoutSection, LoggingConfig, ManagerConfig, PanelEntry};
pub use controller::{PanelConfig, PanelHandle, PanelManager, PanelManagerBuilder};
pub use error::{ConfigError, LoggingError, PanelError, StorageError, StorageResult};
pub use preference::{
    BackedPreferences, DEFAULT_STORAGE_KEY, FileStorage, MemoryPreferences, MemoryStorage,
    PreferenceRecord, PreferenceStore, StorageBackend,
};
