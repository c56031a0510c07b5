#![forbid(unsafe_code)]

//! Core: geometry, breakpoint tiers, panel identity, and viewport observation.
//!
//! # Role in Sidedock
//! `sidedock-core` is the leaf layer. It owns the value types every other
//! crate speaks in ([`Rect`], [`Viewport`], [`PanelId`], [`VisibilityMap`])
//! and the [`BreakpointObserver`] that turns viewport changes into a single
//! "is the layout wide enough" boolean.
//!
//! # How it fits in the system
//! The runtime (`sidedock-runtime`) subscribes to a [`BreakpointObserver`]
//! and publishes a [`VisibilityMap`]; the layout crate (`sidedock-layout`)
//! reads that map and arranges regions inside a [`Rect`].

pub mod breakpoint;
pub mod geometry;
pub mod media;
pub mod observer;
pub mod panel;

pub use breakpoint::{Breakpoint, Breakpoints};
pub use geometry::{Rect, Sides, Viewport};
pub use media::MediaRule;
pub use observer::{BreakpointObserver, ObserverSubscription};
pub use panel::{PanelId, Side, VisibilityMap};
