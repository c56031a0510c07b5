//! Declarative manager configuration.
//!
//! [`ManagerConfig`] gathers the storage key, breakpoint thresholds, page
//! regions, panels, and logging settings in one serde-friendly struct. Every
//! field has a default, so a file only needs to name what it changes.
//!
//! # Example (TOML)
//!
//! ```toml
//! storage_key = "editor-layout"
//! wide_from = "lg"
//!
//! [breakpoints]
//! lg = 1024
//!
//! [layout]
//! top_bar_height = 40
//! main_min_width = 480
//!
//! [[panels]]
//! id = "files"
//! side = "left"
//! width = 260
//!
//! [[panels]]
//! id = "outline"
//! side = "right"
//! default_collapsed = true
//! shrink = true
//! min_width = 180
//!
//! [logging]
//! filter = "sidedock=debug"
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sidedock_core::{
    Breakpoint, BreakpointObserver, Breakpoints, MediaRule, PanelId, Side, Sides, Viewport,
};
use sidedock_layout::{BarSpec, LayoutSpec, PanelSizing, PanelSlot};
use tracing_subscriber::EnvFilter;

use crate::controller::{PanelConfig, PanelManager, PanelManagerBuilder};
use crate::error::ConfigError;
use crate::preference::{DEFAULT_STORAGE_KEY, StorageBackend};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Key the preference record is stored under.
    pub storage_key: String,
    pub breakpoints: Breakpoints,
    /// Smallest tier that counts as wide.
    pub wide_from: Breakpoint,
    /// Pixel threshold for wide; takes precedence over `wide_from`.
    pub wide_min_width: Option<u16>,
    /// Smallest tier at which the bottom bar renders.
    pub bottom_bar_from: Breakpoint,
    pub layout: LayoutSection,
    pub panels: Vec<PanelEntry>,
    pub logging: LoggingConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            breakpoints: Breakpoints::DEFAULT,
            wide_from: Breakpoint::Lg,
            wide_min_width: None,
            bottom_bar_from: Breakpoint::Md,
            layout: LayoutSection::default(),
            panels: vec![
                PanelEntry::new(PanelId::left(), Side::Left, PanelSizing::fixed(240)),
                PanelEntry::new(
                    PanelId::right(),
                    Side::Right,
                    PanelSizing::new(280, 200, 320).shrinkable(true),
                ),
            ],
            logging: LoggingConfig::default(),
        }
    }
}

/// Page regions around the panel row. A height of 0 omits the bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub top_bar_height: u16,
    pub bottom_bar_height: u16,
    pub main_min_width: u16,
    pub gap: u16,
    pub margin: Sides,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            top_bar_height: 40,
            bottom_bar_height: 24,
            main_min_width: 400,
            gap: 0,
            margin: Sides::default(),
        }
    }
}

/// One configured panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub id: PanelId,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub default_collapsed: bool,
    #[serde(default = "default_true")]
    pub collapsible: bool,
    #[serde(default = "default_true")]
    pub has_content: bool,
    #[serde(flatten)]
    pub sizing: PanelSizing,
}

fn default_true() -> bool {
    true
}

impl PanelEntry {
    #[must_use]
    pub fn new(id: PanelId, side: Side, sizing: PanelSizing) -> Self {
        Self {
            id,
            side,
            default_collapsed: false,
            collapsible: true,
            has_content: true,
            sizing,
        }
    }

    #[must_use]
    pub fn to_panel_config(&self) -> PanelConfig {
        PanelConfig::new(self.id.clone())
            .default_collapsed(self.default_collapsed)
            .collapsible(self.collapsible)
    }

    #[must_use]
    pub fn to_slot(&self) -> PanelSlot {
        PanelSlot::new(self.id.clone(), self.side, self.sizing).with_content(self.has_content)
    }
}

/// Tracing output settings, consumed by [`crate::logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"sidedock=trace"`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

impl ManagerConfig {
    /// Parse from a TOML string.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Every problem found, as human-readable messages. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.storage_key.trim().is_empty() {
            errors.push("storage_key must not be empty".into());
        }

        let bp = self.breakpoints;
        if !(bp.sm <= bp.md && bp.md <= bp.lg && bp.lg <= bp.xl) {
            errors.push(format!(
                "breakpoints must be ascending, got sm={} md={} lg={} xl={}",
                bp.sm, bp.md, bp.lg, bp.xl
            ));
        }

        if self.wide_from == Breakpoint::Xs && self.wide_min_width.is_none() {
            errors.push("wide_from = \"xs\" makes every width wide".into());
        }

        let mut seen = BTreeSet::new();
        for (i, panel) in self.panels.iter().enumerate() {
            if panel.id.as_str().is_empty() {
                errors.push(format!("panels[{i}].id must not be empty"));
            } else if !seen.insert(panel.id.as_str()) {
                errors.push(format!("panels[{i}].id {:?} is a duplicate", panel.id.as_str()));
            }
            if panel.sizing.min_width > panel.sizing.max_width {
                errors.push(format!(
                    "panels[{i}].min_width ({}) exceeds max_width ({})",
                    panel.sizing.min_width, panel.sizing.max_width
                ));
            }
        }

        if let Err(err) = EnvFilter::try_new(&self.logging.filter) {
            errors.push(format!("logging.filter is invalid: {err}"));
        }

        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// The rule a breakpoint tier must satisfy to count as wide.
    #[must_use]
    pub fn wide_rule(&self) -> MediaRule {
        MediaRule::at_least(self.wide_from)
    }

    /// An observer for the configured wide predicate.
    #[must_use]
    pub fn observer(&self, viewport: Viewport) -> BreakpointObserver {
        match self.wide_min_width {
            Some(threshold) => BreakpointObserver::min_width(threshold, viewport),
            None => BreakpointObserver::from_rule(self.breakpoints, self.wide_rule(), viewport),
        }
    }

    #[must_use]
    pub fn panel_configs(&self) -> Vec<PanelConfig> {
        self.panels.iter().map(PanelEntry::to_panel_config).collect()
    }

    #[must_use]
    pub fn layout_spec(&self) -> LayoutSpec {
        let layout = &self.layout;
        let mut spec = LayoutSpec::new()
            .main_min_width(layout.main_min_width)
            .gap(layout.gap)
            .margin(layout.margin)
            .breakpoints(self.breakpoints.normalized());
        if layout.top_bar_height > 0 {
            spec = spec.top_bar(BarSpec::new(layout.top_bar_height));
        }
        if layout.bottom_bar_height > 0 {
            spec = spec.bottom_bar(
                BarSpec::new(layout.bottom_bar_height)
                    .shown_at(MediaRule::at_least(self.bottom_bar_from)),
            );
        }
        self.panels
            .iter()
            .fold(spec, |spec, panel| spec.panel(panel.to_slot()))
    }

    /// A builder preloaded with the configured panels, the observer, and
    /// `backend` under [`storage_key`](Self::storage_key).
    #[must_use]
    pub fn manager_builder<B: StorageBackend + 'static>(
        &self,
        backend: B,
        viewport: Viewport,
    ) -> (PanelManagerBuilder, BreakpointObserver) {
        let observer = self.observer(viewport);
        let builder = PanelManager::builder()
            .panels(self.panel_configs())
            .observer(observer.clone())
            .storage(backend, self.storage_key.clone());
        (builder, observer)
    }
}
