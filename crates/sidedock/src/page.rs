//! A manager and a compositor driven together by viewport changes.

use sidedock_core::Viewport;
use sidedock_layout::{Arrangement, LayoutCompositor};
use sidedock_runtime::{ConfigError, ManagerConfig, PanelError, PanelManager, StorageBackend};
use tracing::trace;

/// One page: panel visibility plus the layout it produces.
///
/// [`resize`](Self::resize) is the single entry point for the host's resize
/// notification; it updates the manager's observer and recomposes.
#[derive(Debug)]
pub struct Page {
    manager: PanelManager,
    compositor: LayoutCompositor,
}

impl Page {
    #[must_use]
    pub fn new(manager: PanelManager, compositor: LayoutCompositor) -> Self {
        Self {
            manager,
            compositor,
        }
    }

    /// Build the manager and layout described by `config`.
    ///
    /// The config is validated first; every problem found is reported in
    /// one [`ConfigError::Validation`].
    pub fn from_config<B: StorageBackend + 'static>(
        config: &ManagerConfig,
        backend: B,
        viewport: Viewport,
    ) -> Result<Self, ConfigError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        let (builder, _observer) = config.manager_builder(backend, viewport);
        Ok(Self::new(
            builder.build()?,
            LayoutCompositor::new(config.layout_spec()),
        ))
    }

    #[must_use]
    pub fn manager(&self) -> &PanelManager {
        &self.manager
    }

    #[must_use]
    pub fn compositor(&self) -> &LayoutCompositor {
        &self.compositor
    }

    /// Apply a new viewport and return the resulting arrangement.
    pub fn resize(&self, viewport: Viewport) -> Arrangement {
        let flipped = self.manager.set_viewport(viewport);
        trace!(width = viewport.width, height = viewport.height, flipped, "page resized");
        self.arrangement()
    }

    /// Toggle a panel and return the resulting arrangement.
    pub fn toggle(&self, id: &str) -> Result<Arrangement, PanelError> {
        self.manager.toggle(id)?;
        Ok(self.arrangement())
    }

    /// The arrangement for the current visibility and viewport.
    #[must_use]
    pub fn arrangement(&self) -> Arrangement {
        let area = self.manager.observer().viewport().rect();
        self.compositor.compose(&self.manager.visibility(), area)
    }
}
