#![forbid(unsafe_code)]

//! Page-region compositor: top bar, side panels, main content, bottom bar.
//!
//! [`LayoutCompositor::compose`] is a pure function of a [`LayoutSpec`], a
//! [`VisibilityMap`] and the available [`Rect`]. It decides which regions
//! render and how wide each one is; it never stores anything between calls.
//!
//! ```text
//! +---------------------------------------------+
//! | top bar                                     |
//! +--------+--------------------------+---------+
//! | left   | main                     | right   |
//! | panels |                          | panels  |
//! +--------+--------------------------+---------+
//! | bottom bar (hidden below its MediaRule)     |
//! +---------------------------------------------+
//! ```
//!
//! # Invariants
//!
//! 1. A panel renders iff its slot has content and the map reports it as
//!    expanded. Unknown panels count as collapsed.
//! 2. Collapsed panels take no area; the main region absorbs the space.
//! 3. Placement order is: top bar, left panels (declaration order), main,
//!    right panels (declaration order), bottom bar.
//! 4. Rendered middle-band rects never overlap and stay inside the area.
//! 5. Identical inputs give identical arrangements.
//!
//! # Failure Modes
//!
//! None. Oversized panels are shrunk (if allowed) and then truncated by the
//! flex solver; an empty area yields zero-sized rects.

use serde::{Deserialize, Serialize};
use sidedock_core::{Breakpoint, Breakpoints, MediaRule, PanelId, Rect, Sides, Side, VisibilityMap};

use crate::{Constraint, Flex};

/// Width policy of one side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSizing {
    /// Preferred width (flex basis).
    pub width: u16,
    pub min_width: u16,
    pub max_width: u16,
    /// Whether the panel may give up width, down to `min_width`, when the
    /// row is too narrow.
    pub shrink: bool,
}

impl PanelSizing {
    /// A fixed-width panel (`min == max == width`).
    #[must_use]
    pub const fn fixed(width: u16) -> Self {
        Self {
            width,
            min_width: width,
            max_width: width,
            shrink: false,
        }
    }

    /// A panel with a preferred width clamped to `min..=max`.
    #[must_use]
    pub const fn new(width: u16, min_width: u16, max_width: u16) -> Self {
        Self {
            width,
            min_width,
            max_width,
            shrink: false,
        }
    }

    /// Builder-style `shrink` toggle.
    #[must_use]
    pub const fn shrinkable(mut self, shrink: bool) -> Self {
        self.shrink = shrink;
        self
    }

    /// Preferred width clamped into bounds. A `max` below `min` is read as `min`.
    #[must_use]
    pub fn basis(&self) -> u16 {
        let max = self.max_width.max(self.min_width);
        self.width.clamp(self.min_width, max)
    }

    /// The narrowest width this panel can be squeezed to.
    #[must_use]
    pub fn floor(&self) -> u16 {
        if self.shrink {
            self.min_width.min(self.basis())
        } else {
            self.basis()
        }
    }
}

impl Default for PanelSizing {
    /// The admin layout's left sidebar: 240 preferred, 200..=300.
    fn default() -> Self {
        Self::new(240, 200, 300)
    }
}

/// One side-panel slot in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSlot {
    pub id: PanelId,
    pub side: Side,
    pub sizing: PanelSizing,
    /// Whether the page mounted any content in this slot.
    pub has_content: bool,
}

impl PanelSlot {
    #[must_use]
    pub fn new(id: impl Into<PanelId>, side: Side, sizing: PanelSizing) -> Self {
        Self {
            id: id.into(),
            side,
            sizing,
            has_content: true,
        }
    }

    /// Builder-style content flag.
    #[must_use]
    pub fn with_content(mut self, has_content: bool) -> Self {
        self.has_content = has_content;
        self
    }
}

/// A full-width bar above or below the panel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSpec {
    pub height: u16,
    /// Tiers at which the bar renders.
    #[serde(default)]
    pub shown_at: MediaRule,
}

impl BarSpec {
    #[must_use]
    pub const fn new(height: u16) -> Self {
        Self {
            height,
            shown_at: MediaRule::ALWAYS,
        }
    }

    #[must_use]
    pub const fn shown_at(mut self, rule: MediaRule) -> Self {
        self.shown_at = rule;
        self
    }
}

/// Static description of a page layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    pub top_bar: Option<BarSpec>,
    pub bottom_bar: Option<BarSpec>,
    pub panels: Vec<PanelSlot>,
    pub main_min_width: u16,
    /// Horizontal gap between adjacent rendered regions of the panel row.
    pub gap: u16,
    pub margin: Sides,
    pub breakpoints: Breakpoints,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            top_bar: None,
            bottom_bar: None,
            panels: Vec::new(),
            main_min_width: 0,
            gap: 0,
            margin: Sides::default(),
            breakpoints: Breakpoints::DEFAULT,
        }
    }
}

impl LayoutSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn top_bar(mut self, bar: BarSpec) -> Self {
        self.top_bar = Some(bar);
        self
    }

    #[must_use]
    pub fn bottom_bar(mut self, bar: BarSpec) -> Self {
        self.bottom_bar = Some(bar);
        self
    }

    #[must_use]
    pub fn panel(mut self, slot: PanelSlot) -> Self {
        self.panels.push(slot);
        self
    }

    #[must_use]
    pub fn main_min_width(mut self, width: u16) -> Self {
        self.main_min_width = width;
        self
    }

    #[must_use]
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn breakpoints(mut self, breakpoints: Breakpoints) -> Self {
        self.breakpoints = breakpoints.normalized();
        self
    }

    /// Smallest width at which every panel with content fits next to the
    /// main minimum: fixed panels at basis, shrinkable ones at their floor.
    ///
    /// With a 240 left panel, a 280 (min 220) shrinkable right panel and a
    /// 400 main minimum this is 860.
    #[must_use]
    pub fn min_wide_width(&self) -> u16 {
        let mut total = self.margin.horizontal_sum().saturating_add(self.main_min_width);
        for slot in self.panels.iter().filter(|s| s.has_content) {
            total = total
                .saturating_add(slot.sizing.floor())
                .saturating_add(self.gap);
        }
        total
    }
}

/// A layout region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    TopBar,
    Panel(PanelId),
    Main,
    BottomBar,
}

/// A rendered region and its rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub region: Region,
    pub rect: Rect,
}

/// Output of [`LayoutCompositor::compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    /// Tier of the composed area's width.
    pub breakpoint: Breakpoint,
    /// Rendered regions in placement order.
    pub placements: Vec<Placement>,
}

impl Arrangement {
    /// Rect of `region`, if it renders.
    #[must_use]
    pub fn rect_of(&self, region: &Region) -> Option<Rect> {
        self.placements
            .iter()
            .find(|p| &p.region == region)
            .map(|p| p.rect)
    }

    #[must_use]
    pub fn is_rendered(&self, region: &Region) -> bool {
        self.rect_of(region).is_some()
    }

    /// Rect of the panel named `id`, if it renders.
    #[must_use]
    pub fn panel_rect(&self, id: &str) -> Option<Rect> {
        self.placements.iter().find_map(|p| match &p.region {
            Region::Panel(pid) if pid.as_str() == id => Some(p.rect),
            _ => None,
        })
    }

    /// The main region. Always rendered.
    #[must_use]
    pub fn main(&self) -> Rect {
        self.rect_of(&Region::Main).unwrap_or_default()
    }

    /// Rendered regions of the middle band, left to right.
    pub fn row(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|p| matches!(p.region, Region::Panel(_) | Region::Main))
    }
}

/// Arranges page regions from a [`LayoutSpec`] and a visibility snapshot.
#[derive(Debug, Clone, Default)]
pub struct LayoutCompositor {
    spec: LayoutSpec,
}

impl LayoutCompositor {
    #[must_use]
    pub fn new(spec: LayoutSpec) -> Self {
        Self { spec }
    }

    #[must_use]
    pub fn spec(&self) -> &LayoutSpec {
        &self.spec
    }

    /// Arrange every region for `visibility` inside `area`.
    #[must_use]
    pub fn compose(&self, visibility: &VisibilityMap, area: Rect) -> Arrangement {
        let spec = &self.spec;
        let breakpoint = spec.breakpoints.classify_width(area.width);
        let inner = area.inner(spec.margin);

        let top = spec.top_bar.filter(|bar| bar.shown_at.holds(breakpoint));
        let bottom = spec.bottom_bar.filter(|bar| bar.shown_at.holds(breakpoint));

        let mut rows = Vec::with_capacity(3);
        if let Some(bar) = top {
            rows.push(Constraint::Fixed(bar.height));
        }
        rows.push(Constraint::Fill);
        if let Some(bar) = bottom {
            rows.push(Constraint::Fixed(bar.height));
        }
        let mut bands = Flex::vertical().constraints(rows).split(inner).into_iter();

        let mut placements = Vec::new();
        if top.is_some() {
            let rect = bands.next().unwrap_or_default();
            placements.push(Placement {
                region: Region::TopBar,
                rect,
            });
        }
        let middle = bands.next().unwrap_or_default();
        placements.extend(self.compose_row(visibility, middle));
        if bottom.is_some() {
            let rect = bands.next().unwrap_or_default();
            placements.push(Placement {
                region: Region::BottomBar,
                rect,
            });
        }

        Arrangement {
            breakpoint,
            placements,
        }
    }

    fn compose_row(&self, visibility: &VisibilityMap, band: Rect) -> Vec<Placement> {
        let spec = &self.spec;
        let rendered = |side: Side| {
            spec.panels.iter().filter(move |slot| {
                slot.side == side && slot.has_content && visibility.is_visible(slot.id.as_str())
            })
        };

        // Left panels, main, right panels.
        let mut regions: Vec<(Region, Option<PanelSizing>)> = Vec::new();
        regions.extend(
            rendered(Side::Left).map(|s| (Region::Panel(s.id.clone()), Some(s.sizing))),
        );
        regions.push((Region::Main, None));
        regions.extend(
            rendered(Side::Right).map(|s| (Region::Panel(s.id.clone()), Some(s.sizing))),
        );

        let mut widths: Vec<u16> = regions
            .iter()
            .map(|(_, sizing)| sizing.map_or(0, |s| s.basis()))
            .collect();
        let gaps = u16::try_from(regions.len() - 1).unwrap_or(u16::MAX);
        let budget = band.width.saturating_sub(spec.gap.saturating_mul(gaps));
        let demand = widths
            .iter()
            .fold(spec.main_min_width, |acc, &w| acc.saturating_add(w));
        let mut deficit = demand.saturating_sub(budget);

        // Shrinkable panels give up width, rightmost first.
        for (i, (_, sizing)) in regions.iter().enumerate().rev() {
            if deficit == 0 {
                break;
            }
            if let Some(sizing) = sizing {
                let give = widths[i].saturating_sub(sizing.floor()).min(deficit);
                widths[i] -= give;
                deficit -= give;
            }
        }

        let constraints = regions.iter().zip(&widths).map(|((region, _), &w)| match region {
            Region::Main => Constraint::Min(spec.main_min_width),
            _ => Constraint::Fixed(w),
        });
        let rects = Flex::horizontal()
            .gap(spec.gap)
            .constraints(constraints)
            .split(band);

        regions
            .into_iter()
            .zip(rects)
            .map(|((region, _), rect)| Placement { region, rect })
            .collect()
    }
}
