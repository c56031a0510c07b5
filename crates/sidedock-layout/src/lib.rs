#![forbid(unsafe_code)]

//! Layout primitives and the page-region compositor.

pub mod compositor;

pub use compositor::{
    Arrangement, BarSpec, LayoutCompositor, LayoutSpec, PanelSizing, PanelSlot, Placement, Region,
};
pub use sidedock_core::geometry::{Rect, Sides};

/// A constraint on the size of a layout item along the split axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Exactly this size, or whatever is left if less.
    Fixed(u16),
    /// At least this size, then an equal share of leftover space.
    Min(u16),
    /// An equal share of leftover space.
    Fill,
}

/// The direction to lay items out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// A flexible layout container.
#[derive(Debug, Clone, Default)]
pub struct Flex {
    direction: Direction,
    constraints: Vec<Constraint>,
    margin: Sides,
    gap: u16,
}

impl Flex {
    /// Create a new vertical flex layout.
    pub fn vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            ..Default::default()
        }
    }

    /// Create a new horizontal flex layout.
    pub fn horizontal() -> Self {
        Self {
            direction: Direction::Horizontal,
            ..Default::default()
        }
    }

    /// Set the constraints.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints = constraints.into_iter().collect();
        self
    }

    /// Set the margin.
    pub fn margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    /// Set the gap between items.
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    /// Split the given area into one rectangle per constraint.
    pub fn split(&self, area: Rect) -> Vec<Rect> {
        let inner = area.inner(self.margin);
        if inner.is_empty() {
            let origin = Rect::new(inner.x, inner.y, 0, 0);
            return self.constraints.iter().map(|_| origin).collect();
        }

        let count = self.constraints.len();
        if count == 0 {
            return Vec::new();
        }

        let total_size = match self.direction {
            Direction::Horizontal => inner.width,
            Direction::Vertical => inner.height,
        };
        let gaps = u16::try_from(count - 1).unwrap_or(u16::MAX);
        let available_size = total_size.saturating_sub(self.gap.saturating_mul(gaps));

        let sizes = self.solve_constraints(available_size);
        self.sizes_to_rects(inner, &sizes)
    }

    fn solve_constraints(&self, available_size: u16) -> Vec<u16> {
        let mut sizes = vec![0u16; self.constraints.len()];
        let mut remaining = available_size;
        let mut grow_indices = Vec::new();

        // 1. Hard allocations in declaration order.
        for (i, &constraint) in self.constraints.iter().enumerate() {
            match constraint {
                Constraint::Fixed(size) => {
                    let size = size.min(remaining);
                    sizes[i] = size;
                    remaining -= size;
                }
                Constraint::Min(min_size) => {
                    let size = min_size.min(remaining);
                    sizes[i] = size;
                    remaining -= size;
                    grow_indices.push(i);
                }
                Constraint::Fill => grow_indices.push(i),
            }
        }

        // 2. Equal shares of the leftover; the last grower absorbs rounding.
        if remaining > 0 && !grow_indices.is_empty() {
            let share = remaining / grow_indices.len() as u16;
            let mut allocated = 0u16;
            for (idx, &i) in grow_indices.iter().enumerate() {
                let size = if idx == grow_indices.len() - 1 {
                    remaining - allocated
                } else {
                    share
                };
                sizes[i] += size;
                allocated += size;
            }
        }

        sizes
    }

    fn sizes_to_rects(&self, area: Rect, sizes: &[u16]) -> Vec<Rect> {
        let mut rects = Vec::with_capacity(sizes.len());
        let (mut current_pos, end) = match self.direction {
            Direction::Horizontal => (area.x, area.right()),
            Direction::Vertical => (area.y, area.bottom()),
        };

        for &size in sizes {
            let rect = match self.direction {
                Direction::Horizontal => Rect {
                    x: current_pos,
                    y: area.y,
                    width: size,
                    height: area.height,
                },
                Direction::Vertical => Rect {
                    x: area.x,
                    y: current_pos,
                    width: area.width,
                    height: size,
                },
            };
            rects.push(rect);
            // Gaps wider than the area collapse onto its far edge.
            current_pos = current_pos
                .saturating_add(size)
                .saturating_add(self.gap)
                .min(end);
        }

        rects
    }
}
