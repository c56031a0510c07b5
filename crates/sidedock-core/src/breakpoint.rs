#![forbid(unsafe_code)]

//! Width tiers for responsive decisions.
//!
//! [`Breakpoints`] holds four ascending width thresholds that split the
//! width axis into five [`Breakpoint`] tiers:
//!
//! | Tier | Width range            |
//! |------|------------------------|
//! | `Xs` | `< sm`                 |
//! | `Sm` | `sm ..< md`            |
//! | `Md` | `md ..< lg`            |
//! | `Lg` | `lg ..< xl`            |
//! | `Xl` | `>= xl`                |
//!
//! The defaults are the grid thresholds the admin layouts were tuned for
//! (576/768/992/1200).
//!
//! # Invariants
//!
//! 1. Thresholds are non-decreasing (`sm <= md <= lg <= xl`); the
//!    constructor raises any threshold smaller than its predecessor.
//! 2. Classification is monotonic: a wider width never maps to a smaller tier.
//! 3. `classify_width(0)` is always `Xs` unless `sm == 0`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A responsive width tier, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs = 0,
    Sm = 1,
    Md = 2,
    Lg = 3,
    Xl = 4,
}

impl Breakpoint {
    /// Every tier in ascending order.
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    /// Short lowercase label (`"xs"` .. `"xl"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ascending width thresholds for [`Breakpoint`] classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub sm: u16,
    pub md: u16,
    pub lg: u16,
    pub xl: u16,
}

impl Breakpoints {
    /// Grid thresholds used by the admin page layouts.
    pub const DEFAULT: Self = Self {
        sm: 576,
        md: 768,
        lg: 992,
        xl: 1200,
    };

    /// Create thresholds, raising any value below its predecessor so the
    /// tiers stay ordered.
    #[must_use]
    pub const fn new(sm: u16, md: u16, lg: u16, xl: u16) -> Self {
        let md = if md < sm { sm } else { md };
        let lg = if lg < md { md } else { lg };
        let xl = if xl < lg { lg } else { xl };
        Self { sm, md, lg, xl }
    }

    /// Return a copy with thresholds re-ordered as [`Breakpoints::new`] would.
    ///
    /// Deserialized values bypass the constructor; call this before use.
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self::new(self.sm, self.md, self.lg, self.xl)
    }

    /// Classify a width into its tier.
    #[must_use]
    pub const fn classify_width(&self, width: u16) -> Breakpoint {
        if width >= self.xl {
            Breakpoint::Xl
        } else if width >= self.lg {
            Breakpoint::Lg
        } else if width >= self.md {
            Breakpoint::Md
        } else if width >= self.sm {
            Breakpoint::Sm
        } else {
            Breakpoint::Xs
        }
    }

    /// The smallest width that classifies as `bp`.
    #[must_use]
    pub const fn min_width_of(&self, bp: Breakpoint) -> u16 {
        match bp {
            Breakpoint::Xs => 0,
            Breakpoint::Sm => self.sm,
            Breakpoint::Md => self.md,
            Breakpoint::Lg => self.lg,
            Breakpoint::Xl => self.xl,
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}
