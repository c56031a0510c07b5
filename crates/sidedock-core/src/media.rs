#![forbid(unsafe_code)]

//! Breakpoint masks: "does this rule hold at tier X".
//!
//! A [`MediaRule`] is the tier-level analogue of a CSS media query. The
//! manager's wide/narrow predicate and the compositor's bottom-bar rule are
//! both expressed as rules over [`Breakpoint`] tiers.
//!
//! ```
//! use sidedock_core::{Breakpoint, MediaRule};
//!
//! let wide = MediaRule::at_least(Breakpoint::Lg);
//! assert!(!wide.holds(Breakpoint::Md));
//! assert!(wide.holds(Breakpoint::Xl));
//! ```
//!
//! # Invariants
//!
//! 1. `ALWAYS` holds at every tier, `NEVER` at none.
//! 2. `at_least(bp)` holds at `bp` and every wider tier.
//! 3. `below(bp)` holds at every tier narrower than `bp`.
//! 4. Masks are truncated to the five defined tiers.

use super::Breakpoint;
use serde::{Deserialize, Serialize};
use std::fmt;

const FULL_MASK: u8 = 0b11111;

/// A set of breakpoint tiers at which some condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct MediaRule {
    /// Bit i set = holds at the tier with ordinal i.
    mask: u8,
}

impl MediaRule {
    /// Holds at every tier.
    pub const ALWAYS: Self = Self { mask: FULL_MASK };

    /// Holds at no tier.
    pub const NEVER: Self = Self { mask: 0 };

    /// Holds at `bp` and every wider tier.
    #[must_use]
    pub const fn at_least(bp: Breakpoint) -> Self {
        Self {
            mask: (FULL_MASK << (bp as u8)) & FULL_MASK,
        }
    }

    /// Holds at every tier strictly narrower than `bp`.
    #[must_use]
    pub const fn below(bp: Breakpoint) -> Self {
        Self {
            mask: (1u8 << (bp as u8)) - 1,
        }
    }

    /// Holds at exactly the listed tiers.
    #[must_use]
    pub fn only(tiers: &[Breakpoint]) -> Self {
        let mask = tiers.iter().fold(0u8, |acc, &bp| acc | (1u8 << (bp as u8)));
        Self { mask }
    }

    /// Build from a raw mask (bits 0..=4 map to `Xs..=Xl`).
    #[must_use]
    pub const fn from_mask(mask: u8) -> Self {
        Self {
            mask: mask & FULL_MASK,
        }
    }

    /// The raw mask.
    #[must_use]
    pub const fn mask(self) -> u8 {
        self.mask
    }

    /// Whether the rule holds at `bp`.
    #[must_use]
    pub const fn holds(self, bp: Breakpoint) -> bool {
        self.mask & (1u8 << (bp as u8)) != 0
    }

    /// The complementary rule.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            mask: !self.mask & FULL_MASK,
        }
    }
}

impl Default for MediaRule {
    fn default() -> Self {
        Self::ALWAYS
    }
}

impl From<u8> for MediaRule {
    fn from(mask: u8) -> Self {
        Self::from_mask(mask)
    }
}

impl From<MediaRule> for u8 {
    fn from(rule: MediaRule) -> Self {
        rule.mask
    }
}

impl fmt::Display for MediaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mask {
            FULL_MASK => return f.write_str("always"),
            0 => return f.write_str("never"),
            _ => {}
        }
        let mut first = true;
        for bp in Breakpoint::ALL {
            if self.holds(bp) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(bp.label())?;
                first = false;
            }
        }
        Ok(())
    }
}
