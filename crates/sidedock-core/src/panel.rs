#![forbid(unsafe_code)]

//! Panel identity and the published collapsed/expanded snapshot.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a collapsible panel, stable for the lifetime of a manager.
///
/// Serialized as a plain string, so it doubles as the key of the persisted
/// preference record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    /// Create an identifier from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The conventional left sidebar.
    #[must_use]
    pub fn left() -> Self {
        Self::new("left")
    }

    /// The conventional right sidebar.
    #[must_use]
    pub fn right() -> Self {
        Self::new("right")
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PanelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PanelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which side of the main region a panel is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Snapshot of every panel's collapsed flag (`true` = collapsed).
///
/// Produced by the collapse controller and consumed read-only by the
/// compositor. Iteration order is by [`PanelId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibilityMap {
    collapsed: BTreeMap<PanelId, bool>,
}

impl VisibilityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, id: impl Into<PanelId>, collapsed: bool) -> Self {
        self.insert(id.into(), collapsed);
        self
    }

    /// Record a panel's collapsed flag, returning the previous one.
    pub fn insert(&mut self, id: PanelId, collapsed: bool) -> Option<bool> {
        self.collapsed.insert(id, collapsed)
    }

    /// The collapsed flag of `id`, or `None` if the panel is unknown.
    #[must_use]
    pub fn is_collapsed(&self, id: &str) -> Option<bool> {
        self.collapsed.get(id).copied()
    }

    /// Whether `id` is known and expanded. Unknown panels are not visible.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.is_collapsed(id) == Some(false)
    }

    /// Whether every known panel is collapsed (vacuously true when empty).
    #[must_use]
    pub fn all_collapsed(&self) -> bool {
        self.collapsed.values().all(|&c| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PanelId, bool)> {
        self.collapsed.iter().map(|(id, &c)| (id, c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }
}

impl FromIterator<(PanelId, bool)> for VisibilityMap {
    fn from_iter<I: IntoIterator<Item = (PanelId, bool)>>(iter: I) -> Self {
        Self {
            collapsed: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_id_serializes_as_string() {
        let id = PanelId::left();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"left\"");
        let back: PanelId = serde_json::from_str("\"inspector\"").unwrap();
        assert_eq!(back.as_str(), "inspector");
        assert_eq!(back.to_string(), "inspector");
    }

    #[test]
    fn visibility_lookup_by_str() {
        let map = VisibilityMap::new()
            .with("left", false)
            .with(PanelId::right(), true);
        assert_eq!(map.is_collapsed("left"), Some(false));
        assert_eq!(map.is_collapsed("right"), Some(true));
        assert_eq!(map.is_collapsed("bottom"), None);
        assert!(map.is_visible("left"));
        assert!(!map.is_visible("right"));
        assert!(!map.is_visible("bottom"));
    }

    #[test]
    fn all_collapsed() {
        assert!(VisibilityMap::new().all_collapsed());
        let map: VisibilityMap = [(PanelId::left(), true), (PanelId::right(), true)]
            .into_iter()
            .collect();
        assert!(map.all_collapsed());
        let map = map.with("right", false);
        assert!(!map.all_collapsed());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn iteration_is_ordered_by_id() {
        let map = VisibilityMap::new().with("right", true).with("left", false);
        let ids: Vec<_> = map.iter().map(|(id, _)| id.as_str().to_owned()).collect();
        assert_eq!(ids, ["left", "right"]);
    }
}
