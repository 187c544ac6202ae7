//! # Markers
//!
//! Transient bookkeeping tags attached to cells while a level is generated.
//! Markers never change terrain by themselves; later stages read them to
//! decide what to do (for example `PathBroken` becomes a wall once the
//! critical path settles).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Closed set of marker kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Where the critical path search starts (up stairs)
    StartPoint,
    /// Where the critical path search ends (down stairs)
    EndPoint,
    /// Cell on the accepted critical path
    CriticalPath,
    /// Door selected for walling off
    PathBroken,
    /// Non-floor cell on a room border
    RoomWall,
    /// Interior cell of a dead-end room
    Term,
    /// Cell overwritten by an elemental splash
    Splash,
}

impl Marker {
    /// Markers kept by cleanup unless the caller says otherwise.
    pub const DEFAULT_PRESERVED: [Marker; 3] =
        [Marker::StartPoint, Marker::EndPoint, Marker::CriticalPath];
}

/// Sparse cell-index to marker-set map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMap {
    cells: BTreeMap<usize, BTreeSet<Marker>>,
}

impl MarkerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker; returns false if it was already present.
    pub fn insert(&mut self, index: usize, marker: Marker) -> bool {
        self.cells.entry(index).or_default().insert(marker)
    }

    /// Removes a marker; returns true if it was present.
    pub fn remove(&mut self, index: usize, marker: Marker) -> bool {
        let Some(set) = self.cells.get_mut(&index) else {
            return false;
        };
        let removed = set.remove(&marker);
        if set.is_empty() {
            self.cells.remove(&index);
        }
        removed
    }

    pub fn contains(&self, index: usize, marker: Marker) -> bool {
        self.cells
            .get(&index)
            .map(|set| set.contains(&marker))
            .unwrap_or(false)
    }

    /// Markers on a single cell.
    pub fn get(&self, index: usize) -> Option<&BTreeSet<Marker>> {
        self.cells.get(&index)
    }

    /// Indices carrying the given marker, in ascending order.
    pub fn indices_with(&self, marker: Marker) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|(_, set)| set.contains(&marker))
            .map(|(&index, _)| index)
            .collect()
    }

    /// Drops every marker not in `keep`.
    pub fn retain_only(&mut self, keep: &[Marker]) {
        for set in self.cells.values_mut() {
            set.retain(|marker| keep.contains(marker));
        }
        self.cells.retain(|_, set| !set.is_empty());
    }

    /// Number of (cell, marker) pairs.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<Marker>)> {
        self.cells.iter().map(|(&index, set)| (index, set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut markers = MarkerMap::new();
        assert!(markers.insert(3, Marker::PathBroken));
        assert!(!markers.insert(3, Marker::PathBroken));
        assert!(markers.contains(3, Marker::PathBroken));
        assert_eq!(markers.len(), 1);

        assert!(markers.remove(3, Marker::PathBroken));
        assert!(!markers.remove(3, Marker::PathBroken));
        assert!(markers.is_empty());
    }

    #[test]
    fn test_retain_only() {
        let mut markers = MarkerMap::new();
        markers.insert(1, Marker::CriticalPath);
        markers.insert(1, Marker::RoomWall);
        markers.insert(2, Marker::Term);

        markers.retain_only(&Marker::DEFAULT_PRESERVED);

        assert!(markers.contains(1, Marker::CriticalPath));
        assert!(!markers.contains(1, Marker::RoomWall));
        assert!(markers.get(2).is_none());
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn test_indices_with_is_sorted() {
        let mut markers = MarkerMap::new();
        markers.insert(9, Marker::Term);
        markers.insert(2, Marker::Term);
        markers.insert(5, Marker::Splash);
        assert_eq!(markers.indices_with(Marker::Term), vec![2, 9]);
    }
}
