//! # Connectivity Verification
//!
//! Flood fills from the first walkable cell and counts what was left behind.

use crate::map::{Cell, Level};
use crate::utils::floodfill;
use serde::{Deserialize, Serialize};

/// Reachability counts of a level's walkable cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    /// Passable-or-door cells on the level
    pub total: usize,
    /// Cells reached by the flood fill
    pub reachable: usize,
}

impl ConnectivityReport {
    pub fn unreachable(&self) -> usize {
        self.total - self.reachable
    }

    /// True when at most `max_unreachable` cells were missed.
    pub fn within(&self, max_unreachable: usize) -> bool {
        self.unreachable() <= max_unreachable
    }
}

/// Counts walkable cells and how many of them the flood fill reaches.
pub fn connectivity_report(level: &Level) -> ConnectivityReport {
    let total = level.count_cells(Cell::is_passable_or_door);
    let reachable = level
        .positions()
        .find(|&pos| level.is_passable_or_door(pos))
        .map(|start| floodfill(level, start, |pos| level.is_passable_or_door(pos), false).len())
        .unwrap_or(0);

    ConnectivityReport { total, reachable }
}

/// Accepts the level when no more than `max_unreachable` walkable cells are
/// cut off from the rest.
///
/// # Examples
///
/// ```
/// use stairwell::{Level, Position, Terrain};
/// use stairwell::generation::verify_connectivity;
///
/// let mut level = Level::new(6, 3);
/// level.set_terrain(Position::new(1, 1), Terrain::Floor).unwrap();
/// level.set_terrain(Position::new(4, 1), Terrain::Floor).unwrap();
///
/// assert!(!verify_connectivity(&level, 0));
/// assert!(verify_connectivity(&level, 1));
/// ```
pub fn verify_connectivity(level: &Level, max_unreachable: usize) -> bool {
    connectivity_report(level).within(max_unreachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Room;
    use crate::map::{Position, Terrain};

    fn sealed_rooms() -> Level {
        let mut level = Level::new(12, 6);
        for room in [
            Room::new(0, Position::new(0, 0), 5, 5),
            Room::new(1, Position::new(6, 0), 4, 4),
        ] {
            for pos in room.floor_positions() {
                level.set_terrain(pos, Terrain::Floor).unwrap();
            }
        }
        level
    }

    #[test]
    fn test_sealed_rooms_are_rejected() {
        let level = sealed_rooms();
        let report = connectivity_report(&level);

        assert_eq!(report.total, 13);
        assert_eq!(report.reachable, 9);
        assert_eq!(report.unreachable(), 4);
        assert!(!verify_connectivity(&level, 0));
        assert!(!verify_connectivity(&level, 3));
        assert!(verify_connectivity(&level, 4));
    }

    #[test]
    fn test_joined_rooms_are_accepted() {
        let mut level = sealed_rooms();
        level.set_terrain(Position::new(4, 1), Terrain::Floor).unwrap();
        level.set_terrain(Position::new(5, 1), Terrain::Floor).unwrap();
        level.add_door(Position::new(6, 1)).unwrap();

        let report = connectivity_report(&level);
        assert_eq!(report.unreachable(), 0);
        assert!(verify_connectivity(&level, 0));
    }

    #[test]
    fn test_empty_level_is_trivially_connected() {
        let level = Level::new(5, 5);
        assert_eq!(connectivity_report(&level).total, 0);
        assert!(verify_connectivity(&level, 0));
    }
}
