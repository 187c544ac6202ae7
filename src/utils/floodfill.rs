//! # Flood Fill
//!
//! Connected-component queries on the level grid.

use crate::{Level, Position};
use ::pathfinding::prelude::bfs_reach;

/// Returns every cell reachable from `start` through cells matching
/// `predicate`, including `start` itself.
///
/// Nothing is returned when `start` is off the grid or fails the predicate.
/// With `diagonal` set, the fill also spreads to the four diagonal neighbours.
pub fn floodfill<F>(level: &Level, start: Position, predicate: F, diagonal: bool) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    if !level.is_valid_position(start) || !predicate(start) {
        return Vec::new();
    }

    bfs_reach(start, |pos: &Position| {
        let neighbours = if diagonal {
            pos.adjacent_positions()
        } else {
            pos.cardinal_adjacent_positions()
        };
        neighbours
            .into_iter()
            .filter(|&next| level.is_valid_position(next) && predicate(next))
            .collect::<Vec<_>>()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Terrain;

    #[test]
    fn test_fill_stays_in_component() {
        let mut level = Level::new(10, 5);
        for x in 1..4 {
            level.set_terrain(Position::new(x, 2), Terrain::Floor).unwrap();
        }
        for x in 6..9 {
            level.set_terrain(Position::new(x, 2), Terrain::Floor).unwrap();
        }

        let filled = floodfill(&level, Position::new(1, 2), |pos| level.is_passable(pos), false);
        assert_eq!(filled.len(), 3);
        assert!(!filled.contains(&Position::new(6, 2)));
    }

    #[test]
    fn test_diagonal_fill() {
        let mut level = Level::new(5, 5);
        level.set_terrain(Position::new(1, 1), Terrain::Floor).unwrap();
        level.set_terrain(Position::new(2, 2), Terrain::Floor).unwrap();

        let straight = floodfill(&level, Position::new(1, 1), |pos| level.is_passable(pos), false);
        let diagonal = floodfill(&level, Position::new(1, 1), |pos| level.is_passable(pos), true);
        assert_eq!(straight.len(), 1);
        assert_eq!(diagonal.len(), 2);
    }

    #[test]
    fn test_start_must_match() {
        let level = Level::new(5, 5);
        let filled = floodfill(&level, Position::new(2, 2), |pos| level.is_passable(pos), false);
        assert!(filled.is_empty());
    }
}
