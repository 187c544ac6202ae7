//! # Pathfinding
//!
//! Shortest-path queries on the level grid.
//!
//! Every step costs the same, so breadth-first search from the `pathfinding`
//! crate gives exact shortest paths. Movement is 4-connected.

use crate::{Level, Position};
use ::pathfinding::prelude::bfs;

/// Shortest 4-connected path from `from` to `to` using a custom passability
/// predicate.
///
/// The returned path includes both endpoints. It is empty when `to` cannot be
/// reached. The start cell itself is not checked against `passable`; every
/// other cell on the path, including `to`, is.
///
/// # Examples
///
/// ```
/// use stairwell::{Level, Position, Terrain};
/// use stairwell::utils::shortest_path;
///
/// let mut level = Level::new(6, 3);
/// for x in 1..5 {
///     level.set_terrain(Position::new(x, 1), Terrain::Floor).unwrap();
/// }
/// let path = shortest_path(&level, Position::new(1, 1), Position::new(4, 1), |pos| {
///     level.is_passable(pos)
/// });
/// assert_eq!(path.len(), 4);
/// ```
pub fn shortest_path<F>(level: &Level, from: Position, to: Position, passable: F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    if !level.is_valid_position(from) || !level.is_valid_position(to) {
        return Vec::new();
    }

    bfs(
        &from,
        |pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| level.is_valid_position(next) && passable(next))
                .collect::<Vec<_>>()
        },
        |pos| *pos == to,
    )
    .unwrap_or_default()
}

/// Shortest path where both passable terrain and doors may be crossed.
pub fn shortest_passable_path_with_doors(level: &Level, from: Position, to: Position) -> Vec<Position> {
    shortest_path(level, from, to, |pos| level.is_passable_or_door(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Terrain;

    fn corridor_level() -> Level {
        let mut level = Level::new(10, 5);
        for x in 1..9 {
            level.set_terrain(Position::new(x, 2), Terrain::Floor).unwrap();
        }
        level
    }

    #[test]
    fn test_path_includes_endpoints() {
        let level = corridor_level();
        let path = shortest_passable_path_with_doors(&level, Position::new(1, 2), Position::new(8, 2));
        assert_eq!(path.len(), 8);
        assert_eq!(path.first(), Some(&Position::new(1, 2)));
        assert_eq!(path.last(), Some(&Position::new(8, 2)));
    }

    #[test]
    fn test_blocked_path_is_empty() {
        let mut level = corridor_level();
        level.set_terrain(Position::new(4, 2), Terrain::Chasm).unwrap();
        let path = shortest_passable_path_with_doors(&level, Position::new(1, 2), Position::new(8, 2));
        assert!(path.is_empty());
    }

    #[test]
    fn test_doors_are_crossed() {
        let mut level = corridor_level();
        level.set_terrain(Position::new(4, 2), Terrain::Wall).unwrap();
        level.add_door(Position::new(4, 2)).unwrap();

        let with_doors =
            shortest_passable_path_with_doors(&level, Position::new(1, 2), Position::new(8, 2));
        assert_eq!(with_doors.len(), 8);

        let floor_only = shortest_path(&level, Position::new(1, 2), Position::new(8, 2), |pos| {
            level.is_passable(pos)
        });
        assert!(floor_only.is_empty());
    }

    #[test]
    fn test_custom_predicate_excludes_cells() {
        let mut level = Level::new(6, 6);
        for y in 1..5 {
            for x in 1..5 {
                level.set_terrain(Position::new(x, y), Terrain::Floor).unwrap();
            }
        }
        let blocked = Position::new(2, 1);
        let path = shortest_path(&level, Position::new(1, 1), Position::new(3, 1), |pos| {
            pos != blocked && level.is_passable(pos)
        });
        assert!(!path.contains(&blocked));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let level = corridor_level();
        let path = shortest_passable_path_with_doors(&level, Position::new(-1, 2), Position::new(8, 2));
        assert!(path.is_empty());
    }
}
