//! # Map Module
//!
//! Grid representation of a single dungeon level.
//!
//! This module contains the building blocks every generation stage works on:
//! - Positions and neighbourhoods
//! - Terrain, elements (doors, stairs) and hazards per cell
//! - Transient bookkeeping markers held in a sparse map
//! - The `Level` grid itself, including its ASCII debug dump

pub mod cell;
pub mod level;
pub mod markers;

pub use cell::*;
pub use level::*;
pub use markers::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the level grid.
///
/// # Examples
///
/// ```
/// use stairwell::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use stairwell::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1), // NW
            Position::new(self.x, self.y - 1),     // N
            Position::new(self.x + 1, self.y - 1), // NE
            Position::new(self.x - 1, self.y),     // W
            Position::new(self.x + 1, self.y),     // E
            Position::new(self.x - 1, self.y + 1), // SW
            Position::new(self.x, self.y + 1),     // S
            Position::new(self.x + 1, self.y + 1), // SE
        ]
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four map edges and corners used when anchoring big rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    North,
    South,
    East,
    West,
}

impl Side {
    /// Returns all four sides.
    pub fn all() -> [Side; 4] {
        [Side::North, Side::South, Side::East, Side::West]
    }
}

/// Map corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// Returns all four corners.
    pub fn all() -> [Corner; 4] {
        [
            Corner::NorthWest,
            Corner::NorthEast,
            Corner::SouthWest,
            Corner::SouthEast,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_arithmetic() {
        let a = Position::new(3, 4);
        let b = Position::new(1, 1);
        assert_eq!(a + b, Position::new(4, 5));
        assert_eq!(a - b, Position::new(2, 3));
        assert_eq!(a.manhattan_distance(b), 5);
    }

    #[test]
    fn test_adjacent_positions() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.adjacent_positions().len(), 8);

        let cardinal = pos.cardinal_adjacent_positions();
        assert!(cardinal.contains(&Position::new(5, 4)));
        assert!(cardinal.contains(&Position::new(6, 5)));
        assert!(!cardinal.contains(&Position::new(6, 6)));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(2, -1).to_string(), "(2, -1)");
    }
}
