//! # Cells
//!
//! Terrain, elements and hazards stored per grid cell.

use super::Position;
use serde::{Deserialize, Serialize};

/// Base terrain of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Wall,
    Floor,
    /// Shallow water left by a splash
    Water,
    /// Forest splash; walkable undergrowth
    Tree,
    /// Impassable drop left by a splash
    Chasm,
    /// Impassable fire splash
    Lava,
}

impl Terrain {
    /// Whether actors can walk over this terrain.
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Floor | Terrain::Water | Terrain::Tree)
    }

    /// Character used by the ASCII dump.
    pub fn glyph(self) -> char {
        match self {
            Terrain::Wall => '#',
            Terrain::Floor => '.',
            Terrain::Water => '~',
            Terrain::Tree => 'T',
            Terrain::Chasm => ' ',
            Terrain::Lava => '=',
        }
    }
}

/// Direction a staircase leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairDirection {
    Up,
    Down,
}

/// A staircase and the position of the staircase it is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub direction: StairDirection,
    pub target: Position,
}

/// Structural element placed on top of a cell's terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Door { is_open: bool },
    Stairs(Stairs),
}

impl Element {
    /// Creates a closed door.
    pub fn door() -> Self {
        Element::Door { is_open: false }
    }

    pub fn is_door(&self) -> bool {
        matches!(self, Element::Door { .. })
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub element: Option<Element>,
}

impl Cell {
    /// Creates a cell with the given terrain and no element.
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            element: None,
        }
    }

    pub fn floor() -> Self {
        Self::new(Terrain::Floor)
    }

    pub fn wall() -> Self {
        Self::new(Terrain::Wall)
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    pub fn has_door(&self) -> bool {
        self.element.map(|e| e.is_door()).unwrap_or(false)
    }

    /// The "floor OR door" predicate used by every path and flood fill query.
    pub fn is_passable_or_door(&self) -> bool {
        self.is_passable() || self.has_door()
    }

    /// Character used by the ASCII dump.
    pub fn glyph(&self) -> char {
        match self.element {
            Some(Element::Door { is_open: true }) => '\'',
            Some(Element::Door { is_open: false }) => '+',
            Some(Element::Stairs(Stairs {
                direction: StairDirection::Down,
                ..
            })) => '>',
            Some(Element::Stairs(Stairs {
                direction: StairDirection::Up,
                ..
            })) => '<',
            None => self.terrain.glyph(),
        }
    }
}

/// Kinds of persistent hazard actors a level can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Fire,
}

/// A hazard actor placed during decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_passability() {
        assert!(Terrain::Floor.is_passable());
        assert!(Terrain::Water.is_passable());
        assert!(Terrain::Tree.is_passable());
        assert!(!Terrain::Wall.is_passable());
        assert!(!Terrain::Chasm.is_passable());
        assert!(!Terrain::Lava.is_passable());
    }

    #[test]
    fn test_door_counts_as_passable() {
        let mut cell = Cell::wall();
        assert!(!cell.is_passable_or_door());

        cell.element = Some(Element::door());
        assert!(cell.has_door());
        assert!(cell.is_passable_or_door());
        assert_eq!(cell.glyph(), '+');
    }

    #[test]
    fn test_stairs_glyphs() {
        let mut cell = Cell::floor();
        cell.element = Some(Element::Stairs(Stairs {
            direction: StairDirection::Down,
            target: Position::new(1, 1),
        }));
        assert_eq!(cell.glyph(), '>');
        assert!(!cell.has_door());
    }
}
