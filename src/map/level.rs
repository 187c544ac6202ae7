//! # Level
//!
//! The grid a level is generated on, plus everything committed to it: rooms,
//! hazards, stairs and markers.

use super::{Cell, Element, Hazard, Marker, MarkerMap, Position, StairDirection, Stairs, Terrain};
use crate::generation::Room;
use crate::{StairwellError, StairwellResult};
use serde::{Deserialize, Serialize};

/// A single dungeon level.
///
/// Cells are stored row-major. The level owns the normal room list; big rooms
/// and other per-generation bookkeeping travel separately in the extras bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Width of the level in cells
    pub width: u32,
    /// Height of the level in cells
    pub height: u32,
    cells: Vec<Cell>,
    /// Normal rooms, with IDs and doors once decorated
    pub rooms: Vec<Room>,
    /// Transient markers; only the allow-list survives cleanup
    pub markers: MarkerMap,
    /// Persistent hazard actors
    pub hazards: Vec<Hazard>,
    /// Position of the up staircase, if placed
    pub stairs_up_position: Option<Position>,
    /// Position of the down staircase, if placed
    pub stairs_down_position: Option<Position>,
}

impl Level {
    /// Creates a level filled with walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use stairwell::{Level, Position, Terrain};
    ///
    /// let level = Level::new(20, 10);
    /// assert_eq!(level.get_cell(Position::new(3, 3)).unwrap().terrain, Terrain::Wall);
    /// assert!(level.get_cell(Position::new(20, 0)).is_none());
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::wall(); (width * height) as usize],
            rooms: Vec::new(),
            markers: MarkerMap::new(),
            hazards: Vec::new(),
            stairs_up_position: None,
            stairs_down_position: None,
        }
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Row-major index of a position, if it is on the grid.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if self.is_valid_position(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    pub fn get_cell(&self, pos: Position) -> Option<&Cell> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    pub fn get_cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        match self.index_of(pos) {
            Some(index) => Some(&mut self.cells[index]),
            None => None,
        }
    }

    fn cell_mut_checked(&mut self, pos: Position) -> StairwellResult<&mut Cell> {
        let (width, height) = (self.width, self.height);
        self.get_cell_mut(pos).ok_or_else(|| {
            StairwellError::InvalidState(format!(
                "position {} outside {}x{} level",
                pos, width, height
            ))
        })
    }

    pub fn set_cell(&mut self, pos: Position, cell: Cell) -> StairwellResult<()> {
        *self.cell_mut_checked(pos)? = cell;
        Ok(())
    }

    /// Changes the terrain of a cell, keeping its element.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) -> StairwellResult<()> {
        self.cell_mut_checked(pos)?.terrain = terrain;
        Ok(())
    }

    /// Turns a cell into plain wall, dropping any element on it.
    pub fn wall_off(&mut self, pos: Position) -> StairwellResult<()> {
        self.set_cell(pos, Cell::wall())
    }

    pub fn terrain_at(&self, pos: Position) -> Option<Terrain> {
        self.get_cell(pos).map(|cell| cell.terrain)
    }

    pub fn is_passable(&self, pos: Position) -> bool {
        self.get_cell(pos).map(Cell::is_passable).unwrap_or(false)
    }

    pub fn has_door(&self, pos: Position) -> bool {
        self.get_cell(pos).map(Cell::has_door).unwrap_or(false)
    }

    /// "Floor OR door"; false off the grid.
    pub fn is_passable_or_door(&self, pos: Position) -> bool {
        self.get_cell(pos)
            .map(Cell::is_passable_or_door)
            .unwrap_or(false)
    }

    /// Places a closed door; returns false if one is already there.
    pub fn add_door(&mut self, pos: Position) -> StairwellResult<bool> {
        let cell = self.cell_mut_checked(pos)?;
        if cell.has_door() {
            return Ok(false);
        }
        cell.element = Some(Element::door());
        Ok(true)
    }

    /// Places a staircase linked to `target` and records its position.
    pub fn add_stairs(
        &mut self,
        pos: Position,
        direction: StairDirection,
        target: Position,
    ) -> StairwellResult<()> {
        self.cell_mut_checked(pos)?.element = Some(Element::Stairs(Stairs { direction, target }));
        match direction {
            StairDirection::Up => self.stairs_up_position = Some(pos),
            StairDirection::Down => self.stairs_down_position = Some(pos),
        }
        Ok(())
    }

    /// All staircases on the level with their positions.
    pub fn stairs(&self) -> Vec<(Position, Stairs)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| match cell.element {
                Some(Element::Stairs(stairs)) => Some((self.position_of(index), stairs)),
                _ => None,
            })
            .collect()
    }

    pub fn add_hazard(&mut self, hazard: Hazard) {
        self.hazards.push(hazard);
    }

    pub fn add_marker(&mut self, pos: Position, marker: Marker) -> StairwellResult<bool> {
        let index = self.index_of(pos).ok_or_else(|| {
            StairwellError::InvalidState(format!("cannot mark {} outside the level", pos))
        })?;
        Ok(self.markers.insert(index, marker))
    }

    pub fn remove_marker(&mut self, pos: Position, marker: Marker) -> bool {
        match self.index_of(pos) {
            Some(index) => self.markers.remove(index, marker),
            None => false,
        }
    }

    pub fn has_marker(&self, pos: Position, marker: Marker) -> bool {
        self.index_of(pos)
            .map(|index| self.markers.contains(index, marker))
            .unwrap_or(false)
    }

    /// Positions carrying the given marker, in row-major order.
    pub fn positions_with_marker(&self, marker: Marker) -> Vec<Position> {
        self.markers
            .indices_with(marker)
            .into_iter()
            .map(|index| self.position_of(index))
            .collect()
    }

    /// Every position on the grid, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |index| self.position_of(index))
    }

    /// Counts cells matching a predicate.
    pub fn count_cells<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Cell) -> bool,
    {
        self.cells.iter().filter(|cell| predicate(cell)).count()
    }

    /// Renders the grid as text, one row per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use stairwell::{Level, Position, Terrain};
    ///
    /// let mut level = Level::new(3, 3);
    /// level.set_terrain(Position::new(1, 1), Terrain::Floor).unwrap();
    /// assert_eq!(level.to_ascii(), "###\n#.#\n###\n");
    /// ```
    pub fn to_ascii(&self) -> String {
        self.to_ascii_with_path(&[])
    }

    /// Renders the grid with `path` cells drawn as `*` (stairs stay visible).
    pub fn to_ascii_with_path(&self, path: &[Position]) -> String {
        let mut glyphs: Vec<char> = self.cells.iter().map(Cell::glyph).collect();
        for &pos in path {
            if let Some(index) = self.index_of(pos) {
                if !matches!(self.cells[index].element, Some(Element::Stairs(_))) {
                    glyphs[index] = '*';
                }
            }
        }

        let mut out = String::with_capacity(glyphs.len() + self.height as usize);
        for row in glyphs.chunks(self.width as usize) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}
