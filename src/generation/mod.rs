//! # Generation Module
//!
//! Procedural generation of a single dungeon level.
//!
//! The stages live in their own modules and run in this order:
//! base map ([`base`]), big rooms ([`big_rooms`]), feature decoration
//! ([`features`]), stairs ([`stairs`]), critical path ([`critical_path`]),
//! connectivity verification ([`verify`]) and finally marker cleanup, all
//! driven by [`dungeon::DungeonGenerator`].

pub mod base;
pub mod big_rooms;
pub mod critical_path;
pub mod dungeon;
pub mod features;
pub mod stairs;
pub mod verify;

pub use base::*;
pub use big_rooms::*;
pub use critical_path::*;
pub use dungeon::*;
pub use features::*;
pub use stairs::*;
pub use verify::*;

use crate::config as defaults;
use crate::map::{Level, Marker, Position, StairDirection};
use crate::{StairwellError, StairwellResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for level generation.
///
/// Every field has a default, so configuration files only need to name the
/// values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Level width used by [`Generator::generate`]
    pub cols: u32,
    /// Level height used by [`Generator::generate`]
    pub rows: u32,
    /// Base map flavour
    pub dungeon_type: DungeonType,
    /// Minimum room size, walls included
    pub min_room_size: u32,
    /// Maximum room size, walls included
    pub max_room_size: u32,
    /// Cap on normal rooms per base map
    pub max_rooms: u32,
    /// Overrides the dungeon type's base dug percentage
    pub dug_percentage: Option<f64>,
    /// Chance, rolled once per room, of one extra corridor to another room
    /// (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Base maps with fewer rooms are regenerated
    pub min_num_rooms: usize,
    /// Attempts at reaching `min_num_rooms`
    pub room_count_watchdog: u32,
    /// Number of manually specified big rooms (0 = random big room)
    pub n_big_rooms: usize,
    pub big_room_x: Vec<Placement>,
    pub big_room_y: Vec<Placement>,
    pub big_room_width: Vec<u32>,
    pub big_room_height: Vec<u32>,
    /// Chance of a random big room when `n_big_rooms` is 0
    pub big_room_chance: f64,
    /// Room pairs sampled when placing stairs
    pub stairs_watchdog: u32,
    /// Critical paths shorter than this get doors broken
    pub min_path_len: usize,
    /// Upper bound on doors broken while lengthening the critical path
    pub max_path_breaks: u32,
    /// Whether to flood-fill check the finished level
    pub verify_connectivity: bool,
    /// Floor cells allowed to be unreachable
    pub max_unreachable: usize,
    /// Regenerate the whole level when verification fails
    pub rerun_on_failure: bool,
    /// Fail with a grid dump when verification fails
    pub error_on_failure: bool,
    /// Bound on full regenerations; `None` retries forever
    pub max_regenerations: Option<u32>,
    /// Strip transient markers before handing the level off
    pub should_remove_markers: bool,
    /// Markers kept in addition to the default allow-list
    pub preserve_markers: Vec<Marker>,
}

/// Base map flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DungeonType {
    /// Rooms of varied size, sparse digging
    #[default]
    Digger,
    /// Rooms of near-identical size, denser digging
    Uniform,
}

impl DungeonType {
    /// Fraction of the map the base generator aims to dig.
    pub fn base_dug_percentage(self) -> f64 {
        match self {
            DungeonType::Digger => 0.25,
            DungeonType::Uniform => 0.35,
        }
    }

    /// Room size range (walls included) for this flavour.
    pub fn room_size_range(self, min: u32, max: u32) -> (u32, u32) {
        match self {
            DungeonType::Digger => (min, max),
            DungeonType::Uniform => {
                let mid = (min + max) / 2;
                (mid.saturating_sub(1).max(min), (mid + 1).min(max))
            }
        }
    }
}

/// Position component of a manually placed big room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    /// Absolute top-left coordinate
    At(i32),
    /// Named anchor such as `"cen"`
    Anchor(Anchor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// Centered on the map along this axis
    #[serde(rename = "cen", alias = "center")]
    Center,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use stairwell::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.min_path_len, 50);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cols: defaults::DEFAULT_DUNGEON_WIDTH,
            rows: defaults::DEFAULT_DUNGEON_HEIGHT,
            dungeon_type: DungeonType::Digger,
            min_room_size: 5,
            max_room_size: 11,
            max_rooms: 15,
            dug_percentage: None,
            extra_connection_chance: 0.15,
            min_num_rooms: 3,
            room_count_watchdog: 20,
            n_big_rooms: 0,
            big_room_x: Vec::new(),
            big_room_y: Vec::new(),
            big_room_width: Vec::new(),
            big_room_height: Vec::new(),
            big_room_chance: defaults::PROB_BIG_ROOM,
            stairs_watchdog: defaults::STAIRS_WATCHDOG,
            min_path_len: defaults::MIN_PATH_LEN,
            max_path_breaks: 100,
            verify_connectivity: true,
            max_unreachable: defaults::MAX_UNREACHABLE,
            rerun_on_failure: true,
            error_on_failure: false,
            max_regenerations: Some(100),
            should_remove_markers: true,
            preserve_markers: Vec::new(),
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            cols: 60,
            rows: 30,
            min_room_size: 4,
            max_room_size: 8,
            max_rooms: 10,
            ..Self::new(seed)
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> StairwellResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Dug percentage the base map starts from.
    pub fn base_dug_percentage(&self) -> f64 {
        self.dug_percentage
            .unwrap_or_else(|| self.dungeon_type.base_dug_percentage())
    }

    /// Full marker allow-list applied by cleanup.
    pub fn preserved_markers(&self) -> Vec<Marker> {
        let mut keep = Marker::DEFAULT_PRESERVED.to_vec();
        for marker in &self.preserve_markers {
            if !keep.contains(marker) {
                keep.push(*marker);
            }
        }
        keep
    }

    /// Rejects configurations no level can be generated from.
    pub fn validate(&self, cols: u32, rows: u32) -> StairwellResult<()> {
        if self.min_room_size < 4 || self.max_room_size < self.min_room_size {
            return Err(StairwellError::InvalidConfig(format!(
                "room size range {}..={} is invalid",
                self.min_room_size, self.max_room_size
            )));
        }
        if cols < self.max_room_size + 4 || rows < self.max_room_size + 4 {
            return Err(StairwellError::InvalidConfig(format!(
                "{}x{} map cannot hold rooms up to size {}",
                cols, rows, self.max_room_size
            )));
        }
        for (name, value) in [
            ("extra_connection_chance", self.extra_connection_chance),
            ("big_room_chance", self.big_room_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StairwellError::InvalidConfig(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }
        if self.stairs_watchdog == 0 {
            return Err(StairwellError::InvalidConfig(
                "stairs_watchdog must be at least 1".to_string(),
            ));
        }
        if let Some(dug) = self.dug_percentage {
            if !(0.0..=defaults::DUG_MAX).contains(&dug) {
                return Err(StairwellError::InvalidConfig(format!(
                    "dug_percentage {} exceeds {}",
                    dug,
                    defaults::DUG_MAX
                )));
            }
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Represents a rectangular room on the level.
///
/// The rectangle includes the room's walls: the border of the rectangle is
/// the wall ring, everything inside it is floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Sequential identifier, assigned during decoration
    pub id: u32,
    /// Top-left corner of the room (wall)
    pub top_left: Position,
    /// Width of the room (including walls)
    pub width: u32,
    /// Height of the room (including walls)
    pub height: u32,
    /// Door positions on the wall ring
    pub doors: Vec<Position>,
    /// Staircases placed inside this room
    pub stairs: Vec<(Position, StairDirection)>,
    /// Set when the room is a big-room set-piece
    pub big_room: Option<BigRoomType>,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use stairwell::{Room, Position};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 10, 8);
    /// assert_eq!(room.id, 1);
    /// assert_eq!(room.width, 10);
    /// assert_eq!(room.height, 8);
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
            doors: Vec::new(),
            stairs: Vec::new(),
            big_room: None,
        }
    }

    /// Tags this room as a big-room set-piece.
    pub fn with_big_room(mut self, kind: BigRoomType) -> Self {
        self.big_room = Some(kind);
        self
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// Outer bounding box (walls included) as top-left and bottom-right.
    pub fn outer_bbox(&self) -> (Position, Position) {
        (self.top_left, self.bottom_right())
    }

    /// Inner bounding box (floor only) as top-left and bottom-right.
    pub fn inner_bbox(&self) -> (Position, Position) {
        let (tl, br) = self.outer_bbox();
        (
            Position::new(tl.x + 1, tl.y + 1),
            Position::new(br.x - 1, br.y - 1),
        )
    }

    /// The four corners of the outer bounding box.
    pub fn corners(&self) -> [Position; 4] {
        let (tl, br) = self.outer_bbox();
        [
            tl,
            Position::new(br.x, tl.y),
            Position::new(tl.x, br.y),
            br,
        ]
    }

    /// The four corners of the floor area.
    pub fn inner_corners(&self) -> [Position; 4] {
        let (tl, br) = self.inner_bbox();
        [
            tl,
            Position::new(br.x, tl.y),
            Position::new(tl.x, br.y),
            br,
        ]
    }

    /// Gets the area of the room in tiles.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Gets the inner area (excluding walls) of the room.
    pub fn inner_area(&self) -> u32 {
        if self.width >= 2 && self.height >= 2 {
            (self.width - 2) * (self.height - 2)
        } else {
            0
        }
    }

    /// Checks if a position is inside this room (walls included).
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Checks if a position is on the border of this room.
    pub fn is_border(&self, pos: Position) -> bool {
        if !self.contains(pos) {
            return false;
        }

        pos.x == self.top_left.x
            || pos.y == self.top_left.y
            || pos.x == self.top_left.x + self.width as i32 - 1
            || pos.y == self.top_left.y + self.height as i32 - 1
    }

    /// Checks if this room overlaps with another room.
    pub fn overlaps(&self, other: &Room) -> bool {
        !(self.top_left.x >= other.top_left.x + other.width as i32
            || other.top_left.x >= self.top_left.x + self.width as i32
            || self.top_left.y >= other.top_left.y + other.height as i32
            || other.top_left.y >= self.top_left.y + self.height as i32)
    }

    /// Gets all floor positions within this room.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            for x in (self.top_left.x + 1)..(self.top_left.x + self.width as i32 - 1) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }

    /// Gets all wall positions of this room, walking the border.
    pub fn wall_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        // Top and bottom walls
        for x in self.top_left.x..(self.top_left.x + self.width as i32) {
            positions.push(Position::new(x, self.top_left.y));
            positions.push(Position::new(x, self.top_left.y + self.height as i32 - 1));
        }

        // Left and right walls (excluding corners already added)
        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            positions.push(Position::new(self.top_left.x, y));
            positions.push(Position::new(self.top_left.x + self.width as i32 - 1, y));
        }

        positions
    }

    /// Records a door on the wall ring.
    ///
    /// Returns false if the door was already known. A position off the wall
    /// ring is a logic error upstream and is reported as such.
    pub fn add_door(&mut self, pos: Position) -> StairwellResult<bool> {
        if !self.is_border(pos) {
            return Err(StairwellError::InvalidState(format!(
                "door {} is not on the border of room {}",
                pos, self.id
            )));
        }
        if self.doors.contains(&pos) {
            return Ok(false);
        }
        self.doors.push(pos);
        Ok(true)
    }

    /// Records a staircase inside the room.
    pub fn add_stairs(&mut self, pos: Position, direction: StairDirection) -> StairwellResult<()> {
        if !self.contains(pos) || self.is_border(pos) {
            return Err(StairwellError::InvalidState(format!(
                "stairs {} are not inside room {}",
                pos, self.id
            )));
        }
        self.stairs.push((pos, direction));
        Ok(())
    }
}

/// Result of a watchdog-bounded loop.
///
/// `exhausted` is set when the loop ran out of iterations before meeting its
/// goal; `value` then holds the best result found so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub exhausted: bool,
}

impl<T> Outcome<T> {
    pub fn done(value: T) -> Self {
        Self {
            value,
            exhausted: false,
        }
    }

    pub fn exhausted(value: T) -> Self {
        Self {
            value,
            exhausted: true,
        }
    }
}

/// Trait for procedural generators.
///
/// Generators produce content from a configuration and a seeded random
/// number generator, and can re-check what they produced.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> StairwellResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> StairwellResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::map::Terrain;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Validates that a level meets basic requirements.
    pub fn validate_level(level: &Level) -> StairwellResult<()> {
        let floor_count = level.count_cells(|cell| cell.terrain == Terrain::Floor);

        if floor_count == 0 {
            return Err(StairwellError::GenerationFailed(
                "Level has no floor tiles".to_string(),
            ));
        }

        Ok(())
    }
}
