//! # Base Map Generation
//!
//! Room-and-corridor carving that produces the grid every later stage
//! decorates.
//!
//! The generator creates base maps by:
//! 1. Carving any registered extra rooms (big rooms) first
//! 2. Placing normal rooms randomly with collision detection until the dug
//!    percentage budget is met
//! 3. Connecting all rooms with L-shaped corridors, plus a few extra links

use crate::config::DUG_MAX;
use crate::generation::{utils, GenerationConfig, Generator, Room};
use crate::map::{Level, Position, Terrain};
use crate::{StairwellError, StairwellResult};
use log::debug;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// A carved corridor between two room centers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    pub start: Position,
    pub end: Position,
    /// Every cell the corridor carved, in walking order
    pub cells: Vec<Position>,
}

/// Output of the base map generator.
#[derive(Debug, Clone)]
pub struct BaseMap {
    pub level: Level,
    /// Normal rooms, in placement order
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
}

/// Room-and-corridor base map generator.
#[derive(Debug, Clone)]
pub struct BaseMapGenerator {
    pub cols: u32,
    pub rows: u32,
    /// Room width range, walls included
    pub room_width: (u32, u32),
    /// Room height range, walls included
    pub room_height: (u32, u32),
    /// Rooms placed even after the dug budget is met
    pub min_rooms: u32,
    /// Maximum normal rooms to place
    pub max_rooms: u32,
    /// Maximum attempts to place rooms before giving up
    pub max_placement_attempts: u32,
    dug_percentage: f64,
    extra_rooms: Vec<Room>,
}

impl BaseMapGenerator {
    /// Creates a base map generator for a `cols`×`rows` level.
    ///
    /// # Examples
    ///
    /// ```
    /// use stairwell::{BaseMapGenerator, GenerationConfig};
    ///
    /// let config = GenerationConfig::new(1);
    /// let generator = BaseMapGenerator::new(80, 40, &config);
    /// assert!(generator.dug_percentage() > 0.0);
    /// ```
    pub fn new(cols: u32, rows: u32, config: &GenerationConfig) -> Self {
        let (min, max) = config
            .dungeon_type
            .room_size_range(config.min_room_size, config.max_room_size);
        Self {
            cols,
            rows,
            room_width: (min, max),
            room_height: (min, (max * 3 / 4).max(min)),
            min_rooms: config.min_num_rooms as u32,
            max_rooms: config.max_rooms,
            max_placement_attempts: 200,
            dug_percentage: config.base_dug_percentage().min(DUG_MAX),
            extra_rooms: Vec::new(),
        }
    }

    /// Current dug percentage budget.
    pub fn dug_percentage(&self) -> f64 {
        self.dug_percentage
    }

    /// Raises the dug percentage budget, clamped at `DUG_MAX`.
    pub fn add_dug_percentage(&mut self, delta: f64) {
        self.dug_percentage = (self.dug_percentage + delta).min(DUG_MAX);
    }

    /// Registers an extra carve-out room.
    pub fn add_extra_room(&mut self, room: Room) {
        self.extra_rooms.push(room);
    }

    pub fn extra_rooms(&self) -> &[Room] {
        &self.extra_rooms
    }

    /// Carves a new base map.
    pub fn create(&self, config: &GenerationConfig, rng: &mut StdRng) -> StairwellResult<BaseMap> {
        let mut level = Level::new(self.cols, self.rows);

        for room in &self.extra_rooms {
            if !self.room_fits_in_level(room) {
                return Err(StairwellError::InvalidConfig(format!(
                    "extra room at {} ({}x{}) does not fit a {}x{} map",
                    room.top_left, room.width, room.height, self.cols, self.rows
                )));
            }
            self.carve_room(&mut level, room)?;
        }

        let rooms = self.place_rooms(&mut level, rng)?;

        let mut connected: Vec<Position> = self.extra_rooms.iter().map(Room::center).collect();
        connected.extend(rooms.iter().map(Room::center));
        let corridors = self.connect_rooms(&mut level, &connected, config, rng)?;

        debug!(
            "Base map: {} rooms, {} extra rooms, {} corridors, dug {:.2} (target {:.2})",
            rooms.len(),
            self.extra_rooms.len(),
            corridors.len(),
            self.dug_ratio(&level),
            self.dug_percentage
        );

        Ok(BaseMap {
            level,
            rooms,
            corridors,
        })
    }

    /// Fraction of the level interior that is floor.
    pub fn dug_ratio(&self, level: &Level) -> f64 {
        let total = (self.cols.saturating_sub(2) * self.rows.saturating_sub(2)).max(1);
        level.count_cells(|cell| cell.terrain == Terrain::Floor) as f64 / total as f64
    }

    /// Places rooms until the dug budget, room cap or attempt budget runs out.
    ///
    /// Extra rooms can eat most of the budget on their own, so at least
    /// `min_rooms` normal rooms are attempted regardless of the dug ratio.
    fn place_rooms(&self, level: &mut Level, rng: &mut StdRng) -> StairwellResult<Vec<Room>> {
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..self.max_placement_attempts {
            let placed = rooms.len() as u32;
            if placed >= self.max_rooms
                || (placed >= self.min_rooms && self.dug_ratio(level) >= self.dug_percentage)
            {
                break;
            }

            let room = self.generate_room_candidate(rng);
            if !self.room_fits_in_level(&room) {
                continue;
            }
            if rooms
                .iter()
                .chain(self.extra_rooms.iter())
                .any(|existing| room.overlaps(existing))
            {
                continue;
            }

            self.carve_room(level, &room)?;
            rooms.push(room);
        }

        Ok(rooms)
    }

    /// Generates a candidate room at a random position.
    fn generate_room_candidate(&self, rng: &mut StdRng) -> Room {
        let width = rng.gen_range(self.room_width.0..=self.room_width.1);
        let height = rng.gen_range(self.room_height.0..=self.room_height.1);

        let max_x = (self.cols as i32 - width as i32 - 1).max(2);
        let max_y = (self.rows as i32 - height as i32 - 1).max(2);
        let x = rng.gen_range(1..max_x);
        let y = rng.gen_range(1..max_y);

        Room::new(0, Position::new(x, y), width, height)
    }

    /// Checks if a room fits within level boundaries, leaving a solid rim.
    pub fn room_fits_in_level(&self, room: &Room) -> bool {
        room.top_left.x >= 1
            && room.top_left.y >= 1
            && room.top_left.x + room.width as i32 <= self.cols as i32 - 1
            && room.top_left.y + room.height as i32 <= self.rows as i32 - 1
    }

    /// Carves out a room by setting its interior to floor.
    fn carve_room(&self, level: &mut Level, room: &Room) -> StairwellResult<()> {
        for pos in room.floor_positions() {
            level.set_terrain(pos, Terrain::Floor)?;
        }
        Ok(())
    }

    /// Connects consecutive rooms, then gives each room an
    /// `extra_connection_chance` of one more link to another room.
    fn connect_rooms(
        &self,
        level: &mut Level,
        centers: &[Position],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> StairwellResult<Vec<Corridor>> {
        let mut corridors = Vec::new();
        if centers.len() < 2 {
            return Ok(corridors);
        }

        for pair in centers.windows(2) {
            corridors.push(self.carve_l_corridor(level, pair[0], pair[1], rng)?);
        }

        for (a, &from) in centers.iter().enumerate() {
            if !rng.gen_bool(config.extra_connection_chance) {
                continue;
            }
            let mut b = rng.gen_range(0..centers.len() - 1);
            if b >= a {
                b += 1;
            }
            corridors.push(self.carve_l_corridor(level, from, centers[b], rng)?);
        }

        Ok(corridors)
    }

    /// Carves an L-shaped corridor between two points.
    fn carve_l_corridor(
        &self,
        level: &mut Level,
        start: Position,
        end: Position,
        rng: &mut StdRng,
    ) -> StairwellResult<Corridor> {
        let bend = if rng.gen_bool(0.5) {
            Position::new(end.x, start.y)
        } else {
            Position::new(start.x, end.y)
        };

        let mut cells = Vec::new();
        for (from, to) in [(start, bend), (bend, end)] {
            for pos in straight_line(from, to) {
                if cells.last() == Some(&pos) {
                    continue;
                }
                if level.is_valid_position(pos) {
                    level.set_terrain(pos, Terrain::Floor)?;
                }
                cells.push(pos);
            }
        }

        Ok(Corridor { start, end, cells })
    }
}

/// Cells of an axis-aligned segment, inclusive, walking from `from` to `to`.
fn straight_line(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let steps = (to.x - from.x).abs().max((to.y - from.y).abs());
    (0..=steps)
        .map(|i| Position::new(from.x + dx * i, from.y + dy * i))
        .collect()
}

impl Generator<BaseMap> for BaseMapGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> StairwellResult<BaseMap> {
        let base = self.create(config, rng)?;
        self.validate(&base, config)?;
        Ok(base)
    }

    fn validate(&self, base: &BaseMap, _config: &GenerationConfig) -> StairwellResult<()> {
        if let Some(room) = base.rooms.iter().find(|room| !self.room_fits_in_level(room)) {
            return Err(StairwellError::InvalidState(format!(
                "room at {} leaves the level",
                room.top_left
            )));
        }
        utils::validate_level(&base.level)
    }

    fn generator_type(&self) -> &'static str {
        "BaseMapGenerator"
    }
}
