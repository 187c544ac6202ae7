//! # Feature Decoration
//!
//! Dresses the carved map:
//! - the first big room may receive an elemental splash, a noise-generated
//!   patch of water, chasm, forest or lava laid over its interior
//! - every normal room gets an ID, wall markers, and doors wherever a
//!   corridor broke through its wall ring
//! - rooms with a single door are recorded as dead ends ("terms")
//! - one random room gets fire burning in its four corners

use crate::generation::{BigRoomType, Extras, Room};
use crate::map::{Hazard, HazardKind, Level, Marker, Position, Terrain};
use crate::StairwellResult;
use log::debug;
use noise::{NoiseFn, Perlin};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Noise frequency of splash patches.
const SPLASH_SCALE: f64 = 0.18;

/// Noise value above which a patch cell is covered.
const SPLASH_THRESHOLD: f64 = 0.12;

/// Features a big room type can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomFeature {
    Splashes,
}

/// Elemental splash themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplashTheme {
    Water,
    Chasm,
    Forest,
    Fire,
}

impl SplashTheme {
    pub const ALL: [SplashTheme; 4] = [
        SplashTheme::Water,
        SplashTheme::Chasm,
        SplashTheme::Forest,
        SplashTheme::Fire,
    ];

    /// Terrain a splash of this theme leaves behind.
    pub fn terrain(self) -> Terrain {
        match self {
            SplashTheme::Water => Terrain::Water,
            SplashTheme::Chasm => Terrain::Chasm,
            SplashTheme::Forest => Terrain::Tree,
            SplashTheme::Fire => Terrain::Lava,
        }
    }
}

/// Features applied to each big room type.
pub fn features_for(kind: BigRoomType) -> &'static [RoomFeature] {
    match kind {
        BigRoomType::CrossHorizontal | BigRoomType::CrossVertical | BigRoomType::LargeCorridor(_) => {
            &[RoomFeature::Splashes]
        }
        BigRoomType::Center | BigRoomType::Vault { .. } | BigRoomType::Custom => &[],
    }
}

/// Runs every decoration step on a freshly carved level.
pub fn decorate(level: &mut Level, extras: &mut Extras, rng: &mut StdRng) -> StairwellResult<()> {
    if let Some(big_room) = extras.big_rooms.first().cloned() {
        for feature in features_for(big_room.kind) {
            match feature {
                RoomFeature::Splashes => {
                    let theme = SplashTheme::ALL[rng.gen_range(0..SplashTheme::ALL.len())];
                    let covered = apply_splash(level, &big_room.room, theme, rng.gen())?;
                    debug!("Splash {:?} covered {} cells", theme, covered);
                    extras.theme = Some(theme);
                }
            }
        }
    }

    mark_rooms(level, extras)?;
    add_fire_hazard(level, rng);
    Ok(())
}

/// Generates a row-major patch mask of `width`×`height` cells.
pub fn splash_patch(width: u32, height: u32, seed: u32) -> Vec<bool> {
    let perlin = Perlin::new(seed);
    let perlin = &perlin;
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                perlin.get([x as f64 * SPLASH_SCALE, y as f64 * SPLASH_SCALE]) > SPLASH_THRESHOLD
            })
        })
        .collect()
}

/// Overlays a splash patch on the room's interior, keeping a one-cell floor
/// rim inside the walls. Only floor cells are overwritten.
///
/// Returns the number of cells changed.
pub fn apply_splash(
    level: &mut Level,
    room: &Room,
    theme: SplashTheme,
    seed: u32,
) -> StairwellResult<usize> {
    if room.width < 5 || room.height < 5 {
        return Ok(0);
    }
    let (patch_width, patch_height) = (room.width - 4, room.height - 4);
    let origin = room.top_left;
    let patch = splash_patch(patch_width, patch_height, seed);

    let mut covered = 0;
    for (index, hit) in patch.into_iter().enumerate() {
        if !hit {
            continue;
        }
        let pos = Position::new(
            origin.x + 2 + (index as u32 % patch_width) as i32,
            origin.y + 2 + (index as u32 / patch_width) as i32,
        );
        if level.terrain_at(pos) == Some(Terrain::Floor) {
            level.set_terrain(pos, theme.terrain())?;
            level.add_marker(pos, Marker::Splash)?;
            covered += 1;
        }
    }
    Ok(covered)
}

/// Numbers the normal rooms, marks their walls, places their doors and
/// records dead ends.
pub fn mark_rooms(level: &mut Level, extras: &mut Extras) -> StairwellResult<()> {
    let mut rooms = std::mem::take(&mut level.rooms);
    let result = mark_room_list(level, &mut rooms, extras);
    level.rooms = rooms;
    result
}

fn mark_room_list(
    level: &mut Level,
    rooms: &mut [Room],
    extras: &mut Extras,
) -> StairwellResult<()> {
    for (id, room) in rooms.iter_mut().enumerate() {
        room.id = id as u32;

        for pos in room.wall_positions() {
            if level.is_passable_or_door(pos) {
                room.add_door(pos)?;
            } else {
                level.add_marker(pos, Marker::RoomWall)?;
            }
        }
        place_doors(level, room)?;

        if room.doors.len() == 1 {
            extras.terms.push(room.id);
            for pos in room.floor_positions() {
                level.add_marker(pos, Marker::Term)?;
            }
        }
    }
    Ok(())
}

/// Adds a door element at each of the room's doors that lacks one.
pub fn place_doors(level: &mut Level, room: &Room) -> StairwellResult<usize> {
    let mut placed = 0;
    for &pos in &room.doors {
        if level.add_door(pos)? {
            placed += 1;
        }
    }
    Ok(placed)
}

/// Sets fire in the four inner corners of one random normal room.
pub fn add_fire_hazard(level: &mut Level, rng: &mut StdRng) {
    if level.rooms.is_empty() {
        return;
    }
    let room = &level.rooms[rng.gen_range(0..level.rooms.len())];
    let corners = room.inner_corners();
    debug!("Fire hazard in room {}", room.id);
    for position in corners {
        level.add_hazard(Hazard {
            kind: HazardKind::Fire,
            position,
        });
    }
}
