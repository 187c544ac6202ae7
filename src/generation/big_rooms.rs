//! # Big Rooms
//!
//! Oversized structural set-pieces registered with the base map before it is
//! carved: a centered hall, a large corridor along one edge, a cross of two
//! strips, or a vault in a corner.
//!
//! Big rooms may overlap each other; normal rooms are kept out of them by the
//! base map generator. Each placement raises the base map's dug percentage so
//! normal rooms still get their share of the map.

use crate::config::{BIG_ROOM_DUG_INCREMENT, CROSS_DUG_FACTOR};
use crate::generation::{Anchor, BaseMapGenerator, GenerationConfig, Placement, Room};
use crate::map::{Corner, Position, Side};
use crate::{StairwellError, StairwellResult};
use log::debug;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Structural type of a big room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BigRoomType {
    /// Hall centered on the map
    Center,
    /// Full-width or full-height strip hugging one edge
    LargeCorridor(Side),
    /// Horizontal half of a cross
    CrossHorizontal,
    /// Vertical half of a cross
    CrossVertical,
    /// Vault anchored in a corner
    Vault { size: VaultSize, corner: Corner },
    /// Manually specified rectangle
    Custom,
}

impl BigRoomType {
    pub fn is_cross(self) -> bool {
        matches!(self, BigRoomType::CrossHorizontal | BigRoomType::CrossVertical)
    }
}

/// Vault footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultSize {
    /// Quarter of the map
    Small,
    /// Half of the map, full width
    BigHorizontal,
    /// Half of the map, full height
    BigVertical,
}

/// Families the random planner picks from, uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigRoomFamily {
    Center,
    LargeCorridor,
    Cross,
    Vault,
}

impl BigRoomFamily {
    pub const ALL: [BigRoomFamily; 4] = [
        BigRoomFamily::Center,
        BigRoomFamily::LargeCorridor,
        BigRoomFamily::Cross,
        BigRoomFamily::Vault,
    ];
}

/// A big room and its rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigRoom {
    pub kind: BigRoomType,
    pub room: Room,
}

impl BigRoom {
    pub fn new(kind: BigRoomType, room: Room) -> Self {
        Self {
            kind,
            room: room.with_big_room(kind),
        }
    }
}

/// Plans big rooms and registers them with the base map generator.
///
/// With `n_big_rooms > 0` the rectangles come from the configuration;
/// otherwise one random big room is planned with probability
/// `big_room_chance`.
pub fn plan_big_rooms(
    base: &mut BaseMapGenerator,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> StairwellResult<Vec<BigRoom>> {
    let planned = if config.n_big_rooms > 0 {
        manual_big_rooms(base, config)?
    } else if rng.gen_bool(config.big_room_chance) {
        let family = *BigRoomFamily::ALL
            .choose(rng)
            .ok_or_else(|| StairwellError::InvalidState("no big room families".to_string()))?;
        random_big_rooms(base.cols, base.rows, family, rng)
    } else {
        Vec::new()
    };

    for big_room in &planned {
        if !base.room_fits_in_level(&big_room.room) {
            return Err(StairwellError::InvalidConfig(format!(
                "big room {:?} at {} ({}x{}) does not fit a {}x{} map",
                big_room.kind,
                big_room.room.top_left,
                big_room.room.width,
                big_room.room.height,
                base.cols,
                base.rows
            )));
        }
    }

    let total_area = (base.cols * base.rows) as f64;
    if planned.iter().any(|big_room| big_room.kind.is_cross()) {
        let cross_area: u32 = planned.iter().map(|big_room| big_room.room.area()).sum();
        base.add_dug_percentage(CROSS_DUG_FACTOR * cross_area as f64 / total_area);
    } else {
        for _ in &planned {
            base.add_dug_percentage(BIG_ROOM_DUG_INCREMENT);
        }
    }

    for big_room in &planned {
        debug!(
            "Big room {:?} at {} ({}x{})",
            big_room.kind, big_room.room.top_left, big_room.room.width, big_room.room.height
        );
        base.add_extra_room(big_room.room.clone());
    }

    Ok(planned)
}

/// Builds the rectangles listed in the configuration.
fn manual_big_rooms(
    base: &BaseMapGenerator,
    config: &GenerationConfig,
) -> StairwellResult<Vec<BigRoom>> {
    let mut planned = Vec::with_capacity(config.n_big_rooms);

    for i in 0..config.n_big_rooms {
        let missing = |field: &str| {
            StairwellError::InvalidConfig(format!("big room {} has no {} entry", i, field))
        };
        let x = *config.big_room_x.get(i).ok_or_else(|| missing("big_room_x"))?;
        let y = *config.big_room_y.get(i).ok_or_else(|| missing("big_room_y"))?;
        let width = *config
            .big_room_width
            .get(i)
            .ok_or_else(|| missing("big_room_width"))?;
        let height = *config
            .big_room_height
            .get(i)
            .ok_or_else(|| missing("big_room_height"))?;

        if width < 3 || height < 3 {
            return Err(StairwellError::InvalidConfig(format!(
                "big room {} is {}x{}, smaller than 3x3",
                i, width, height
            )));
        }

        let top_left = Position::new(
            resolve_placement(x, base.cols, width),
            resolve_placement(y, base.rows, height),
        );
        planned.push(BigRoom::new(
            BigRoomType::Custom,
            Room::new(0, top_left, width, height),
        ));
    }

    Ok(planned)
}

/// Resolves one axis of a manual placement to a top-left coordinate.
///
/// # Examples
///
/// ```
/// use stairwell::{resolve_placement, Anchor, Placement};
///
/// assert_eq!(resolve_placement(Placement::Anchor(Anchor::Center), 80, 10), 35);
/// assert_eq!(resolve_placement(Placement::At(4), 80, 10), 4);
/// ```
pub fn resolve_placement(placement: Placement, extent: u32, size: u32) -> i32 {
    match placement {
        Placement::At(value) => value,
        Placement::Anchor(Anchor::Center) => extent as i32 / 2 - size as i32 / 2,
    }
}

/// Synthesizes the rectangles of one random big room family.
pub fn random_big_rooms(
    cols: u32,
    rows: u32,
    family: BigRoomFamily,
    rng: &mut StdRng,
) -> Vec<BigRoom> {
    let (c, r) = (cols as i32, rows as i32);

    match family {
        BigRoomFamily::Center => {
            let width = (cols / pick(rng, &[2, 3, 4])).max(3);
            let height = (rows / pick(rng, &[2, 3, 4])).max(3);
            let top_left = Position::new(c / 2 - width as i32 / 2, r / 2 - height as i32 / 2);
            vec![BigRoom::new(
                BigRoomType::Center,
                Room::new(0, top_left, width, height),
            )]
        }
        BigRoomFamily::LargeCorridor => {
            let side = pick(rng, &Side::all());
            let room = match side {
                Side::North | Side::South => {
                    let height = (rows / pick(rng, &[3, 4, 5])).max(3);
                    let y = if side == Side::North {
                        1
                    } else {
                        r - 1 - height as i32
                    };
                    Room::new(0, Position::new(1, y), cols - 2, height)
                }
                Side::East | Side::West => {
                    let width = (cols / pick(rng, &[3, 4, 5])).max(3);
                    let x = if side == Side::West {
                        1
                    } else {
                        c - 1 - width as i32
                    };
                    Room::new(0, Position::new(x, 1), width, rows - 2)
                }
            };
            vec![BigRoom::new(BigRoomType::LargeCorridor(side), room)]
        }
        BigRoomFamily::Cross => {
            let strip_height = (rows / pick(rng, &[4, 5, 6])).max(3);
            let strip_width = (cols / pick(rng, &[4, 5, 6])).max(3);
            let horizontal = Room::new(
                0,
                Position::new(1, r / 2 - strip_height as i32 / 2),
                cols - 2,
                strip_height,
            );
            let vertical = Room::new(
                0,
                Position::new(c / 2 - strip_width as i32 / 2, 1),
                strip_width,
                rows - 2,
            );
            vec![
                BigRoom::new(BigRoomType::CrossHorizontal, horizontal),
                BigRoom::new(BigRoomType::CrossVertical, vertical),
            ]
        }
        BigRoomFamily::Vault => {
            let size = pick(
                rng,
                &[
                    VaultSize::Small,
                    VaultSize::BigHorizontal,
                    VaultSize::BigVertical,
                ],
            );
            // Corners are drawn uniformly; nothing reserves a corner.
            let corner = pick(rng, &Corner::all());
            let (width, height) = match size {
                VaultSize::Small => (cols / 2, rows / 2),
                VaultSize::BigHorizontal => (cols - 2, rows / 2),
                VaultSize::BigVertical => (cols / 2, rows - 2),
            };
            let x = match corner {
                Corner::NorthWest | Corner::SouthWest => 1,
                Corner::NorthEast | Corner::SouthEast => c - 1 - width as i32,
            };
            let y = match corner {
                Corner::NorthWest | Corner::NorthEast => 1,
                Corner::SouthWest | Corner::SouthEast => r - 1 - height as i32,
            };
            vec![BigRoom::new(
                BigRoomType::Vault { size, corner },
                Room::new(0, Position::new(x, y), width, height),
            )]
        }
    }
}

fn pick<T: Copy>(rng: &mut StdRng, options: &[T]) -> T {
    options[rng.gen_range(0..options.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DUG_MAX;
    use crate::generation::utils::create_rng;

    fn manual_config(x: Placement, y: Placement, width: u32, height: u32) -> GenerationConfig {
        GenerationConfig {
            n_big_rooms: 1,
            big_room_x: vec![x],
            big_room_y: vec![y],
            big_room_width: vec![width],
            big_room_height: vec![height],
            ..GenerationConfig::new(5)
        }
    }

    #[test]
    fn test_manual_center_big_room() {
        let center = Placement::Anchor(Anchor::Center);
        let config = manual_config(center, center, 10, 10);
        let mut rng = create_rng(&config);
        let mut base = BaseMapGenerator::new(80, 40, &config);
        let before = base.dug_percentage();

        let planned = plan_big_rooms(&mut base, &config, &mut rng).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, BigRoomType::Custom);
        assert_eq!(planned[0].room.center(), Position::new(40, 20));
        assert_eq!(planned[0].room.big_room, Some(BigRoomType::Custom));
        assert_eq!(base.extra_rooms().len(), 1);
        assert!((base.dug_percentage() - before - BIG_ROOM_DUG_INCREMENT).abs() < 1e-9);
    }

    #[test]
    fn test_manual_big_room_out_of_bounds() {
        let config = manual_config(Placement::At(0), Placement::At(5), 10, 10);
        let mut rng = create_rng(&config);
        let mut base = BaseMapGenerator::new(80, 40, &config);

        let result = plan_big_rooms(&mut base, &config, &mut rng);
        assert!(matches!(result, Err(StairwellError::InvalidConfig(_))));
        assert!(base.extra_rooms().is_empty());
    }

    #[test]
    fn test_manual_big_room_missing_entry() {
        let mut config = manual_config(Placement::At(2), Placement::At(2), 10, 10);
        config.n_big_rooms = 2;
        let mut rng = create_rng(&config);
        let mut base = BaseMapGenerator::new(80, 40, &config);

        assert!(plan_big_rooms(&mut base, &config, &mut rng).is_err());
    }

    #[test]
    fn test_no_big_room_without_chance() {
        let mut config = GenerationConfig::new(3);
        config.big_room_chance = 0.0;
        let mut rng = create_rng(&config);
        let mut base = BaseMapGenerator::new(80, 40, &config);

        assert!(plan_big_rooms(&mut base, &config, &mut rng)
            .unwrap()
            .is_empty());
        assert!(base.extra_rooms().is_empty());
    }

    #[test]
    fn test_random_families_fit_the_map() {
        let config = GenerationConfig::new(11);
        let base = BaseMapGenerator::new(80, 40, &config);
        let mut rng = create_rng(&config);

        for family in BigRoomFamily::ALL {
            for _ in 0..25 {
                for big_room in random_big_rooms(80, 40, family, &mut rng) {
                    assert!(
                        base.room_fits_in_level(&big_room.room),
                        "{:?} does not fit",
                        big_room
                    );
                }
            }
        }
    }

    #[test]
    fn test_cross_has_two_centered_strips() {
        let config = GenerationConfig::new(11);
        let mut rng = create_rng(&config);
        let cross = random_big_rooms(80, 40, BigRoomFamily::Cross, &mut rng);

        assert_eq!(cross.len(), 2);
        assert_eq!(cross[0].kind, BigRoomType::CrossHorizontal);
        assert_eq!(cross[1].kind, BigRoomType::CrossVertical);
        assert_eq!(cross[0].room.width, 78);
        assert_eq!(cross[1].room.height, 38);
        assert!((cross[0].room.center().y - 20).abs() <= 1);
        assert!((cross[1].room.center().x - 40).abs() <= 1);
    }

    #[test]
    fn test_cross_dug_increment_is_capped() {
        let mut found_cross = false;
        for seed in 0..200 {
            let mut config = GenerationConfig::new(seed);
            config.big_room_chance = 1.0;
            config.dug_percentage = Some(0.7);
            let mut rng = create_rng(&config);
            let mut base = BaseMapGenerator::new(80, 40, &config);

            let planned = plan_big_rooms(&mut base, &config, &mut rng).unwrap();
            if planned.iter().any(|big_room| big_room.kind.is_cross()) {
                found_cross = true;
                assert_eq!(planned.len(), 2);
                assert!((base.dug_percentage() - DUG_MAX).abs() < 1e-9);
                break;
            }
        }
        assert!(found_cross);
    }

    #[test]
    fn test_vault_sits_in_its_corner() {
        let config = GenerationConfig::new(8);
        let mut rng = create_rng(&config);
        for _ in 0..40 {
            let vault = random_big_rooms(60, 30, BigRoomFamily::Vault, &mut rng).remove(0);
            let BigRoomType::Vault { corner, .. } = vault.kind else {
                panic!("expected a vault, got {:?}", vault.kind);
            };
            let (tl, br) = vault.room.outer_bbox();
            match corner {
                Corner::NorthWest => assert_eq!(tl, Position::new(1, 1)),
                Corner::NorthEast => assert_eq!((br.x, tl.y), (58, 1)),
                Corner::SouthWest => assert_eq!((tl.x, br.y), (1, 28)),
                Corner::SouthEast => assert_eq!(br, Position::new(58, 28)),
            }
        }
    }

    #[test]
    fn test_dug_percentage_never_exceeds_max() {
        for seed in 0..50 {
            let mut config = GenerationConfig::new(seed);
            config.big_room_chance = 1.0;
            config.dug_percentage = Some(0.6);
            let mut rng = create_rng(&config);
            let mut base = BaseMapGenerator::new(80, 40, &config);

            plan_big_rooms(&mut base, &config, &mut rng).unwrap();
            assert!(base.dug_percentage() <= DUG_MAX);
        }
    }
}
