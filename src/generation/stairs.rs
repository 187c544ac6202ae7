//! # Stairs Placement
//!
//! Picks the two normal rooms that lie furthest apart, measured along the
//! walkable route between their centers, and links them with a down and an
//! up staircase.

use crate::generation::{Extras, Outcome};
use crate::map::{Level, Marker, Position, StairDirection};
use crate::utils::shortest_passable_path_with_doors;
use crate::{StairwellError, StairwellResult};
use log::{debug, warn};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Where the stairs ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StairsPlacement {
    /// Up staircase; the critical path starts here
    pub start_point: Position,
    /// Down staircase; the critical path ends here
    pub end_point: Position,
    /// Index of the room holding the down staircase
    pub down_room: usize,
    /// Index of the room holding the up staircase
    pub up_room: usize,
    /// Route length between the two room centers, in cells
    pub distance: usize,
}

/// Distance a room pair must exceed to stop sampling early.
///
/// # Examples
///
/// ```
/// use stairwell::generation::min_room_distance;
///
/// assert_eq!(min_room_distance(80, 40), 60);
/// assert_eq!(min_room_distance(61, 31), 45);
/// ```
pub fn min_room_distance(cols: u32, rows: u32) -> usize {
    (cols / 2 + rows / 2) as usize
}

/// Places the stairs and records both points in the extras bag.
///
/// Samples up to `watchdog` distinct room pairs and keeps the one with the
/// longest route between centers. Pairs without any route are skipped, but
/// the first sample is kept as a fallback so a placement is always made.
/// The outcome is marked exhausted when no pair beat [`min_room_distance`].
pub fn place_stairs(
    level: &mut Level,
    extras: &mut Extras,
    watchdog: u32,
    rng: &mut StdRng,
) -> StairwellResult<Outcome<StairsPlacement>> {
    let room_count = level.rooms.len();
    if room_count == 0 {
        return Err(StairwellError::InvalidState(
            "cannot place stairs on a level without rooms".to_string(),
        ));
    }

    if room_count == 1 {
        let corners = level.rooms[0].inner_corners();
        if corners[0] == corners[3] {
            return Err(StairwellError::InvalidState(
                "a single room needs at least two interior cells for stairs".to_string(),
            ));
        }
        let placement = StairsPlacement {
            start_point: corners[3],
            end_point: corners[0],
            down_room: 0,
            up_room: 0,
            distance: corners[0].manhattan_distance(corners[3]) as usize + 1,
        };
        commit(level, extras, &placement)?;
        debug!("Single room: stairs in opposite corners");
        return Ok(Outcome::exhausted(placement));
    }

    let threshold = min_room_distance(level.width, level.height);
    let mut best: Option<(usize, usize, usize)> = None;
    let mut fallback: Option<(usize, usize)> = None;
    let mut met = false;

    for _ in 0..watchdog {
        let first = rng.gen_range(0..room_count);
        let mut second = rng.gen_range(0..room_count - 1);
        if second >= first {
            second += 1;
        }
        fallback.get_or_insert((first, second));

        let path = shortest_passable_path_with_doors(
            level,
            level.rooms[first].center(),
            level.rooms[second].center(),
        );
        if path.is_empty() {
            continue;
        }

        let distance = path.len();
        if best.map_or(true, |(_, _, longest)| distance > longest) {
            best = Some((first, second, distance));
        }
        if distance > threshold {
            met = true;
            break;
        }
    }

    let (down_room, up_room, distance) = match (best, fallback) {
        (Some(pair), _) => pair,
        (None, Some((first, second))) => {
            warn!("No sampled room pair is connected; using the first sample");
            (first, second, 0)
        }
        (None, None) => {
            return Err(StairwellError::InvalidConfig(
                "stairs watchdog must allow at least one sample".to_string(),
            ))
        }
    };

    let placement = StairsPlacement {
        start_point: level.rooms[up_room].center(),
        end_point: level.rooms[down_room].center(),
        down_room,
        up_room,
        distance,
    };
    commit(level, extras, &placement)?;

    if met {
        debug!("Stairs {} apart (threshold {})", distance, threshold);
        Ok(Outcome::done(placement))
    } else {
        warn!(
            "Stairs watchdog exhausted; best distance {} of {}",
            distance, threshold
        );
        Ok(Outcome::exhausted(placement))
    }
}

fn commit(level: &mut Level, extras: &mut Extras, placement: &StairsPlacement) -> StairwellResult<()> {
    let StairsPlacement {
        start_point,
        end_point,
        down_room,
        up_room,
        ..
    } = *placement;

    level.add_stairs(end_point, StairDirection::Down, start_point)?;
    level.add_stairs(start_point, StairDirection::Up, end_point)?;
    level.rooms[down_room].add_stairs(end_point, StairDirection::Down)?;
    level.rooms[up_room].add_stairs(start_point, StairDirection::Up)?;
    level.add_marker(start_point, Marker::StartPoint)?;
    level.add_marker(end_point, Marker::EndPoint)?;

    extras.start_point = Some(start_point);
    extras.end_point = Some(end_point);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;
    use crate::generation::{GenerationConfig, Room};
    use crate::map::{Element, Terrain};

    fn carve(level: &mut Level, room: &Room) {
        for pos in room.floor_positions() {
            level.set_terrain(pos, Terrain::Floor).unwrap();
        }
    }

    fn carve_row(level: &mut Level, y: i32, xs: std::ops::RangeInclusive<i32>) {
        for x in xs {
            level.set_terrain(Position::new(x, y), Terrain::Floor).unwrap();
        }
    }

    /// Three rooms in an L: 0 and 1 on the top row, 2 below room 1.
    fn three_rooms() -> Level {
        let mut level = Level::new(30, 12);
        let rooms = vec![
            Room::new(0, Position::new(1, 1), 5, 5),
            Room::new(1, Position::new(10, 1), 5, 5),
            Room::new(2, Position::new(10, 7), 5, 5),
        ];
        for room in &rooms {
            carve(&mut level, room);
        }
        carve_row(&mut level, 3, 5..=10);
        for y in 5..=7 {
            level.set_terrain(Position::new(12, y), Terrain::Floor).unwrap();
        }
        level.rooms = rooms;
        level
    }

    fn rng() -> StdRng {
        create_rng(&GenerationConfig::new(11))
    }

    #[test]
    fn test_no_rooms_is_an_error() {
        let mut level = Level::new(10, 10);
        let mut extras = Extras::default();
        assert!(place_stairs(&mut level, &mut extras, 100, &mut rng()).is_err());
    }

    #[test]
    fn test_zero_watchdog_is_an_error() {
        let mut level = three_rooms();
        let mut extras = Extras::default();
        assert!(matches!(
            place_stairs(&mut level, &mut extras, 0, &mut rng()),
            Err(StairwellError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_room_uses_opposite_corners() {
        let mut level = Level::new(12, 12);
        let room = Room::new(0, Position::new(2, 2), 6, 6);
        carve(&mut level, &room);
        level.rooms = vec![room];
        let mut extras = Extras::default();

        let outcome = place_stairs(&mut level, &mut extras, 100, &mut rng()).unwrap();
        assert_eq!(outcome.value.end_point, Position::new(3, 3));
        assert_eq!(outcome.value.start_point, Position::new(6, 6));
        assert_eq!(level.stairs().len(), 2);
    }

    #[test]
    fn test_single_one_cell_room_is_an_error() {
        let mut level = Level::new(8, 8);
        let room = Room::new(0, Position::new(2, 2), 3, 3);
        carve(&mut level, &room);
        level.rooms = vec![room];
        let mut extras = Extras::default();

        assert!(matches!(
            place_stairs(&mut level, &mut extras, 100, &mut rng()),
            Err(StairwellError::InvalidState(_))
        ));
        assert!(level.stairs().is_empty());
        assert_eq!(extras.start_point, None);
    }

    #[test]
    fn test_far_pair_stops_early() {
        let mut level = Level::new(20, 6);
        let rooms = vec![
            Room::new(0, Position::new(1, 1), 3, 3),
            Room::new(1, Position::new(16, 1), 3, 3),
        ];
        for room in &rooms {
            carve(&mut level, room);
        }
        carve_row(&mut level, 2, 3..=16);
        level.rooms = rooms;
        let mut extras = Extras::default();

        let outcome = place_stairs(&mut level, &mut extras, 100, &mut rng()).unwrap();
        assert!(!outcome.exhausted);
        assert_eq!(outcome.value.distance, 16);
        assert!(outcome.value.distance > min_room_distance(20, 6));
    }

    #[test]
    fn test_exhausted_watchdog_keeps_best_pair() {
        let mut level = three_rooms();
        let mut extras = Extras::default();

        let outcome = place_stairs(&mut level, &mut extras, 100, &mut rng()).unwrap();
        assert!(outcome.exhausted);

        let mut rooms = [outcome.value.down_room, outcome.value.up_room];
        rooms.sort_unstable();
        assert_eq!(rooms, [0, 2]);
        assert_eq!(outcome.value.distance, 16);
    }

    #[test]
    fn test_stairs_are_linked_and_marked() {
        let mut level = three_rooms();
        let mut extras = Extras::default();
        let placement = place_stairs(&mut level, &mut extras, 100, &mut rng())
            .unwrap()
            .value;

        assert_eq!(extras.start_point, Some(placement.start_point));
        assert_eq!(extras.end_point, Some(placement.end_point));
        assert_eq!(level.stairs_up_position, Some(placement.start_point));
        assert_eq!(level.stairs_down_position, Some(placement.end_point));
        assert!(level.has_marker(placement.start_point, Marker::StartPoint));
        assert!(level.has_marker(placement.end_point, Marker::EndPoint));

        match level.get_cell(placement.end_point).unwrap().element {
            Some(Element::Stairs(stairs)) => {
                assert_eq!(stairs.direction, StairDirection::Down);
                assert_eq!(stairs.target, placement.start_point);
            }
            other => panic!("expected down stairs, found {:?}", other),
        }
        assert_eq!(level.rooms[placement.down_room].stairs.len(), 1);
        assert_eq!(level.rooms[placement.up_room].stairs.len(), 1);
    }
}
