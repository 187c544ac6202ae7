//! # Critical Path
//!
//! Lengthens the walk between the stairs. While the shortest route is shorter
//! than the configured minimum, the first door along it is broken (turned to
//! wall) and the route is recomputed, forcing a detour. Breaking stops when no
//! door is left on the route, when a break would cut the stairs apart (that
//! break is rolled back), or when the break budget runs out.
//!
//! The result is best effort: a route without doors cannot be lengthened.

use crate::generation::{Extras, Outcome};
use crate::map::{Level, Marker, Position};
use crate::utils::{shortest_passable_path_with_doors, shortest_path};
use crate::{StairwellError, StairwellResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// What the enforcer did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CriticalPathReport {
    /// Final route from the start point to the end point, both included
    pub path: Vec<Position>,
    /// Doors that were walled off
    pub broken_doors: Vec<Position>,
    /// Length of every accepted route, in order
    pub lengths: Vec<usize>,
    /// Set when the last break cut the stairs apart and was undone
    pub rolled_back: bool,
}

/// Enforces a minimum route length between the stairs recorded in `extras`.
///
/// Fails when either stairs point is missing or no route exists at all. The
/// outcome is marked exhausted when `max_breaks` ran out before the route
/// reached `min_path_len`.
pub fn enforce_critical_path(
    level: &mut Level,
    extras: &mut Extras,
    min_path_len: usize,
    max_breaks: u32,
) -> StairwellResult<Outcome<CriticalPathReport>> {
    let (start, end) = match (extras.start_point, extras.end_point) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(StairwellError::InvalidState(
                "critical path requested before the stairs were placed".to_string(),
            ))
        }
    };

    let mut path = shortest_passable_path_with_doors(level, start, end);
    if path.is_empty() {
        return Err(StairwellError::GenerationFailed(format!(
            "no path between stairs {} and {}",
            start, end
        )));
    }

    let mut report = CriticalPathReport {
        lengths: vec![path.len()],
        ..CriticalPathReport::default()
    };
    let mut breaks = 0;
    let mut exhausted = false;

    while path.len() < min_path_len {
        if breaks >= max_breaks {
            warn!("Path break budget of {} exhausted at length {}", max_breaks, path.len());
            exhausted = true;
            break;
        }

        let door = match path.iter().copied().find(|&pos| level.has_door(pos)) {
            Some(door) => door,
            None => {
                debug!("No door left to break on a path of length {}", path.len());
                break;
            }
        };

        level.add_marker(door, Marker::PathBroken)?;
        breaks += 1;

        let rerouted = shortest_path(level, start, end, |pos| {
            level.is_passable_or_door(pos) && !level.has_marker(pos, Marker::PathBroken)
        });
        if rerouted.is_empty() {
            level.remove_marker(door, Marker::PathBroken);
            report.rolled_back = true;
            warn!("Breaking door {} cuts the stairs apart; rolled back", door);
            break;
        }

        debug!("Broke door {}: path {} -> {}", door, path.len(), rerouted.len());
        path = rerouted;
        report.lengths.push(path.len());
    }

    for pos in level.positions_with_marker(Marker::PathBroken) {
        level.wall_off(pos)?;
        for room in level.rooms.iter_mut() {
            room.doors.retain(|&door| door != pos);
        }
        report.broken_doors.push(pos);
    }

    for &pos in &path {
        level.add_marker(pos, Marker::CriticalPath)?;
    }
    extras.critical_path = path.clone();
    report.path = path;

    debug!(
        "Critical path of length {} after {} break(s)",
        report.path.len(),
        report.broken_doors.len()
    );
    Ok(if exhausted {
        Outcome::exhausted(report)
    } else {
        Outcome::done(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Room;
    use crate::map::Terrain;

    fn floor(level: &mut Level, x: i32, y: i32) {
        level.set_terrain(Position::new(x, y), Terrain::Floor).unwrap();
    }

    fn door(level: &mut Level, room: &mut Room, x: i32, y: i32) {
        let pos = Position::new(x, y);
        floor(level, x, y);
        level.add_door(pos).unwrap();
        room.add_door(pos).unwrap();
    }

    /// Two rooms joined by a short corridor on row 2 and a long detour
    /// through row 7.
    fn two_routes() -> (Level, Extras) {
        let mut level = Level::new(20, 10);
        let mut a = Room::new(0, Position::new(0, 0), 5, 5);
        let mut b = Room::new(1, Position::new(14, 0), 5, 5);
        for pos in a.floor_positions().into_iter().chain(b.floor_positions()) {
            level.set_terrain(pos, Terrain::Floor).unwrap();
        }

        for x in 5..=13 {
            floor(&mut level, x, 2);
        }
        door(&mut level, &mut a, 4, 2);
        door(&mut level, &mut b, 14, 2);

        door(&mut level, &mut a, 2, 4);
        door(&mut level, &mut b, 16, 4);
        for y in 5..=7 {
            floor(&mut level, 2, y);
            floor(&mut level, 16, y);
        }
        for x in 3..=15 {
            floor(&mut level, x, 7);
        }

        level.rooms = vec![a, b];
        let extras = Extras {
            start_point: Some(Position::new(2, 2)),
            end_point: Some(Position::new(16, 2)),
            ..Extras::default()
        };
        (level, extras)
    }

    #[test]
    fn test_long_enough_path_is_kept() {
        let (mut level, mut extras) = two_routes();
        let outcome = enforce_critical_path(&mut level, &mut extras, 10, 100).unwrap();

        assert!(!outcome.exhausted);
        assert_eq!(outcome.value.path.len(), 15);
        assert!(outcome.value.broken_doors.is_empty());
        assert_eq!(extras.critical_path, outcome.value.path);
        assert!(level.has_marker(Position::new(9, 2), Marker::CriticalPath));
    }

    #[test]
    fn test_break_forces_detour_then_rolls_back() {
        let (mut level, mut extras) = two_routes();
        let report = enforce_critical_path(&mut level, &mut extras, 1000, 100)
            .unwrap()
            .value;

        assert_eq!(report.lengths, vec![15, 25]);
        assert_eq!(report.path.len(), 25);
        assert!(report.rolled_back);
        assert_eq!(report.broken_doors, vec![Position::new(4, 2)]);

        assert_eq!(level.terrain_at(Position::new(4, 2)), Some(Terrain::Wall));
        assert!(!level.has_door(Position::new(4, 2)));
        assert!(level.has_door(Position::new(2, 4)));
        assert!(!level.has_marker(Position::new(2, 4), Marker::PathBroken));
        assert!(!level.rooms[0].doors.contains(&Position::new(4, 2)));
        assert!(level.rooms[0].doors.contains(&Position::new(2, 4)));
        assert!(level.has_marker(Position::new(9, 7), Marker::CriticalPath));
        assert!(!level.has_marker(Position::new(9, 2), Marker::CriticalPath));
    }

    #[test]
    fn test_break_budget_exhausts() {
        let (mut level, mut extras) = two_routes();
        let outcome = enforce_critical_path(&mut level, &mut extras, 1000, 0).unwrap();

        assert!(outcome.exhausted);
        assert_eq!(outcome.value.path.len(), 15);
        assert!(level.has_door(Position::new(4, 2)));
    }

    #[test]
    fn test_no_door_stops_breaking() {
        let mut level = Level::new(12, 5);
        for x in 1..=10 {
            floor(&mut level, x, 2);
        }
        let mut extras = Extras {
            start_point: Some(Position::new(1, 2)),
            end_point: Some(Position::new(10, 2)),
            ..Extras::default()
        };

        let outcome = enforce_critical_path(&mut level, &mut extras, 50, 100).unwrap();
        assert!(!outcome.exhausted);
        assert!(!outcome.value.rolled_back);
        assert_eq!(outcome.value.lengths, vec![10]);
    }

    #[test]
    fn test_missing_stairs_is_an_error() {
        let (mut level, _) = two_routes();
        let mut extras = Extras::default();
        assert!(matches!(
            enforce_critical_path(&mut level, &mut extras, 50, 100),
            Err(StairwellError::InvalidState(_))
        ));
    }

    #[test]
    fn test_unreachable_stairs_is_an_error() {
        let mut level = Level::new(10, 5);
        floor(&mut level, 1, 1);
        floor(&mut level, 8, 3);
        let mut extras = Extras {
            start_point: Some(Position::new(1, 1)),
            end_point: Some(Position::new(8, 3)),
            ..Extras::default()
        };
        assert!(matches!(
            enforce_critical_path(&mut level, &mut extras, 50, 100),
            Err(StairwellError::GenerationFailed(_))
        ));
    }
}
