//! # Dungeon Generation
//!
//! Drives one level through every stage:
//!
//! ```text
//! BaseMapCreated -> BigRoomsPlaced -> FeaturesDecorated -> StairsPlaced
//!     -> CriticalPathEnforced -> Verified | Rejected -> MarkersCleaned -> Done
//! ```
//!
//! A rejected level is thrown away whole and generated again from a fresh
//! base map, unless the configuration asks for an error instead. Per-attempt
//! bookkeeping travels in an [`Extras`] bag that never outlives the attempt.

use crate::generation::{
    decorate, enforce_critical_path, plan_big_rooms, place_stairs, connectivity_report,
    utils, BaseMap, BaseMapGenerator, BigRoom, ConnectivityReport, Corridor, GenerationConfig,
    Generator, Outcome, SplashTheme,
};
use crate::map::{Level, Marker, Position};
use crate::{StairwellError, StairwellResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages, logged as the generator moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationStage {
    BaseMapCreated,
    BigRoomsPlaced,
    FeaturesDecorated,
    StairsPlaced,
    CriticalPathEnforced,
    Verified,
    Rejected,
    MarkersCleaned,
    Done,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStage::BaseMapCreated => "base map created",
            GenerationStage::BigRoomsPlaced => "big rooms placed",
            GenerationStage::FeaturesDecorated => "features decorated",
            GenerationStage::StairsPlaced => "stairs placed",
            GenerationStage::CriticalPathEnforced => "critical path enforced",
            GenerationStage::Verified => "verified",
            GenerationStage::Rejected => "rejected",
            GenerationStage::MarkersCleaned => "markers cleaned",
            GenerationStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Scratch data shared by the stages of one generation attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extras {
    pub corridors: Vec<Corridor>,
    pub big_rooms: Vec<BigRoom>,
    /// IDs of rooms with a single door
    pub terms: Vec<u32>,
    pub start_point: Option<Position>,
    pub end_point: Option<Position>,
    pub critical_path: Vec<Position>,
    pub theme: Option<SplashTheme>,
}

/// A finished level and what downstream consumers need to know about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLevel {
    pub level: Level,
    pub big_rooms: Vec<BigRoom>,
    /// Up staircase, where the critical path starts
    pub start_point: Position,
    /// Down staircase, where the critical path ends
    pub end_point: Position,
    pub critical_path: Vec<Position>,
    /// IDs of dead-end rooms
    pub terms: Vec<u32>,
    pub theme: Option<SplashTheme>,
    /// Full generation attempts it took, the accepted one included
    pub attempts: u32,
}

enum Attempt {
    Accepted { level: Level, extras: Extras },
    Rejected { level: Level, report: ConnectivityReport },
}

/// Generates complete dungeon levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a `cols`×`rows` level.
    ///
    /// Retry exhaustion inside a stage is tolerated; the best result found is
    /// used. A level that fails the connectivity check is regenerated from
    /// scratch while `rerun_on_failure` is set and `max_regenerations` allows,
    /// or reported as [`StairwellError::Disconnected`] with
    /// `error_on_failure`.
    pub fn create(
        &self,
        cols: u32,
        rows: u32,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> StairwellResult<GeneratedLevel> {
        config.validate(cols, rows)?;
        regenerate(cols, rows, config, rng, |rng| {
            self.attempt(cols, rows, config, rng)
        })
    }

    fn attempt(
        &self,
        cols: u32,
        rows: u32,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> StairwellResult<Attempt> {
        let mut base = BaseMapGenerator::new(cols, rows, config);
        let big_rooms = plan_big_rooms(&mut base, config, rng)?;

        let BaseMap {
            mut level,
            rooms,
            corridors,
        } = create_base_map(&base, config, rng)?.value;
        level.rooms = rooms;
        stage(GenerationStage::BaseMapCreated);

        let mut extras = Extras {
            corridors,
            big_rooms,
            ..Extras::default()
        };
        stage(GenerationStage::BigRoomsPlaced);

        decorate(&mut level, &mut extras, rng)?;
        stage(GenerationStage::FeaturesDecorated);

        place_stairs(&mut level, &mut extras, config.stairs_watchdog, rng)?;
        stage(GenerationStage::StairsPlaced);

        enforce_critical_path(
            &mut level,
            &mut extras,
            config.min_path_len,
            config.max_path_breaks,
        )?;
        stage(GenerationStage::CriticalPathEnforced);

        if config.verify_connectivity {
            let report = connectivity_report(&level);
            if !report.within(config.max_unreachable) {
                stage(GenerationStage::Rejected);
                return Ok(Attempt::Rejected { level, report });
            }
            stage(GenerationStage::Verified);
        }

        Ok(Attempt::Accepted { level, extras })
    }
}

/// Runs attempts until one is accepted or the rejection policy gives up.
fn regenerate<F>(
    cols: u32,
    rows: u32,
    config: &GenerationConfig,
    rng: &mut StdRng,
    mut attempt: F,
) -> StairwellResult<GeneratedLevel>
where
    F: FnMut(&mut StdRng) -> StairwellResult<Attempt>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt(rng)? {
            Attempt::Accepted { mut level, extras } => {
                if config.should_remove_markers {
                    remove_markers(&mut level, &config.preserved_markers());
                    stage(GenerationStage::MarkersCleaned);
                }
                stage(GenerationStage::Done);
                info!(
                    "Generated {}x{} level in {} attempt(s): {} rooms, critical path {}",
                    cols,
                    rows,
                    attempts,
                    level.rooms.len(),
                    extras.critical_path.len()
                );
                return finish(level, extras, attempts);
            }
            Attempt::Rejected { level, report } => {
                reject(&level, &report, attempts, config)?;
                warn!(
                    "Attempt {} rejected: {} of {} cells unreachable; regenerating",
                    attempts,
                    report.unreachable(),
                    report.total
                );
            }
        }
    }
}

/// Decides what happens to a level that failed the connectivity check.
///
/// `Ok` means generate again from scratch.
fn reject(
    level: &Level,
    report: &ConnectivityReport,
    attempts: u32,
    config: &GenerationConfig,
) -> StairwellResult<()> {
    if config.error_on_failure {
        return Err(StairwellError::Disconnected {
            unreachable: report.unreachable(),
            allowed: config.max_unreachable,
            dump: level.to_ascii(),
        });
    }
    if !config.rerun_on_failure {
        return Err(StairwellError::GenerationFailed(format!(
            "{} cells unreachable (allowed {})",
            report.unreachable(),
            config.max_unreachable
        )));
    }
    match config.max_regenerations {
        Some(max) if attempts > max => Err(StairwellError::GenerationFailed(format!(
            "no connected level after {} attempts",
            attempts
        ))),
        _ => Ok(()),
    }
}

fn stage(stage: GenerationStage) {
    debug!("Stage: {}", stage);
}

fn finish(level: Level, extras: Extras, attempts: u32) -> StairwellResult<GeneratedLevel> {
    let Extras {
        big_rooms,
        terms,
        start_point,
        end_point,
        critical_path,
        theme,
        ..
    } = extras;

    match (start_point, end_point) {
        (Some(start_point), Some(end_point)) => Ok(GeneratedLevel {
            level,
            big_rooms,
            start_point,
            end_point,
            critical_path,
            terms,
            theme,
            attempts,
        }),
        _ => Err(StairwellError::InvalidState(
            "level finished without stairs".to_string(),
        )),
    }
}

/// Creates base maps until one has `min_num_rooms` rooms, keeping the
/// roomiest if `room_count_watchdog` runs out first.
pub fn create_base_map(
    base: &BaseMapGenerator,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> StairwellResult<Outcome<BaseMap>> {
    let mut best = base.create(config, rng)?;
    for _ in 1..config.room_count_watchdog {
        if best.rooms.len() >= config.min_num_rooms {
            return Ok(Outcome::done(best));
        }
        let candidate = base.create(config, rng)?;
        if candidate.rooms.len() > best.rooms.len() {
            best = candidate;
        }
    }

    if best.rooms.len() >= config.min_num_rooms {
        Ok(Outcome::done(best))
    } else {
        warn!(
            "Room count watchdog exhausted with {} of {} rooms",
            best.rooms.len(),
            config.min_num_rooms
        );
        Ok(Outcome::exhausted(best))
    }
}

/// Strips every marker not in `keep`. Running it again changes nothing.
///
/// # Examples
///
/// ```
/// use stairwell::{Level, Marker, Position};
/// use stairwell::generation::remove_markers;
///
/// let mut level = Level::new(4, 4);
/// level.add_marker(Position::new(1, 1), Marker::Term).unwrap();
/// level.add_marker(Position::new(2, 2), Marker::CriticalPath).unwrap();
///
/// remove_markers(&mut level, &[Marker::CriticalPath]);
/// assert!(!level.has_marker(Position::new(1, 1), Marker::Term));
/// assert!(level.has_marker(Position::new(2, 2), Marker::CriticalPath));
/// ```
pub fn remove_markers(level: &mut Level, keep: &[Marker]) {
    let before = level.markers.len();
    level.markers.retain_only(keep);
    debug!("Marker cleanup: {} -> {} markers", before, level.markers.len());
}

/// Generates a level sized and seeded by the configuration alone.
pub fn generate_level(config: &GenerationConfig) -> StairwellResult<GeneratedLevel> {
    let mut rng = utils::create_rng(config);
    DungeonGenerator::new().create(config.cols, config.rows, config, &mut rng)
}

impl Generator<GeneratedLevel> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> StairwellResult<GeneratedLevel> {
        self.create(config.cols, config.rows, config, rng)
    }

    fn validate(&self, content: &GeneratedLevel, config: &GenerationConfig) -> StairwellResult<()> {
        utils::validate_level(&content.level)?;

        if content.level.stairs().len() != 2 {
            return Err(StairwellError::InvalidState(format!(
                "expected 2 stairs, found {}",
                content.level.stairs().len()
            )));
        }
        if content.critical_path.is_empty() {
            return Err(StairwellError::InvalidState(
                "critical path is empty".to_string(),
            ));
        }
        if config.verify_connectivity {
            let report = connectivity_report(&content.level);
            if !report.within(config.max_unreachable) {
                return Err(StairwellError::Disconnected {
                    unreachable: report.unreachable(),
                    allowed: config.max_unreachable,
                    dump: content.level.to_ascii(),
                });
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}
