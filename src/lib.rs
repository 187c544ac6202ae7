//! # Stairwell
//!
//! Single-level dungeon generation: big rooms, doors, linked stairs and a
//! critical path of guaranteed (best-effort) minimum length.
//!
//! ## Architecture Overview
//!
//! Generation runs as a strictly sequential pipeline over a private grid:
//!
//! - **Base map**: rooms and L-shaped corridors carved into an all-wall grid
//! - **Big rooms**: oversized set-pieces (center, large corridor, cross, vault)
//!   registered with the base map before carving
//! - **Features**: elemental splashes on big rooms, doors and wall markers on
//!   normal rooms, dead-end detection, fire hazards
//! - **Stairs**: two rooms far apart (by path distance) get linked stairs
//! - **Critical path**: doors along a too-short route are walled off until the
//!   route between the stairs is long enough, or no door is left to break
//! - **Verification**: flood fill connectivity check, with full regeneration
//!   on failure
//! - **Cleanup**: transient markers are stripped except an allow-list
//!
//! ```
//! use stairwell::{DungeonGenerator, GenerationConfig};
//! use stairwell::generation::utils::create_rng;
//!
//! let config = GenerationConfig::for_testing(7);
//! let mut rng = create_rng(&config);
//! let generated = DungeonGenerator::new()
//!     .create(60, 30, &config, &mut rng)
//!     .unwrap();
//! assert!(!generated.critical_path.is_empty());
//! ```

pub mod generation;
pub mod map;
pub mod utils;

pub use generation::*;
pub use map::*;

/// Core error type for the Stairwell generator.
#[derive(thiserror::Error, Debug)]
pub enum StairwellError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration is unusable (empty room list, out-of-bounds big room, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pipeline reached a state that another stage should have prevented
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Connectivity verification rejected the level
    #[error("Level is disconnected: {unreachable} unreachable cells (max {allowed})\n{dump}")]
    Disconnected {
        unreachable: usize,
        allowed: usize,
        dump: String,
    },
}

/// Result type used throughout the Stairwell codebase.
pub type StairwellResult<T> = Result<T, StairwellError>;

/// Version information for the generator.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 40;

    /// Chance that a level gets a random big room when none are configured
    pub const PROB_BIG_ROOM: f64 = 0.2;

    /// Ceiling for the base map's dug percentage
    pub const DUG_MAX: f64 = 0.75;

    /// Dug percentage added for each big room placement
    pub const BIG_ROOM_DUG_INCREMENT: f64 = 0.1;

    /// Multiplier applied to the area fraction of a cross
    pub const CROSS_DUG_FACTOR: f64 = 1.6;

    /// Shortest acceptable critical path, in cells
    pub const MIN_PATH_LEN: usize = 50;

    /// Floor cells allowed to be unreachable from the rest of the level
    pub const MAX_UNREACHABLE: usize = 10;

    /// Iterations spent looking for a distant stairs pair
    pub const STAIRS_WATCHDOG: u32 = 100;
}
