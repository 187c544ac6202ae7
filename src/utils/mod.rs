//! # Utilities Module
//!
//! Grid search helpers shared by the generation stages: shortest paths and
//! flood fills.

pub mod floodfill;
pub mod pathfinding;

pub use self::floodfill::*;
pub use self::pathfinding::*;
