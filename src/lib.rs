//! Tank Arena - deterministic simulation core for a top-down tank battle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, units, collisions, round state)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `audio`: Sound events emitted by the simulation
//! - `roster`: Round outcome and player carry-over between rounds
//! - `error`: Configuration and level loading errors

pub mod audio;
pub mod error;
pub mod roster;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::SimConfig;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (ms)
    pub const SIM_DT_MS: u32 = 16;

    /// Edge length of a terrain tile in pixels
    pub const TILE: i32 = 16;

    /// Turning snaps the off-axis coordinate to the tile grid within this distance
    pub const SNAP_EPSILON: f32 = 5.0;
    /// Projectiles spawn overlapping the shooter's leading edge by this much
    pub const MUZZLE_OVERLAP: f32 = 4.0;

    /// Speed multiplier for fast enemies and powered-up players
    pub const SPEED_BOOST: f32 = 1.3;

    /// Base projectile cap for players
    pub const PLAYER_PROJECTILE_CAP: usize = 2;
    /// Highest power tier a player can reach
    pub const MAX_POWER_TIER: u32 = 3;
}

/// One of the four axis-aligned headings
///
/// The discriminants are part of the wall damage arithmetic and the sprite
/// sheet layout, so they must stay 0..=3 in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Numeric code (0..=3)
    #[inline]
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % 4]
    }

    /// Unit step in screen coordinates (y grows downward)
    #[inline]
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}
