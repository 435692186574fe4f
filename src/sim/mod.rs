//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied millisecond steps only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of every entity list)
//! - No rendering, audio or platform dependencies; sprites and sounds are
//!   emitted as plain data

pub mod bonus;
pub mod collision;
pub mod eagle;
pub mod enemy;
pub mod entity;
pub mod geometry;
pub mod level;
pub mod player;
pub mod projectile;
pub mod sprites;
pub mod state;
pub mod tank;
pub mod terrain;
pub mod tick;

pub use bonus::{Bonus, BonusKind};
pub use eagle::{Eagle, EagleState};
pub use enemy::{Enemy, EnemyKind};
pub use entity::{Color, DrawCommand, Entity};
pub use geometry::{Rect, intersect};
pub use level::{DEMO_LEVEL, load_level};
pub use player::{Player, PlayerInput};
pub use projectile::Projectile;
pub use sprites::{SpriteCatalog, SpriteData, SpriteKind};
pub use state::{PlayerStatus, RoundPhase, RoundState, StatusPanel};
pub use tank::{ArmoredUnit, HitOutcome, UnitFlag, UnitFlags};
pub use terrain::{Brick, TerrainGrid, Tile};
pub use tick::{TickInput, tick};
