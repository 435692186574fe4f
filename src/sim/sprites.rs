//! Sprite sheet metadata
//!
//! The simulation needs frame sizes and animation timing from the sprite
//! sheet: rectangles derive from frame size, and several state transitions
//! fire when a one-shot animation runs out. Pixels are never touched here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Visual type of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    TankA,
    TankB,
    TankC,
    TankD,
    Player1,
    Player2,
    Player3,
    Brick,
    Stone,
    Water,
    Bush,
    Ice,
    BonusAreaClear,
    BonusShield,
    BonusFreeze,
    BonusFortify,
    BonusExtraLife,
    BonusUpgradeMinor,
    BonusUpgradeMajor,
    BonusWaterCrossing,
    Shield,
    Spawn,
    TankExplosion,
    ProjectileExplosion,
    BoatP1,
    BoatP2,
    Eagle,
    EagleExplosion,
    Flag,
    Projectile,
}

/// Frame geometry and timing for one sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteData {
    /// First frame on the sheet; later frames follow downward
    pub rect: Rect,
    pub frames_count: u32,
    /// Time each frame is shown (ms)
    pub frame_duration: u32,
    pub looping: bool,
}

impl SpriteData {
    pub const fn new(rect: Rect, frames_count: u32, frame_duration: u32, looping: bool) -> Self {
        Self {
            rect,
            frames_count,
            frame_duration,
            looping,
        }
    }

    /// Single-frame, non-animated sprite
    pub const fn still(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(Rect::new(x, y, w, h), 1, 0, false)
    }
}

/// Lookup from visual type to sprite metadata
#[derive(Debug, Clone)]
pub struct SpriteCatalog {
    entries: HashMap<SpriteKind, SpriteData>,
}

impl SpriteCatalog {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: SpriteKind, data: SpriteData) {
        self.entries.insert(kind, data);
    }

    /// Metadata for `kind`
    ///
    /// Panics if `kind` was never registered. Every sprite the simulation
    /// uses is registered up front, so a miss is a setup bug.
    pub fn get(&self, kind: SpriteKind) -> SpriteData {
        match self.entries.get(&kind) {
            Some(data) => *data,
            None => panic!("sprite {kind:?} is not registered"),
        }
    }

    pub fn contains(&self, kind: SpriteKind) -> bool {
        self.entries.contains_key(&kind)
    }
}

impl Default for SpriteCatalog {
    /// The stock sheet layout
    fn default() -> Self {
        use SpriteKind::*;

        let mut catalog = Self::empty();
        let tank = |y| SpriteData::new(Rect::new(128, y, 32, 32), 2, 100, true);
        catalog.insert(TankA, tank(0));
        catalog.insert(TankB, tank(64));
        catalog.insert(TankC, tank(128));
        catalog.insert(TankD, tank(192));

        catalog.insert(Player1, SpriteData::new(Rect::new(640, 0, 32, 32), 2, 50, true));
        catalog.insert(Player2, SpriteData::new(Rect::new(768, 0, 32, 32), 2, 50, true));
        catalog.insert(Player3, SpriteData::new(Rect::new(768, 0, 32, 32), 2, 50, true));

        catalog.insert(Brick, SpriteData::still(928, 0, 16, 16));
        catalog.insert(Stone, SpriteData::still(928, 144, 16, 16));
        catalog.insert(Water, SpriteData::new(Rect::new(928, 160, 16, 16), 2, 350, true));
        catalog.insert(Bush, SpriteData::still(928, 192, 16, 16));
        catalog.insert(Ice, SpriteData::still(928, 208, 16, 16));

        let bonuses = [
            BonusAreaClear,
            BonusShield,
            BonusFreeze,
            BonusFortify,
            BonusExtraLife,
            BonusUpgradeMinor,
            BonusUpgradeMajor,
            BonusWaterCrossing,
        ];
        for (i, kind) in bonuses.into_iter().enumerate() {
            catalog.insert(kind, SpriteData::still(896, 32 * i as i32, 32, 32));
        }

        catalog.insert(Shield, SpriteData::new(Rect::new(976, 0, 32, 32), 2, 45, true));
        catalog.insert(Spawn, SpriteData::new(Rect::new(1008, 0, 32, 32), 10, 100, false));
        catalog.insert(TankExplosion, SpriteData::new(Rect::new(1040, 0, 64, 64), 7, 70, false));
        catalog.insert(
            ProjectileExplosion,
            SpriteData::new(Rect::new(1108, 0, 32, 32), 5, 40, false),
        );
        catalog.insert(BoatP1, SpriteData::still(944, 96, 32, 32));
        catalog.insert(BoatP2, SpriteData::still(976, 96, 32, 32));
        catalog.insert(Eagle, SpriteData::still(944, 0, 32, 32));
        catalog.insert(EagleExplosion, SpriteData::new(Rect::new(1040, 0, 64, 64), 7, 100, false));
        catalog.insert(Flag, SpriteData::still(944, 32, 32, 32));
        catalog.insert(Projectile, SpriteData::still(944, 128, 8, 8));

        catalog
    }
}
