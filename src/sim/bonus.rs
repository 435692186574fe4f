//! Timed power-up pickups

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{DrawCommand, Entity};
use super::geometry::Rect;
use super::sprites::{SpriteCatalog, SpriteKind};
use crate::consts::TILE;
use crate::settings::SimConfig;

/// Placement attempts before a power-up is dropped anywhere
const PLACEMENT_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Destroys every enemy on the map
    AreaClear,
    /// Full-length invulnerability
    Shield,
    /// Immobilizes every enemy
    Freeze,
    /// Stone walls around the objective for a while
    Fortify,
    ExtraLife,
    /// +1 power tier
    UpgradeMinor,
    /// Straight to the top power tier
    UpgradeMajor,
    /// Water crossing; also absorbs one hit
    WaterCrossing,
}

impl BonusKind {
    pub const ALL: [BonusKind; 8] = [
        BonusKind::AreaClear,
        BonusKind::Shield,
        BonusKind::Freeze,
        BonusKind::Fortify,
        BonusKind::ExtraLife,
        BonusKind::UpgradeMinor,
        BonusKind::UpgradeMajor,
        BonusKind::WaterCrossing,
    ];

    pub fn sprite(self) -> SpriteKind {
        match self {
            BonusKind::AreaClear => SpriteKind::BonusAreaClear,
            BonusKind::Shield => SpriteKind::BonusShield,
            BonusKind::Freeze => SpriteKind::BonusFreeze,
            BonusKind::Fortify => SpriteKind::BonusFortify,
            BonusKind::ExtraLife => SpriteKind::BonusExtraLife,
            BonusKind::UpgradeMinor => SpriteKind::BonusUpgradeMinor,
            BonusKind::UpgradeMajor => SpriteKind::BonusUpgradeMajor,
            BonusKind::WaterCrossing => SpriteKind::BonusWaterCrossing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub entity: Entity,
    pub kind: BonusKind,
    pub visible: bool,
    /// Time on the map
    pub age: u32,
}

impl Bonus {
    pub fn new(kind: BonusKind, pos: Vec2, catalog: &SpriteCatalog) -> Self {
        Self {
            entity: Entity::new(pos, kind.sprite(), catalog),
            kind,
            visible: true,
            age: 0,
        }
    }

    /// Random kind at a random spot inside `map`, off the `objective`
    pub fn spawn_random<R: Rng>(
        rng: &mut R,
        map: Rect,
        objective: Rect,
        catalog: &SpriteCatalog,
    ) -> Self {
        let kind = BonusKind::ALL[rng.random_range(0..BonusKind::ALL.len())];
        let size = catalog.get(kind.sprite()).rect;
        let max_x = (map.w - TILE).max(1);
        let max_y = (map.h - TILE).max(1);
        let mut pos = Vec2::ZERO;
        for _ in 0..PLACEMENT_ATTEMPTS {
            pos = Vec2::new(rng.random_range(0..max_x) as f32, rng.random_range(0..max_y) as f32);
            let rect = Rect::new(pos.x as i32, pos.y as i32, size.w, size.h);
            if !rect.overlaps(&objective) {
                break;
            }
        }
        Self::new(kind, pos, catalog)
    }

    pub fn rect(&self) -> Rect {
        self.entity.collision_rect
    }

    /// Age, blink and expire
    ///
    /// Visible on odd blink periods; the period halves in the last quarter
    /// of the lifetime.
    pub fn update(&mut self, dt: u32, config: &SimConfig) {
        self.age = self.age.saturating_add(dt);
        if self.age > config.bonus_show_time {
            self.entity.to_erase = true;
        }
        let period = if self.age < config.bonus_show_time / 4 * 3 {
            config.bonus_blink_time
        } else {
            config.bonus_blink_time / 2
        };
        self.visible = (self.age / period.max(1)) % 2 == 1;
    }

    pub fn draw_command(&self) -> Option<DrawCommand> {
        self.visible.then(|| self.entity.draw_command())
    }
}
