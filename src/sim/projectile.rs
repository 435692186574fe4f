//! Projectiles fired by units

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::geometry::Rect;
use super::sprites::{SpriteCatalog, SpriteKind};
use crate::Direction;

/// A shell in flight, or its explosion once it has hit something
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub entity: Entity,
    pub direction: Direction,
    pub speed: f32,
    /// Set on impact; the projectile is inert from then on
    pub collided: bool,
    /// Removes whole cells and clears bushes
    pub high_damage: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, direction: Direction, speed: f32, catalog: &SpriteCatalog) -> Self {
        let mut projectile = Self {
            entity: Entity::new(pos, SpriteKind::Projectile, catalog),
            direction,
            speed,
            collided: false,
            high_damage: false,
        };
        projectile.refresh_frame();
        projectile
    }

    pub fn rect(&self) -> Rect {
        self.entity.collision_rect
    }

    /// Still able to hit something
    pub fn is_live(&self) -> bool {
        !self.collided && !self.entity.to_erase
    }

    /// Stop and start the explosion, centred on the leading edge
    pub fn destroy(&mut self, catalog: &SpriteCatalog) {
        if self.collided {
            return;
        }
        self.collided = true;
        self.speed = 0.0;

        let r = self.entity.dest_rect;
        let center = r.center();
        let impact = match self.direction {
            Direction::Up => Vec2::new(center.x, r.y as f32),
            Direction::Right => Vec2::new(r.right() as f32, center.y),
            Direction::Down => Vec2::new(center.x, r.bottom() as f32),
            Direction::Left => Vec2::new(r.x as f32, center.y),
        };
        self.entity
            .set_sprite_centered(SpriteKind::ProjectileExplosion, impact, catalog);
        self.entity.collision_rect = Rect::ZERO;
        self.refresh_frame();
    }

    pub fn update(&mut self, dt: u32) {
        if self.collided {
            self.entity.animate(dt);
            if self.entity.animation_done() {
                self.entity.to_erase = true;
            }
        } else {
            self.entity.pos += self.direction.unit() * self.speed * dt as f32;
            self.entity.sync_rects();
        }
        self.refresh_frame();
    }

    fn refresh_frame(&mut self) {
        if self.collided {
            self.entity.use_frame_row();
        } else {
            // in flight the sheet column is the heading
            self.entity.src_rect = self.entity.frame_rect(self.direction.index(), 0);
        }
    }
}
