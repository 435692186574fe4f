//! The defended objective

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{DrawCommand, Entity};
use super::geometry::Rect;
use super::sprites::{SpriteCatalog, SpriteKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EagleState {
    Intact,
    Exploding,
    /// Terminal: a flag marks the spot
    Ruined,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eagle {
    pub entity: Entity,
    pub state: EagleState,
    /// Footprint that keeps blocking units in every state
    home: Rect,
}

impl Eagle {
    pub fn new(pos: Vec2, catalog: &SpriteCatalog) -> Self {
        let entity = Entity::new(pos, SpriteKind::Eagle, catalog);
        let home = entity.collision_rect;
        Self {
            entity,
            state: EagleState::Intact,
            home,
        }
    }

    pub fn rect(&self) -> Rect {
        self.home
    }

    pub fn is_intact(&self) -> bool {
        self.state == EagleState::Intact
    }

    pub fn destroy(&mut self, catalog: &SpriteCatalog) {
        if !self.is_intact() {
            return;
        }
        self.state = EagleState::Exploding;
        self.entity
            .set_sprite_centered(SpriteKind::EagleExplosion, self.home.center(), catalog);
        self.entity.collision_rect = self.home;
    }

    pub fn update(&mut self, dt: u32, catalog: &SpriteCatalog) {
        self.entity.animate(dt);
        if self.state == EagleState::Exploding && self.entity.animation_done() {
            self.state = EagleState::Ruined;
            self.entity
                .set_sprite_centered(SpriteKind::Flag, self.home.center(), catalog);
        }
        self.entity.use_frame_row();
        self.entity.collision_rect = self.home;
    }

    pub fn draw_command(&self) -> DrawCommand {
        self.entity.draw_command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destruction_ends_in_flag() {
        let catalog = SpriteCatalog::default();
        let mut eagle = Eagle::new(Vec2::new(192.0, 384.0), &catalog);
        eagle.destroy(&catalog);
        assert_eq!(eagle.state, EagleState::Exploding);
        assert_eq!(eagle.entity.dest_rect, Rect::new(176, 368, 64, 64));
        for _ in 0..100 {
            eagle.update(16, &catalog);
        }
        assert_eq!(eagle.state, EagleState::Ruined);
        assert_eq!(eagle.entity.sprite, SpriteKind::Flag);
        assert_eq!(eagle.entity.dest_rect, Rect::new(192, 384, 32, 32));
        assert_eq!(eagle.rect(), Rect::new(192, 384, 32, 32));
    }
}
