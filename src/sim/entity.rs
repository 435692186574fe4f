//! Common position/animation state for every simulated thing

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::sprites::{SpriteCatalog, SpriteData, SpriteKind};

/// RGBA tint applied when drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Tint for player `index`
    pub fn player(index: usize) -> Self {
        const TINTS: [Color; 4] = [
            Color::rgb(255, 220, 90),
            Color::rgb(120, 220, 120),
            Color::rgb(110, 160, 255),
            Color::rgb(255, 110, 110),
        ];
        TINTS[index % TINTS.len()]
    }
}

/// One sprite blit for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCommand {
    /// Region of the sprite sheet
    pub src: Rect,
    /// Region of the playfield
    pub dest: Rect,
    pub tint: Color,
}

/// Position, rectangles and animation clock
///
/// `dest_rect` and `collision_rect` are recomputed from `pos` and the frame
/// size by `sync_rects`; nothing else writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Vec2,
    pub sprite: SpriteKind,
    pub sprite_data: SpriteData,
    pub dest_rect: Rect,
    pub collision_rect: Rect,
    pub src_rect: Rect,
    pub tint: Color,
    /// Removed by the owning list after the current tick
    pub to_erase: bool,
    frame: u32,
    frame_time: u32,
    animation_done: bool,
}

impl Entity {
    pub fn new(pos: Vec2, sprite: SpriteKind, catalog: &SpriteCatalog) -> Self {
        let sprite_data = catalog.get(sprite);
        let mut entity = Self {
            pos,
            sprite,
            sprite_data,
            dest_rect: Rect::ZERO,
            collision_rect: Rect::ZERO,
            src_rect: sprite_data.rect,
            tint: Color::WHITE,
            to_erase: false,
            frame: 0,
            frame_time: 0,
            animation_done: false,
        };
        entity.sync_rects();
        entity
    }

    /// Switch visual type and restart its animation
    pub fn set_sprite(&mut self, sprite: SpriteKind, catalog: &SpriteCatalog) {
        self.sprite = sprite;
        self.sprite_data = catalog.get(sprite);
        self.frame = 0;
        self.frame_time = 0;
        self.animation_done = false;
        self.sync_rects();
    }

    /// Switch visual type keeping the entity centred on `center`
    pub fn set_sprite_centered(&mut self, sprite: SpriteKind, center: Vec2, catalog: &SpriteCatalog) {
        self.set_sprite(sprite, catalog);
        self.pos = center - self.size() / 2.0;
        self.sync_rects();
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.sprite_data.rect.w as f32, self.sprite_data.rect.h as f32)
    }

    /// Recompute rectangles from position and frame size
    pub fn sync_rects(&mut self) {
        let r = self.sprite_data.rect;
        self.dest_rect = Rect::new(self.pos.x as i32, self.pos.y as i32, r.w, r.h);
        self.collision_rect = self.dest_rect;
    }

    /// Advance the frame clock
    pub fn animate(&mut self, dt: u32) {
        let data = self.sprite_data;
        if self.animation_done {
            return;
        }
        self.frame_time += dt;
        if self.frame_time > data.frame_duration {
            self.frame_time = 0;
            self.frame += 1;
            if self.frame >= data.frames_count {
                if data.looping {
                    self.frame = 0;
                } else {
                    self.frame = data.frames_count.saturating_sub(1);
                    self.animation_done = true;
                }
            }
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// A one-shot animation has played its last frame
    pub fn animation_done(&self) -> bool {
        self.animation_done
    }

    /// Sheet cell at (`col`, `row`) relative to the sprite's first frame
    pub fn frame_rect(&self, col: i32, row: i32) -> Rect {
        self.sprite_data.rect.cell(col, row)
    }

    /// Point `src_rect` at the current frame, one frame per sheet row
    pub fn use_frame_row(&mut self) {
        self.src_rect = self.frame_rect(0, self.frame as i32);
    }

    pub fn draw_command(&self) -> DrawCommand {
        DrawCommand {
            src: self.src_rect,
            dest: self.dest_rect,
            tint: self.tint,
        }
    }
}
