//! Armored unit: movement, firing and the temporary-effect state machine
//!
//! Players and enemies share this record; they differ only in the policy that
//! produces movement and fire intent each tick (see `player` and `enemy`).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{DrawCommand, Entity};
use super::geometry::Rect;
use super::projectile::Projectile;
use super::sprites::{SpriteCatalog, SpriteKind};
use crate::Direction;
use crate::consts::{MUZZLE_OVERLAP, SNAP_EPSILON, TILE};

/// Independent status and capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitFlag {
    /// Hits are ignored
    Invulnerable,
    /// No movement, decisions or firing
    Immobilized,
    /// Water does not block; the next hit is absorbed instead
    CanCrossWater,
    /// Drops a power-up when first hit
    DropsBonus,
    /// Standing on ice, may keep sliding without input
    OnIce,
    /// Playing the spawn flash
    Spawning,
    /// Fully spawned and in play
    Alive,
    /// Playing the explosion
    Destroyed,
    /// On show in a results roster; input is ignored until respawn
    Menu,
}

impl UnitFlag {
    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of `UnitFlag`s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitFlags(u16);

impl UnitFlags {
    pub fn only(flag: UnitFlag) -> Self {
        Self(flag.bit())
    }

    #[inline]
    pub fn contains(&self, flag: UnitFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, flag: UnitFlag) {
        self.0 |= flag.bit();
    }

    #[inline]
    pub fn remove(&mut self, flag: UnitFlag) {
        self.0 &= !flag.bit();
    }
}

/// Result of a destruction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Not hittable or invulnerable; nothing changed
    Ignored,
    /// Protection consumed (water crossing, top power tier)
    Absorbed,
    /// Armor lost, unit still in play
    Damaged,
    /// Explosion started
    Destroyed,
}

/// Anything built around an `ArmoredUnit`
pub trait AsUnit {
    fn unit(&self) -> &ArmoredUnit;
    fn unit_mut(&mut self) -> &mut ArmoredUnit;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmoredUnit {
    pub entity: Entity,
    /// Sprite shown while alive
    pub base_sprite: SpriteKind,
    pub direction: Direction,
    /// Facing chosen while sliding; becomes `direction` when the slide ends
    pub requested_direction: Direction,
    pub speed: f32,
    pub default_speed: f32,
    /// Movement cancelled for the current tick
    pub blocked: bool,
    pub flags: UnitFlags,
    /// Armor tier for enemies, remaining lives for players
    pub lives: u32,
    pub projectiles: Vec<Projectile>,
    pub projectile_cap: usize,
    pub invulnerable_ms: u32,
    pub immobilized_ms: u32,
    pub slip_ms: u32,
    overlay_clock: u32,
}

impl ArmoredUnit {
    pub fn new(
        pos: Vec2,
        sprite: SpriteKind,
        default_speed: f32,
        projectile_cap: usize,
        catalog: &SpriteCatalog,
    ) -> Self {
        Self {
            entity: Entity::new(pos, sprite, catalog),
            base_sprite: sprite,
            direction: Direction::Up,
            requested_direction: Direction::Up,
            speed: 0.0,
            default_speed,
            blocked: false,
            flags: UnitFlags::default(),
            lives: 1,
            projectiles: Vec::new(),
            projectile_cap,
            invulnerable_ms: 0,
            immobilized_ms: 0,
            slip_ms: 0,
            overlay_clock: 0,
        }
    }

    #[inline]
    pub fn has(&self, flag: UnitFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn rect(&self) -> Rect {
        self.entity.collision_rect
    }

    /// Alive and not exploding; only such units move, fire or take hits
    pub fn is_active(&self) -> bool {
        self.has(UnitFlag::Alive) && !self.has(UnitFlag::Destroyed)
    }

    /// Facing used for firing and drawing
    pub fn heading(&self) -> Direction {
        if self.has(UnitFlag::OnIce) {
            self.requested_direction
        } else {
            self.direction
        }
    }

    pub fn grant_invulnerability(&mut self, ms: u32) {
        self.flags.insert(UnitFlag::Invulnerable);
        self.invulnerable_ms = ms;
    }

    pub fn immobilize(&mut self, ms: u32) {
        self.flags.insert(UnitFlag::Immobilized);
        self.immobilized_ms = ms;
    }

    /// Turn toward `dir`
    ///
    /// On ice the turn is deferred until the current slide ends. When the
    /// unit was free to move, the off-axis coordinate snaps to the tile grid
    /// if it is within a few pixels of it.
    pub fn set_direction(&mut self, dir: Direction, slip_time: u32) {
        if !self.is_active() || self.has(UnitFlag::Immobilized) {
            return;
        }
        if self.has(UnitFlag::OnIce) {
            self.requested_direction = dir;
            if self.speed == 0.0 || self.slip_ms == 0 {
                self.direction = dir;
            }
            if self.slip_ms == 0 || self.direction == self.requested_direction {
                self.slip_ms = slip_time;
            }
        } else {
            self.direction = dir;
            self.requested_direction = dir;
        }

        if !self.blocked {
            let tile = TILE as f32;
            let axis = if self.direction.is_vertical() {
                &mut self.entity.pos.x
            } else {
                &mut self.entity.pos.y
            };
            let cell = (*axis / tile).floor() * tile;
            if *axis - cell < SNAP_EPSILON {
                *axis = cell;
            } else if *axis - cell > tile - SNAP_EPSILON {
                *axis = cell + tile;
            }
            self.entity.sync_rects();
        }
    }

    /// Where the unit would be after moving for `dt`, plus a pixel of margin
    pub fn next_collision_rect(&self, dt: u32) -> Rect {
        let rect = self.rect();
        if self.speed == 0.0 {
            return rect;
        }
        let dist = (self.speed * dt as f32) as i32 + 1;
        rect.shifted(self.direction, dist)
    }

    /// Cancel this tick's movement if `overlap` lies on the leading edge
    pub fn collide(&mut self, overlap: &Rect) {
        let own = self.rect();
        let leading = if overlap.w > overlap.h {
            (self.direction == Direction::Up && overlap.y <= own.y)
                || (self.direction == Direction::Down && overlap.bottom() >= own.bottom())
        } else {
            (self.direction == Direction::Left && overlap.x <= own.x)
                || (self.direction == Direction::Right && overlap.right() >= own.right())
        };
        if leading {
            self.blocked = true;
            self.slip_ms = 0;
        }
    }

    /// Launch a projectile from the leading edge
    ///
    /// Returns `false` when the unit cannot fire or its cap is reached.
    pub fn fire(&mut self, speed: f32, high_damage: bool, catalog: &SpriteCatalog) -> bool {
        if !self.is_active() || self.projectiles.len() >= self.projectile_cap {
            return false;
        }
        let heading = self.heading();
        let size = catalog.get(SpriteKind::Projectile).rect;
        let (pw, ph) = (size.w as f32, size.h as f32);
        let body = self.entity.dest_rect;
        let (w, h) = (body.w as f32, body.h as f32);
        let p = self.entity.pos;
        let pos = match heading {
            Direction::Up => Vec2::new(p.x + (w - pw) / 2.0, p.y - ph + MUZZLE_OVERLAP),
            Direction::Right => Vec2::new(p.x + w - MUZZLE_OVERLAP, p.y + (h - ph) / 2.0),
            Direction::Down => Vec2::new(p.x + (w - pw) / 2.0, p.y + h - MUZZLE_OVERLAP),
            Direction::Left => Vec2::new(p.x - pw + MUZZLE_OVERLAP, p.y + (h - ph) / 2.0),
        };
        let mut projectile = Projectile::new(pos, heading, speed, catalog);
        projectile.high_damage = high_damage;
        self.projectiles.push(projectile);
        true
    }

    /// Hit checks shared by all units. `Some` when the hit stops here.
    pub fn screen_hit(&mut self) -> Option<HitOutcome> {
        if !self.is_active() || self.has(UnitFlag::Invulnerable) {
            return Some(HitOutcome::Ignored);
        }
        if self.has(UnitFlag::CanCrossWater) {
            self.flags.remove(UnitFlag::CanCrossWater);
            return Some(HitOutcome::Absorbed);
        }
        None
    }

    /// Lose one armor tier, exploding at zero
    pub fn destroy(&mut self, catalog: &SpriteCatalog) -> HitOutcome {
        if let Some(outcome) = self.screen_hit() {
            return outcome;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.explode(catalog);
            HitOutcome::Destroyed
        } else {
            HitOutcome::Damaged
        }
    }

    /// Start the explosion regardless of armor or protection
    pub fn explode(&mut self, catalog: &SpriteCatalog) {
        if self.has(UnitFlag::Destroyed) {
            return;
        }
        self.flags = UnitFlags::only(UnitFlag::Destroyed);
        self.speed = 0.0;
        self.slip_ms = 0;
        self.invulnerable_ms = 0;
        self.immobilized_ms = 0;
        let center = self.entity.dest_rect.center();
        self.entity
            .set_sprite_centered(SpriteKind::TankExplosion, center, catalog);
        self.entity.collision_rect = Rect::ZERO;
    }

    /// The explosion has played out
    pub fn explosion_finished(&self) -> bool {
        self.has(UnitFlag::Destroyed) && self.entity.animation_done()
    }

    /// Clear all effects and play the spawn flash at `pos`
    pub fn respawn(&mut self, pos: Vec2, direction: Direction, catalog: &SpriteCatalog) {
        self.flags = UnitFlags::only(UnitFlag::Spawning);
        self.speed = 0.0;
        self.blocked = false;
        self.slip_ms = 0;
        self.invulnerable_ms = 0;
        self.immobilized_ms = 0;
        self.direction = direction;
        self.requested_direction = direction;
        self.entity.pos = pos;
        self.entity.set_sprite(SpriteKind::Spawn, catalog);
    }

    fn finish_spawn(&mut self, catalog: &SpriteCatalog) {
        self.flags.remove(UnitFlag::Spawning);
        self.flags.insert(UnitFlag::Alive);
        self.entity.set_sprite(self.base_sprite, catalog);
    }

    /// Skip the spawn flash
    #[cfg(test)]
    pub(crate) fn activate(&mut self, catalog: &SpriteCatalog) {
        self.flags.insert(UnitFlag::Spawning);
        self.finish_spawn(catalog);
    }

    /// Move, run effect countdowns and animations, update projectiles
    pub fn advance(&mut self, dt: u32, catalog: &SpriteCatalog) {
        if self.is_active() && !self.blocked && !self.has(UnitFlag::Immobilized) {
            self.entity.pos += self.direction.unit() * self.speed * dt as f32;
        }
        if !self.has(UnitFlag::Destroyed) {
            self.entity.sync_rects();
        }

        self.entity.animate(dt);
        if self.has(UnitFlag::Spawning) && self.entity.animation_done() {
            self.finish_spawn(catalog);
        }

        if self.has(UnitFlag::OnIce) && self.slip_ms > 0 {
            self.slip_ms = self.slip_ms.saturating_sub(dt);
            if self.slip_ms == 0 {
                self.flags.remove(UnitFlag::OnIce);
                self.direction = self.requested_direction;
            }
        }
        if self.has(UnitFlag::Invulnerable) {
            self.invulnerable_ms = self.invulnerable_ms.saturating_sub(dt);
            if self.invulnerable_ms == 0 {
                self.flags.remove(UnitFlag::Invulnerable);
            }
        }
        if self.has(UnitFlag::Immobilized) {
            self.immobilized_ms = self.immobilized_ms.saturating_sub(dt);
            if self.immobilized_ms == 0 {
                self.flags.remove(UnitFlag::Immobilized);
            }
        }
        self.overlay_clock = self.overlay_clock.wrapping_add(dt);

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.projectiles.retain(|p| !p.entity.to_erase);
    }

    /// Point `src_rect` at the body frame, or at the spawn/explosion frame
    pub fn set_body_frame(&mut self, col: i32, row_offset: i32) {
        if self.is_active() {
            let row = self.entity.frame() as i32 + row_offset;
            self.entity.src_rect = self.entity.frame_rect(col, row);
        } else {
            self.entity.use_frame_row();
        }
    }

    /// Body, effect overlays and projectiles
    pub fn draw(&self, boat: SpriteKind, catalog: &SpriteCatalog, out: &mut Vec<DrawCommand>) {
        out.push(self.entity.draw_command());
        if !self.is_active() {
            return;
        }
        let dest = self.entity.dest_rect;
        if self.has(UnitFlag::CanCrossWater) {
            out.push(DrawCommand {
                src: catalog.get(boat).rect,
                dest,
                tint: self.entity.tint,
            });
        }
        if self.has(UnitFlag::Invulnerable) {
            let shield = catalog.get(SpriteKind::Shield);
            let frame = self.overlay_clock / shield.frame_duration.max(1) % shield.frames_count.max(1);
            out.push(DrawCommand {
                src: shield.rect.cell(0, frame as i32),
                dest,
                tint: self.entity.tint,
            });
        }
    }

    pub fn draw_projectiles(&self, out: &mut Vec<DrawCommand>) {
        out.extend(self.projectiles.iter().map(|p| p.entity.draw_command()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn active_unit(pos: Vec2, catalog: &SpriteCatalog) -> ArmoredUnit {
        let mut unit = ArmoredUnit::new(pos, SpriteKind::TankA, 0.08, 1, catalog);
        unit.activate(catalog);
        unit
    }

    #[test]
    fn test_flags_are_independent() {
        let mut flags = UnitFlags::default();
        flags.insert(UnitFlag::Invulnerable);
        flags.insert(UnitFlag::Immobilized);
        flags.insert(UnitFlag::OnIce);
        flags.remove(UnitFlag::Immobilized);
        assert!(flags.contains(UnitFlag::Invulnerable));
        assert!(flags.contains(UnitFlag::OnIce));
        assert!(!flags.contains(UnitFlag::Immobilized));
    }

    #[test]
    fn test_spawn_flash_then_alive() {
        let catalog = SpriteCatalog::default();
        let mut unit = ArmoredUnit::new(Vec2::ZERO, SpriteKind::TankB, 0.08, 1, &catalog);
        unit.respawn(Vec2::new(32.0, 0.0), Direction::Down, &catalog);
        assert!(unit.has(UnitFlag::Spawning));
        assert!(!unit.fire(0.23, false, &catalog));
        for _ in 0..200 {
            unit.advance(16, &catalog);
        }
        assert!(unit.is_active());
        assert_eq!(unit.entity.sprite, SpriteKind::TankB);
        assert_eq!(unit.rect(), Rect::new(32, 0, 32, 32));
    }

    #[test]
    fn test_turn_snaps_to_grid() {
        let catalog = SpriteCatalog::default();
        let mut unit = active_unit(Vec2::new(35.0, 100.0), &catalog);
        unit.set_direction(Direction::Up, 380);
        assert_eq!(unit.entity.pos.x, 32.0);
        unit.entity.pos.x = 45.0;
        unit.set_direction(Direction::Down, 380);
        assert_eq!(unit.entity.pos.x, 48.0);
        unit.entity.pos.x = 40.0;
        unit.set_direction(Direction::Down, 380);
        assert_eq!(unit.entity.pos.x, 40.0);
    }

    #[test]
    fn test_collide_only_on_leading_edge() {
        let catalog = SpriteCatalog::default();
        let mut unit = active_unit(Vec2::new(64.0, 64.0), &catalog);
        unit.direction = Direction::Right;
        // overlap on the left side does not stop a unit moving right
        unit.collide(&Rect::new(64, 64, 2, 32));
        assert!(!unit.blocked);
        unit.collide(&Rect::new(94, 64, 2, 32));
        assert!(unit.blocked);
    }

    #[test]
    fn test_next_rect_projects_movement() {
        let catalog = SpriteCatalog::default();
        let mut unit = active_unit(Vec2::new(64.0, 64.0), &catalog);
        assert_eq!(unit.next_collision_rect(16), unit.rect());
        unit.direction = Direction::Left;
        unit.speed = 0.08;
        // 0.08 * 16 = 1.28 -> 1, plus a pixel of margin
        assert_eq!(unit.next_collision_rect(16), Rect::new(62, 64, 32, 32));
    }

    #[test]
    fn test_fire_respects_cap() {
        let catalog = SpriteCatalog::default();
        let mut unit = active_unit(Vec2::new(64.0, 64.0), &catalog);
        unit.projectile_cap = 2;
        assert!(unit.fire(0.23, false, &catalog));
        assert!(unit.fire(0.23, false, &catalog));
        assert!(!unit.fire(0.23, false, &catalog));
        assert_eq!(unit.projectiles.len(), 2);
        // muzzle sits on the top edge, centred
        assert_eq!(unit.projectiles[0].rect(), Rect::new(76, 60, 8, 8));
    }

    #[test]
    fn test_water_crossing_absorbs_one_hit() {
        let catalog = SpriteCatalog::default();
        let mut unit = active_unit(Vec2::ZERO, &catalog);
        unit.lives = 2;
        unit.flags.insert(UnitFlag::CanCrossWater);
        assert_eq!(unit.destroy(&catalog), HitOutcome::Absorbed);
        assert_eq!(unit.lives, 2);
        assert_eq!(unit.destroy(&catalog), HitOutcome::Damaged);
        assert_eq!(unit.destroy(&catalog), HitOutcome::Destroyed);
        assert_eq!(unit.lives, 0);
        assert!(unit.has(UnitFlag::Destroyed));
        assert_eq!(unit.destroy(&catalog), HitOutcome::Ignored);
    }

    #[test]
    fn test_slide_ends_in_requested_direction() {
        let catalog = SpriteCatalog::default();
        let mut unit = active_unit(Vec2::new(64.0, 64.0), &catalog);
        unit.flags.insert(UnitFlag::OnIce);
        unit.speed = 0.08;
        unit.set_direction(Direction::Up, 100);
        unit.set_direction(Direction::Right, 100);
        assert_eq!(unit.direction, Direction::Up);
        assert_eq!(unit.heading(), Direction::Right);
        for _ in 0..10 {
            unit.advance(16, &catalog);
        }
        assert!(!unit.has(UnitFlag::OnIce));
        assert_eq!(unit.direction, Direction::Right);
    }

    proptest! {
        #[test]
        fn invulnerable_unit_keeps_armor(lives in 1u32..5, hits in 1usize..20, window in 1u32..10_000) {
            let catalog = SpriteCatalog::default();
            let mut unit = active_unit(Vec2::ZERO, &catalog);
            unit.lives = lives;
            unit.grant_invulnerability(window);
            for _ in 0..hits {
                prop_assert_eq!(unit.destroy(&catalog), HitOutcome::Ignored);
            }
            prop_assert_eq!(unit.lives, lives);
            prop_assert!(unit.is_active());
        }
    }
}
