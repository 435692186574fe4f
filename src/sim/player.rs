//! Player-controlled unit and power tier progression

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Color, DrawCommand};
use super::sprites::{SpriteCatalog, SpriteKind};
use super::tank::{ArmoredUnit, AsUnit, HitOutcome, UnitFlag};
use crate::Direction;
use crate::consts::{MAX_POWER_TIER, PLAYER_PROJECTILE_CAP, SPEED_BOOST};
use crate::settings::SimConfig;

/// Buttons held by one player this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl PlayerInput {
    /// Held direction, first of up, down, left, right
    pub fn direction(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub unit: ArmoredUnit,
    /// Player number; selects start point, sprite and input slot
    pub index: usize,
    pub score: u32,
    /// 0..=3
    pub power_tier: u32,
    /// Time since the last shot attempt
    reload_ms: u32,
}

impl Player {
    /// New player at its start point, playing the spawn flash
    ///
    /// Panics if `config.player_starts` has no entry for `index`.
    pub fn new(index: usize, config: &SimConfig, catalog: &SpriteCatalog) -> Self {
        let start = config.player_starts[index].as_vec2();
        let mut unit = ArmoredUnit::new(
            start,
            Self::sprite_for(index),
            config.tank_default_speed,
            PLAYER_PROJECTILE_CAP,
            catalog,
        );
        unit.lives = config.player_lives;
        unit.entity.tint = Color::player(index);
        let mut player = Self {
            unit,
            index,
            score: 0,
            power_tier: 0,
            reload_ms: 0,
        };
        player.respawn(config, catalog);
        player
    }

    pub fn sprite_for(index: usize) -> SpriteKind {
        match index {
            0 => SpriteKind::Player1,
            1 => SpriteKind::Player2,
            _ => SpriteKind::Player3,
        }
    }

    fn boat_sprite(&self) -> SpriteKind {
        if self.index == 0 {
            SpriteKind::BoatP1
        } else {
            SpriteKind::BoatP2
        }
    }

    fn start_pos(&self, config: &SimConfig) -> Vec2 {
        config.player_starts[self.index].as_vec2()
    }

    /// Back to the start point facing up, with a half-length shield
    pub fn respawn(&mut self, config: &SimConfig, catalog: &SpriteCatalog) {
        let start = self.start_pos(config);
        self.unit.respawn(start, Direction::Up, catalog);
        self.unit.grant_invulnerability(config.shield_time / 2);
        self.refresh_frame();
    }

    pub fn projectile_speed(&self, config: &SimConfig) -> f32 {
        if self.power_tier > 0 {
            config.projectile_default_speed * SPEED_BOOST
        } else {
            config.projectile_default_speed
        }
    }

    /// Shift the power tier by `delta`, clamped to 0..=3
    ///
    /// Any positive change that lands on tier 2 or above adds one to the
    /// projectile cap; every other change resets it to the base cap. Stars
    /// collected at the top tier keep stacking the cap with no ceiling until
    /// the next hit resets it.
    pub fn change_power_tier(&mut self, delta: i32, config: &SimConfig) {
        let tier = (self.power_tier as i32 + delta).clamp(0, MAX_POWER_TIER as i32) as u32;
        self.power_tier = tier;
        if tier >= 2 && delta > 0 {
            self.unit.projectile_cap += 1;
        } else {
            self.unit.projectile_cap = PLAYER_PROJECTILE_CAP;
        }
        self.unit.default_speed = if tier > 0 {
            config.tank_default_speed * SPEED_BOOST
        } else {
            config.tank_default_speed
        };
    }

    /// Turn input into movement and fire intent. Returns whether a shot left.
    ///
    /// A player on show in a results roster ignores input.
    pub fn apply_input(
        &mut self,
        input: &PlayerInput,
        dt: u32,
        config: &SimConfig,
        catalog: &SpriteCatalog,
    ) -> bool {
        if self.unit.has(UnitFlag::Menu) {
            return false;
        }
        if self.unit.is_active() {
            match input.direction() {
                Some(dir) => {
                    self.unit.set_direction(dir, config.slip_time);
                    self.unit.speed = self.unit.default_speed;
                }
                None => {
                    if !self.unit.has(UnitFlag::OnIce) || self.unit.slip_ms == 0 {
                        self.unit.speed = 0.0;
                    }
                }
            }
        }

        let mut fired = false;
        if input.fire && self.reload_ms > config.player_reload_time {
            let speed = self.projectile_speed(config);
            fired = self
                .unit
                .fire(speed, self.power_tier == MAX_POWER_TIER, catalog);
            self.reload_ms = 0;
        }
        self.reload_ms = self.reload_ms.saturating_add(dt);
        fired
    }

    /// Take a hit
    ///
    /// At the top tier a hit only costs one tier. Otherwise the tier drops to
    /// zero, a life is lost and the unit explodes.
    pub fn destroy(&mut self, config: &SimConfig, catalog: &SpriteCatalog) -> HitOutcome {
        if let Some(outcome) = self.unit.screen_hit() {
            return outcome;
        }
        if self.power_tier == MAX_POWER_TIER {
            self.change_power_tier(-1, config);
            return HitOutcome::Absorbed;
        }
        self.change_power_tier(-3, config);
        self.unit.lives = self.unit.lives.saturating_sub(1);
        self.unit.explode(catalog);
        HitOutcome::Destroyed
    }

    /// Out of lives and waiting for the last projectiles to land
    pub fn is_eliminated(&self) -> bool {
        self.unit.lives == 0 && self.unit.has(UnitFlag::Destroyed)
    }

    pub fn advance(&mut self, dt: u32, config: &SimConfig, catalog: &SpriteCatalog) {
        self.unit.advance(dt, catalog);
        if self.unit.explosion_finished() {
            if self.unit.lives > 0 {
                self.respawn(config, catalog);
            } else if self.unit.projectiles.is_empty() {
                self.unit.entity.to_erase = true;
            }
        }
        self.refresh_frame();
    }

    /// Reset for the next round, keeping score and power tier
    ///
    /// A player eliminated during a won round rejoins with one life.
    pub fn prepare_next_round(&mut self, victory: bool, config: &SimConfig, catalog: &SpriteCatalog) {
        if self.unit.lives == 0 && victory {
            self.unit.lives = 1;
        }
        self.unit.projectiles.clear();
        self.unit.entity.to_erase = false;
        self.reload_ms = 0;
        self.respawn(config, catalog);
    }

    fn refresh_frame(&mut self) {
        let col = self.unit.heading().index();
        let row_offset = 2 * self.power_tier as i32;
        self.unit.set_body_frame(col, row_offset);
    }

    pub fn draw(&self, catalog: &SpriteCatalog, out: &mut Vec<DrawCommand>) {
        self.unit.draw(self.boat_sprite(), catalog, out);
    }

    #[cfg(test)]
    pub(crate) fn activate(&mut self, catalog: &SpriteCatalog) {
        self.unit.activate(catalog);
        self.unit.flags.remove(UnitFlag::Invulnerable);
        self.unit.invulnerable_ms = 0;
        self.refresh_frame();
    }
}

impl AsUnit for Player {
    fn unit(&self) -> &ArmoredUnit {
        &self.unit
    }

    fn unit_mut(&mut self) -> &mut ArmoredUnit {
        &mut self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_player() -> (Player, SimConfig, SpriteCatalog) {
        let config = SimConfig::default();
        let catalog = SpriteCatalog::default();
        let mut player = Player::new(0, &config, &catalog);
        player.activate(&catalog);
        (player, config, catalog)
    }

    #[test]
    fn test_spawns_shielded_at_start_point() {
        let config = SimConfig::default();
        let catalog = SpriteCatalog::default();
        let player = Player::new(1, &config, &catalog);
        assert!(player.unit.has(UnitFlag::Spawning));
        assert!(player.unit.has(UnitFlag::Invulnerable));
        assert_eq!(player.unit.invulnerable_ms, config.shield_time / 2);
        assert_eq!(player.unit.entity.pos, Vec2::new(256.0, 384.0));
        assert_eq!(player.unit.lives, 3);
    }

    #[test]
    fn test_tier_three_hit_drops_one_tier() {
        let (mut player, config, catalog) = ready_player();
        player.change_power_tier(3, &config);
        assert_eq!(player.destroy(&config, &catalog), HitOutcome::Absorbed);
        assert_eq!(player.power_tier, 2);
        assert_eq!(player.unit.lives, 3);
        assert!(player.unit.is_active());
    }

    #[test]
    fn test_lower_tier_hit_drops_to_zero() {
        for tier in [1, 2] {
            let (mut player, config, catalog) = ready_player();
            player.change_power_tier(tier, &config);
            assert_eq!(player.destroy(&config, &catalog), HitOutcome::Destroyed);
            assert_eq!(player.power_tier, 0);
            assert_eq!(player.unit.lives, 2);
            assert_eq!(player.unit.projectile_cap, PLAYER_PROJECTILE_CAP);
        }
    }

    #[test]
    fn test_tier_effects() {
        let (mut player, config, _) = ready_player();
        player.change_power_tier(1, &config);
        assert_eq!(player.unit.projectile_cap, 2);
        assert!((player.unit.default_speed - config.tank_default_speed * SPEED_BOOST).abs() < 1e-6);
        assert!((player.projectile_speed(&config) - config.projectile_default_speed * SPEED_BOOST).abs() < 1e-6);
        player.change_power_tier(1, &config);
        assert_eq!(player.unit.projectile_cap, 3);
        player.change_power_tier(3, &config);
        assert_eq!(player.power_tier, 3);
        assert_eq!(player.unit.projectile_cap, 4);
        player.change_power_tier(-1, &config);
        assert_eq!(player.unit.projectile_cap, 2);
    }

    #[test]
    fn test_top_tier_stars_stack_cap_until_hit() {
        let (mut player, config, catalog) = ready_player();
        for _ in 0..6 {
            player.change_power_tier(3, &config);
        }
        assert_eq!(player.power_tier, MAX_POWER_TIER);
        assert_eq!(player.unit.projectile_cap, PLAYER_PROJECTILE_CAP + 6);
        assert_eq!(player.destroy(&config, &catalog), HitOutcome::Absorbed);
        assert_eq!(player.power_tier, 2);
        assert_eq!(player.unit.projectile_cap, PLAYER_PROJECTILE_CAP);
    }

    #[test]
    fn test_top_tier_fires_high_damage() {
        let (mut player, config, catalog) = ready_player();
        player.change_power_tier(3, &config);
        let fire = PlayerInput { fire: true, ..Default::default() };
        player.apply_input(&PlayerInput::default(), 200, &config, &catalog);
        assert!(player.apply_input(&fire, 16, &config, &catalog));
        assert!(player.unit.projectiles[0].high_damage);
    }

    #[test]
    fn test_reload_interval() {
        let (mut player, config, catalog) = ready_player();
        let fire = PlayerInput { fire: true, ..Default::default() };
        player.apply_input(&PlayerInput::default(), 200, &config, &catalog);
        assert!(player.apply_input(&fire, 16, &config, &catalog));
        // 16ms later the reload has not elapsed
        assert!(!player.apply_input(&fire, 16, &config, &catalog));
        assert_eq!(player.unit.projectiles.len(), 1);
    }

    #[test]
    fn test_input_priority_and_stop() {
        let (mut player, config, catalog) = ready_player();
        let input = PlayerInput { left: true, down: true, ..Default::default() };
        player.apply_input(&input, 16, &config, &catalog);
        assert_eq!(player.unit.direction, Direction::Down);
        assert!(player.unit.speed > 0.0);
        player.apply_input(&PlayerInput::default(), 16, &config, &catalog);
        assert_eq!(player.unit.speed, 0.0);
    }

    #[test]
    fn test_last_life_waits_for_projectiles() {
        let (mut player, config, catalog) = ready_player();
        player.unit.lives = 1;
        player.apply_input(&PlayerInput::default(), 200, &config, &catalog);
        player.apply_input(&PlayerInput { fire: true, ..Default::default() }, 16, &config, &catalog);
        player.destroy(&config, &catalog);
        assert!(player.is_eliminated());
        let mut ticks = 0;
        while !player.unit.explosion_finished() {
            player.advance(16, &config, &catalog);
            ticks += 1;
            assert!(ticks < 200);
        }
        // the shot is still flying across an open field
        if !player.unit.projectiles.is_empty() {
            assert!(!player.unit.entity.to_erase);
            player.unit.projectiles.clear();
            player.advance(16, &config, &catalog);
        }
        assert!(player.unit.entity.to_erase);
    }

    #[test]
    fn test_respawn_after_explosion() {
        let (mut player, config, catalog) = ready_player();
        player.destroy(&config, &catalog);
        for _ in 0..100 {
            player.advance(16, &config, &catalog);
        }
        assert_eq!(player.unit.lives, 2);
        assert!(player.unit.has(UnitFlag::Spawning) || player.unit.is_active());
        assert!(player.unit.has(UnitFlag::Invulnerable));
        assert_eq!(player.unit.direction, Direction::Up);
    }

    #[test]
    fn test_eliminated_player_returns_after_victory() {
        let (mut player, config, catalog) = ready_player();
        player.unit.lives = 0;
        player.score = 700;
        player.prepare_next_round(true, &config, &catalog);
        assert_eq!(player.unit.lives, 1);
        assert_eq!(player.score, 700);
        assert!(player.unit.has(UnitFlag::Spawning));
    }
}
