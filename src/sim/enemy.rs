//! Autonomous units and their decision loop

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::DrawCommand;
use super::sprites::{SpriteCatalog, SpriteKind};
use super::tank::{ArmoredUnit, AsUnit, HitOutcome, UnitFlag};
use crate::Direction;
use crate::consts::SPEED_BOOST;
use crate::settings::SimConfig;

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Pursuer: hunts nearby players and usually steers toward its target
    A,
    /// Fast mover
    B,
    /// Rapid fire with faster shells
    C,
    /// Sniper: hunts players and only fires when stuck or lined up
    D,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [EnemyKind::A, EnemyKind::B, EnemyKind::C, EnemyKind::D];

    pub fn sprite(self) -> SpriteKind {
        match self {
            EnemyKind::A => SpriteKind::TankA,
            EnemyKind::B => SpriteKind::TankB,
            EnemyKind::C => SpriteKind::TankC,
            EnemyKind::D => SpriteKind::TankD,
        }
    }

    /// Prefers a nearby player over the objective as target
    pub fn is_homing(self) -> bool {
        matches!(self, EnemyKind::A | EnemyKind::D)
    }

    /// Chance of steering toward the target on a direction change
    fn pursuit_chance(self) -> f32 {
        if self == EnemyKind::A { 0.8 } else { 0.5 }
    }
}

/// Share of new enemies that drop a power-up when hit
const BONUS_CARRIER_CHANCE: f32 = 0.12;

/// Chance that a new enemy on `level` is a sniper; the rest split evenly
pub fn sniper_chance(level: u32) -> f32 {
    0.00735 * level as f32 + 0.09265
}

/// Armor tier (1..=4) for a new enemy on `level` given a uniform draw `p`
///
/// Heavier armor grows more likely with the level, on a steeper curve after
/// level 17.
pub fn spawn_armor(level: u32, p: f32) -> u32 {
    let l = level as f32;
    let (a, b, c) = if level <= 17 {
        (
            -0.040625 * l + 0.940625,
            -0.028125 * l + 0.978125,
            -0.014375 * l + 0.994375,
        )
    } else {
        (
            -0.012778 * l + 0.467222,
            -0.025 * l + 0.925,
            -0.036111 * l + 1.363889,
        )
    };
    if p < a {
        1
    } else if p < b {
        2
    } else if p < c {
        3
    } else {
        4
    }
}

/// Roll kind, armor and power-up flag for a new enemy on `level`
pub fn roll_enemy<R: Rng>(level: u32, rng: &mut R) -> (EnemyKind, u32, bool) {
    let kind = if rng.random::<f32>() < sniper_chance(level) {
        EnemyKind::D
    } else {
        EnemyKind::ALL[rng.random_range(0..3)]
    };
    let armor = spawn_armor(level, rng.random());
    let drops_bonus = rng.random::<f32>() < BONUS_CARRIER_CHANCE;
    (kind, armor, drops_bonus)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub unit: ArmoredUnit,
    pub kind: EnemyKind,
    /// Point this unit steers and aims toward, assigned each tick
    pub target: Option<Vec2>,
    direction_ms: u32,
    keep_direction_ms: u32,
    move_ms: u32,
    resume_ms: u32,
    fire_ms: u32,
    reload_ms: u32,
}

impl Enemy {
    /// Enemy playing its spawn flash at `pos`, facing down
    pub fn new(
        kind: EnemyKind,
        pos: Vec2,
        armor: u32,
        drops_bonus: bool,
        config: &SimConfig,
        catalog: &SpriteCatalog,
    ) -> Self {
        let speed = match kind {
            EnemyKind::B => config.tank_default_speed * SPEED_BOOST,
            _ => config.tank_default_speed,
        };
        let mut unit = ArmoredUnit::new(pos, kind.sprite(), speed, 1, catalog);
        unit.respawn(pos, Direction::Down, catalog);
        unit.lives = armor.max(1);
        if drops_bonus {
            unit.flags.insert(UnitFlag::DropsBonus);
        }
        Self {
            unit,
            kind,
            target: None,
            direction_ms: 0,
            keep_direction_ms: 100,
            move_ms: 0,
            resume_ms: 100,
            fire_ms: 0,
            reload_ms: 100,
        }
    }

    pub fn projectile_speed(&self, config: &SimConfig) -> f32 {
        match self.kind {
            EnemyKind::C => config.projectile_default_speed * SPEED_BOOST,
            _ => config.projectile_default_speed,
        }
    }

    fn offset_to_target(&self, target: Vec2) -> Vec2 {
        target - self.unit.entity.dest_rect.center()
    }

    /// Run the decision timers. Returns whether the unit wants to fire.
    pub fn decide<R: Rng>(&mut self, dt: u32, rng: &mut R, config: &SimConfig) -> bool {
        if !self.unit.is_active() || self.unit.has(UnitFlag::Immobilized) {
            return false;
        }
        self.direction_ms += dt;
        self.move_ms += dt;
        self.fire_ms += dt;

        if self.direction_ms > self.keep_direction_ms {
            self.direction_ms = 0;
            self.keep_direction_ms = rng.random_range(100..900);
            let dir = match self.target {
                Some(target) if rng.random::<f32>() < self.kind.pursuit_chance() => {
                    let d = self.offset_to_target(target);
                    let horizontal = if d.x < 0.0 { Direction::Left } else { Direction::Right };
                    let vertical = if d.y < 0.0 { Direction::Up } else { Direction::Down };
                    let (major, minor) = if d.x.abs() > d.y.abs() {
                        (horizontal, vertical)
                    } else {
                        (vertical, horizontal)
                    };
                    if rng.random::<f32>() < 0.7 { major } else { minor }
                }
                _ => Direction::from_index(rng.random_range(0..4)),
            };
            self.unit.set_direction(dir, config.slip_time);
        }

        if self.move_ms > self.resume_ms {
            self.move_ms = 0;
            self.resume_ms = rng.random_range(0..300);
            self.unit.speed = self.unit.default_speed;
        }

        if self.fire_ms > self.reload_ms {
            self.fire_ms = 0;
            return match self.kind {
                EnemyKind::D => {
                    self.reload_ms = rng.random_range(0..400);
                    self.unit.blocked || self.lined_up()
                }
                EnemyKind::C => {
                    self.reload_ms = rng.random_range(0..800);
                    true
                }
                _ => {
                    self.reload_ms = rng.random_range(0..1000);
                    true
                }
            };
        }
        false
    }

    /// Target lies ahead along the current facing, within a body width
    fn lined_up(&self) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let d = self.offset_to_target(target);
        let r = self.unit.entity.dest_rect;
        let (w, h) = (r.w as f32, r.h as f32);
        match self.unit.direction {
            Direction::Up => d.y < 0.0 && d.x.abs() < w,
            Direction::Right => d.x > 0.0 && d.y.abs() < h,
            Direction::Down => d.y > 0.0 && d.x.abs() < w,
            Direction::Left => d.x < 0.0 && d.y.abs() < h,
        }
    }

    pub fn fire(&mut self, config: &SimConfig, catalog: &SpriteCatalog) -> bool {
        let speed = self.projectile_speed(config);
        self.unit.fire(speed, false, catalog)
    }

    pub fn destroy(&mut self, catalog: &SpriteCatalog) -> HitOutcome {
        self.unit.destroy(catalog)
    }

    /// Points for a player hit that left the unit at its current armor
    pub fn score_for_hit(&self) -> u32 {
        if self.unit.lives > 0 { 50 } else { 100 }
    }

    pub fn advance(&mut self, dt: u32, catalog: &SpriteCatalog) {
        self.unit.advance(dt, catalog);
        if self.unit.explosion_finished() && self.unit.projectiles.is_empty() {
            self.unit.entity.to_erase = true;
        }
        self.refresh_frame();
    }

    fn refresh_frame(&mut self) {
        let heading = self.unit.heading().index();
        let col = if self.unit.has(UnitFlag::DropsBonus) {
            heading - 4
        } else {
            heading + (self.unit.lives.max(1) as i32 - 1) * 4
        };
        self.unit.set_body_frame(col, 0);
    }

    pub fn draw(&self, catalog: &SpriteCatalog, out: &mut Vec<DrawCommand>) {
        self.unit.draw(SpriteKind::BoatP2, catalog, out);
    }

    #[cfg(test)]
    pub(crate) fn activate(&mut self, catalog: &SpriteCatalog) {
        self.unit.activate(catalog);
        self.unit.direction = Direction::Down;
        self.unit.requested_direction = Direction::Down;
        self.refresh_frame();
    }
}

impl AsUnit for Enemy {
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
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ready_enemy(kind: EnemyKind, armor: u32) -> (Enemy, SimConfig, SpriteCatalog) {
        let config = SimConfig::default();
        let catalog = SpriteCatalog::default();
        let mut enemy = Enemy::new(kind, Vec2::new(192.0, 192.0), armor, false, &config, &catalog);
        enemy.activate(&catalog);
        (enemy, config, catalog)
    }

    #[test]
    fn test_spawns_facing_down_without_shield() {
        let config = SimConfig::default();
        let catalog = SpriteCatalog::default();
        let enemy = Enemy::new(EnemyKind::B, Vec2::new(1.0, 1.0), 2, true, &config, &catalog);
        assert!(enemy.unit.has(UnitFlag::Spawning));
        assert!(enemy.unit.has(UnitFlag::DropsBonus));
        assert!(!enemy.unit.has(UnitFlag::Invulnerable));
        assert_eq!(enemy.unit.direction, Direction::Down);
        assert_eq!(enemy.unit.lives, 2);
        assert!(enemy.unit.default_speed > config.tank_default_speed);
    }

    #[test]
    fn test_armor_and_score() {
        let (mut enemy, _, catalog) = ready_enemy(EnemyKind::A, 2);
        assert_eq!(enemy.destroy(&catalog), HitOutcome::Damaged);
        assert_eq!(enemy.score_for_hit(), 50);
        assert_eq!(enemy.destroy(&catalog), HitOutcome::Destroyed);
        assert_eq!(enemy.score_for_hit(), 100);
    }

    #[test]
    fn test_immobilized_makes_no_decisions() {
        let (mut enemy, config, _) = ready_enemy(EnemyKind::C, 1);
        let mut rng = Pcg32::seed_from_u64(7);
        enemy.unit.immobilize(1000);
        for _ in 0..50 {
            assert!(!enemy.decide(16, &mut rng, &config));
        }
        assert_eq!(enemy.unit.speed, 0.0);
    }

    #[test]
    fn test_resumes_moving_and_fires() {
        let (mut enemy, config, _) = ready_enemy(EnemyKind::B, 1);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut wants_fire = false;
        for _ in 0..200 {
            wants_fire |= enemy.decide(16, &mut rng, &config);
        }
        assert!(wants_fire);
        assert!(enemy.unit.speed > 0.0);
    }

    #[test]
    fn test_pursuer_steers_toward_target() {
        let (mut enemy, config, _) = ready_enemy(EnemyKind::A, 1);
        // target far to the right on the same row
        enemy.target = Some(Vec2::new(2000.0, 208.0));
        let mut rng = Pcg32::seed_from_u64(11);
        let mut rights = 0;
        let mut turns = 0;
        for _ in 0..20_000 {
            let before = enemy.direction_ms;
            enemy.decide(16, &mut rng, &config);
            if enemy.direction_ms < before {
                turns += 1;
                if enemy.unit.direction == Direction::Right {
                    rights += 1;
                }
            }
        }
        assert!(turns > 10);
        // pursuit 0.8 * major axis 0.7 plus random picks
        assert!(rights * 2 > turns, "{rights} of {turns}");
    }

    #[test]
    fn test_sniper_fires_only_when_lined_up() {
        let (mut enemy, config, _) = ready_enemy(EnemyKind::D, 1);
        enemy.unit.direction = Direction::Down;
        enemy.target = Some(Vec2::new(208.0, 400.0));
        assert!(enemy.lined_up());
        enemy.target = Some(Vec2::new(400.0, 400.0));
        assert!(!enemy.lined_up());
        enemy.unit.blocked = true;
        enemy.fire_ms = 0;
        enemy.reload_ms = 0;
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(enemy.decide(1, &mut rng, &config));
    }

    #[test]
    fn test_armor_curves() {
        // level 1: mostly light armor
        assert_eq!(spawn_armor(1, 0.0), 1);
        assert_eq!(spawn_armor(1, 0.89), 1);
        assert_eq!(spawn_armor(1, 0.91), 2);
        assert_eq!(spawn_armor(1, 0.97), 3);
        assert_eq!(spawn_armor(1, 0.99), 4);
        // level 35: heavy armor dominates
        assert_eq!(spawn_armor(35, 0.01), 1);
        assert_eq!(spawn_armor(35, 0.03), 2);
        assert_eq!(spawn_armor(35, 0.07), 3);
        assert_eq!(spawn_armor(35, 0.5), 4);
        assert!(sniper_chance(35) > sniper_chance(1));
    }

    #[test]
    fn test_rolls_are_seeded() {
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for level in 1..=35 {
            let roll = roll_enemy(level, &mut a);
            assert_eq!(roll, roll_enemy(level, &mut b));
            assert!((1..=4).contains(&roll.1));
        }
    }

    #[test]
    fn test_bonus_carrier_uses_marked_frames() {
        let config = SimConfig::default();
        let catalog = SpriteCatalog::default();
        let mut enemy = Enemy::new(EnemyKind::A, Vec2::new(0.0, 0.0), 1, true, &config, &catalog);
        enemy.activate(&catalog);
        // facing down (2) shifted four columns left of the base sheet
        assert_eq!(enemy.unit.entity.src_rect.x, 128 + (2 - 4) * 32);
    }
}
