//! Round state
//!
//! Everything one round of play owns: terrain, the objective, units,
//! power-ups, counters and the seeded RNG. `tick` drives it; the host reads
//! it back through `draw_list`, `status_panel`, `drain_sounds` and `outcome`.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bonus::Bonus;
use super::eagle::Eagle;
use super::enemy::{Enemy, roll_enemy};
use super::entity::DrawCommand;
use super::player::Player;
use super::sprites::SpriteCatalog;
use super::tank::UnitFlag;
use super::terrain::{Brick, TerrainGrid, Tile};
use crate::audio::SoundEffect;
use crate::roster::{RoundOutcome, RoundResult};
use crate::settings::SimConfig;

/// Banner position at which a lost round ends
const GAME_OVER_BANNER_STOP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Level title shown, nothing moves
    LevelIntro,
    Active,
    /// Objective lost; play continues while the banner scrolls in
    GameOver,
    /// Terminal; `outcome` is available
    Finished,
}

/// Per-player line of the side panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub index: usize,
    pub score: u32,
    pub lives: u32,
    pub power_tier: u32,
    /// Out of lives; stays listed so the score is still shown
    pub eliminated: bool,
}

/// Values the host shows beside the playfield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPanel {
    pub level_index: u32,
    pub enemies_remaining: u32,
    pub players: Vec<PlayerStatus>,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    pub config: SimConfig,
    pub catalog: Arc<SpriteCatalog>,
    pub phase: RoundPhase,
    pub paused: bool,
    pub result: Option<RoundResult>,
    pub level_index: u32,
    pub grid: TerrainGrid,
    pub eagle: Eagle,
    /// Players in play, in player order
    pub players: Vec<Player>,
    /// Players out of lives, kept for scoring
    pub fallen_players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub bonuses: Vec<Bonus>,
    /// Enemies still to destroy, on the map or waiting to spawn
    pub enemies_remaining: i32,
    pub enemy_ready_ms: u32,
    /// Next entry of `config.enemy_starts`
    pub spawn_cursor: usize,
    /// Time since fortify started, while it lasts
    pub fortify_ms: Option<u32>,
    pub intro_ms: u32,
    /// Time since the last enemy went down
    pub level_end_ms: u32,
    pub game_over_banner_y: f32,
    pub time_ms: u64,
    pub rng: Pcg32,
    pub(crate) sounds: Vec<SoundEffect>,
}

impl RoundState {
    /// Round on `grid` with an existing roster, starting at the level intro
    pub fn new(
        grid: TerrainGrid,
        level_index: u32,
        players: Vec<Player>,
        config: SimConfig,
        catalog: Arc<SpriteCatalog>,
        seed: u64,
    ) -> Self {
        let eagle = Eagle::new(grid.objective_pos(), &catalog);
        log::info!(
            "Round on level {} with {} player(s), {} enemies, seed {}",
            level_index,
            players.len(),
            config.enemy_start_count,
            seed
        );
        Self {
            enemies_remaining: config.enemy_start_count as i32,
            config,
            catalog,
            phase: RoundPhase::LevelIntro,
            paused: false,
            result: None,
            level_index,
            grid,
            eagle,
            players,
            fallen_players: Vec::new(),
            enemies: Vec::new(),
            bonuses: Vec::new(),
            enemy_ready_ms: 0,
            spawn_cursor: 0,
            fortify_ms: None,
            intro_ms: 0,
            level_end_ms: 0,
            game_over_banner_y: 0.0,
            time_ms: 0,
            rng: Pcg32::seed_from_u64(seed),
            sounds: vec![SoundEffect::LevelStart],
        }
    }

    /// Round with `player_count` new players
    pub fn new_game(
        grid: TerrainGrid,
        level_index: u32,
        player_count: usize,
        config: SimConfig,
        catalog: Arc<SpriteCatalog>,
        seed: u64,
    ) -> Self {
        let count = player_count.min(config.player_starts.len());
        let players = (0..count).map(|i| Player::new(i, &config, &catalog)).collect();
        Self::new(grid, level_index, players, config, catalog, seed)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RoundPhase::GameOver
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::Finished
    }

    /// Leave the round; the host returns to the menu
    pub fn abandon(&mut self) {
        if self.is_finished() {
            return;
        }
        log::info!("Level {} abandoned", self.level_index);
        self.finish(RoundResult::Abandoned);
    }

    pub(crate) fn finish(&mut self, result: RoundResult) {
        log::info!("Level {} finished: {:?}", self.level_index, result);
        self.phase = RoundPhase::Finished;
        self.result = Some(result);
    }

    /// Destroy the objective and start the game-over banner
    pub(crate) fn begin_game_over(&mut self) {
        if matches!(self.phase, RoundPhase::GameOver | RoundPhase::Finished) {
            return;
        }
        log::info!("Game over on level {}", self.level_index);
        self.eagle.destroy(&self.catalog);
        self.phase = RoundPhase::GameOver;
        self.game_over_banner_y = self.grid.pixel_size().1 as f32;
        self.sounds.push(SoundEffect::GameOver);
    }

    /// Scroll the banner; the round ends once it reaches the top
    pub(crate) fn scroll_game_over_banner(&mut self, dt: u32) {
        self.game_over_banner_y -= self.config.game_over_entry_speed * dt as f32;
        if self.game_over_banner_y < GAME_OVER_BANNER_STOP {
            self.finish(RoundResult::Defeat);
        }
    }

    /// Vertical position of the game-over banner while it shows
    pub fn game_over_banner(&self) -> Option<f32> {
        (self.is_game_over() || self.result == Some(RoundResult::Defeat))
            .then_some(self.game_over_banner_y.max(GAME_OVER_BANNER_STOP))
    }

    /// How the round ended, with the full roster; `None` while running
    ///
    /// Roster players are flagged for the results screen and ignore input
    /// until they respawn in the next round.
    pub fn outcome(&self) -> Option<RoundOutcome> {
        let result = self.result?;
        let roster = self
            .players
            .iter()
            .chain(&self.fallen_players)
            .map(|p| {
                let mut p = p.clone();
                p.unit.flags.insert(UnitFlag::Menu);
                p
            })
            .collect();
        Some(RoundOutcome {
            result,
            level_index: self.level_index,
            roster,
        })
    }

    /// Sound events queued since the last drain, oldest first
    pub fn drain_sounds(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.sounds)
    }

    pub fn status_panel(&self) -> StatusPanel {
        let mut players: Vec<PlayerStatus> = self
            .players
            .iter()
            .chain(&self.fallen_players)
            .map(|p| PlayerStatus {
                index: p.index,
                score: p.score,
                lives: p.unit.lives,
                power_tier: p.power_tier,
                eliminated: p.is_eliminated(),
            })
            .collect();
        players.sort_by_key(|p| p.index);
        StatusPanel {
            level_index: self.level_index,
            enemies_remaining: self.enemies_remaining.max(0) as u32,
            players,
        }
    }

    /// Sprites back to front: ground, objective, units with their shots,
    /// bushes, then power-ups
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        let catalog = &self.catalog;
        let mut out = Vec::new();
        self.grid.draw_tiles(catalog, &mut out);
        out.push(self.eagle.draw_command());
        for player in &self.players {
            player.draw(catalog, &mut out);
            player.unit.draw_projectiles(&mut out);
        }
        for enemy in &self.enemies {
            enemy.draw(catalog, &mut out);
            enemy.unit.draw_projectiles(&mut out);
        }
        self.grid.draw_bushes(catalog, &mut out);
        out.extend(self.bonuses.iter().filter_map(Bonus::draw_command));
        out
    }

    /// Put a new enemy on the next start point
    pub(crate) fn spawn_enemy(&mut self) {
        if self.config.enemy_starts.is_empty() {
            return;
        }
        let start = self.config.enemy_starts[self.spawn_cursor % self.config.enemy_starts.len()];
        self.spawn_cursor = (self.spawn_cursor + 1) % self.config.enemy_starts.len();
        let (kind, armor, drops_bonus) = roll_enemy(self.level_index, &mut self.rng);
        log::debug!(
            "Spawning enemy {:?} armor {} at {} (bonus: {})",
            kind,
            armor,
            start,
            drops_bonus
        );
        self.enemies.push(Enemy::new(
            kind,
            start.as_vec2(),
            armor,
            drops_bonus,
            &self.config,
            &self.catalog,
        ));
    }

    /// Drop a random power-up somewhere off the objective
    pub(crate) fn spawn_bonus(&mut self) {
        let bonus = Bonus::spawn_random(
            &mut self.rng,
            self.grid.map_rect(),
            self.eagle.rect(),
            &self.catalog,
        );
        log::debug!("Power-up {:?} at {}", bonus.kind, bonus.entity.pos);
        self.bonuses.push(bonus);
    }

    /// Replace the wall ring around the objective with stone, restarting
    /// the timer if already running
    pub fn start_fortify(&mut self) {
        self.grid.set_wall_ring(Tile::Stone);
        self.fortify_ms = Some(0);
        log::debug!("Fortify started");
    }

    /// Run the fortify timer
    ///
    /// During the last quarter the ring alternates between stone and fresh
    /// brick; when time runs out it is plain brick again.
    pub fn update_fortify(&mut self, dt: u32) {
        let Some(elapsed) = self.fortify_ms else {
            return;
        };
        let elapsed = elapsed.saturating_add(dt);
        if elapsed >= self.config.fortify_time {
            self.grid.set_wall_ring(Tile::Brick(Brick::new()));
            self.fortify_ms = None;
            log::debug!("Fortify expired");
            return;
        }
        self.fortify_ms = Some(elapsed);
        if elapsed > self.config.fortify_time / 4 * 3 {
            let blink = self.config.bonus_blink_time.max(1);
            let tile = if (elapsed / blink) % 2 == 1 {
                Tile::Brick(Brick::new())
            } else {
                Tile::Stone
            };
            self.grid.set_wall_ring(tile);
        }
    }
}
