//! Fixed timestep round update
//!
//! Each tick runs the same passes in the same order: targets, intents,
//! collisions, movement, removal, spawning, end-of-round checks and the
//! fortify timer. Collisions are resolved against where things will be, so
//! nothing moves into a wall and has to be pushed back out.

use super::bonus::BonusKind;
use super::collision::{
    check_projectile_bushes, check_projectile_pair, check_projectile_terrain, check_unit_group,
    check_unit_groups, check_unit_terrain,
};
use super::geometry::Rect;
use super::player::PlayerInput;
use super::state::{RoundPhase, RoundState};
use super::tank::{HitOutcome, UnitFlag};
use crate::audio::SoundEffect;
use crate::roster::RoundResult;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Buttons per player index; missing entries hold nothing
    pub players: Vec<PlayerInput>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the round by `dt` milliseconds
///
/// Deltas above `config.max_tick_ms` come from stalls and are dropped.
pub fn tick(state: &mut RoundState, input: &TickInput, dt: u32) {
    if dt > state.config.max_tick_ms {
        log::trace!("Dropping {dt}ms tick");
        return;
    }

    match state.phase {
        RoundPhase::Finished => return,
        RoundPhase::LevelIntro => {
            state.intro_ms = state.intro_ms.saturating_add(dt);
            if state.intro_ms > state.config.level_start_time {
                log::info!("Level {} started", state.level_index);
                state.phase = RoundPhase::Active;
            }
            return;
        }
        RoundPhase::Active | RoundPhase::GameOver => {}
    }

    if input.pause && state.phase == RoundPhase::Active {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
    }
    if state.paused {
        return;
    }
    state.time_ms += u64::from(dt);

    assign_targets(state);
    apply_intents(state, input, dt);
    resolve_collisions(state, dt);
    advance(state, dt);
    remove_finished(state);
    spawn_enemies(state, dt);
    check_round_end(state, dt);
    state.update_fortify(dt);
}

fn manhattan(a: &Rect, b: &Rect) -> f32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
}

/// Homing enemies chase the nearest player within range; everyone else,
/// and homing enemies with nobody close, head for the objective
fn assign_targets(state: &mut RoundState) {
    let objective = state.eagle.rect();
    for enemy in &mut state.enemies {
        let here = enemy.unit.entity.dest_rect;
        let mut best = state.config.homing_cutoff;
        let mut target = objective.center();
        if enemy.kind.is_homing() {
            for player in &state.players {
                if player.unit.has(UnitFlag::Destroyed) {
                    continue;
                }
                let body = player.unit.entity.dest_rect;
                let distance = manhattan(&body, &here);
                if distance < best {
                    best = distance;
                    target = body.center();
                }
            }
        }
        if manhattan(&objective, &here) < best {
            target = objective.center();
        }
        enemy.target = Some(target);
    }
}

fn apply_intents(state: &mut RoundState, input: &TickInput, dt: u32) {
    for player in &mut state.players {
        let buttons = input.players.get(player.index).copied().unwrap_or_default();
        if player.apply_input(&buttons, dt, &state.config, &state.catalog) {
            state.sounds.push(SoundEffect::Shoot);
        }
    }
    for enemy in &mut state.enemies {
        if enemy.decide(dt, &mut state.rng, &state.config) {
            enemy.fire(&state.config, &state.catalog);
        }
    }
}

fn resolve_collisions(state: &mut RoundState, dt: u32) {
    for player in &mut state.players {
        player.unit.blocked = false;
    }
    for enemy in &mut state.enemies {
        enemy.unit.blocked = false;
    }

    // units against units
    check_unit_group(&mut state.players, dt);
    check_unit_group(&mut state.enemies, dt);
    check_unit_groups(&mut state.players, &mut state.enemies, dt);

    projectiles_vs_terrain(state);

    for player in &mut state.players {
        for projectile in &mut player.unit.projectiles {
            check_projectile_bushes(projectile, &mut state.grid.bushes, &state.catalog);
        }
    }

    player_shots_vs_enemies(state);
    enemy_shots_vs_players(state);

    for player in &mut state.players {
        for enemy in &mut state.enemies {
            for a in &mut player.unit.projectiles {
                for b in &mut enemy.unit.projectiles {
                    check_projectile_pair(a, b, &state.catalog);
                }
            }
        }
    }

    collect_bonuses(state);

    let objective = state.eagle.rect();
    let ice = state.config.ice_overlap_min;
    for enemy in &mut state.enemies {
        check_unit_terrain(&mut enemy.unit, &state.grid, objective, dt, ice);
    }
    for player in &mut state.players {
        check_unit_terrain(&mut player.unit, &state.grid, objective, dt, ice);
    }
}

fn projectiles_vs_terrain(state: &mut RoundState) {
    let mut objective_hit = false;
    for enemy in &mut state.enemies {
        for projectile in &mut enemy.unit.projectiles {
            let objective = (!objective_hit && state.eagle.is_intact()).then(|| state.eagle.rect());
            let impact = check_projectile_terrain(projectile, &mut state.grid, objective, &state.catalog);
            objective_hit |= impact.objective;
        }
    }
    for player in &mut state.players {
        for projectile in &mut player.unit.projectiles {
            let objective = (!objective_hit && state.eagle.is_intact()).then(|| state.eagle.rect());
            let impact = check_projectile_terrain(projectile, &mut state.grid, objective, &state.catalog);
            objective_hit |= impact.objective;
            if impact.brick {
                state.sounds.push(SoundEffect::BrickHit);
            } else if impact.solid || impact.edge {
                state.sounds.push(SoundEffect::SteelHit);
            }
        }
    }
    if objective_hit {
        log::info!("Objective destroyed");
        state.begin_game_over();
    }
}

fn player_shots_vs_enemies(state: &mut RoundState) {
    let mut drops = 0;
    for player in &mut state.players {
        for enemy in &mut state.enemies {
            for projectile in &mut player.unit.projectiles {
                if !projectile.is_live() || !projectile.rect().overlaps(&enemy.unit.rect()) {
                    continue;
                }
                projectile.destroy(&state.catalog);
                let carrier = enemy.unit.has(UnitFlag::DropsBonus);
                let outcome = enemy.destroy(&state.catalog);
                if outcome == HitOutcome::Ignored {
                    continue;
                }
                if carrier {
                    enemy.unit.flags.remove(UnitFlag::DropsBonus);
                    drops += 1;
                }
                player.score += enemy.score_for_hit();
                if outcome == HitOutcome::Destroyed {
                    state.enemies_remaining -= 1;
                    state.sounds.push(SoundEffect::TankExplosion);
                    log::debug!(
                        "Player {} destroyed {:?}, {} left",
                        player.index,
                        enemy.kind,
                        state.enemies_remaining
                    );
                } else {
                    state.sounds.push(SoundEffect::SteelHit);
                }
            }
        }
    }
    for _ in 0..drops {
        state.spawn_bonus();
    }
}

fn enemy_shots_vs_players(state: &mut RoundState) {
    for enemy in &mut state.enemies {
        for player in &mut state.players {
            for projectile in &mut enemy.unit.projectiles {
                if !projectile.is_live() || !projectile.rect().overlaps(&player.unit.rect()) {
                    continue;
                }
                projectile.destroy(&state.catalog);
                match player.destroy(&state.config, &state.catalog) {
                    HitOutcome::Destroyed => {
                        log::info!("Player {} hit, {} lives left", player.index, player.unit.lives);
                        state.sounds.push(SoundEffect::PlayerExplosion);
                    }
                    HitOutcome::Absorbed => state.sounds.push(SoundEffect::ShieldHit),
                    HitOutcome::Damaged | HitOutcome::Ignored => {}
                }
            }
        }
    }
}

fn collect_bonuses(state: &mut RoundState) {
    for pi in 0..state.players.len() {
        for bi in 0..state.bonuses.len() {
            let bonus = &state.bonuses[bi];
            if bonus.entity.to_erase || !bonus.rect().overlaps(&state.players[pi].unit.rect()) {
                continue;
            }
            let kind = bonus.kind;
            state.bonuses[bi].entity.to_erase = true;
            apply_bonus(state, pi, kind);
        }
    }
}

fn apply_bonus(state: &mut RoundState, pi: usize, kind: BonusKind) {
    state.sounds.push(SoundEffect::Bonus);
    let player = &mut state.players[pi];
    player.score += state.config.pickup_score;
    log::debug!("Player {} collected {:?}", player.index, kind);

    match kind {
        BonusKind::AreaClear => {
            for enemy in &mut state.enemies {
                if enemy.unit.entity.to_erase || enemy.unit.has(UnitFlag::Destroyed) {
                    continue;
                }
                enemy.unit.lives = 0;
                enemy.unit.explode(&state.catalog);
                player.score += state.config.area_clear_score;
                state.enemies_remaining -= 1;
                state.sounds.push(SoundEffect::TankExplosion);
            }
        }
        BonusKind::Shield => player.unit.grant_invulnerability(state.config.shield_time),
        BonusKind::Freeze => {
            for enemy in &mut state.enemies {
                if !enemy.unit.has(UnitFlag::Destroyed) {
                    enemy.unit.immobilize(state.config.frozen_time);
                }
            }
        }
        BonusKind::Fortify => state.start_fortify(),
        BonusKind::ExtraLife => {
            player.unit.lives += 1;
            state.sounds.push(SoundEffect::ExtraLife);
        }
        BonusKind::UpgradeMinor => player.change_power_tier(1, &state.config),
        BonusKind::UpgradeMajor => player.change_power_tier(3, &state.config),
        BonusKind::WaterCrossing => player.unit.flags.insert(UnitFlag::CanCrossWater),
    }
}

fn advance(state: &mut RoundState, dt: u32) {
    for player in &mut state.players {
        player.advance(dt, &state.config, &state.catalog);
    }
    for enemy in &mut state.enemies {
        enemy.advance(dt, &state.catalog);
    }
    for bonus in &mut state.bonuses {
        bonus.update(dt, &state.config);
    }
    state.eagle.update(dt, &state.catalog);
    state.grid.update(dt);
}

fn remove_finished(state: &mut RoundState) {
    state.enemies.retain(|e| !e.unit.entity.to_erase);
    state.bonuses.retain(|b| !b.entity.to_erase);
    state.grid.remove_cleared_bushes();

    if state.players.iter().any(|p| p.unit.entity.to_erase) {
        let (gone, staying): (Vec<_>, Vec<_>) = std::mem::take(&mut state.players)
            .into_iter()
            .partition(|p| p.unit.entity.to_erase);
        for player in &gone {
            log::info!("Player {} is out with {} points", player.index, player.score);
        }
        state.players = staying;
        state.fallen_players.extend(gone);
    }
}

fn spawn_enemies(state: &mut RoundState, dt: u32) {
    state.enemy_ready_ms = state.enemy_ready_ms.saturating_add(dt);
    let room = state
        .config
        .enemy_max_on_map
        .min(state.enemies_remaining.max(0) as usize);
    if state.enemies.len() < room && state.enemy_ready_ms > state.config.enemy_ready_time {
        state.enemy_ready_ms = 0;
        state.spawn_enemy();
    }
}

/// Defeat wins over a simultaneous victory
fn check_round_end(state: &mut RoundState, dt: u32) {
    if state.players.is_empty() {
        state.begin_game_over();
    }
    if state.is_game_over() {
        state.scroll_game_over_banner(dt);
    } else if state.enemies.is_empty() && state.enemies_remaining <= 0 {
        state.level_end_ms = state.level_end_ms.saturating_add(dt);
        if state.level_end_ms > state.config.level_end_time {
            state.finish(RoundResult::Victory);
        }
    }
}
