//! Collision detection against predicted positions
//!
//! Units are tested at the rectangle they would occupy after this tick's
//! movement; a hit on the leading edge cancels the move. Projectiles are
//! tested where they are and stop on the first solid thing they touch.

use std::iter;

use super::geometry::{Rect, intersect};
use super::projectile::Projectile;
use super::sprites::SpriteCatalog;
use super::tank::{ArmoredUnit, AsUnit, UnitFlag};
use super::terrain::{Bush, TerrainGrid, Tile};
use crate::consts::TILE;

/// What a projectile ran into on the terrain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainImpact {
    /// Damaged or removed a brick
    pub brick: bool,
    /// Stopped on stone, or removed it with a high-damage shot
    pub solid: bool,
    /// Left the playfield
    pub edge: bool,
    /// Reached the intact objective
    pub objective: bool,
}

/// Cancel movement of two units whose predicted rectangles overlap
pub fn check_unit_pair(a: &mut ArmoredUnit, b: &mut ArmoredUnit, dt: u32) {
    let overlap = intersect(&a.next_collision_rect(dt), &b.next_collision_rect(dt));
    if overlap.has_area() {
        a.collide(&overlap);
        b.collide(&overlap);
    }
}

/// Every unordered pair within one group
pub fn check_unit_group<T: AsUnit>(units: &mut [T], dt: u32) {
    for i in 0..units.len() {
        let (head, tail) = units.split_at_mut(i + 1);
        let a = head[i].unit_mut();
        for b in tail {
            check_unit_pair(a, b.unit_mut(), dt);
        }
    }
}

/// Every pair across two groups
pub fn check_unit_groups<A: AsUnit, B: AsUnit>(first: &mut [A], second: &mut [B], dt: u32) {
    for a in first.iter_mut() {
        for b in second.iter_mut() {
            check_unit_pair(a.unit_mut(), b.unit_mut(), dt);
        }
    }
}

/// Stop a unit at walls, water, the map edges and the objective
///
/// Overlapping ice by more than `ice_overlap_min` on both axes puts the unit
/// on ice instead of blocking it.
pub fn check_unit_terrain(
    unit: &mut ArmoredUnit,
    grid: &TerrainGrid,
    objective: Rect,
    dt: u32,
    ice_overlap_min: i32,
) {
    if !unit.is_active() {
        return;
    }
    let next = unit.next_collision_rect(dt);
    let crosses_water = unit.has(UnitFlag::CanCrossWater);

    // one blocking cell per row is enough
    let mut done_row = None;
    for (col, row) in grid.unit_band(&unit.rect(), unit.direction) {
        if unit.blocked {
            break;
        }
        if done_row == Some(row) {
            continue;
        }
        let tile = grid.get(col, row);
        if crosses_water && tile == Tile::Water {
            continue;
        }
        let Some(cell) = grid.cell_rect(col, row) else {
            continue;
        };
        let overlap = intersect(&cell, &next);
        if !overlap.has_area() {
            continue;
        }
        if tile == Tile::Ice {
            if overlap.w > ice_overlap_min && overlap.h > ice_overlap_min {
                unit.flags.insert(UnitFlag::OnIce);
            }
            continue;
        }
        unit.collide(&overlap);
        done_row = Some(row);
    }

    let (w, h) = grid.pixel_size();
    let outside = [
        Rect::new(-TILE, -TILE, TILE, h + 2 * TILE),
        Rect::new(w, -TILE, TILE, h + 2 * TILE),
        Rect::new(0, -TILE, w, TILE),
        Rect::new(0, h, w, TILE),
    ];
    for rect in outside.iter().chain(iter::once(&objective)) {
        let overlap = intersect(rect, &next);
        if overlap.has_area() {
            unit.collide(&overlap);
        }
    }
}

/// Projectile against walls, the playfield bounds and the objective
///
/// A projectile can damage two cells on the same tick when it arrives
/// between them. Water and ice let it pass. `objective` is `None` once the
/// objective is no longer a target.
pub fn check_projectile_terrain(
    projectile: &mut Projectile,
    grid: &mut TerrainGrid,
    objective: Option<Rect>,
    catalog: &SpriteCatalog,
) -> TerrainImpact {
    let mut impact = TerrainImpact::default();
    if !projectile.is_live() {
        return impact;
    }
    let rect = projectile.rect();

    for (col, row) in grid.projectile_band(&rect, projectile.direction) {
        let tile = grid.get(col, row);
        if matches!(tile, Tile::Empty | Tile::Water | Tile::Ice) {
            continue;
        }
        let Some(cell) = grid.cell_rect(col, row) else {
            continue;
        };
        if !intersect(&cell, &rect).has_area() {
            continue;
        }
        match tile {
            Tile::Brick(_) if projectile.high_damage => {
                grid.set(col, row, Tile::Empty);
                impact.brick = true;
            }
            Tile::Brick(mut brick) => {
                brick.hit(projectile.direction);
                let next = if brick.is_destroyed() {
                    Tile::Empty
                } else {
                    Tile::Brick(brick)
                };
                grid.set(col, row, next);
                impact.brick = true;
            }
            _ if projectile.high_damage => {
                grid.set(col, row, Tile::Empty);
                impact.solid = true;
            }
            _ => impact.solid = true,
        }
        projectile.destroy(catalog);
    }

    let map = grid.map_rect();
    if rect.x < map.x || rect.y < map.y || rect.right() > map.right() || rect.bottom() > map.bottom() {
        projectile.destroy(catalog);
        impact.edge = true;
    }

    if objective.is_some_and(|o| rect.overlaps(&o)) {
        projectile.destroy(catalog);
        impact.objective = true;
    }
    impact
}

/// High-damage projectiles clear the bushes they touch
pub fn check_projectile_bushes(projectile: &mut Projectile, bushes: &mut [Bush], catalog: &SpriteCatalog) {
    if !projectile.is_live() || !projectile.high_damage {
        return;
    }
    let rect = projectile.rect();
    for bush in bushes.iter_mut().filter(|b| !b.cleared) {
        if bush.rect.overlaps(&rect) {
            bush.cleared = true;
            projectile.destroy(catalog);
        }
    }
}

/// Opposing projectiles cancel each other out
pub fn check_projectile_pair(a: &mut Projectile, b: &mut Projectile, catalog: &SpriteCatalog) -> bool {
    if !a.is_live() || !b.is_live() || !a.rect().overlaps(&b.rect()) {
        return false;
    }
    a.destroy(catalog);
    b.destroy(catalog);
    true
}
