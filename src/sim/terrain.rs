//! Terrain grid and the destructible wall damage model
//!
//! The playfield is a rectangular grid of 16px tiles. Bushes are kept in a
//! separate list because they never block movement and draw above units.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Color, DrawCommand};
use super::geometry::Rect;
use super::sprites::{SpriteCatalog, SpriteKind};
use crate::Direction;
use crate::consts::TILE;

/// Damage code of a fully destroyed wall
const BRICK_DESTROYED: u8 = 9;

/// Destructible wall
///
/// `state` 0 is an intact tile, 1..=4 are halves (top, right, bottom, left
/// remaining), 5..=8 are quarters (top-right, bottom-right, top-left,
/// bottom-left remaining) and 9 is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Brick {
    hits: u8,
    state: u8,
}

impl Brick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == BRICK_DESTROYED
    }

    /// Apply a hit from a projectile travelling in `dir`
    pub fn hit(&mut self, dir: Direction) {
        let d = dir.index() as u8;
        self.hits = self.hits.saturating_add(1);
        self.state = match self.hits {
            1 => d + 1,
            2 => {
                let prior = self.state - 1;
                let s = prior * prior + d * d;
                if s % 2 == 1 { (s + 19) / 4 } else { BRICK_DESTROYED }
            }
            _ => BRICK_DESTROYED,
        };
    }

    /// Remaining solid part of the tile at `tile`
    pub fn collision_rect(&self, tile: Rect) -> Rect {
        let half = tile.w / 2;
        let (x, y) = (tile.x, tile.y);
        match self.state {
            0 => tile,
            1 => Rect::new(x, y, tile.w, half),
            2 => Rect::new(x + half, y, half, tile.h),
            3 => Rect::new(x, y + half, tile.w, half),
            4 => Rect::new(x, y, half, tile.h),
            5 => Rect::new(x + half, y, half, half),
            6 => Rect::new(x + half, y + half, half, half),
            7 => Rect::new(x, y, half, half),
            8 => Rect::new(x, y + half, half, half),
            _ => Rect::ZERO,
        }
    }
}

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Brick(Brick),
    Stone,
    Water,
    Ice,
}

impl Tile {
    pub fn from_char(c: char) -> Self {
        match c {
            '#' => Tile::Brick(Brick::new()),
            '@' => Tile::Stone,
            '~' => Tile::Water,
            '-' => Tile::Ice,
            _ => Tile::Empty,
        }
    }

    fn sprite(&self) -> Option<SpriteKind> {
        match self {
            Tile::Empty => None,
            Tile::Brick(_) => Some(SpriteKind::Brick),
            Tile::Stone => Some(SpriteKind::Stone),
            Tile::Water => Some(SpriteKind::Water),
            Tile::Ice => Some(SpriteKind::Ice),
        }
    }
}

/// Decorative cover tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bush {
    pub rect: Rect,
    pub cleared: bool,
}

/// Rectangular tile grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Tile>,
    pub bushes: Vec<Bush>,
    water_clock: u32,
}

impl TerrainGrid {
    /// All-empty grid
    pub fn empty(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Tile::Empty; cols * rows],
            bushes: Vec::new(),
            water_clock: 0,
        }
    }

    /// Build a grid from a level description
    ///
    /// One character per tile. Short rows are padded with empty tiles and
    /// unknown characters are empty, so bad input only means fewer obstacles.
    /// The objective's 2x2 footprint is always cleared.
    pub fn parse(text: &str) -> Self {
        let mut lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let mut grid = Self::empty(cols, lines.len());

        for (row, line) in lines.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                if c == '%' {
                    grid.bushes.push(Bush {
                        rect: Self::tile_rect(col, row),
                        cleared: false,
                    });
                } else {
                    grid.set(col, row, Tile::from_char(c));
                }
            }
        }

        let (ec, er) = grid.objective_cell();
        for (col, row) in [(ec, er), (ec + 1, er), (ec, er + 1), (ec + 1, er + 1)] {
            if col < grid.cols && row < grid.rows {
                grid.set(col, row, Tile::Empty);
            }
        }
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Playfield size in pixels
    pub fn pixel_size(&self) -> (i32, i32) {
        (self.cols as i32 * TILE, self.rows as i32 * TILE)
    }

    pub fn map_rect(&self) -> Rect {
        let (w, h) = self.pixel_size();
        Rect::new(0, 0, w, h)
    }

    /// Top-left cell of the objective's 2x2 footprint
    pub fn objective_cell(&self) -> (usize, usize) {
        ((self.cols / 2).saturating_sub(1), self.rows.saturating_sub(2))
    }

    pub fn objective_pos(&self) -> Vec2 {
        let (c, r) = self.objective_cell();
        Vec2::new((c as i32 * TILE) as f32, (r as i32 * TILE) as f32)
    }

    pub fn tile_rect(col: usize, row: usize) -> Rect {
        Rect::new(col as i32 * TILE, row as i32 * TILE, TILE, TILE)
    }

    /// Panics on out-of-range indices; scans clamp before reading.
    pub fn get(&self, col: usize, row: usize) -> Tile {
        assert!(col < self.cols && row < self.rows, "cell ({col}, {row}) outside grid");
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        assert!(col < self.cols && row < self.rows, "cell ({col}, {row}) outside grid");
        self.cells[row * self.cols + col] = tile;
    }

    /// Solid rectangle of a cell, `None` for empty cells
    pub fn cell_rect(&self, col: usize, row: usize) -> Option<Rect> {
        let tile_rect = Self::tile_rect(col, row);
        match self.get(col, row) {
            Tile::Empty => None,
            Tile::Brick(brick) => Some(brick.collision_rect(tile_rect)),
            _ => Some(tile_rect),
        }
    }

    /// Cells in an inclusive col/row span clipped to the grid, row-major
    fn band(&self, cols: (i32, i32), rows: (i32, i32)) -> Vec<(usize, usize)> {
        if self.cols == 0 || self.rows == 0 {
            return Vec::new();
        }
        let c0 = cols.0.max(0);
        let r0 = rows.0.max(0);
        let c1 = cols.1.min(self.cols as i32 - 1);
        let r1 = rows.1.min(self.rows as i32 - 1);
        let mut cells = Vec::new();
        for row in r0..=r1 {
            for col in c0..=c1 {
                cells.push((col as usize, row as usize));
            }
        }
        cells
    }

    /// Cells a unit heading `dir` may run into: the two rows/columns ahead of
    /// its leading edge, widened by one cell on each side
    pub fn unit_band(&self, rect: &Rect, dir: Direction) -> Vec<(usize, usize)> {
        let across_cols = (rect.x / TILE - 1, rect.right() / TILE + 1);
        let across_rows = (rect.y / TILE - 1, rect.bottom() / TILE + 1);
        match dir {
            Direction::Up => {
                let end = rect.y / TILE;
                self.band(across_cols, (end - 1, end))
            }
            Direction::Down => {
                let start = rect.bottom() / TILE;
                self.band(across_cols, (start, start + 1))
            }
            Direction::Right => {
                let start = rect.right() / TILE;
                self.band((start, start + 1), across_rows)
            }
            Direction::Left => {
                let end = rect.x / TILE;
                self.band((end - 1, end), across_rows)
            }
        }
    }

    /// Cells a projectile heading `dir` may hit: one row or column at its
    /// leading edge
    pub fn projectile_band(&self, rect: &Rect, dir: Direction) -> Vec<(usize, usize)> {
        let cols = (rect.x / TILE, rect.right() / TILE);
        let rows = (rect.y / TILE, rect.bottom() / TILE);
        match dir {
            Direction::Up => self.band(cols, (rows.0, rows.0)),
            Direction::Down => self.band(cols, (rows.1, rows.1)),
            Direction::Right => self.band((cols.1, cols.1), rows),
            Direction::Left => self.band((cols.0, cols.0), rows),
        }
    }

    /// Wall ring around the objective that fortify replaces
    ///
    /// Eight cells: the column on each side of the objective over its two rows
    /// and the row above, plus the two cells directly above it. The bottom
    /// edge is the map border, so the ring is closed on every open side.
    pub fn fortify_cells(&self) -> Vec<(usize, usize)> {
        let (ec, er) = self.objective_cell();
        let (ec, er) = (ec as i32, er as i32);
        let mut cells = Vec::with_capacity(8);
        for row in er - 1..=er + 1 {
            cells.push((ec - 1, row));
            cells.push((ec + 2, row));
        }
        cells.push((ec, er - 1));
        cells.push((ec + 1, er - 1));
        cells
            .into_iter()
            .filter(|&(c, r)| c >= 0 && r >= 0 && (c as usize) < self.cols && (r as usize) < self.rows)
            .map(|(c, r)| (c as usize, r as usize))
            .collect()
    }

    /// Fill the fortify ring with `tile`
    pub fn set_wall_ring(&mut self, tile: Tile) {
        for (col, row) in self.fortify_cells() {
            self.set(col, row, tile);
        }
    }

    pub fn update(&mut self, dt: u32) {
        self.water_clock = self.water_clock.wrapping_add(dt);
    }

    /// Drop bushes cleared this tick
    pub fn remove_cleared_bushes(&mut self) {
        self.bushes.retain(|b| !b.cleared);
    }

    /// Ground tiles (everything but bushes)
    pub fn draw_tiles(&self, catalog: &SpriteCatalog, out: &mut Vec<DrawCommand>) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let tile = self.get(col, row);
                let Some(kind) = tile.sprite() else { continue };
                let data = catalog.get(kind);
                let src = match tile {
                    Tile::Brick(brick) => data.rect.cell(0, brick.state() as i32),
                    Tile::Water if data.frame_duration > 0 => {
                        let frame = self.water_clock / data.frame_duration % data.frames_count.max(1);
                        data.rect.cell(0, frame as i32)
                    }
                    _ => data.rect,
                };
                out.push(DrawCommand {
                    src,
                    dest: Self::tile_rect(col, row),
                    tint: Color::WHITE,
                });
            }
        }
    }

    pub fn draw_bushes(&self, catalog: &SpriteCatalog, out: &mut Vec<DrawCommand>) {
        let src = catalog.get(SpriteKind::Bush).rect;
        out.extend(self.bushes.iter().filter(|b| !b.cleared).map(|b| DrawCommand {
            src,
            dest: b.rect,
            tint: Color::WHITE,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn hit_twice(first: Direction, second: Direction) -> Brick {
        let mut brick = Brick::new();
        brick.hit(first);
        brick.hit(second);
        brick
    }

    #[test]
    fn test_first_hit_leaves_half() {
        for dir in Direction::ALL {
            let mut brick = Brick::new();
            brick.hit(dir);
            assert_eq!(brick.state(), dir.index() as u8 + 1);
        }
    }

    #[test]
    fn test_second_hit_table() {
        // (first, second) -> resulting state, 9 = destroyed
        let table = [
            (Up, Up, 9),
            (Up, Right, 5),
            (Up, Down, 9),
            (Up, Left, 7),
            (Right, Up, 5),
            (Right, Right, 9),
            (Right, Down, 6),
            (Right, Left, 9),
            (Down, Up, 9),
            (Down, Right, 6),
            (Down, Down, 9),
            (Down, Left, 8),
            (Left, Up, 7),
            (Left, Right, 9),
            (Left, Down, 8),
            (Left, Left, 9),
        ];
        for (first, second, expected) in table {
            let brick = hit_twice(first, second);
            assert_eq!(brick.state(), expected, "{first:?} then {second:?}");
            assert_eq!(brick.is_destroyed(), expected == 9);
        }
    }

    #[test]
    fn test_third_hit_always_destroys() {
        let mut brick = hit_twice(Up, Right);
        assert!(!brick.is_destroyed());
        brick.hit(Down);
        assert!(brick.is_destroyed());
    }

    #[test]
    fn test_damage_geometry() {
        let tile = Rect::new(32, 48, 16, 16);
        let mut brick = Brick::new();
        assert_eq!(brick.collision_rect(tile), tile);
        brick.hit(Up);
        assert_eq!(brick.collision_rect(tile), Rect::new(32, 48, 16, 8));
        brick.hit(Left);
        assert_eq!(brick.collision_rect(tile), Rect::new(32, 48, 8, 8));
        brick.hit(Left);
        assert!(!brick.collision_rect(tile).has_area());
    }

    #[test]
    fn test_parse_pads_and_clears_objective() {
        let grid = TerrainGrid::parse("#@~-%x\n##\n######\n######\n\n");
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.rows(), 4);
        assert!(matches!(grid.get(0, 0), Tile::Brick(_)));
        assert_eq!(grid.get(1, 0), Tile::Stone);
        assert_eq!(grid.get(2, 0), Tile::Water);
        assert_eq!(grid.get(3, 0), Tile::Ice);
        assert_eq!(grid.get(4, 0), Tile::Empty);
        assert_eq!(grid.get(5, 0), Tile::Empty);
        assert_eq!(grid.get(5, 1), Tile::Empty);
        assert_eq!(grid.bushes.len(), 1);
        // objective at cols 2..=3, rows 2..=3
        assert_eq!(grid.objective_cell(), (2, 2));
        assert_eq!(grid.get(2, 2), Tile::Empty);
        assert_eq!(grid.get(3, 3), Tile::Empty);
        assert!(matches!(grid.get(1, 3), Tile::Brick(_)));
    }

    #[test]
    fn test_unit_band_is_clamped() {
        let grid = TerrainGrid::empty(26, 26);
        let band = grid.unit_band(&Rect::new(0, 0, 32, 32), Up);
        // rows -1..=0 clamp to 0, cols -1..=3 clamp to 0..=3
        assert_eq!(band.len(), 4);
        assert!(band.iter().all(|&(_, r)| r == 0));

        let band = grid.unit_band(&Rect::new(64, 64, 32, 32), Right);
        assert_eq!(band.len(), 2 * 5);
        assert!(band.iter().all(|&(c, _)| c == 6 || c == 7));
    }

    #[test]
    fn test_projectile_band_is_single_line() {
        let grid = TerrainGrid::empty(26, 26);
        let band = grid.projectile_band(&Rect::new(60, 92, 8, 8), Left);
        assert_eq!(band, vec![(3, 5), (3, 6)]);
    }

    #[test]
    fn test_fortify_ring_on_full_map() {
        let grid = TerrainGrid::empty(26, 26);
        let mut cells = grid.fortify_cells();
        cells.sort();
        assert_eq!(
            cells,
            vec![(11, 23), (11, 24), (11, 25), (12, 23), (13, 23), (14, 23), (14, 24), (14, 25)]
        );
    }
}
