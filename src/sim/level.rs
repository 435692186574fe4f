//! Level resources
//!
//! Levels are plain text files named by their index inside a level
//! directory. Recognized characters: `#` brick, `@` stone, `%` bush,
//! `~` water, `-` ice; anything else is empty ground.

use std::fs;
use std::path::{Path, PathBuf};

use super::terrain::TerrainGrid;
use crate::error::{Error, Result};

/// Built-in 26x26 level for runs without a level directory
pub const DEMO_LEVEL: &str = "\
..........................
..........................
..##..##..##..##..##..##..
..##..##..##..##..##..##..
..##..##..##..##..##..##..
..##..##..##@@##..##..##..
..##..##..##@@##..##..##..
..##..##..........##..##..
..##..##..........##..##..
..........##..##..........
..........##..##..........
##..####..........####..##
@@..####..........####..@@
..........##..##..........
..........######..........
..##..##..##..##..##..##..
..##..##..##..##..##..##..
..##..##..%%%%%%..##..##..
..##..##..~~~~~~..##..##..
..##..##..------..##..##..
..........................
..##..##..............##..
..##..##..............##..
...........####...........
...........#..#...........
...........#..#...........
";

pub fn level_path(dir: impl AsRef<Path>, index: u32) -> PathBuf {
    dir.as_ref().join(index.to_string())
}

/// Read and parse level `index` from `dir`
pub fn load_level(dir: impl AsRef<Path>, index: u32) -> Result<TerrainGrid> {
    let path = level_path(dir, index);
    let text = fs::read_to_string(&path).map_err(|source| Error::Level {
        path: path.clone(),
        source,
    })?;
    let grid = TerrainGrid::parse(&text);
    log::info!(
        "Loaded level {} ({}x{}) from {}",
        index,
        grid.cols(),
        grid.rows(),
        path.display()
    );
    Ok(grid)
}

/// Level after `index`, wrapping back to 1 after `level_count`
pub fn next_level_index(index: u32, level_count: u32) -> u32 {
    if index >= level_count.max(1) { 1 } else { index + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::Tile;

    #[test]
    fn test_demo_level_shape() {
        assert!(DEMO_LEVEL.lines().all(|l| l.len() == 26));
        let grid = TerrainGrid::parse(DEMO_LEVEL);
        assert_eq!((grid.cols(), grid.rows()), (26, 26));
        assert_eq!(grid.objective_cell(), (12, 24));
        for (col, row) in grid.fortify_cells() {
            assert!(matches!(grid.get(col, row), Tile::Brick(_)), "({col}, {row})");
        }
        assert_eq!(grid.bushes.len(), 6);
    }

    #[test]
    fn test_missing_level_is_level_error() {
        let err = load_level("/definitely/not/a/level/dir", 3).unwrap_err();
        match err {
            Error::Level { path, .. } => assert!(path.ends_with("3")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_load_from_dir() {
        let dir = std::env::temp_dir().join(format!("tank_arena_levels_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(level_path(&dir, 1), "@@@@\n#..#\n....\n....\n").unwrap();
        let grid = load_level(&dir, 1).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(grid.get(0, 0), Tile::Stone);
        assert_eq!(grid.rows(), 4);
    }

    #[test]
    fn test_level_index_wraps() {
        assert_eq!(next_level_index(1, 35), 2);
        assert_eq!(next_level_index(35, 35), 1);
        assert_eq!(next_level_index(40, 35), 1);
    }
}
