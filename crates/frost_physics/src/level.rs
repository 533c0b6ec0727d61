//! Level files: the tile layout, an optional tile palette override, and the
//! player-start metadata that decides where an entity spawns.

use crate::tiles::{GridCell, RoleSet, TileGrid, TileRole, TileSet, DEFAULT_TILE_SIZE, EMPTY_TILE};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Spawn used when a level offers nothing better.
pub const FALLBACK_SPAWN: (f32, f32) = (100.0, 100.0);

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    pub rows: Vec<Vec<u16>>,
    #[serde(default)]
    pub player_start: Option<GridCell>,
    /// Replaces the standard palette entirely when present.
    #[serde(default)]
    pub tile_types: Option<TileSet>,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub level_id: String,
    pub name: String,
    pub grid: TileGrid,
    pub player_start: Option<GridCell>,
}

impl Level {
    pub fn from_file(file: LevelFile) -> Self {
        let tile_set = file.tile_types.unwrap_or_else(TileSet::standard);
        let grid = TileGrid::from_rows(&file.rows, file.tile_size, tile_set);
        Self {
            level_id: file.level_id,
            name: file.name,
            grid,
            player_start: file.player_start,
        }
    }

    /// Top-left pixel position for a fresh entity, in priority order: explicit
    /// `player_start`, the first spawn-marker tile, the first empty cell resting
    /// on plain solid ground, then [`FALLBACK_SPAWN`].
    pub fn spawn_point(&self) -> (f32, f32) {
        let grid = &self.grid;
        let to_pixels = |cell: GridCell| (grid.cell_origin(cell.x), grid.cell_origin(cell.y));

        if let Some(cell) = self.player_start {
            return to_pixels(cell);
        }

        let marker = grid
            .cells_iter()
            .find(|(cell, _)| grid.tile(cell.x, cell.y).is_some_and(|t| t.has(TileRole::Spawn)));
        if let Some((cell, _)) = marker {
            return to_pixels(cell);
        }

        let plain_ground = RoleSet::of(&[TileRole::Solid]);
        let standable = grid.cells_iter().find(|(cell, id)| {
            *id == EMPTY_TILE
                && grid
                    .tile(cell.x, cell.y + 1)
                    .is_some_and(|below| below.roles == plain_ground)
        });
        if let Some((cell, _)) = standable {
            return to_pixels(cell);
        }

        log::warn!(
            "Level '{}' has no usable start position, spawning at {:?}",
            self.level_id,
            FALLBACK_SPAWN
        );
        FALLBACK_SPAWN
    }
}

pub fn load_level_from_path(path: &Path) -> Result<Level, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level_file(&file)?;
    warn_unknown_tiles(&file);
    Ok(Level::from_file(file))
}

fn validate_level_file(file: &LevelFile) -> Result<(), String> {
    if file.tile_size <= 0.0 {
        return Err("Level validation failed: tile_size must be > 0".to_string());
    }
    let Some(first) = file.rows.first() else {
        return Err("Level validation failed: rows list is empty".to_string());
    };
    if first.is_empty() {
        return Err("Level validation failed: rows must have at least one column".to_string());
    }
    let width = first.len();
    for (y, row) in file.rows.iter().enumerate() {
        if row.len() != width {
            return Err(format!(
                "Level validation failed: row {y} has {} columns, expected {width}",
                row.len()
            ));
        }
    }
    if let Some(start) = file.player_start {
        let inside = start.x >= 0
            && (start.x as usize) < width
            && start.y >= 0
            && (start.y as usize) < file.rows.len();
        if !inside {
            return Err(format!(
                "Level validation failed: player_start out of bounds ({}, {})",
                start.x, start.y
            ));
        }
    }
    Ok(())
}

// Unknown ids are legal (they behave as empty space) but usually a typo.
fn warn_unknown_tiles(file: &LevelFile) {
    let standard = TileSet::standard();
    let tile_set = file.tile_types.as_ref().unwrap_or(&standard);
    for (y, row) in file.rows.iter().enumerate() {
        for (x, id) in row.iter().enumerate() {
            if *id != EMPTY_TILE && !tile_set.contains(*id) {
                log::warn!(
                    "Level '{}': unknown tile id {} at ({}, {}) treated as empty",
                    file.level_id,
                    id,
                    x,
                    y
                );
            }
        }
    }
}

const fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}
