//! Tile types and the immutable per-level tile grid.
//!
//! A grid cell stores a small tile id; the id resolves through a [`TileSet`] to a
//! [`TileType`] whose [`RoleSet`] says how physics treats it. Id `0` is always
//! empty space, and ids missing from the set are non-interactive. Gameplay code
//! asks about roles, never about specific ids.

use serde::Deserialize;
use std::collections::HashMap;

pub const EMPTY_TILE: u16 = 0;
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileRole {
    Solid,
    Deadly,
    Ice,
    Bounce,
    Goal,
    Decorative,
    /// Player-start marker; physics ignores it.
    Spawn,
}

impl TileRole {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Bit set of [`TileRole`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: Self = Self(0);

    pub fn of(roles: &[TileRole]) -> Self {
        roles.iter().fold(Self::EMPTY, |set, role| set.with(*role))
    }

    pub const fn with(self, role: TileRole) -> Self {
        Self(self.0 | role.bit())
    }

    pub const fn contains(self, role: TileRole) -> bool {
        self.0 & role.bit() != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "TileTypeJson")]
pub struct TileType {
    pub name: String,
    pub color: String,
    pub roles: RoleSet,
    /// Facing of directional hazards in degrees (0 = up).
    pub rotation: u16,
}

impl TileType {
    pub fn new(name: &str, color: &str, roles: &[TileRole]) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            roles: RoleSet::of(roles),
            rotation: 0,
        }
    }

    pub fn rotated(mut self, degrees: u16) -> Self {
        self.rotation = degrees % 360;
        self
    }

    pub fn has(&self, role: TileRole) -> bool {
        self.roles.contains(role)
    }

    /// Solid tiles push the player out, except goals which only look solid.
    pub fn blocks_movement(&self) -> bool {
        self.has(TileRole::Solid) && !self.has(TileRole::Goal)
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct TileTypeJson {
    name: String,
    #[serde(default = "default_color")]
    color: String,
    #[serde(default)]
    roles: Vec<TileRole>,
    #[serde(default)]
    rotation: u16,
}

impl From<TileTypeJson> for TileType {
    fn from(json: TileTypeJson) -> Self {
        Self {
            name: json.name,
            color: json.color,
            roles: RoleSet::of(&json.roles),
            rotation: json.rotation % 360,
        }
    }
}

fn default_color() -> String {
    "#ffffff".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TileSet {
    types: HashMap<u16, TileType>,
}

impl TileSet {
    /// The stock tile palette levels are authored against.
    pub fn standard() -> Self {
        use TileRole::*;

        let spike = |name: &str, rotation: u16| {
            TileType::new(name, "#FF4757", &[Deadly]).rotated(rotation)
        };
        let types = HashMap::from([
            (1, TileType::new("Platform", "#5B7CFA", &[Solid])),
            (2, spike("Spike (Up)", 0)),
            (3, TileType::new("Goal", "#32D671", &[Solid, Goal])),
            (4, TileType::new("Dirt", "#B87333", &[Solid])),
            (5, TileType::new("Wood", "#DEB887", &[Solid])),
            (6, TileType::new("Stone", "#95A5A6", &[Solid])),
            (7, TileType::new("Ice", "#74C0FC", &[Solid, Ice])),
            (8, TileType::new("Bounce", "#FF6B9D", &[Solid, Bounce])),
            (9, TileType::new("Player Start", "#FFD43B", &[Spawn])),
            (10, spike("Spike (Up)", 0)),
            (11, spike("Spike (Right)", 90)),
            (12, spike("Spike (Down)", 180)),
            (13, spike("Spike (Left)", 270)),
            (14, TileType::new("Sawblade", "#8B0000", &[Deadly])),
            (
                15,
                TileType::new("Decorative Block", "rgba(75,0,130,0.6)", &[Decorative]),
            ),
        ]);
        Self { types }
    }

    pub fn get(&self, id: u16) -> Option<&TileType> {
        if id == EMPTY_TILE {
            return None;
        }
        self.types.get(&id)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.get(id).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

/// Row-major grid of tile ids. Fixed for the lifetime of a level; physics only
/// ever reads it.
#[derive(Debug, Clone)]
pub struct TileGrid {
    pub width: i32,
    pub height: i32,
    pub tile_size: f32,
    cells: Vec<u16>,
    tile_set: TileSet,
}

impl TileGrid {
    /// Row-major `cells`. Cells missing from a short vector read as empty.
    pub fn new(width: i32, height: i32, tile_size: f32, cells: Vec<u16>, tile_set: TileSet) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells,
            tile_set,
        }
    }

    pub fn from_rows(rows: &[Vec<u16>], tile_size: f32, tile_set: TileSet) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        // Short rows are padded with empty cells so every row has `width` columns.
        let cells = rows
            .iter()
            .flat_map(|row| row.iter().copied().chain(std::iter::repeat(EMPTY_TILE)).take(width))
            .collect();
        Self::new(width as i32, height, tile_size, cells, tile_set)
    }

    pub fn tile_set(&self) -> &TileSet {
        &self.tile_set
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Raw id at a cell; out-of-bounds reads as empty.
    pub fn tile_id(&self, x: i32, y: i32) -> u16 {
        if !self.in_bounds(x, y) {
            return EMPTY_TILE;
        }
        self.cells
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(EMPTY_TILE)
    }

    /// Resolved tile at a cell. Empty, unknown, and out-of-bounds all read as `None`.
    pub fn tile(&self, x: i32, y: i32) -> Option<&TileType> {
        self.tile_set.get(self.tile_id(x, y))
    }

    /// Resolved tile under a world-space point.
    pub fn tile_at_point(&self, world_x: f32, world_y: f32) -> Option<(u16, &TileType)> {
        let (x, y) = (self.world_to_cell(world_x), self.world_to_cell(world_y));
        let id = self.tile_id(x, y);
        self.tile_set.get(id).map(|tile| (id, tile))
    }

    pub fn cells_iter(&self) -> impl Iterator<Item = (GridCell, u16)> + '_ {
        self.cells.iter().enumerate().map(|(i, id)| {
            let i = i as i32;
            (
                GridCell {
                    x: i % self.width,
                    y: i / self.width,
                },
                *id,
            )
        })
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn world_to_cell(&self, world: f32) -> i32 {
        (world / self.tile_size).floor() as i32
    }

    /// Left (x) or top (y) world edge of a cell index.
    pub fn cell_origin(&self, index: i32) -> f32 {
        index as f32 * self.tile_size
    }
}
