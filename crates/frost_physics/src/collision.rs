//! Tile collision for axis-aligned bodies.
//!
//! Movement is resolved in two separate passes: the caller applies `vel_x` and
//! runs [`resolve_horizontal`], then applies `vel_y` and runs
//! [`resolve_vertical`]. Each pass scans the tiles within one tile of the body
//! (rows outer, columns inner) and mutates the body as it goes, so later tiles
//! in the scan see the already-corrected position.
//!
//! The vertical pass resolves each overlap on the axis of smallest
//! penetration, with landing taking priority so a body clipping a ledge corner
//! while falling ends up standing on it rather than shoved sideways. Goal tiles
//! never take part in solid resolution.

use crate::tiles::{GridCell, TileGrid, TileRole, TileType};

/// Box given by its top-left corner and size, in world pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// A moving box as the collision passes see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub aabb: Aabb,
    pub vel_x: f32,
    pub vel_y: f32,
}

/// Which sides of the body were pushed out of a solid tile during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub left: bool,
    pub right: bool,
    /// Landed on top of a tile.
    pub down: bool,
    /// Hit a ceiling.
    pub up: bool,
}

impl ContactState {
    fn merge(&mut self, other: ContactState) {
        self.left |= other.left;
        self.right |= other.right;
        self.down |= other.down;
        self.up |= other.up;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub contacts: ContactState,
    /// First deadly tile the body overlapped. The pass stops there and leaves
    /// the body where it was.
    pub hazard: Option<GridCell>,
}

/// Penetration depth of a body into a tile, measured from each tile side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub from_left: f32,
    pub from_right: f32,
    pub from_top: f32,
    pub from_bottom: f32,
}

impl Penetration {
    pub fn between(body: &Aabb, tile: &Aabb) -> Self {
        Self {
            from_left: body.right() - tile.x,
            from_right: tile.right() - body.x,
            from_top: body.bottom() - tile.y,
            from_bottom: tile.bottom() - body.y,
        }
    }

    pub fn smallest(&self) -> f32 {
        self.from_left
            .min(self.from_right)
            .min(self.from_top)
            .min(self.from_bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalResponse {
    Land,
    Ceiling,
    PushLeft,
    PushRight,
    /// Overlap that none of the rules claims, e.g. rising into a corner with
    /// equal side and top penetration.
    Unresolved,
}

/// Tie-break for one solid overlap in the vertical pass. Landing wins when the
/// top penetration is smallest and the body moves down; the ceiling wins when
/// the bottom penetration is smallest and it moves up; a side push happens only
/// when that side is strictly shallower than the top.
pub fn vertical_response(pen: &Penetration, vel_y: f32) -> VerticalResponse {
    let smallest = pen.smallest();
    if smallest == pen.from_top && vel_y > 0.0 {
        VerticalResponse::Land
    } else if smallest == pen.from_bottom && vel_y < 0.0 {
        VerticalResponse::Ceiling
    } else if smallest == pen.from_left && pen.from_left < pen.from_top {
        VerticalResponse::PushLeft
    } else if smallest == pen.from_right && pen.from_right < pen.from_top {
        VerticalResponse::PushRight
    } else {
        VerticalResponse::Unresolved
    }
}

/// Resolve the body against the grid after horizontal movement. Blocking
/// tiles push it back against the direction of travel and stop it.
pub fn resolve_horizontal(grid: &TileGrid, body: &mut Body) -> SweepResult {
    let mut result = SweepResult::default();
    for (cell, tile) in tiles_near(grid, body.aabb) {
        let bounds = tile_bounds(grid, cell);
        if !body.aabb.overlaps(&bounds) {
            continue;
        }
        if tile.has(TileRole::Deadly) {
            result.hazard = Some(cell);
            return result;
        }
        if !tile.blocks_movement() {
            continue;
        }
        if body.vel_x > 0.0 {
            body.aabb.x = bounds.x - body.aabb.width;
            result.contacts.right = true;
        } else if body.vel_x < 0.0 {
            body.aabb.x = bounds.right();
            result.contacts.left = true;
        }
        body.vel_x = 0.0;
    }
    result
}

/// Resolve the body against the grid after vertical movement.
pub fn resolve_vertical(grid: &TileGrid, body: &mut Body) -> SweepResult {
    let mut result = SweepResult::default();
    for (cell, tile) in tiles_near(grid, body.aabb) {
        let bounds = tile_bounds(grid, cell);
        if !body.aabb.overlaps(&bounds) {
            continue;
        }
        if tile.has(TileRole::Deadly) {
            result.hazard = Some(cell);
            return result;
        }
        if !tile.blocks_movement() {
            continue;
        }

        let pen = Penetration::between(&body.aabb, &bounds);
        let mut contacts = ContactState::default();
        match vertical_response(&pen, body.vel_y) {
            VerticalResponse::Land => {
                body.aabb.y = bounds.y - body.aabb.height;
                body.vel_y = 0.0;
                contacts.down = true;
            }
            VerticalResponse::Ceiling => {
                body.aabb.y = bounds.bottom();
                body.vel_y = 0.0;
                contacts.up = true;
            }
            VerticalResponse::PushLeft => {
                body.aabb.x = bounds.x - body.aabb.width;
                body.vel_x = 0.0;
                contacts.right = true;
            }
            VerticalResponse::PushRight => {
                body.aabb.x = bounds.right();
                body.vel_x = 0.0;
                contacts.left = true;
            }
            VerticalResponse::Unresolved => {
                log::trace!("Unresolved corner overlap at ({}, {})", cell.x, cell.y);
            }
        }
        result.contacts.merge(contacts);
    }
    result
}

/// First goal tile the box overlaps by a positive amount on both axes.
pub fn overlapping_goal(grid: &TileGrid, aabb: &Aabb) -> Option<GridCell> {
    // Shave the far edges so a box resting exactly on a tile boundary does not
    // reach into the next cell.
    let x0 = grid.world_to_cell(aabb.x);
    let x1 = grid.world_to_cell(aabb.right() - 0.1);
    let y0 = grid.world_to_cell(aabb.y);
    let y1 = grid.world_to_cell(aabb.bottom() - 0.1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let Some(tile) = grid.tile(x, y) else {
                continue;
            };
            if !tile.has(TileRole::Goal) {
                continue;
            }
            let bounds = tile_bounds(grid, GridCell { x, y });
            let overlap_x = aabb.right().min(bounds.right()) - aabb.x.max(bounds.x);
            let overlap_y = aabb.bottom().min(bounds.bottom()) - aabb.y.max(bounds.y);
            if overlap_x > 0.0 && overlap_y > 0.0 {
                return Some(GridCell { x, y });
            }
        }
    }
    None
}

pub fn tile_bounds(grid: &TileGrid, cell: GridCell) -> Aabb {
    Aabb::new(
        grid.cell_origin(cell.x),
        grid.cell_origin(cell.y),
        grid.tile_size,
        grid.tile_size,
    )
}

/// Resolved tiles in the one-tile neighborhood of `aabb`, clamped to the grid.
/// The range is fixed when the scan starts.
fn tiles_near(grid: &TileGrid, aabb: Aabb) -> impl Iterator<Item = (GridCell, &TileType)> + '_ {
    let size = grid.tile_size;
    let x0 = grid.world_to_cell(aabb.x - size).max(0);
    let x1 = grid.world_to_cell(aabb.right() + size).min(grid.width - 1);
    let y0 = grid.world_to_cell(aabb.y - size).max(0);
    let y1 = grid.world_to_cell(aabb.bottom() + size).min(grid.height - 1);

    (y0..=y1).flat_map(move |y| {
        (x0..=x1).filter_map(move |x| grid.tile(x, y).map(|tile| (GridCell { x, y }, tile)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{TileSet, DEFAULT_TILE_SIZE};

    const T: f32 = DEFAULT_TILE_SIZE;

    fn grid(rows: &[Vec<u16>]) -> TileGrid {
        TileGrid::from_rows(rows, DEFAULT_TILE_SIZE, TileSet::standard())
    }

    fn body(x: f32, y: f32, vel_x: f32, vel_y: f32) -> Body {
        Body {
            aabb: Aabb::new(x, y, 24.0, 32.0),
            vel_x,
            vel_y,
        }
    }

    #[test]
    fn horizontal_pass_stops_body_at_wall() {
        let grid = grid(&[vec![0, 0, 1], vec![1, 1, 1]]);
        // Moved right into the wall column at x = 64.
        let mut moving = body(44.0, 0.0, 6.0, 0.0);
        let result = resolve_horizontal(&grid, &mut moving);

        assert_eq!(moving.aabb.x, 2.0 * T - 24.0);
        assert_eq!(moving.vel_x, 0.0);
        assert!(result.contacts.right);
        assert!(result.hazard.is_none());
    }

    #[test]
    fn resting_on_floor_is_not_a_horizontal_overlap() {
        let grid = grid(&[vec![0, 0, 0], vec![1, 1, 1]]);
        let mut resting = body(10.0, 0.0, 5.0, 0.0);
        let result = resolve_horizontal(&grid, &mut resting);

        assert_eq!(resting.aabb.x, 10.0);
        assert_eq!(resting.vel_x, 5.0);
        assert_eq!(result, SweepResult::default());
    }

    #[test]
    fn vertical_pass_lands_on_floor() {
        let grid = grid(&[vec![0, 0, 0], vec![1, 1, 1]]);
        let mut falling = body(10.0, 3.5, 0.0, 3.5);
        let result = resolve_vertical(&grid, &mut falling);

        assert!(result.contacts.down);
        assert_eq!(falling.aabb.y, 0.0);
        assert_eq!(falling.vel_y, 0.0);
    }

    #[test]
    fn vertical_pass_stops_at_ceiling() {
        let grid = grid(&[vec![1, 1, 1], vec![0, 0, 0], vec![0, 0, 0]]);
        let mut rising = body(10.0, 30.0, 0.0, -4.0);
        let result = resolve_vertical(&grid, &mut rising);

        assert!(result.contacts.up);
        assert_eq!(rising.aabb.y, T);
        assert_eq!(rising.vel_y, 0.0);
    }

    #[test]
    fn equal_corner_penetration_while_falling_resolves_as_landing() {
        let pen = Penetration {
            from_left: 4.0,
            from_right: 52.0,
            from_top: 4.0,
            from_bottom: 60.0,
        };
        assert_eq!(vertical_response(&pen, 2.0), VerticalResponse::Land);

        // Body's bottom-right corner 4px into a lone tile's top-left corner.
        let grid = grid(&[vec![0, 0, 0], vec![0, 0, 0], vec![0, 1, 0]]);
        let mut falling = body(T - 20.0, 2.0 * T - 28.0, 0.0, 4.0);
        let result = resolve_vertical(&grid, &mut falling);
        assert!(result.contacts.down);
        assert!(!result.contacts.right);
        assert_eq!(falling.aabb.y, 2.0 * T - 32.0);
        assert_eq!(falling.aabb.x, T - 20.0);
    }

    #[test]
    fn equal_corner_penetration_while_rising_is_left_alone() {
        let pen = Penetration {
            from_left: 4.0,
            from_right: 52.0,
            from_top: 4.0,
            from_bottom: 60.0,
        };
        assert_eq!(vertical_response(&pen, -2.0), VerticalResponse::Unresolved);
    }

    #[test]
    fn shallow_side_penetration_pushes_sideways() {
        let pen = Penetration {
            from_left: 2.0,
            from_right: 54.0,
            from_top: 10.0,
            from_bottom: 54.0,
        };
        assert_eq!(vertical_response(&pen, 3.0), VerticalResponse::PushLeft);

        let pen = Penetration {
            from_left: 54.0,
            from_right: 2.0,
            from_top: 10.0,
            from_bottom: 54.0,
        };
        assert_eq!(vertical_response(&pen, 3.0), VerticalResponse::PushRight);
    }

    #[test]
    fn goal_tiles_never_move_the_body() {
        let grid = grid(&[vec![0, 0, 0], vec![0, 3, 0], vec![1, 1, 1]]);
        let mut inside = body(T + 4.0, T, 3.0, 2.0);
        let before = inside;

        let horizontal = resolve_horizontal(&grid, &mut inside);
        let vertical = resolve_vertical(&grid, &mut inside);

        assert_eq!(inside, before);
        assert_eq!(horizontal, SweepResult::default());
        assert_eq!(vertical, SweepResult::default());
        assert_eq!(
            overlapping_goal(&grid, &inside.aabb),
            Some(GridCell { x: 1, y: 1 })
        );
    }

    #[test]
    fn goal_touch_requires_positive_overlap() {
        let grid = grid(&[vec![0, 0, 0], vec![0, 3, 0]]);
        // Standing exactly beside the goal tile, sharing only an edge.
        let beside = Aabb::new(T - 24.0, T, 24.0, 32.0);
        assert_eq!(overlapping_goal(&grid, &beside), None);

        let touching = Aabb::new(T - 23.5, T, 24.0, 32.0);
        assert!(overlapping_goal(&grid, &touching).is_some());
    }

    #[test]
    fn deadly_overlap_reports_hazard_and_stops_the_pass() {
        let grid = grid(&[vec![0, 14, 0], vec![1, 1, 1]]);
        let mut moving = body(12.0, 0.0, 4.0, 0.0);
        let result = resolve_horizontal(&grid, &mut moving);

        assert_eq!(result.hazard, Some(GridCell { x: 1, y: 0 }));
        assert_eq!(moving.aabb.x, 12.0);
        assert_eq!(moving.vel_x, 4.0);
    }

    #[test]
    fn decorative_and_unknown_tiles_are_passable() {
        let grid = grid(&[vec![0, 15, 42], vec![1, 1, 1]]);
        let mut moving = body(40.0, 0.0, 8.0, 0.0);
        let result = resolve_horizontal(&grid, &mut moving);
        assert_eq!(result, SweepResult::default());
        assert_eq!(moving.aabb.x, 40.0);
    }
}
