use super::map::{Tile, TileGrid, TileKind};
use glam::IVec2;

/// Widest radius a brush paints with; larger radii are clipped to it.
pub const MAX_BRUSH_RADIUS: i32 = 4096;

/// Shape used to paint tiles around a center cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brush {
    Point,
    /// All cells within `radius` on both axes.
    Square { radius: i32 },
    /// All cells with `dx² + dy² <= radius²`.
    Round { radius: i32 },
}

impl Brush {
    /// Radius actually painted with, within `0..=MAX_BRUSH_RADIUS`.
    pub fn radius(&self) -> i32 {
        match *self {
            Brush::Point => 0,
            Brush::Square { radius } | Brush::Round { radius } => {
                radius.clamp(0, MAX_BRUSH_RADIUS)
            }
        }
    }

    #[inline(always)]
    fn covers(&self, dx: i64, dy: i64) -> bool {
        match *self {
            Brush::Point | Brush::Square { .. } => true,
            Brush::Round { .. } => {
                let radius = self.radius() as i64;
                dx * dx + dy * dy <= radius * radius
            }
        }
    }

    /// Cells covered by the brush when centered on `center`. May include
    /// out-of-bounds cells; cells past the `i32` range are left out.
    pub fn cells(&self, center: IVec2) -> Vec<IVec2> {
        let radius = self.radius();
        let mut cells = Vec::new();
        for dy in -radius..=radius {
            let Some(y) = center.y.checked_add(dy) else {
                continue;
            };
            for dx in -radius..=radius {
                if !self.covers(dx as i64, dy as i64) {
                    continue;
                }
                if let Some(x) = center.x.checked_add(dx) {
                    cells.push(IVec2::new(x, y));
                }
            }
        }
        cells
    }

    pub fn paint(&self, grid: &mut TileGrid, center: IVec2, kind: TileKind) {
        self.paint_where(grid, center, kind, |_| true);
    }

    /// Paints only the covered cells whose current tile passes `keep`. Walks
    /// the part of the footprint that lies on the grid.
    pub fn paint_where<F>(&self, grid: &mut TileGrid, center: IVec2, kind: TileKind, keep: F)
    where
        F: Fn(&Tile) -> bool,
    {
        let radius = self.radius() as i64;
        let (cx, cy) = (center.x as i64, center.y as i64);
        let x_min = (cx - radius).max(0);
        let x_max = (cx + radius).min(grid.width() as i64 - 1);
        let y_min = (cy - radius).max(0);
        let y_max = (cy + radius).min(grid.height() as i64 - 1);

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                if !self.covers(x - cx, y - cy) {
                    continue;
                }
                let cell = IVec2::new(x as i32, y as i32);
                if keep(grid.get_tile(cell)) {
                    grid.set_tile(cell, kind);
                }
            }
        }
    }
}
