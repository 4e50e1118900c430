use super::colony::ColonyId;
use crate::config::{MAP_SIDE_RANGE, WorldConfig, check_num};
use anyhow::{Context, Result, bail};
use bincode::{decode_from_slice, encode_to_vec};
use bincode_derive::{Decode, Encode};
use glam::{IVec2, Vec2};
use std::fs;
use std::path::Path;

/// What occupies a cell. Nest cells remember the colony that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Empty,
    Wall,
    Food,
    Nest(ColonyId),
}

/// A single grid cell.
///
/// `amount` is only ever non-zero on food cells: every kind change goes
/// through [`Tile::with_kind`], which resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    kind: TileKind,
    amount: u32,
}

impl Tile {
    /// Returned for every out-of-bounds query.
    const OUT_OF_BOUNDS: Tile = Tile {
        kind: TileKind::Wall,
        amount: 0,
    };

    fn with_kind(kind: TileKind, food_default_amount: u32) -> Self {
        let amount = match kind {
            TileKind::Food => food_default_amount,
            _ => 0,
        };
        Self { kind, amount }
    }

    #[inline(always)]
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    #[inline(always)]
    pub fn remaining_amount(&self) -> u32 {
        self.amount
    }

    #[inline(always)]
    pub fn is_passable(&self) -> bool {
        !matches!(self.kind, TileKind::Wall)
    }

    #[inline(always)]
    pub fn is_food(&self) -> bool {
        matches!(self.kind, TileKind::Food)
    }

    /// Colony owning this cell, if it is part of a nest.
    #[inline(always)]
    pub fn nest_owner(&self) -> Option<ColonyId> {
        match self.kind {
            TileKind::Nest(colony_id) => Some(colony_id),
            _ => None,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            kind: TileKind::Empty,
            amount: 0,
        }
    }
}

/// Fixed-size grid of tiles stored row-major in one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: i32,
    height: i32,
    food_default_amount: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, food_default_amount: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            food_default_amount,
            tiles: vec![Tile::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn food_default_amount(&self) -> u32 {
        self.food_default_amount
    }

    #[inline(always)]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    #[inline(always)]
    fn index(&self, pos: IVec2) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Cell containing a continuous world position.
    #[inline(always)]
    pub fn cell_of(pos: Vec2) -> IVec2 {
        pos.floor().as_ivec2()
    }

    /// Tile at `pos`; out-of-bounds reads see an impassable wall.
    #[inline(always)]
    pub fn get_tile(&self, pos: IVec2) -> &Tile {
        match self.index(pos) {
            Some(idx) => &self.tiles[idx],
            None => &Tile::OUT_OF_BOUNDS,
        }
    }

    #[inline(always)]
    pub fn tile_kind(&self, pos: IVec2) -> TileKind {
        self.get_tile(pos).kind
    }

    #[inline(always)]
    pub fn is_passable(&self, pos: IVec2) -> bool {
        self.get_tile(pos).is_passable()
    }

    /// Changes the kind of a cell and resets its food amount. No-op out of bounds.
    pub fn set_tile(&mut self, pos: IVec2, kind: TileKind) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = Tile::with_kind(kind, self.food_default_amount);
        }
    }

    /// Takes one unit of food. Returns true when this emptied the cell.
    pub fn take_food(&mut self, pos: IVec2) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        let tile = &mut self.tiles[idx];
        if !tile.is_food() {
            return false;
        }
        if tile.amount <= 1 {
            *tile = Tile::default();
            return true;
        }
        tile.amount -= 1;
        false
    }

    /// Resets every cell to empty.
    pub fn clear(&mut self) {
        self.tiles.fill(Tile::default());
    }

    /// Walls off the outermost ring of cells.
    pub fn wall_border(&mut self) {
        for x in 0..self.width {
            self.set_tile(IVec2::new(x, 0), TileKind::Wall);
            self.set_tile(IVec2::new(x, self.height - 1), TileKind::Wall);
        }
        for y in 0..self.height {
            self.set_tile(IVec2::new(0, y), TileKind::Wall);
            self.set_tile(IVec2::new(self.width - 1, y), TileKind::Wall);
        }
    }

    /// Food units left on the whole map.
    pub fn food_remaining(&self) -> u64 {
        self.tiles.iter().map(|tile| tile.amount as u64).sum()
    }

    /// Iterates `(position, tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Tile)> + '_ {
        let width = self.width;
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            let idx = idx as i32;
            (IVec2::new(idx % width, idx / width), tile)
        })
    }
}

/// Upper bound on the encoded size of a map file: one byte per tile of the
/// largest allowed map plus the header.
const MAP_BYTES_LIMIT: usize = {
    let side = *MAP_SIDE_RANGE.end() as usize;
    side * side + 64
};

/// Cell content as stored in a map file. Nests are saved as bare sites since
/// colonies are rebuilt on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum SnapshotTile {
    Empty,
    Wall,
    Food,
    NestSite,
}

/// On-disk form of a world, as produced by an external map generator or by
/// [`MapSnapshot::from_grid`].
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct MapSnapshot {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<SnapshotTile>,
}

impl MapSnapshot {
    /// Captures the grid. Nest cells are written empty and each of
    /// `nest_sites` is marked as a site instead.
    pub fn from_grid(grid: &TileGrid, nest_sites: &[IVec2]) -> Self {
        let mut tiles: Vec<SnapshotTile> = grid
            .tiles
            .iter()
            .map(|tile| match tile.kind {
                TileKind::Empty | TileKind::Nest(_) => SnapshotTile::Empty,
                TileKind::Wall => SnapshotTile::Wall,
                TileKind::Food => SnapshotTile::Food,
            })
            .collect();
        for &site in nest_sites {
            if let Some(idx) = grid.index(site) {
                tiles[idx] = SnapshotTile::NestSite;
            }
        }
        Self {
            width: grid.width as u32,
            height: grid.height as u32,
            tiles,
        }
    }

    /// Builds a grid (food refilled to the default amount) and returns the
    /// nest sites found in the snapshot.
    ///
    /// # Errors
    /// Fails when the dimensions are out of range, when the tile count does
    /// not match them, or when a nest of `world.nest_radius` would not fit
    /// around a site.
    pub fn into_grid(self, world: &WorldConfig) -> Result<(TileGrid, Vec<IVec2>)> {
        check_num(self.width, MAP_SIDE_RANGE).context("invalid map snapshot width")?;
        check_num(self.height, MAP_SIDE_RANGE).context("invalid map snapshot height")?;
        let expected = self.width as usize * self.height as usize;
        if self.tiles.len() != expected {
            bail!(
                "map snapshot holds {} tiles but {}x{} needs {}",
                self.tiles.len(),
                self.width,
                self.height,
                expected
            );
        }

        let mut grid = TileGrid::new(self.width, self.height, world.food_default_amount);
        let mut nest_sites = Vec::new();
        let width = self.width as i32;
        for (idx, tile) in self.tiles.into_iter().enumerate() {
            let pos = IVec2::new(idx as i32 % width, idx as i32 / width);
            match tile {
                SnapshotTile::Empty => {}
                SnapshotTile::Wall => grid.set_tile(pos, TileKind::Wall),
                SnapshotTile::Food => grid.set_tile(pos, TileKind::Food),
                SnapshotTile::NestSite => {
                    let radius = IVec2::splat(world.nest_radius);
                    if !grid.in_bounds(pos - radius) || !grid.in_bounds(pos + radius) {
                        bail!(
                            "nest site {pos} is too close to the edge for a nest of radius {}",
                            world.nest_radius
                        );
                    }
                    nest_sites.push(pos);
                }
            }
        }
        Ok((grid, nest_sites))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = encode_to_vec(self, bincode::config::standard())
            .context("failed to encode map snapshot")?;
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).with_context(|| format!("failed to create {dir:?}"))?;
            }
        }
        fs::write(path, data).with_context(|| format!("failed to write {path:?}"))?;
        log::info!("Saved map snapshot to {}", path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
        if data.len() > MAP_BYTES_LIMIT {
            bail!(
                "map snapshot {path:?} is {} bytes, more than the {MAP_BYTES_LIMIT} a map can take",
                data.len()
            );
        }
        let config = bincode::config::standard().with_limit::<MAP_BYTES_LIMIT>();
        let (snapshot, _len): (MapSnapshot, _) = decode_from_slice(&data, config)
            .with_context(|| format!("failed to decode map snapshot {path:?}"))?;
        log::info!(
            "Loaded map snapshot {} ({}x{})",
            path.display(),
            snapshot.width,
            snapshot.height
        );
        Ok(snapshot)
    }
}
