use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use shared::{ColonySnapshot, Statistics};
use slotmap::SlotMap;

use crate::config::SimulationConfig;

use super::brush::Brush;
use super::colony::{Colony, ColonyId};
use super::map::{MapSnapshot, TileGrid, TileKind};
use glam::IVec2;

pub struct Simulation {
    tick: u64,
    grid: TileGrid,
    initial_grid: TileGrid,
    colonies: SlotMap<ColonyId, Colony>,
    is_paused: bool,
    config: SimulationConfig,
    seed: u64,
    rng: ChaCha12Rng,
}

impl Simulation {
    /// Builds a paused simulation with one colony per nest site. Without any
    /// site, a single colony is placed at the configured nest position or at
    /// the center of the map.
    pub fn new(config: &SimulationConfig, grid: TileGrid, nest_sites: &[IVec2]) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!(
            "Creating {}x{} simulation with seed {}",
            grid.width(),
            grid.height(),
            seed
        );

        let mut sim = Self {
            tick: 0,
            initial_grid: grid.clone(),
            grid,
            colonies: SlotMap::with_key(),
            is_paused: true,
            config: config.clone(),
            seed,
            rng: ChaCha12Rng::seed_from_u64(seed),
        };

        if nest_sites.is_empty() {
            let fallback = config
                .world
                .nest_position
                .map(IVec2::from_array)
                .unwrap_or_else(|| IVec2::new(sim.grid.width() / 2, sim.grid.height() / 2));
            sim.spawn_colony(fallback);
        } else {
            for &site in nest_sites {
                sim.spawn_colony(site);
            }
        }
        sim
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn colonies(&self) -> &SlotMap<ColonyId, Colony> {
        &self.colonies
    }

    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.get(id)
    }

    pub fn colony_mut(&mut self, id: ColonyId) -> Option<&mut Colony> {
        self.colonies.get_mut(id)
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Advances every colony by one tick. Does nothing while paused.
    pub fn tick(&mut self, dt: f32) {
        if self.is_paused {
            return;
        }

        // Colonies race for the same food, so no one always goes first
        let mut colony_ids: Vec<ColonyId> = self.colonies.keys().collect();
        colony_ids.shuffle(&mut self.rng);

        for id in colony_ids {
            if let Some(colony) = self.colonies.get_mut(id) {
                colony.update(&mut self.grid, dt);
            }
        }
        self.tick += 1;
    }

    pub fn spawn_colony(&mut self, nest_position: IVec2) -> ColonyId {
        let seed = self.rng.random();
        let grid = &mut self.grid;
        let config = &self.config;
        let id = self
            .colonies
            .insert_with_key(|id| Colony::new(id, grid, nest_position, config, seed));
        log::info!("Spawned colony {:?} at {}", id, nest_position);
        id
    }

    /// Removes the colony and its nest tiles.
    pub fn remove_colony(&mut self, id: ColonyId) -> bool {
        match self.colonies.remove(id) {
            Some(colony) => {
                colony.clear_nest(&mut self.grid);
                log::info!("Removed colony {:?}", id);
                true
            }
            None => {
                log::warn!("Colony {:?} not found, nothing to remove", id);
                false
            }
        }
    }

    /// Moves a colony's nest. Returns false if the colony does not exist.
    pub fn relocate_nest(&mut self, id: ColonyId, position: IVec2) -> bool {
        match self.colonies.get_mut(id) {
            Some(colony) => {
                colony.relocate_nest(&mut self.grid, position);
                true
            }
            None => false,
        }
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn unpause(&mut self) {
        self.is_paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
    }

    /// Restores the initial map and refounds every colony at its current
    /// nest with a fresh population and empty pheromone fields.
    pub fn reset(&mut self) {
        self.pause();
        self.tick = 0;
        self.grid = self.initial_grid.clone();
        self.rng = ChaCha12Rng::seed_from_u64(self.seed);

        let nests: Vec<IVec2> = self.colonies.values().map(|c| c.nest().position).collect();
        self.colonies.clear();
        for nest in nests {
            self.spawn_colony(nest);
        }
        log::info!("Simulation reset");
    }

    /// Paints `kind` with `brush`. Nest tiles survive unless `kind` is a
    /// nest itself.
    pub fn paint(&mut self, brush: Brush, center: IVec2, kind: TileKind) {
        let paints_nest = matches!(kind, TileKind::Nest(_));
        brush.paint_where(&mut self.grid, center, kind, |tile| {
            paints_nest || tile.nest_owner().is_none()
        });
    }

    pub fn snapshot(&self) -> Vec<ColonySnapshot> {
        self.colonies.values().map(Colony::snapshot).collect()
    }

    /// Current map with every colony's nest stored as a site.
    pub fn map_snapshot(&self) -> MapSnapshot {
        let sites: Vec<IVec2> = self.colonies.values().map(|c| c.nest().position).collect();
        MapSnapshot::from_grid(&self.grid, &sites)
    }

    /// Counters summed over all colonies.
    pub fn statistics(&self) -> Statistics {
        let mut total = Statistics::default();
        for colony in self.colonies.values() {
            total += colony.statistics();
        }
        total
    }

    /// Total number of live ants across all colonies.
    pub fn total_ant_count(&self) -> usize {
        self.colonies.values().map(Colony::active_count).sum()
    }
}
