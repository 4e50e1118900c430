use super::ant::{Ant, PendingEvent, Surroundings};
use super::brush::Brush;
use super::map::{TileGrid, TileKind};
use super::pheromone::PheromoneField;
use super::Timer;
use crate::config::{AntConfig, ColonyConfig, SimulationConfig};
use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use shared::{ColonySnapshot, Statistics};
use slotmap::new_key_type;

new_key_type! {
    pub struct ColonyId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nest {
    pub position: IVec2,
    pub radius: i32,
    pub stored_food: u32,
}

impl Nest {
    /// Center of the nest cell, where ants are born.
    pub fn spawn_point(&self) -> Vec2 {
        self.position.as_vec2() + Vec2::splat(0.5)
    }

    fn footprint(&self) -> Brush {
        Brush::Round {
            radius: self.radius,
        }
    }
}

pub struct Colony {
    id: ColonyId,
    /// Live ants only; the buffer is reserved for the whole population up
    /// front so growth never reallocates.
    ants: Vec<Ant>,
    capacity: usize,
    pending: Vec<PendingEvent>,
    pheromones: PheromoneField,
    nest: Nest,
    statistics: Statistics,
    rng: ChaCha12Rng,
    death_timer: Timer,
    ant_config: AntConfig,
    colony_config: ColonyConfig,
}

impl Colony {
    /// Creates a colony, paints its nest onto `grid` and hatches the
    /// starting population.
    pub fn new(
        id: ColonyId,
        grid: &mut TileGrid,
        nest_position: IVec2,
        config: &SimulationConfig,
        seed: u64,
    ) -> Self {
        let capacity = config.colony.ants_max_amount;
        let nest = Nest {
            position: nest_position,
            radius: config.world.nest_radius,
            stored_food: 0,
        };
        nest.footprint().paint(grid, nest.position, TileKind::Nest(id));

        let mut colony = Self {
            id,
            ants: Vec::with_capacity(capacity),
            capacity,
            pending: Vec::with_capacity(capacity),
            pheromones: PheromoneField::new(grid.width(), grid.height(), &config.pheromones),
            nest,
            statistics: Statistics::default(),
            rng: ChaCha12Rng::seed_from_u64(seed),
            death_timer: Timer::new(config.colony.ant_death_delay as f32, 0.0),
            ant_config: config.ants.clone(),
            colony_config: config.colony.clone(),
        };

        for _ in 0..config.colony.ants_start_amount {
            colony.spawn_ant();
        }
        let delay = colony.death_delay();
        colony.death_timer.set_delay(delay);

        log::debug!(
            "Colony {:?} founded at {} with {} ants",
            id,
            nest_position,
            colony.ants.len()
        );
        colony
    }

    pub fn id(&self) -> ColonyId {
        self.id
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn ants_mut(&mut self) -> &mut [Ant] {
        &mut self.ants
    }

    pub fn active_count(&self) -> usize {
        self.ants.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn nest(&self) -> &Nest {
        &self.nest
    }

    pub fn pheromones(&self) -> &PheromoneField {
        &self.pheromones
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    /// Advances the colony by one tick.
    pub fn update(&mut self, grid: &mut TileGrid, dt: f32) {
        if self.colony_config.dynamic_life {
            self.update_dynamic_life();
        }

        let Self {
            ants,
            pending,
            pheromones,
            nest,
            statistics,
            ant_config,
            ..
        } = self;

        // Phase 1: ants only read the shared grids
        {
            let world = Surroundings {
                grid: &*grid,
                pheromones: &*pheromones,
                nest_position: nest.spawn_point(),
                config: &*ant_config,
            };
            ants.par_iter_mut()
                .map(|ant| ant.update(dt, &world))
                .collect_into_vec(pending);
        }

        // Phase 2: apply side effects one ant at a time
        for (ant, event) in ants.iter_mut().zip(pending.iter()) {
            let outcome = ant.commit(*event, grid, pheromones, ant_config);
            if outcome.picked_up {
                statistics.food_collected += 1;
            }
            if outcome.depleted {
                statistics.food_tiles_depleted += 1;
            }
            if outcome.delivered {
                statistics.food_delivered += 1;
                nest.stored_food += 1;
            }
        }

        self.grow();
        self.pheromones.update();
    }

    /// Turns stored food into new ants while there is room for them.
    fn grow(&mut self) {
        let cost = self.colony_config.food_to_spawn_ant;
        while self.nest.stored_food >= cost && self.ants.len() < self.capacity {
            self.nest.stored_food -= cost;
            self.spawn_ant();
        }
    }

    /// Hatches one ant at the nest. Returns false when the colony is full.
    pub fn spawn_ant(&mut self) -> bool {
        if self.ants.len() >= self.capacity {
            return false;
        }

        let ant = Ant::new(
            self.ants.len(),
            self.id,
            self.nest.spawn_point(),
            &self.ant_config,
            &mut self.rng,
        );
        self.ants.push(ant);
        self.statistics.ants_spawned += 1;
        true
    }

    /// Removes the ant at `index`; the last live ant takes its slot.
    pub fn remove_ant(&mut self, index: usize) -> Option<Ant> {
        if index >= self.ants.len() {
            return None;
        }

        let removed = self.ants.swap_remove(index);
        if let Some(moved) = self.ants.get_mut(index) {
            moved.set_id(index);
        }
        self.statistics.ants_removed += 1;
        log::debug!("Colony {:?} retired ant {}", self.id, index);
        Some(removed)
    }

    fn update_dynamic_life(&mut self) {
        self.death_timer.update(1.0);
        if !self.death_timer.is_ready() {
            return;
        }
        self.death_timer.reset();

        if self.ants.len() > 1 {
            self.remove_ant(self.ants.len() - 1);
        }
        let delay = self.death_delay();
        self.death_timer.set_delay(delay);
    }

    /// Ticks until the next retirement; shrinks as the colony fills up.
    pub fn death_delay(&self) -> f32 {
        let delay = self.colony_config.ant_death_delay as f32;
        let fill = self.ants.len() as f32 / self.capacity.max(1) as f32;
        (delay - delay * fill).ceil().max(1.0)
    }

    /// Moves the nest, repainting its footprint on the grid.
    pub fn relocate_nest(&mut self, grid: &mut TileGrid, position: IVec2) {
        self.clear_nest(grid);
        self.nest.position = position;
        self.nest.footprint().paint(grid, position, TileKind::Nest(self.id));
        log::debug!("Colony {:?} nest moved to {}", self.id, position);
    }

    /// Erases this colony's nest tiles; tiles painted over since are kept.
    pub fn clear_nest(&self, grid: &mut TileGrid) {
        for cell in self.nest.footprint().cells(self.nest.position) {
            if grid.tile_kind(cell) == TileKind::Nest(self.id) {
                grid.set_tile(cell, TileKind::Empty);
            }
        }
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            nest_position: self.nest.position.to_array(),
            nest_radius: self.nest.radius,
            stored_food: self.nest.stored_food,
            ants: self.ants.iter().map(Ant::snapshot).collect(),
            statistics: self.statistics,
        }
    }
}
