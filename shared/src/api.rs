//! Read-only views handed to whatever sits outside the simulation core
//! (renderers, statistics panels, headless reports).

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Monotonically increasing event counters of a colony.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Successful pickups from a food tile.
    pub food_collected: u64,
    /// Food units brought back into a friendly nest.
    pub food_delivered: u64,
    /// Food tiles emptied by a pickup.
    pub food_tiles_depleted: u64,
    pub ants_spawned: u64,
    pub ants_removed: u64,
}

impl AddAssign for Statistics {
    fn add_assign(&mut self, other: Self) {
        self.food_collected += other.food_collected;
        self.food_delivered += other.food_delivered;
        self.food_tiles_depleted += other.food_tiles_depleted;
        self.ants_spawned += other.ants_spawned;
        self.ants_removed += other.ants_removed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntSnapshot {
    pub position: [f32; 2],
    pub heading: f32,
    pub carrying_food: bool,
}

/// Per-colony state as polled by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    pub nest_position: [i32; 2],
    pub nest_radius: i32,
    pub stored_food: u32,
    pub ants: Vec<AntSnapshot>,
    pub statistics: Statistics,
}
