pub mod ant;
mod brush;
mod colony;
mod map;
mod pheromone;
mod sim;
mod timer;

pub use ant::{Ant, AntState, PendingEvent, Perception};
pub use brush::{Brush, MAX_BRUSH_RADIUS};
pub use colony::{Colony, ColonyId, Nest};
pub use map::{MapSnapshot, SnapshotTile, Tile, TileGrid, TileKind};
pub use pheromone::{PheromoneField, PheromoneKind, TrailPolicy};
pub use sim::Simulation;
pub use timer::Timer;
