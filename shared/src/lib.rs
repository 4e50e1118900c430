pub mod api;
pub mod util;

pub use api::{AntSnapshot, ColonySnapshot, Statistics};
pub use util::{fast_sin_cos, wrap_angle};
