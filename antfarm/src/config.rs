use crate::simulation::TrailPolicy;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::{RangeBounds, RangeInclusive},
    path::Path,
};

/// Allowed width and height of a map, in cells.
pub const MAP_SIDE_RANGE: RangeInclusive<u32> = 8..=4096;

/// Everything the simulation needs to know, grouped the way the TOML file is.
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random source; a random seed is drawn when absent.
    pub seed: Option<u64>,
    pub world: WorldConfig,
    pub ants: AntConfig,
    pub colony: ColonyConfig,
    pub pheromones: PheromoneConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    /// Units of food a cell holds when it becomes food.
    pub food_default_amount: u32,
    pub nest_radius: i32,
    /// Nest center; defaults to the middle of the map.
    pub nest_position: Option<[i32; 2]>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            food_default_amount: 30,
            nest_radius: 5,
            nest_position: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AntConfig {
    /// Cells per second.
    pub movement_speed: f32,
    /// Fraction of the heading error corrected per second.
    pub rotation_speed: f32,
    /// Max wander added to the desired heading each tick (radians).
    pub random_rotation: f32,
    /// Number of rings scanned by the perception cone.
    pub fov_range: i32,
    /// Seconds between two perception scans.
    pub fov_check_delay: f32,
    /// Seconds between two pheromone deposits.
    pub pheromone_spawn_delay: f32,
    /// Intensity deposited with a fresh trail strength.
    pub pheromone_intensity: f32,
    /// Trail strength lost per second.
    pub trail_strength_loss: f32,
    /// Range (seconds) the delay before ignoring pheromones is drawn from.
    pub exploration_delay: [f32; 2],
    /// Range (seconds) the time spent ignoring pheromones is drawn from.
    pub deviation_cooldown: [f32; 2],
    pub trail_policy: TrailPolicy,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            movement_speed: 20.0,
            rotation_speed: 10.0,
            random_rotation: 0.1,
            fov_range: 8,
            fov_check_delay: 0.04,
            pheromone_spawn_delay: 0.25,
            pheromone_intensity: 128.0,
            trail_strength_loss: 0.05,
            exploration_delay: [10.0, 20.0],
            deviation_cooldown: [1.0, 2.0],
            trail_policy: TrailPolicy::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColonyConfig {
    pub ants_start_amount: usize,
    pub ants_max_amount: usize,
    /// Stored food consumed to activate one more ant.
    pub food_to_spawn_ant: u32,
    /// Periodically retire ants, faster as the colony fills up.
    pub dynamic_life: bool,
    /// Ticks between two retirements of a near-empty colony.
    pub ant_death_delay: u32,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            ants_start_amount: 25,
            ants_max_amount: 2500,
            food_to_spawn_ant: 10,
            dynamic_life: false,
            ant_death_delay: 600,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PheromoneConfig {
    /// Subtracted from every food-trail cell on each evaporation pass.
    pub food_evaporation_rate: f32,
    /// Subtracted from every nest-trail cell on each evaporation pass.
    pub nest_evaporation_rate: f32,
    pub max_intensity: f32,
    /// Ticks between two evaporation passes.
    pub evaporation_interval: u32,
}

impl Default for PheromoneConfig {
    fn default() -> Self {
        Self {
            food_evaporation_rate: 0.5,
            nest_evaporation_rate: 0.5,
            max_intensity: 255.0,
            evaporation_interval: 10,
        }
    }
}

impl SimulationConfig {
    /// Load and validate a [`SimulationConfig`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if any
    /// value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {path:?}"))?;
        log::info!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(content).context("failed to deserialize config")?;
        config.validate().context("failed to validate config")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        check_num(world.width, MAP_SIDE_RANGE).context("invalid map width")?;
        check_num(world.height, MAP_SIDE_RANGE).context("invalid map height")?;
        check_num(world.food_default_amount, 1..=100_000)
            .context("invalid default food amount")?;
        check_num(world.nest_radius, 0..=64).context("invalid nest radius")?;
        if let Some([x, y]) = world.nest_position {
            check_num(x, 0..world.width as i32).context("invalid nest x")?;
            check_num(y, 0..world.height as i32).context("invalid nest y")?;
        }

        let ants = &self.ants;
        check_num(ants.movement_speed, 0.0..=1000.0).context("invalid movement speed")?;
        check_num(ants.rotation_speed, 0.0..=1000.0).context("invalid rotation speed")?;
        check_num(ants.random_rotation, 0.0..=std::f32::consts::PI)
            .context("invalid random rotation")?;
        check_num(ants.fov_range, 1..=32).context("invalid fov range")?;
        check_num(ants.fov_check_delay, 0.0..=60.0).context("invalid fov check delay")?;
        check_num(ants.pheromone_spawn_delay, 0.0..=60.0)
            .context("invalid pheromone spawn delay")?;
        check_num(ants.pheromone_intensity, 0.0..=self.pheromones.max_intensity)
            .context("invalid pheromone intensity")?;
        check_num(ants.trail_strength_loss, 0.0..=100.0).context("invalid trail strength loss")?;
        check_range(ants.exploration_delay).context("invalid exploration delay")?;
        check_range(ants.deviation_cooldown).context("invalid deviation cooldown")?;

        let colony = &self.colony;
        check_num(colony.ants_max_amount, 1..=1_000_000).context("invalid max ants amount")?;
        check_num(colony.ants_start_amount, 0..=colony.ants_max_amount)
            .context("invalid start ants amount")?;
        check_num(colony.food_to_spawn_ant, 1..=1_000_000).context("invalid spawn cost")?;
        check_num(colony.ant_death_delay, 1..=1_000_000).context("invalid ant death delay")?;

        let pheromones = &self.pheromones;
        check_num(pheromones.max_intensity, 1.0..=1.0e6).context("invalid max intensity")?;
        check_num(pheromones.food_evaporation_rate, 0.0..=pheromones.max_intensity)
            .context("invalid food evaporation rate")?;
        check_num(pheromones.nest_evaporation_rate, 0.0..=pheromones.max_intensity)
            .context("invalid nest evaporation rate")?;
        check_num(pheromones.evaporation_interval, 1..=100_000)
            .context("invalid evaporation interval")?;

        Ok(())
    }
}

pub(crate) fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_range([min, max]: [f32; 2]) -> Result<()> {
    check_num(min, 0.0..=3600.0)?;
    check_num(max, 0.0..=3600.0)?;
    if min > max {
        bail!("range minimum {min} exceeds maximum {max}");
    }
    Ok(())
}
