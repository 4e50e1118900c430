use super::Timer;
use super::ant::AntState;
use crate::config::PheromoneConfig;
use glam::IVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PheromoneKind {
    Food,
    Nest,
}

impl PheromoneKind {
    pub const COUNT: usize = 2;
    pub const ALL: [PheromoneKind; Self::COUNT] = [PheromoneKind::Food, PheromoneKind::Nest];

    #[inline(always)]
    fn channel(self) -> usize {
        match self {
            PheromoneKind::Food => 0,
            PheromoneKind::Nest => 1,
        }
    }
}

/// Which trail an ant lays in each state.
///
/// An ant always follows the trail laid by ants in the opposite state, so a
/// single choice fixes both the deposit and the sensing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailPolicy {
    /// Food carriers lay food trail; searchers lay nest trail.
    #[default]
    CarrierMarksFood,
    /// Food carriers lay nest trail; searchers lay food trail.
    CarrierMarksNest,
}

impl TrailPolicy {
    pub fn deposit_kind(self, state: AntState) -> PheromoneKind {
        match (self, state) {
            (TrailPolicy::CarrierMarksFood, AntState::SearchForNest) => PheromoneKind::Food,
            (TrailPolicy::CarrierMarksFood, AntState::SearchForFood) => PheromoneKind::Nest,
            (TrailPolicy::CarrierMarksNest, AntState::SearchForNest) => PheromoneKind::Nest,
            (TrailPolicy::CarrierMarksNest, AntState::SearchForFood) => PheromoneKind::Food,
        }
    }

    pub fn follow_kind(self, state: AntState) -> PheromoneKind {
        self.deposit_kind(state.opposite())
    }
}

/// One scalar grid per pheromone kind, saturating at `max_intensity`.
#[derive(Clone)]
pub struct PheromoneField {
    width: i32,
    height: i32,
    channels: [Vec<f32>; PheromoneKind::COUNT],
    evaporation_rates: [f32; PheromoneKind::COUNT],
    max_intensity: f32,
    evaporation_timer: Timer,
}

impl PheromoneField {
    pub fn new(width: i32, height: i32, config: &PheromoneConfig) -> Self {
        let size = width.max(0) as usize * height.max(0) as usize;
        Self {
            width,
            height,
            channels: [vec![0.0; size], vec![0.0; size]],
            evaporation_rates: [config.food_evaporation_rate, config.nest_evaporation_rate],
            max_intensity: config.max_intensity,
            evaporation_timer: Timer::new(config.evaporation_interval as f32, 0.0),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn max_intensity(&self) -> f32 {
        self.max_intensity
    }

    #[inline(always)]
    fn index(&self, pos: IVec2) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Raises the cell to `intensity` if it is weaker; never sums.
    #[inline(always)]
    pub fn add(&mut self, kind: PheromoneKind, pos: IVec2, intensity: f32) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        let intensity = intensity.clamp(0.0, self.max_intensity);
        let cell = &mut self.channels[kind.channel()][idx];
        *cell = cell.max(intensity);
    }

    /// Intensity at `pos`, 0 outside the field.
    #[inline(always)]
    pub fn get(&self, kind: PheromoneKind, pos: IVec2) -> f32 {
        match self.index(pos) {
            Some(idx) => self.channels[kind.channel()][idx],
            None => 0.0,
        }
    }

    /// Subtracts each kind's rate from all its cells, clamping at 0.
    pub fn evaporate(&mut self) {
        for (channel, &rate) in self.channels.iter_mut().zip(self.evaporation_rates.iter()) {
            channel
                .par_iter_mut()
                .for_each(|val| *val = (*val - rate).max(0.0));
        }
    }

    /// Advances the evaporation cadence by one tick. Returns true when a pass ran.
    pub fn update(&mut self) -> bool {
        self.evaporation_timer.update(1.0);
        if self.evaporation_timer.is_ready() {
            self.evaporate();
            self.evaporation_timer.reset();
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
        self.evaporation_timer.reset();
    }

    /// Raw row-major intensities of one kind, for renderers.
    pub fn channel(&self, kind: PheromoneKind) -> &[f32] {
        &self.channels[kind.channel()]
    }
}
