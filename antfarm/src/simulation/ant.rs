use super::map::{Tile, TileGrid};
use super::pheromone::PheromoneField;
use super::{ColonyId, Timer};
use crate::config::AntConfig;
use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use shared::{AntSnapshot, fast_sin_cos, wrap_angle};
use std::f32::consts::{FRAC_PI_4, PI};

/// Rings closer than this make a wall worth steering away from.
const NEAR_WALL_RINGS: i32 = 3;

/// Goal an ant is currently pursuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntState {
    SearchForFood,
    SearchForNest,
}

impl AntState {
    pub fn opposite(self) -> Self {
        match self {
            AntState::SearchForFood => AntState::SearchForNest,
            AntState::SearchForNest => AntState::SearchForFood,
        }
    }
}

/// Shared-state change an ant asks for during the parallel phase. Applied by
/// [`Ant::commit`] in the sequential phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingEvent {
    #[default]
    None,
    /// The ant stepped on food; the pickup only happens if the tile still
    /// holds food when committed.
    PickedUpFood { cell: IVec2 },
    DeliveredFood,
}

/// What the sequential phase actually did for one ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    pub picked_up: bool,
    pub depleted: bool,
    pub delivered: bool,
}

/// Result of the last perception scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Perception {
    /// A goal tile or a near wall ended the scan.
    pub found_object: bool,
    pub found_pheromone: bool,
    /// -1 left, 0 forward, 1 right.
    pub turn_side: i32,
}

/// Read-only view of the world sensed during the parallel phase.
#[derive(Clone, Copy)]
pub struct Surroundings<'a> {
    pub grid: &'a TileGrid,
    pub pheromones: &'a PheromoneField,
    /// Where a boxed-in ant is sent back to.
    pub nest_position: Vec2,
    pub config: &'a AntConfig,
}

/// Decides whether a probe replaces the best pheromone seen so far.
///
/// Equal readings go to the forward probe, so ambiguous evidence keeps the
/// ant going straight instead of favoring whichever side is scanned first.
#[inline(always)]
pub fn prefers_probe(best: f32, value: f32, side: i32) -> bool {
    value > best || (value > 0.0 && value == best && side == 0)
}

pub struct Ant {
    id: usize,
    colony_id: ColonyId,

    pos: Vec2,
    prev_pos: Vec2,
    heading: f32,
    desired_heading: f32,

    state: AntState,
    carrying_food: bool,
    trail_strength: f32,
    ignoring_pheromones: bool,
    perception: Perception,

    fov_timer: Timer,
    deposit_timer: Timer,
    exploration_timer: Timer,
    deviation_timer: Timer,

    rng: SmallRng,
}

impl Ant {
    /// Create a new ant searching for food, facing a random direction.
    pub fn new<R: Rng>(
        id: usize,
        colony_id: ColonyId,
        pos: Vec2,
        config: &AntConfig,
        seed_rng: &mut R,
    ) -> Self {
        let mut rng = SmallRng::from_rng(seed_rng);
        let heading = rng.random_range(-PI..=PI);

        // Offset the perception cadence so scans are spread across ticks
        let fov_timer = Timer::new(
            config.fov_check_delay,
            rng.random_range(0.0..=config.fov_check_delay),
        );
        let deposit_timer = Timer::new(config.pheromone_spawn_delay, 0.0);
        let exploration_timer = Timer::new(draw_delay(&mut rng, config.exploration_delay), 0.0);
        let deviation_timer = Timer::new(draw_delay(&mut rng, config.deviation_cooldown), 0.0);

        Self {
            id,
            colony_id,
            pos,
            prev_pos: pos,
            heading,
            desired_heading: heading,
            state: AntState::SearchForFood,
            carrying_food: false,
            trail_strength: 1.0,
            ignoring_pheromones: false,
            perception: Perception::default(),
            fov_timer,
            deposit_timer,
            exploration_timer,
            deviation_timer,
            rng,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub fn colony_id(&self) -> ColonyId {
        self.colony_id
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn desired_heading(&self) -> f32 {
        self.desired_heading
    }

    pub fn state(&self) -> AntState {
        self.state
    }

    pub fn is_carrying_food(&self) -> bool {
        self.carrying_food
    }

    pub fn trail_strength(&self) -> f32 {
        self.trail_strength
    }

    pub fn is_ignoring_pheromones(&self) -> bool {
        self.ignoring_pheromones
    }

    pub fn perception(&self) -> Perception {
        self.perception
    }

    pub fn snapshot(&self) -> AntSnapshot {
        AntSnapshot {
            position: self.pos.to_array(),
            heading: self.heading,
            carrying_food: self.carrying_food,
        }
    }

    /// Points the ant (and its steering target) at `heading`.
    pub fn face(&mut self, heading: f32) {
        self.heading = wrap_angle(heading);
        self.desired_heading = self.heading;
    }

    /// Parallel phase: sense, decide and move. Reads shared grids only.
    pub fn update(&mut self, dt: f32, world: &Surroundings<'_>) -> PendingEvent {
        self.update_timers(dt, world.config);

        self.rotate(dt, world.config);
        self.move_forward(dt, world);

        let event = self.check_collisions(world);

        if self.fov_timer.is_ready() {
            self.perception = self.scan_fov(world.grid, world.pheromones, world.config);
            if self.perception.found_object || self.perception.found_pheromone {
                self.desired_heading =
                    wrap_angle(self.heading + self.perception.turn_side as f32 * FRAC_PI_4);
            }
            self.fov_timer.wrap();
        }

        self.trail_strength = (self.trail_strength - world.config.trail_strength_loss * dt).max(0.0);

        event
    }

    /// Sequential phase: deposit pheromone and apply the pending event.
    pub fn commit(
        &mut self,
        event: PendingEvent,
        grid: &mut TileGrid,
        pheromones: &mut PheromoneField,
        config: &AntConfig,
    ) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();

        if self.deposit_timer.is_ready() {
            let kind = config.trail_policy.deposit_kind(self.state);
            let intensity = config.pheromone_intensity * self.trail_strength;
            pheromones.add(kind, TileGrid::cell_of(self.pos), intensity);
            self.deposit_timer.wrap();
        }

        match event {
            PendingEvent::None => {}
            PendingEvent::PickedUpFood { cell } => {
                if self.state == AntState::SearchForFood && grid.get_tile(cell).is_food() {
                    outcome.depleted = grid.take_food(cell);
                    outcome.picked_up = true;
                    self.pick_up_food();
                } else {
                    log::debug!("Ant {} lost the food at {cell} to another ant", self.id);
                }
            }
            PendingEvent::DeliveredFood => outcome.delivered = true,
        }

        outcome
    }

    fn update_timers(&mut self, dt: f32, config: &AntConfig) {
        self.fov_timer.update(dt);
        self.deposit_timer.update(dt);
        self.exploration_timer.update(dt);
        self.deviation_timer.update(dt);

        if self.exploration_timer.is_ready() {
            self.ignoring_pheromones = true;
            self.exploration_timer.reset();
            self.deviation_timer.reset();
            let delay = draw_delay(&mut self.rng, config.exploration_delay);
            self.exploration_timer.set_delay(delay);
        }

        if self.deviation_timer.is_ready() {
            self.ignoring_pheromones = false;
            self.deviation_timer.reset();
            let delay = draw_delay(&mut self.rng, config.deviation_cooldown);
            self.deviation_timer.set_delay(delay);
        }
    }

    /// Wanders the target heading, then steers proportionally toward it.
    fn rotate(&mut self, dt: f32, config: &AntConfig) {
        let wander = self.rng.random_range(-1.0f32..=1.0) * config.random_rotation;
        self.desired_heading = wrap_angle(self.desired_heading + wander);

        let angle_diff = wrap_angle(self.desired_heading - self.heading);
        let gain = (config.rotation_speed * dt).min(1.0);
        self.heading = wrap_angle(self.heading + angle_diff * gain);
    }

    fn move_forward(&mut self, dt: f32, world: &Surroundings<'_>) {
        self.prev_pos = self.pos;

        let (sin, cos) = self.heading.sin_cos();
        self.pos += Vec2::new(cos, sin) * world.config.movement_speed * dt;

        self.stay_in_bounds(world.grid);
    }

    fn stay_in_bounds(&mut self, grid: &TileGrid) {
        let bounds = Vec2::new(grid.width() as f32, grid.height() as f32);
        let out_of_bounds = self.pos.x < 0.0
            || self.pos.y < 0.0
            || self.pos.x >= bounds.x
            || self.pos.y >= bounds.y
            || !self.pos.is_finite();

        if out_of_bounds {
            self.pos = self.prev_pos;
            self.turn_backward();
            self.randomize_heading(FRAC_PI_4);
        }
    }

    fn check_collisions(&mut self, world: &Surroundings<'_>) -> PendingEvent {
        let cell = TileGrid::cell_of(self.pos);
        let tile = *world.grid.get_tile(cell);

        let mut event = PendingEvent::None;
        if self.is_goal(&tile) {
            match self.state {
                AntState::SearchForFood => event = PendingEvent::PickedUpFood { cell },
                AntState::SearchForNest => {
                    self.deliver_food();
                    event = PendingEvent::DeliveredFood;
                }
            }
        }

        if !tile.is_passable() {
            self.pos = self.prev_pos;
            if !world.grid.is_passable(TileGrid::cell_of(self.prev_pos)) {
                log::warn!(
                    "Ant {} boxed in at {}, sending it back to the nest",
                    self.id,
                    self.prev_pos
                );
                self.pos = world.nest_position;
                self.prev_pos = world.nest_position;
            }
            self.turn_backward();
            self.randomize_heading(FRAC_PI_4);
        }

        event
    }

    /// Probes a forward cone ring by ring and picks a side to turn to.
    pub fn scan_fov(
        &self,
        grid: &TileGrid,
        pheromones: &PheromoneField,
        config: &AntConfig,
    ) -> Perception {
        // Unit vectors for left, forward and right probes
        let mut directions = [Vec2::ZERO; 3];
        for (slot, side) in directions.iter_mut().zip(-1..=1) {
            let (sin, cos) = fast_sin_cos(self.heading + side as f32 * FRAC_PI_4);
            *slot = Vec2::new(cos, sin);
        }

        let follow_kind = config.trail_policy.follow_kind(self.state);
        let mut perception = Perception::default();
        let mut strongest = 0.0f32;

        'rings: for j in 1..=config.fov_range {
            let reach = j as f32;
            for i in (-j / 2 - 1)..=(j / 2 + 1) {
                let side = i.signum();
                let probe = self.pos + directions[(side + 1) as usize] * reach;
                let cell = TileGrid::cell_of(probe);
                let tile = grid.get_tile(cell);

                if self.is_goal(tile) {
                    perception.turn_side = side;
                    perception.found_object = true;
                    break 'rings;
                }

                if !tile.is_passable() {
                    if j < NEAR_WALL_RINGS {
                        perception.turn_side = -side;
                        perception.found_object = true;
                        break 'rings;
                    }
                    continue;
                }

                if self.ignoring_pheromones {
                    continue;
                }

                let value = pheromones.get(follow_kind, cell);
                if prefers_probe(strongest, value, side) {
                    strongest = value;
                    perception.turn_side = side;
                    perception.found_pheromone = true;
                }
            }
        }

        perception
    }

    #[inline(always)]
    fn is_goal(&self, tile: &Tile) -> bool {
        match self.state {
            AntState::SearchForFood => tile.is_food(),
            AntState::SearchForNest => tile.nest_owner() == Some(self.colony_id),
        }
    }

    fn pick_up_food(&mut self) {
        self.carrying_food = true;
        self.state = AntState::SearchForNest;
        self.trail_strength = 1.0;
        self.turn_backward();
    }

    fn deliver_food(&mut self) {
        self.carrying_food = false;
        self.state = AntState::SearchForFood;
        self.trail_strength = 1.0;
        self.turn_backward();
    }

    /// Reverses the ant and drops any pending turn.
    pub fn turn_backward(&mut self) {
        self.heading = wrap_angle(self.heading - PI);
        self.desired_heading = self.heading;
    }

    fn randomize_heading(&mut self, max_offset: f32) {
        self.heading = wrap_angle(self.heading + max_offset * self.rng.random_range(-1.0f32..=1.0));
    }
}

fn draw_delay<R: Rng + ?Sized>(rng: &mut R, [min, max]: [f32; 2]) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PheromoneConfig;
    use crate::simulation::map::TileKind;
    use crate::simulation::pheromone::{PheromoneKind, TrailPolicy};
    use rand_chacha::ChaCha12Rng;

    fn quiet_config() -> AntConfig {
        AntConfig {
            random_rotation: 0.0,
            exploration_delay: [1000.0, 1000.0],
            deviation_cooldown: [1.0, 1.0],
            ..AntConfig::default()
        }
    }

    fn world_parts() -> (TileGrid, PheromoneField) {
        let grid = TileGrid::new(30, 20, 1);
        let pheromones = PheromoneField::new(30, 20, &PheromoneConfig::default());
        (grid, pheromones)
    }

    fn ant_at(pos: Vec2, heading: f32, config: &AntConfig) -> Ant {
        let mut seed = ChaCha12Rng::seed_from_u64(11);
        let mut ant = Ant::new(0, ColonyId::default(), pos, config, &mut seed);
        ant.face(heading);
        ant
    }

    fn surroundings<'a>(
        grid: &'a TileGrid,
        pheromones: &'a PheromoneField,
        config: &'a AntConfig,
    ) -> Surroundings<'a> {
        Surroundings {
            grid,
            pheromones,
            nest_position: Vec2::new(2.5, 2.5),
            config,
        }
    }

    #[test]
    fn test_near_wall_straight_ahead_is_detected() {
        let config = quiet_config();
        let (mut grid, pheromones) = world_parts();
        grid.set_tile(IVec2::new(12, 10), TileKind::Wall);
        let ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(perception.found_object);
        assert_eq!(perception.turn_side, 0, "forward probe steers to -0");
    }

    #[test]
    fn test_near_wall_on_left_turns_right() {
        let config = quiet_config();
        let (mut grid, pheromones) = world_parts();
        grid.set_tile(IVec2::new(11, 9), TileKind::Wall);
        let ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(perception.found_object);
        assert_eq!(perception.turn_side, 1);
    }

    #[test]
    fn test_far_wall_is_ignored() {
        let config = quiet_config();
        let (mut grid, pheromones) = world_parts();
        grid.set_tile(IVec2::new(15, 10), TileKind::Wall);
        let ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(!perception.found_object);
        assert!(!perception.found_pheromone);
    }

    #[test]
    fn test_goal_beats_pheromone() {
        let config = quiet_config();
        let (mut grid, mut pheromones) = world_parts();
        pheromones.add(PheromoneKind::Food, IVec2::new(11, 9), 200.0);
        grid.set_tile(IVec2::new(11, 11), TileKind::Food);
        let ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(perception.found_object);
        assert_eq!(perception.turn_side, 1, "food on the right wins");
    }

    #[test]
    fn test_strongest_pheromone_side_is_chosen() {
        let config = quiet_config();
        let (grid, mut pheromones) = world_parts();
        pheromones.add(PheromoneKind::Food, IVec2::new(11, 10), 50.0);
        pheromones.add(PheromoneKind::Food, IVec2::new(11, 11), 80.0);
        // Nest trail is not what a food searcher follows
        pheromones.add(PheromoneKind::Nest, IVec2::new(11, 9), 250.0);
        let ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(perception.found_pheromone);
        assert!(!perception.found_object);
        assert_eq!(perception.turn_side, 1);
    }

    #[test]
    fn test_equal_pheromone_prefers_forward() {
        let config = quiet_config();
        let (grid, mut pheromones) = world_parts();
        pheromones.add(PheromoneKind::Food, IVec2::new(11, 9), 50.0);
        pheromones.add(PheromoneKind::Food, IVec2::new(11, 10), 50.0);
        let ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(perception.found_pheromone);
        assert_eq!(perception.turn_side, 0);
    }

    #[test]
    fn test_prefers_probe_tie_break() {
        assert!(prefers_probe(0.0, 1.0, -1));
        assert!(!prefers_probe(0.0, 0.0, 0), "nothing sensed is not a pick");
        assert!(prefers_probe(5.0, 5.0, 0), "forward takes a tie");
        assert!(!prefers_probe(5.0, 5.0, 1), "sides never take a tie");
        assert!(!prefers_probe(5.0, 4.0, 0));
    }

    #[test]
    fn test_ignoring_pheromones_skips_trails() {
        let config = quiet_config();
        let (grid, mut pheromones) = world_parts();
        pheromones.add(PheromoneKind::Food, IVec2::new(11, 11), 80.0);
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);
        ant.ignoring_pheromones = true;

        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(!perception.found_pheromone);
    }

    #[test]
    fn test_returning_ant_follows_nest_trail_and_seeks_own_nest() {
        let config = quiet_config();
        let (mut grid, mut pheromones) = world_parts();
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);
        ant.state = AntState::SearchForNest;

        pheromones.add(PheromoneKind::Nest, IVec2::new(11, 9), 30.0);
        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert_eq!(perception.turn_side, -1);

        let mut other = slotmap::SlotMap::<ColonyId, ()>::with_key();
        let foreign = other.insert(());
        grid.set_tile(IVec2::new(11, 10), TileKind::Nest(foreign));
        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(!perception.found_object, "a foreign nest is not a goal");

        grid.set_tile(IVec2::new(11, 11), TileKind::Nest(ColonyId::default()));
        let perception = ant.scan_fov(&grid, &pheromones, &config);
        assert!(perception.found_object);
        assert_eq!(perception.turn_side, 1);
    }

    #[test]
    fn test_heading_stays_wrapped_while_wandering() {
        let config = AntConfig {
            random_rotation: 1.5,
            ..AntConfig::default()
        };
        let (grid, pheromones) = world_parts();
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(15.0, 10.0), 3.0, &config);

        for _ in 0..2000 {
            ant.update(1.0 / 60.0, &world);
            assert!((-PI..=PI).contains(&ant.heading()), "heading {} escaped", ant.heading());
            assert!((-PI..=PI).contains(&ant.desired_heading()));
        }
    }

    #[test]
    fn test_rotation_converges_toward_desired_heading() {
        let config = quiet_config();
        let mut ant = ant_at(Vec2::new(5.0, 5.0), 0.0, &config);
        ant.desired_heading = 1.0;
        ant.rotate(0.05, &config);
        assert!((ant.heading() - 0.5).abs() < 1e-5, "half the error per 0.05s at speed 10");
        ant.rotate(0.05, &config);
        assert!((ant.heading() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_turn_backward_reverses() {
        let config = quiet_config();
        let mut ant = ant_at(Vec2::new(5.0, 5.0), 0.5, &config);
        ant.desired_heading = 2.0;
        ant.turn_backward();
        assert!((ant.heading() - (0.5 - PI)).abs() < 1e-5);
        assert_eq!(ant.heading(), ant.desired_heading());
    }

    #[test]
    fn test_wall_collision_reverts_position() {
        let config = quiet_config();
        let (mut grid, pheromones) = world_parts();
        grid.set_tile(IVec2::new(11, 10), TileKind::Wall);
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        ant.prev_pos = Vec2::new(10.5, 10.5);
        ant.pos = Vec2::new(11.2, 10.5);
        assert_eq!(ant.check_collisions(&world), PendingEvent::None);
        assert_eq!(ant.position(), Vec2::new(10.5, 10.5));
        assert!(wrap_angle(ant.heading() - PI).abs() <= FRAC_PI_4 + 1e-5);
    }

    #[test]
    fn test_boxed_in_ant_returns_to_nest() {
        let config = quiet_config();
        let (mut grid, pheromones) = world_parts();
        grid.set_tile(IVec2::new(10, 10), TileKind::Wall);
        grid.set_tile(IVec2::new(11, 10), TileKind::Wall);
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        ant.pos = Vec2::new(11.2, 10.5);
        ant.check_collisions(&world);
        assert_eq!(ant.position(), world.nest_position);
    }

    #[test]
    fn test_leaving_the_map_is_undone() {
        let config = quiet_config();
        let (grid, pheromones) = world_parts();
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(29.9, 10.5), 0.0, &config);

        ant.move_forward(0.1, &world);
        assert_eq!(ant.position(), Vec2::new(29.9, 10.5));
        assert!(wrap_angle(ant.heading() - PI).abs() <= FRAC_PI_4 + 1e-5);
    }

    #[test]
    fn test_stepping_on_food_is_committed_later() {
        let config = quiet_config();
        let (mut grid, mut pheromones) = world_parts();
        grid.set_tile(IVec2::new(11, 10), TileKind::Food);
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        ant.pos = Vec2::new(11.3, 10.5);
        let event = ant.check_collisions(&world);
        assert_eq!(event, PendingEvent::PickedUpFood { cell: IVec2::new(11, 10) });
        assert_eq!(ant.state(), AntState::SearchForFood, "no change before commit");

        ant.trail_strength = 0.2;
        let outcome = ant.commit(event, &mut grid, &mut pheromones, &config);
        assert!(outcome.picked_up && outcome.depleted);
        assert_eq!(grid.tile_kind(IVec2::new(11, 10)), TileKind::Empty);
        assert_eq!(ant.state(), AntState::SearchForNest);
        assert!(ant.is_carrying_food());
        assert_eq!(ant.trail_strength(), 1.0);
        assert!((ant.heading().abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_pickup_race_loser_keeps_searching() {
        let config = quiet_config();
        let (mut grid, mut pheromones) = world_parts();
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);

        let event = PendingEvent::PickedUpFood { cell: IVec2::new(11, 10) };
        let outcome = ant.commit(event, &mut grid, &mut pheromones, &config);
        assert!(!outcome.picked_up);
        assert_eq!(ant.state(), AntState::SearchForFood);
    }

    #[test]
    fn test_entering_own_nest_delivers() {
        let config = quiet_config();
        let (mut grid, pheromones) = world_parts();
        grid.set_tile(IVec2::new(11, 10), TileKind::Nest(ColonyId::default()));
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(10.5, 10.5), 0.0, &config);
        ant.state = AntState::SearchForNest;
        ant.carrying_food = true;
        ant.trail_strength = 0.3;

        ant.pos = Vec2::new(11.4, 10.5);
        assert_eq!(ant.check_collisions(&world), PendingEvent::DeliveredFood);
        assert_eq!(ant.state(), AntState::SearchForFood);
        assert!(!ant.is_carrying_food());
        assert_eq!(ant.trail_strength(), 1.0);
    }

    #[test]
    fn test_deposit_follows_policy_and_trail_strength() {
        let mut config = quiet_config();
        config.pheromone_intensity = 100.0;
        let (mut grid, mut pheromones) = world_parts();
        let mut ant = ant_at(Vec2::new(4.5, 4.5), 0.0, &config);
        ant.trail_strength = 0.5;
        ant.deposit_timer.force_ready();

        ant.commit(PendingEvent::None, &mut grid, &mut pheromones, &config);
        assert_eq!(pheromones.get(PheromoneKind::Nest, IVec2::new(4, 4)), 50.0);
        assert_eq!(pheromones.get(PheromoneKind::Food, IVec2::new(4, 4)), 0.0);

        config.trail_policy = TrailPolicy::CarrierMarksNest;
        ant.deposit_timer.force_ready();
        ant.commit(PendingEvent::None, &mut grid, &mut pheromones, &config);
        assert_eq!(pheromones.get(PheromoneKind::Food, IVec2::new(4, 4)), 50.0);
    }

    #[test]
    fn test_no_deposit_before_timer() {
        let config = quiet_config();
        let (mut grid, mut pheromones) = world_parts();
        let mut ant = ant_at(Vec2::new(4.5, 4.5), 0.0, &config);

        ant.commit(PendingEvent::None, &mut grid, &mut pheromones, &config);
        assert_eq!(pheromones.get(PheromoneKind::Nest, IVec2::new(4, 4)), 0.0);
    }

    #[test]
    fn test_trail_strength_decays_linearly() {
        let mut config = quiet_config();
        config.trail_strength_loss = 0.5;
        config.movement_speed = 0.0;
        let (grid, pheromones) = world_parts();
        let world = surroundings(&grid, &pheromones, &config);
        let mut ant = ant_at(Vec2::new(15.5, 10.5), 0.0, &config);

        ant.update(1.0, &world);
        assert!((ant.trail_strength() - 0.5).abs() < 1e-6);
        ant.update(1.5, &world);
        assert_eq!(ant.trail_strength(), 0.0);
    }

    #[test]
    fn test_exploration_window_opens_and_closes() {
        let mut config = quiet_config();
        config.exploration_delay = [2.0, 2.0];
        config.deviation_cooldown = [0.5, 0.5];
        let mut ant = ant_at(Vec2::new(5.0, 5.0), 0.0, &config);

        ant.update_timers(1.0, &config);
        assert!(!ant.is_ignoring_pheromones());
        ant.update_timers(1.0, &config);
        assert!(ant.is_ignoring_pheromones(), "exploration starts after 2s");
        ant.update_timers(0.25, &config);
        assert!(ant.is_ignoring_pheromones());
        ant.update_timers(0.25, &config);
        assert!(!ant.is_ignoring_pheromones(), "cooldown ends it after 0.5s");
    }
}
