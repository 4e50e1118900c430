// Count-up timer used for every cadence in the simulation.
// Counts from 0 up to `delay`; units are whatever the caller feeds to `update`
// (seconds for agents, ticks for colony and pheromone bookkeeping).

#[derive(Debug, Clone)]
pub struct Timer {
    pub delay: f32,
    pub value: f32,
}

impl Timer {
    /// Create a new timer with a delay and an initial value
    pub fn new(delay: f32, initial_value: f32) -> Self {
        Self {
            delay,
            value: initial_value,
        }
    }

    /// Returns true once the accumulated value reached the delay
    pub fn is_ready(&self) -> bool {
        self.value >= self.delay
    }

    pub fn update(&mut self, dt: f32) {
        self.value += dt;
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Keeps the overshoot past the delay, so cadences do not drift.
    pub fn wrap(&mut self) {
        if self.delay > 0.0 {
            self.value %= self.delay;
        } else {
            self.value = 0.0;
        }
    }

    pub fn force_ready(&mut self) {
        self.value = self.delay;
    }

    /// Changes the delay without touching the accumulated value.
    pub fn set_delay(&mut self, delay: f32) {
        self.delay = delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_becomes_ready_after_delay() {
        let mut timer = Timer::new(1.0, 0.0);
        timer.update(0.4);
        assert!(!timer.is_ready());
        timer.update(0.6);
        assert!(timer.is_ready());
    }

    #[test]
    fn test_timer_wrap_keeps_overshoot() {
        let mut timer = Timer::new(1.0, 0.0);
        timer.update(1.25);
        timer.wrap();
        assert!((timer.value - 0.25).abs() < 1e-6);
        assert!(!timer.is_ready());
    }

    #[test]
    fn test_timer_reset_and_force_ready() {
        let mut timer = Timer::new(3.0, 2.0);
        timer.reset();
        assert_eq!(timer.value, 0.0);
        timer.force_ready();
        assert!(timer.is_ready());
        timer.set_delay(5.0);
        assert!(!timer.is_ready());
    }

    #[test]
    fn test_zero_delay_wrap_does_not_produce_nan() {
        let mut timer = Timer::new(0.0, 0.0);
        timer.update(0.5);
        timer.wrap();
        assert_eq!(timer.value, 0.0);
    }
}
