/// Fixed timestep accumulator with a running frame counter.
///
/// The host hands in variable frame deltas; the clock answers how many fixed
/// ticks to run and keeps count of the ticks already run, which is what the
/// periodic gravity flip and the sensor polling cadence key off.
pub struct FrameClock {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Ticks completed so far.
    frame: u64,
}

impl FrameClock {
    /// Create a clock ticking `frame_rate` times per second.
    pub fn new(frame_rate: u32) -> Self {
        Self {
            dt: 1.0 / frame_rate.max(1) as f32,
            accumulator: 0.0,
            frame: 0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent spiral of death (max 10 ticks per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Mark one tick as run and return its 1-based frame number.
    pub fn advance(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether the current frame lands on a multiple of `period` frames.
    /// A zero period never fires.
    pub fn is_every(&self, period: u64) -> bool {
        period > 0 && self.frame > 0 && self.frame % period == 0
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut clock = FrameClock::new(60);
        assert_eq!(clock.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut clock = FrameClock::new(60);
        assert_eq!(clock.accumulate(0.008), 0); // half a frame
        assert_eq!(clock.accumulate(0.010), 1); // over one frame total
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut clock = FrameClock::new(60);
        assert_eq!(clock.accumulate(1.0), 10);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = FrameClock::new(60);
        assert_eq!(clock.accumulate(-5.0), 0);
        assert_eq!(clock.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn cadence_fires_on_multiples() {
        let mut clock = FrameClock::new(60);
        assert!(!clock.is_every(3), "frame 0 never fires");

        let fired: Vec<u64> = (0..9)
            .filter_map(|_| {
                let frame = clock.advance();
                clock.is_every(3).then_some(frame)
            })
            .collect();
        assert_eq!(fired, vec![3, 6, 9]);
    }

    #[test]
    fn zero_period_never_fires() {
        let mut clock = FrameClock::new(60);
        for _ in 0..5 {
            clock.advance();
            assert!(!clock.is_every(0));
        }
    }
}
