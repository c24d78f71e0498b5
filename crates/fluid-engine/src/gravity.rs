//! Gravity control.
//!
//! Exactly one [`GravityPolicy`] is active per deployment:
//!
//! - **Periodic flip**: every `period_frames` ticks, gravity snaps to a new
//!   cardinal direction drawn uniformly from the four, redrawing until it
//!   differs from the current one.
//! - **Sensor**: each reading is mapped linearly from `[min, max]` onto
//!   `[-intensity, +intensity]`, clamped, negated and used as the horizontal
//!   component. Vertical gravity stays zero. Readings arrive through a
//!   [`SensorFeed`] drained once per tick.

use glam::Vec2;

use crate::config::{GravityPolicyKind, Parameters};
use crate::core::physics::PhysicsBackend;
use crate::core::rng::Rng;
use crate::core::time::FrameClock;
use crate::sensor::SensorFeed;

/// Cardinal gravity directions in canvas space (Y-down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Down,
    Up,
    Right,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Down, Direction::Up, Direction::Right, Direction::Left];

    /// Unit vector pointing the way particles fall.
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
        }
    }
}

/// Linear sensor-to-gravity mapping with clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMapping {
    pub sensor_min: f32,
    pub sensor_max: f32,
    pub intensity: f32,
}

impl SensorMapping {
    /// Horizontal gravity component for a reading. The sensor axis runs
    /// opposite to the gravity axis, so `sensor_min` maps to `+intensity`.
    pub fn horizontal(&self, reading: f32) -> f32 {
        let (out_min, out_max) = (-self.intensity, self.intensity);
        let span = self.sensor_max - self.sensor_min;
        let mapped = if span.abs() <= f32::EPSILON {
            out_min
        } else {
            (reading - self.sensor_min) / span * (out_max - out_min) + out_min
        };
        let (lo, hi) = if out_min <= out_max { (out_min, out_max) } else { (out_max, out_min) };
        -mapped.clamp(lo, hi)
    }

    pub fn gravity(&self, reading: f32) -> Vec2 {
        Vec2::new(self.horizontal(reading), 0.0)
    }
}

/// The active strategy and its private memory.
#[derive(Debug)]
pub enum GravityPolicy {
    PeriodicFlip {
        current: Direction,
        period_frames: u64,
        rng: Rng,
    },
    Sensor {
        mapping: SensorMapping,
        feed: SensorFeed,
        last_reading: Option<f32>,
    },
}

/// What a tick did to gravity.
#[derive(Debug, Clone, PartialEq)]
pub enum GravityChange {
    Unchanged,
    Flipped(Direction),
    /// Sensor readings applied this tick, oldest first. The last one won.
    Readings(Vec<f32>),
}

/// Owns the gravity vector and transitions it under one policy.
#[derive(Debug)]
pub struct GravityController {
    policy: GravityPolicy,
    intensity: f32,
    gravity: Vec2,
}

impl GravityController {
    /// Periodic flip policy starting in [`Direction::Down`].
    pub fn periodic_flip(intensity: f32, period_frames: u64, seed: u64) -> Self {
        let current = Direction::Down;
        Self {
            policy: GravityPolicy::PeriodicFlip {
                current,
                period_frames,
                rng: Rng::new(seed),
            },
            intensity,
            gravity: current.unit() * intensity,
        }
    }

    /// Sensor policy starting at `(+intensity, 0)` until the first reading.
    pub fn sensor(mapping: SensorMapping, feed: SensorFeed) -> Self {
        let intensity = mapping.intensity;
        Self {
            policy: GravityPolicy::Sensor {
                mapping,
                feed,
                last_reading: None,
            },
            intensity,
            gravity: Vec2::new(intensity, 0.0),
        }
    }

    /// Build the controller selected by `params.gravity_policy`.
    pub fn from_parameters(params: &Parameters, feed: SensorFeed) -> Self {
        match params.gravity_policy {
            GravityPolicyKind::PeriodicFlip => Self::periodic_flip(
                params.gravity_intensity,
                params.flip_period_frames(),
                params.seed,
            ),
            GravityPolicyKind::Sensor => Self::sensor(
                SensorMapping {
                    sensor_min: params.sensor_min,
                    sensor_max: params.sensor_max,
                    intensity: params.gravity_intensity,
                },
                feed,
            ),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn policy(&self) -> &GravityPolicy {
        &self.policy
    }

    pub fn kind(&self) -> GravityPolicyKind {
        match self.policy {
            GravityPolicy::PeriodicFlip { .. } => GravityPolicyKind::PeriodicFlip,
            GravityPolicy::Sensor { .. } => GravityPolicyKind::Sensor,
        }
    }

    /// Current direction under the periodic policy.
    pub fn direction(&self) -> Option<Direction> {
        match self.policy {
            GravityPolicy::PeriodicFlip { current, .. } => Some(current),
            GravityPolicy::Sensor { .. } => None,
        }
    }

    /// Last applied reading under the sensor policy.
    pub fn last_reading(&self) -> Option<f32> {
        match self.policy {
            GravityPolicy::Sensor { last_reading, .. } => last_reading,
            GravityPolicy::PeriodicFlip { .. } => None,
        }
    }

    /// Whether the periodic policy is due to flip on the clock's current frame.
    pub fn is_flip_due(&self, clock: &FrameClock) -> bool {
        match self.policy {
            GravityPolicy::PeriodicFlip { period_frames, .. } => clock.is_every(period_frames),
            GravityPolicy::Sensor { .. } => false,
        }
    }

    /// Draw a new direction different from the current one.
    /// Returns `None` under the sensor policy.
    pub fn flip(&mut self) -> Option<Direction> {
        let GravityPolicy::PeriodicFlip { current, rng, .. } = &mut self.policy else {
            return None;
        };
        let mut next = *current;
        while next == *current {
            next = Direction::ALL[rng.next_int(Direction::ALL.len() as u32) as usize];
        }
        *current = next;
        self.gravity = next.unit() * self.intensity;
        Some(next)
    }

    /// Replace gravity from one sensor reading. Ignored under the periodic policy.
    pub fn apply_reading(&mut self, reading: f32) -> Vec2 {
        if let GravityPolicy::Sensor { mapping, last_reading, .. } = &mut self.policy {
            *last_reading = Some(reading);
            self.gravity = mapping.gravity(reading);
        }
        self.gravity
    }

    /// Run this tick's transition and push the result into the world.
    /// Must be called before the world steps for the same tick.
    pub fn update<P: PhysicsBackend>(&mut self, clock: &FrameClock, physics: &mut P) -> GravityChange {
        let change = match self.kind() {
            GravityPolicyKind::PeriodicFlip if self.is_flip_due(clock) => {
                self.flip().map_or(GravityChange::Unchanged, GravityChange::Flipped)
            }
            GravityPolicyKind::PeriodicFlip => GravityChange::Unchanged,
            GravityPolicyKind::Sensor => {
                let readings = self.drain_feed();
                if readings.is_empty() {
                    GravityChange::Unchanged
                } else {
                    for &r in &readings {
                        self.apply_reading(r);
                    }
                    GravityChange::Readings(readings)
                }
            }
        };

        if change != GravityChange::Unchanged {
            self.apply(physics);
        }
        change
    }

    fn drain_feed(&self) -> Vec<f32> {
        match &self.policy {
            GravityPolicy::Sensor { feed, .. } => feed.drain(),
            GravityPolicy::PeriodicFlip { .. } => Vec::new(),
        }
    }

    /// Push the current vector into the world.
    pub fn apply<P: PhysicsBackend>(&self, physics: &mut P) {
        physics.set_gravity(self.gravity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::sensor_channel;

    fn mapping() -> SensorMapping {
        SensorMapping {
            sensor_min: 0.0,
            sensor_max: 180.0,
            intensity: 2.0,
        }
    }

    #[test]
    fn sensor_mapping_inverts_and_clamps() {
        let m = mapping();
        assert!((m.horizontal(0.0) - 2.0).abs() < 1e-6);
        assert!((m.horizontal(180.0) + 2.0).abs() < 1e-6);
        assert!(m.horizontal(90.0).abs() < 1e-6);
        assert!((m.horizontal(-50.0) - 2.0).abs() < 1e-6);
        assert!((m.horizontal(999.0) + 2.0).abs() < 1e-6);
        assert!((m.horizontal(45.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_sensor_range_maps_to_positive_intensity() {
        let m = SensorMapping {
            sensor_min: 10.0,
            sensor_max: 10.0,
            intensity: 1.5,
        };
        assert!((m.horizontal(123.0) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn reversed_sensor_range() {
        let m = SensorMapping {
            sensor_min: 180.0,
            sensor_max: 0.0,
            intensity: 2.0,
        };
        assert!((m.horizontal(180.0) - 2.0).abs() < 1e-6);
        assert!((m.horizontal(0.0) + 2.0).abs() < 1e-6);
    }

    #[test]
    fn flip_never_repeats() {
        let mut ctrl = GravityController::periodic_flip(1.0, 600, 1234);
        let mut prev = ctrl.direction().unwrap();
        for _ in 0..1000 {
            let next = ctrl.flip().unwrap();
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn flip_visits_every_direction() {
        let mut ctrl = GravityController::periodic_flip(1.0, 600, 9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(ctrl.flip().unwrap());
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn flip_scales_unit_vector() {
        let mut ctrl = GravityController::periodic_flip(3.0, 600, 5);
        assert_eq!(ctrl.gravity(), Vec2::new(0.0, 3.0));
        let dir = ctrl.flip().unwrap();
        assert_eq!(ctrl.gravity(), dir.unit() * 3.0);
    }

    #[test]
    fn sensor_controller_starts_horizontal_and_ignores_flip() {
        let (_link, feed) = sensor_channel();
        let mut ctrl = GravityController::sensor(mapping(), feed);
        assert_eq!(ctrl.gravity(), Vec2::new(2.0, 0.0));
        assert_eq!(ctrl.flip(), None);
        assert_eq!(ctrl.direction(), None);
    }

    #[test]
    fn readings_fully_replace_gravity() {
        let (_link, feed) = sensor_channel();
        let mut ctrl = GravityController::sensor(mapping(), feed);
        ctrl.apply_reading(180.0);
        assert_eq!(ctrl.gravity(), Vec2::new(-2.0, 0.0));
        ctrl.apply_reading(90.0);
        assert!(ctrl.gravity().x.abs() < 1e-6);
        assert_eq!(ctrl.gravity().y, 0.0);
        assert_eq!(ctrl.last_reading(), Some(90.0));
    }

    #[test]
    fn periodic_policy_ignores_readings() {
        let mut ctrl = GravityController::periodic_flip(1.0, 600, 5);
        let before = ctrl.gravity();
        assert_eq!(ctrl.apply_reading(0.0), before);
        assert_eq!(ctrl.last_reading(), None);
    }

    #[test]
    fn flip_due_on_period_multiples() {
        let ctrl = GravityController::periodic_flip(1.0, 3, 5);
        let mut clock = FrameClock::new(60);
        let mut due = Vec::new();
        for _ in 0..7 {
            let frame = clock.advance();
            if ctrl.is_flip_due(&clock) {
                due.push(frame);
            }
        }
        assert_eq!(due, vec![3, 6]);
    }

    #[test]
    fn from_parameters_picks_policy() {
        let mut params = Parameters::default();
        params.gravity_policy = GravityPolicyKind::PeriodicFlip;
        let (_link, feed) = sensor_channel();
        let ctrl = GravityController::from_parameters(&params, feed);
        assert_eq!(ctrl.kind(), GravityPolicyKind::PeriodicFlip);
        assert_eq!(ctrl.direction(), Some(Direction::Down));

        params.gravity_policy = GravityPolicyKind::Sensor;
        let (_link, feed) = sensor_channel();
        let ctrl = GravityController::from_parameters(&params, feed);
        assert_eq!(ctrl.kind(), GravityPolicyKind::Sensor);
    }
}
