use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StorageError};
use crate::storage::Storage;

/// Default key the parameter record is persisted under.
pub const PARAMETERS_FILENAME: &str = "parameters.json";

/// Which strategy drives the gravity vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityPolicyKind {
    /// Pick a new cardinal direction every `gravity_flip_interval_seconds`.
    PeriodicFlip,
    /// Map each sensor reading to a horizontal gravity component.
    Sensor,
}

/// Flat configuration record for the installation.
///
/// Loaded once at startup, written back at shutdown. Missing keys take the
/// defaults below and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Serial port the tilt sensor is attached to.
    pub serial_port: String,
    pub baud_rate: u32,
    /// Frames between explicit sensor requests. 0 disables polling.
    pub serial_request_frequency: u32,
    pub gravity_policy: GravityPolicyKind,
    pub gravity_flip_interval_seconds: u32,
    /// Host frame rate (ticks per second).
    pub frame_rate: u32,
    /// Physics steps per simulated second; the world's dt is its reciprocal.
    pub physics_rate: u32,
    pub pixels_per_meter: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub particle_population: u32,
    /// Seconds a particle lives before being respawned. 0 means forever.
    pub particle_lifetime_seconds: f32,
    /// Rendered particle size in pixels.
    pub sprite_size: f32,
    /// Particle collider diameter in pixels.
    pub collider_size: f32,
    pub gravity_intensity: f32,
    pub sensor_min: f32,
    pub sensor_max: f32,
    /// Simplification tolerance (pixels) applied to authored lines.
    pub simplify_tolerance: f32,
    pub lines_filename: String,
    pub sprite_filename: String,
    /// Name the video broadcaster publishes the canvas under.
    pub output_channel: String,
    pub reticle_size: f32,
    pub reticle_stroke_weight: f32,
    pub seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            serial_port: "COM3".to_string(),
            baud_rate: 9600,
            serial_request_frequency: 6,
            gravity_policy: GravityPolicyKind::Sensor,
            gravity_flip_interval_seconds: 10,
            frame_rate: 60,
            physics_rate: 30,
            pixels_per_meter: 30.0,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            particle_population: 8000,
            particle_lifetime_seconds: 0.0,
            sprite_size: 32.0,
            collider_size: 6.0,
            gravity_intensity: 1.0,
            sensor_min: 0.0,
            sensor_max: 180.0,
            simplify_tolerance: 0.3,
            lines_filename: "lines.txt".to_string(),
            sprite_filename: "sprite.png".to_string(),
            output_channel: "liquid-wall".to_string(),
            reticle_size: 10.0,
            reticle_stroke_weight: 1.0,
            seed: 42,
        }
    }
}

impl Parameters {
    /// Parse parameters from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read parameters from storage.
    pub fn load(storage: &dyn Storage, key: &str) -> Result<Self, ConfigError> {
        let text = storage.read(key)?;
        Ok(Self::from_json(&text)?)
    }

    /// Read parameters from storage, falling back to defaults on any failure.
    pub fn load_or_default(storage: &dyn Storage, key: &str) -> Self {
        match Self::load(storage, key) {
            Ok(params) => params,
            Err(ConfigError::Storage(StorageError::NotFound(_))) => {
                log::warn!("{} not found. Using default values...", key);
                Self::default()
            }
            Err(e) => {
                log::warn!("{}. Using default values...", e);
                Self::default()
            }
        }
    }

    /// Write the record back to storage as pretty JSON.
    pub fn save(&self, storage: &mut dyn Storage, key: &str) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        storage.write(key, &json)?;
        Ok(())
    }

    /// Frames between gravity flips under the periodic policy.
    pub fn flip_period_frames(&self) -> u64 {
        self.gravity_flip_interval_seconds as u64 * self.frame_rate as u64
    }

    /// Particle lifetime in ticks, or `None` when particles live forever.
    pub fn particle_lifetime_frames(&self) -> Option<u64> {
        if self.particle_lifetime_seconds > 0.0 {
            Some((self.particle_lifetime_seconds * self.frame_rate as f32).ceil().max(1.0) as u64)
        } else {
            None
        }
    }

    /// Physics integration step in seconds.
    pub fn physics_dt(&self) -> f32 {
        1.0 / self.physics_rate.max(1) as f32
    }
}
