pub mod authoring;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod gravity;
pub mod input;
pub mod render;
pub mod sensor;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience
pub use authoring::{AuthoredCollider, ColliderAuthor};
pub use config::{GravityPolicyKind, Parameters, PARAMETERS_FILENAME};
pub use crate::core::physics::{EdgeHandle, ParticleHandle, PhysicsBackend};
pub use crate::core::rng::Rng;
pub use crate::core::time::FrameClock;
pub use driver::SimulationDriver;
pub use error::{ConfigError, StorageError};
pub use geometry::{Point, Polyline};
pub use gravity::{Direction, GravityChange, GravityController, GravityPolicy, SensorMapping};
pub use input::queue::{EditCommand, InputEvent, InputQueue};
pub use render::instance::{ParticleBuffer, ParticleInstance};
pub use render::preview::EditPreview;
pub use sensor::{sensor_channel, SensorFeed, SensorLink, SensorTransport};
pub use storage::{FileStorage, MemoryStorage, Storage};

#[cfg(feature = "physics")]
pub use crate::core::physics::{ColliderMaterial, PhysicsWorld};
