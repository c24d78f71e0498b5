//! The simulation driver: boots the world and runs one tick per frame.
//!
//! Within a tick, input events are applied to the collider author and the
//! gravity controller runs its transition before the physics world steps, so
//! the world never advances with a same-tick mutation still pending.

use glam::Vec2;

use crate::authoring::ColliderAuthor;
use crate::config::{GravityPolicyKind, Parameters, PARAMETERS_FILENAME};
use crate::core::physics::{ParticleHandle, PhysicsBackend};
use crate::core::rng::Rng;
use crate::core::time::FrameClock;
use crate::gravity::{GravityChange, GravityController};
use crate::input::queue::{EditCommand, InputEvent, InputQueue};
use crate::render::instance::{ParticleBuffer, ParticleInstance};
use crate::render::preview::{edit_preview, EditPreview};
use crate::sensor::{sensor_channel, SensorLink, SensorTransport};
use crate::storage::Storage;

#[cfg(feature = "physics")]
use crate::core::physics::PhysicsWorld;

/// A live particle and the frame it was spawned on.
#[derive(Debug, Clone, Copy)]
struct Particle {
    handle: ParticleHandle,
    born: u64,
}

/// Owns the physics world and every in-scope component for the process lifetime.
pub struct SimulationDriver<P: PhysicsBackend> {
    params: Parameters,
    params_key: String,
    physics: P,
    storage: Box<dyn Storage>,
    author: ColliderAuthor,
    gravity: GravityController,
    sensor_link: SensorLink,
    transport: Option<Box<dyn SensorTransport>>,
    input: InputQueue,
    clock: FrameClock,
    rng: Rng,
    particles: Vec<Particle>,
    pointer: Vec2,
    particle_buffer: ParticleBuffer,
}

#[cfg(feature = "physics")]
impl SimulationDriver<PhysicsWorld> {
    /// Build the rapier world from `params` and initialize on top of it.
    pub fn new(params: Parameters, storage: Box<dyn Storage>) -> Self {
        let mut world = PhysicsWorld::new(Vec2::ZERO)
            .with_pixels_per_meter(params.pixels_per_meter)
            .with_particle_radius(params.collider_size / 2.0);
        world.set_dt(params.physics_dt());
        Self::initialize(params, world, storage)
    }

    /// Load parameters from storage (defaults if absent), then build.
    pub fn boot(storage: Box<dyn Storage>) -> Self {
        let params = Parameters::load_or_default(storage.as_ref(), PARAMETERS_FILENAME);
        Self::new(params, storage)
    }
}

impl<P: PhysicsBackend> SimulationDriver<P> {
    /// Apply initial gravity, wall in the canvas, load the authored colliders
    /// and spawn the initial particle population at rest.
    pub fn initialize(params: Parameters, mut physics: P, storage: Box<dyn Storage>) -> Self {
        let (sensor_link, feed) = sensor_channel();
        let gravity = GravityController::from_parameters(&params, feed);
        gravity.apply(&mut physics);

        physics.create_boundary_walls(params.canvas_width, params.canvas_height);

        let mut author = ColliderAuthor::from_parameters(&params);
        author.load(&mut physics, storage.as_ref());

        let mut driver = Self {
            clock: FrameClock::new(params.frame_rate),
            rng: Rng::new(params.seed),
            particles: Vec::with_capacity(params.particle_population as usize),
            particle_buffer: ParticleBuffer::with_capacity(params.particle_population as usize),
            pointer: Vec2::ZERO,
            input: InputQueue::new(),
            transport: None,
            params_key: PARAMETERS_FILENAME.to_string(),
            sensor_link,
            gravity,
            author,
            storage,
            physics,
            params,
        };

        for _ in 0..driver.params.particle_population {
            let handle = driver.spawn_at_random();
            driver.particles.push(Particle { handle, born: 0 });
        }
        driver.rebuild_particle_buffer();

        log::info!(
            "Simulation ready: {} particles, {} collider lines, {:?} gravity",
            driver.particles.len(),
            driver.author.len(),
            driver.gravity.kind(),
        );
        driver
    }

    /// Attach the transport used to poll the sensor.
    pub fn with_transport(mut self, transport: Box<dyn SensorTransport>) -> Self {
        self.set_transport(transport);
        self
    }

    pub fn set_transport(&mut self, transport: Box<dyn SensorTransport>) {
        self.transport = Some(transport);
    }

    /// Store parameters under a different key at shutdown.
    pub fn with_params_key(mut self, key: impl Into<String>) -> Self {
        self.params_key = key.into();
        self
    }

    /// Handle for the sensor transport to deliver readings through.
    pub fn sensor_link(&self) -> SensorLink {
        self.sensor_link.clone()
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Feed a variable frame delta; runs as many fixed ticks as are due.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let ticks = self.clock.accumulate(frame_dt);
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    /// Run one frame: poll the sensor, apply input, update gravity, expire
    /// particles, then step the world.
    pub fn tick(&mut self) {
        self.clock.advance();

        if self.gravity.kind() == GravityPolicyKind::Sensor
            && self.clock.is_every(self.params.serial_request_frequency as u64)
        {
            if let Some(transport) = self.transport.as_mut() {
                transport.request_reading();
            }
        }

        for event in self.input.drain() {
            self.handle_input(event);
        }

        match self.gravity.update(&self.clock, &mut self.physics) {
            GravityChange::Unchanged => {}
            GravityChange::Flipped(direction) => {
                log::info!("Gravity flipped to {:?}", direction);
            }
            GravityChange::Readings(readings) => {
                if self.author.is_edit_mode() {
                    for reading in readings {
                        log::info!("Sensor reading {}", reading);
                    }
                }
            }
        }

        self.expire_particles();
        self.physics.step();
        self.rebuild_particle_buffer();
    }

    /// Write the parameter record back to storage.
    pub fn shutdown(&mut self) {
        match self.params.save(self.storage.as_mut(), &self.params_key) {
            Ok(()) => log::info!("Saved parameters to {}", self.params_key),
            Err(e) => log::warn!("Was not able to save parameters: {}", e),
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.pointer = Vec2::new(x, y);
            }
            InputEvent::PointerDown { x, y } => {
                self.pointer = Vec2::new(x, y);
                self.author.begin_or_continue_stroke(
                    self.pointer,
                    &mut self.physics,
                    self.storage.as_mut(),
                );
            }
            InputEvent::KeyReleased { key_code } => match EditCommand::from_key(key_code) {
                Some(EditCommand::ToggleEditMode) => {
                    self.author.toggle_edit_mode();
                }
                Some(EditCommand::Undo) => {
                    self.author.undo_last(&mut self.physics, self.storage.as_mut());
                }
                None => {}
            },
        }
    }

    fn spawn_at_random(&mut self) -> ParticleHandle {
        let position = Vec2::new(
            self.rng.range_f32(self.params.canvas_width),
            self.rng.range_f32(self.params.canvas_height),
        );
        self.physics.spawn_particle(position, Vec2::ZERO)
    }

    // Expired particles are replaced so the population stays constant.
    fn expire_particles(&mut self) {
        let Some(lifetime) = self.params.particle_lifetime_frames() else {
            return;
        };
        let now = self.clock.frame();
        for i in 0..self.particles.len() {
            if now.saturating_sub(self.particles[i].born) >= lifetime {
                self.physics.remove_particle(self.particles[i].handle);
                let handle = self.spawn_at_random();
                self.particles[i] = Particle { handle, born: now };
            }
        }
    }

    fn rebuild_particle_buffer(&mut self) {
        let lifetime = self.params.particle_lifetime_frames();
        let now = self.clock.frame();
        self.particle_buffer.clear();
        for particle in &self.particles {
            let Some(pos) = self.physics.particle_position(particle.handle) else {
                continue;
            };
            let alpha = match lifetime {
                Some(frames) => 1.0 - (now - particle.born) as f32 / frames as f32,
                None => 1.0,
            };
            self.particle_buffer.push(ParticleInstance {
                x: pos.x,
                y: pos.y,
                size: self.params.sprite_size,
                alpha: alpha.clamp(0.0, 1.0),
            });
        }
    }

    // ---- Accessors ----

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn author(&self) -> &ColliderAuthor {
        &self.author
    }

    pub fn gravity(&self) -> &GravityController {
        &self.gravity
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particle_buffer(&self) -> &ParticleBuffer {
        &self.particle_buffer
    }

    /// Edit-mode overlay for the current pointer, or `None` outside edit mode.
    pub fn edit_preview(&self) -> Option<EditPreview> {
        edit_preview(
            &self.author,
            self.pointer,
            self.params.reticle_size,
            self.params.reticle_stroke_weight,
        )
    }
}
