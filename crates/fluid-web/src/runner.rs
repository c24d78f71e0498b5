use fluid_engine::{
    InputEvent, Parameters, PhysicsBackend, PhysicsWorld, SensorLink, SensorTransport,
    SimulationDriver, Storage,
};
use glam::Vec2;

/// Owns the simulation for the page's lifetime and adapts it to the flat,
/// number-only calls that cross the wasm boundary.
///
/// wasm-bindgen cannot export a struct holding trait objects, so `lib.rs`
/// keeps one of these in a `thread_local!` and forwards free functions to it.
pub struct InstallationRunner {
    driver: SimulationDriver<PhysicsWorld>,
    sensor: SensorLink,
    preview_json: String,
}

impl InstallationRunner {
    /// Boot from whatever parameters the storage holds.
    pub fn boot(storage: Box<dyn Storage>) -> Self {
        Self::from_driver(SimulationDriver::boot(storage))
    }

    /// Boot with explicit parameters, ignoring the stored record.
    pub fn with_params(params: Parameters, storage: Box<dyn Storage>) -> Self {
        Self::from_driver(SimulationDriver::new(params, storage))
    }

    fn from_driver(driver: SimulationDriver<PhysicsWorld>) -> Self {
        let sensor = driver.sensor_link();
        Self {
            driver,
            sensor,
            preview_json: String::new(),
        }
    }

    /// A sender for sensor payloads that does not need the runner borrowed.
    pub fn sensor_link(&self) -> SensorLink {
        self.sensor.clone()
    }

    pub fn set_sensor_transport(&mut self, transport: Box<dyn SensorTransport>) {
        self.driver.set_transport(transport);
    }

    /// Advance by one animation frame and refresh the overlay.
    pub fn tick(&mut self, dt: f32) -> u32 {
        let ticks = self.driver.advance(dt);
        self.refresh_preview();
        ticks
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.driver.push_input(InputEvent::PointerDown { x, y });
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.driver.push_input(InputEvent::PointerMove { x, y });
    }

    pub fn key_released(&mut self, key_code: u32) {
        self.driver.push_input(InputEvent::KeyReleased { key_code });
    }

    /// Hand a raw serial payload to the gravity controller's feed.
    pub fn sensor_payload(&self, payload: &str) -> bool {
        self.sensor.deliver(payload)
    }

    pub fn shutdown(&mut self) {
        self.driver.shutdown();
    }

    fn refresh_preview(&mut self) {
        self.preview_json.clear();
        if let Some(preview) = self.driver.edit_preview() {
            match serde_json::to_string(&preview) {
                Ok(json) => self.preview_json = json,
                Err(e) => log::warn!("Could not encode edit preview: {}", e),
            }
        }
    }

    // ---- Accessors ----

    pub fn driver(&self) -> &SimulationDriver<PhysicsWorld> {
        &self.driver
    }

    pub fn particles_ptr(&self) -> *const f32 {
        self.driver.particle_buffer().instances_ptr()
    }

    pub fn particle_count(&self) -> u32 {
        self.driver.particle_buffer().instance_count()
    }

    /// Overlay for the last frame as JSON, empty outside edit mode.
    pub fn preview_json(&self) -> &str {
        &self.preview_json
    }

    pub fn is_edit_mode(&self) -> bool {
        self.driver.author().is_edit_mode()
    }

    pub fn gravity(&self) -> Vec2 {
        self.driver.physics().gravity()
    }

    pub fn params(&self) -> &Parameters {
        self.driver.params()
    }
}
