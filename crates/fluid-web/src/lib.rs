//! wasm-bindgen surface of the installation.
//!
//! The page calls `fluid_init` once, then `fluid_tick(dt)` every animation
//! frame, forwarding pointer and key events as they happen. Particle
//! instances are read straight out of wasm memory through
//! `get_particles_ptr` / `get_particle_count`, four floats per instance.

pub mod browser;
pub mod runner;

pub use browser::{JsSensorRequest, LocalStorage};
pub use runner::InstallationRunner;

use std::cell::RefCell;

use fluid_engine::{Parameters, SensorLink};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<InstallationRunner>> = const { RefCell::new(None) };
    // Held apart from the runner so the page can answer a sensor request
    // from inside the tick that issued it.
    static SENSOR: RefCell<Option<SensorLink>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut InstallationRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let Ok(mut borrow) = cell.try_borrow_mut() else {
            log::warn!("Simulation is busy; call ignored (re-entered from a JS callback?)");
            return None;
        };
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("Simulation not initialized. Call fluid_init() first.");
                None
            }
        }
    })
}

fn install(runner: InstallationRunner) {
    SENSOR.with(|cell| {
        *cell.borrow_mut() = Some(runner.sensor_link());
    });
    RUNNER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => *slot = Some(runner),
        Err(_) => log::warn!("Cannot re-initialize while the simulation is running"),
    });
}

fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Boot from the parameter record in localStorage, or defaults.
#[wasm_bindgen]
pub fn fluid_init() {
    init_logging();
    install(InstallationRunner::boot(Box::new(LocalStorage::new())));
    log::info!("fluid: initialized");
}

/// Boot with parameters supplied by the page as JSON. Unknown fields are
/// ignored and missing ones take their defaults.
#[wasm_bindgen]
pub fn fluid_init_with_params(json: &str) {
    init_logging();
    let params = Parameters::from_json(json).unwrap_or_else(|e| {
        log::warn!("Bad parameter JSON ({}), using defaults", e);
        Parameters::default()
    });
    install(InstallationRunner::with_params(params, Box::new(LocalStorage::new())));
    log::info!("fluid: initialized");
}

/// Register the function that asks the serial device for a reading.
#[wasm_bindgen]
pub fn fluid_set_sensor_request(callback: js_sys::Function) {
    with_runner(|r| r.set_sensor_transport(Box::new(JsSensorRequest::new(callback))));
}

#[wasm_bindgen]
pub fn fluid_tick(dt: f32) -> u32 {
    with_runner(|r| r.tick(dt)).unwrap_or(0)
}

#[wasm_bindgen]
pub fn fluid_pointer_down(x: f32, y: f32) {
    with_runner(|r| r.pointer_down(x, y));
}

#[wasm_bindgen]
pub fn fluid_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.pointer_move(x, y));
}

#[wasm_bindgen]
pub fn fluid_key_released(key_code: u32) {
    with_runner(|r| r.key_released(key_code));
}

/// Deliver one raw payload from the serial device.
#[wasm_bindgen]
pub fn fluid_sensor_payload(payload: &str) -> bool {
    SENSOR.with(|cell| match cell.borrow().as_ref() {
        Some(link) => link.deliver(payload),
        None => {
            log::warn!("Simulation not initialized. Call fluid_init() first.");
            false
        }
    })
}

/// Save parameters; call from the page's `beforeunload`.
#[wasm_bindgen]
pub fn fluid_shutdown() {
    with_runner(|r| r.shutdown());
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_particles_ptr() -> *const f32 {
    with_runner(|r| r.particles_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_particle_count() -> u32 {
    with_runner(|r| r.particle_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_preview_json() -> String {
    with_runner(|r| r.preview_json().to_string()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn is_edit_mode() -> bool {
    with_runner(|r| r.is_edit_mode()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn get_gravity_x() -> f32 {
    with_runner(|r| r.gravity().x).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_gravity_y() -> f32 {
    with_runner(|r| r.gravity().y).unwrap_or(0.0)
}

/// The full parameter record, so the page can size its canvas, load the
/// sprite and open the serial port with the configured baud rate.
#[wasm_bindgen]
pub fn get_params_json() -> String {
    with_runner(|r| r.params().to_json())
        .and_then(|json| json.ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluid_engine::{GravityPolicyKind, MemoryStorage, SensorTransport};
    use glam::Vec2;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Answers every request immediately, the way a page with a cached
    /// reading would, and pokes another export while the tick is running.
    struct ImmediateReply {
        nested_count: Rc<Cell<Option<u32>>>,
    }

    impl SensorTransport for ImmediateReply {
        fn request_reading(&mut self) {
            fluid_sensor_payload("180");
            self.nested_count.set(Some(get_particle_count()));
        }
    }

    fn boot() {
        let params = Parameters {
            particle_population: 5,
            canvas_width: 200.0,
            canvas_height: 100.0,
            gravity_policy: GravityPolicyKind::Sensor,
            serial_request_frequency: 1,
            ..Parameters::default()
        };
        install(InstallationRunner::with_params(params, Box::new(MemoryStorage::new())));
    }

    #[test]
    fn reply_inside_tick_is_applied_without_panicking() {
        boot();
        let nested_count = Rc::new(Cell::new(None));
        with_runner(|r| {
            r.set_sensor_transport(Box::new(ImmediateReply {
                nested_count: nested_count.clone(),
            }))
        });

        assert!(fluid_tick(0.05) >= 1);
        assert_eq!(with_runner(|r| r.gravity()), Some(Vec2::new(-1.0, 0.0)));
        // Re-entrant calls that need the runner are refused, not fatal.
        assert_eq!(nested_count.get(), Some(0));
        assert_eq!(get_particle_count(), 5);
    }

    #[test]
    fn calls_before_init_are_ignored() {
        assert_eq!(fluid_tick(0.05), 0);
        assert!(!fluid_sensor_payload("90"));
        assert!(get_preview_json().is_empty());
    }
}
