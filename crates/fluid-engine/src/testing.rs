//! Test doubles shared by unit tests.

use std::collections::HashMap;

use glam::Vec2;

use crate::core::physics::{EdgeHandle, ParticleHandle, PhysicsBackend};

/// A physics backend that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingPhysics {
    next_id: u64,
    edges: HashMap<EdgeHandle, Vec<Vec2>>,
    particles: HashMap<ParticleHandle, Vec2>,
    pub gravity: Vec2,
    pub gravity_log: Vec<Vec2>,
    pub steps: u32,
    /// Gravity observed at each step.
    pub step_gravity: Vec<Vec2>,
    pub walls: Option<(f32, f32)>,
}

impl RecordingPhysics {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_vertices(&self, edge: EdgeHandle) -> Option<&[Vec2]> {
        self.edges.get(&edge).map(Vec::as_slice)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl PhysicsBackend for RecordingPhysics {
    fn create_static_edge(&mut self, vertices: &[Vec2]) -> EdgeHandle {
        let handle = EdgeHandle(self.next());
        self.edges.insert(handle, vertices.to_vec());
        handle
    }

    fn remove_static_edge(&mut self, edge: EdgeHandle) {
        self.edges.remove(&edge);
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
        self.gravity_log.push(gravity);
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn step(&mut self) {
        self.steps += 1;
        self.step_gravity.push(self.gravity);
    }

    fn spawn_particle(&mut self, position: Vec2, _velocity: Vec2) -> ParticleHandle {
        let handle = ParticleHandle(self.next());
        self.particles.insert(handle, position);
        handle
    }

    fn remove_particle(&mut self, particle: ParticleHandle) {
        self.particles.remove(&particle);
    }

    fn particle_position(&self, particle: ParticleHandle) -> Option<Vec2> {
        self.particles.get(&particle).copied()
    }

    fn create_boundary_walls(&mut self, width: f32, height: f32) {
        self.walls = Some((width, height));
    }
}
