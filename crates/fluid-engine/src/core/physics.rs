use glam::Vec2;

/// Opaque handle to a static edge body created from an authored polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeHandle(pub u64);

/// Opaque handle to a single fluid particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle(pub u64);

/// The capabilities the installation needs from a physics world.
///
/// All positions are canvas pixels (Y-down). Gravity is expressed in world
/// units per second squared; positive Y pulls toward the bottom of the canvas.
pub trait PhysicsBackend {
    /// Build a static chain of segments through `vertices`.
    /// A single vertex produces a body with no collision geometry.
    fn create_static_edge(&mut self, vertices: &[Vec2]) -> EdgeHandle;

    /// Destroy an edge body. Unknown handles are ignored.
    fn remove_static_edge(&mut self, edge: EdgeHandle);

    fn set_gravity(&mut self, gravity: Vec2);

    fn gravity(&self) -> Vec2;

    /// Advance the simulation by one internal timestep.
    fn step(&mut self);

    fn spawn_particle(&mut self, position: Vec2, velocity: Vec2) -> ParticleHandle;

    fn remove_particle(&mut self, particle: ParticleHandle);

    fn particle_position(&self, particle: ParticleHandle) -> Option<Vec2>;

    /// Enclose the canvas `[0, width] x [0, height]` with static walls.
    fn create_boundary_walls(&mut self, width: f32, height: f32);
}

#[cfg(feature = "physics")]
pub use rapier_world::{ColliderMaterial, PhysicsWorld};

#[cfg(feature = "physics")]
mod rapier_world {
    use super::{EdgeHandle, ParticleHandle, PhysicsBackend};
    use glam::Vec2;
    use rapier2d::prelude::*;

    // -----------------------------------------------------------------------
    // Conversion helpers: canvas pixels to rapier meters and back
    // -----------------------------------------------------------------------

    fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
        nalgebra::Vector2::new(v.x, v.y)
    }

    fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
        Vec2::new(v.x, v.y)
    }

    fn pack_handle(handle: RigidBodyHandle) -> u64 {
        let (index, generation) = handle.into_raw_parts();
        ((generation as u64) << 32) | index as u64
    }

    fn unpack_handle(raw: u64) -> RigidBodyHandle {
        RigidBodyHandle::from_raw_parts(raw as u32, (raw >> 32) as u32)
    }

    /// Wall thickness in pixels. Walls sit entirely outside the canvas.
    const WALL_THICKNESS: f32 = 64.0;

    /// Physical material properties for particle colliders.
    #[derive(Debug, Clone, Copy)]
    pub struct ColliderMaterial {
        pub restitution: f32,
        pub friction: f32,
        pub density: f32,
    }

    impl Default for ColliderMaterial {
        fn default() -> Self {
            Self {
                restitution: 0.3,
                friction: 0.1,
                density: 1.0,
            }
        }
    }

    /// Wraps all Rapier2D boilerplate into a single struct working in canvas pixels.
    pub struct PhysicsWorld {
        gravity: nalgebra::Vector2<f32>,
        pixels_per_meter: f32,
        particle_radius: f32,
        particle_material: ColliderMaterial,
        integration_parameters: IntegrationParameters,
        physics_pipeline: PhysicsPipeline,
        island_manager: IslandManager,
        broad_phase: DefaultBroadPhase,
        narrow_phase: NarrowPhase,
        bodies: RigidBodySet,
        colliders: ColliderSet,
        impulse_joints: ImpulseJointSet,
        multibody_joints: MultibodyJointSet,
        ccd_solver: CCDSolver,
        query_pipeline: QueryPipeline,
    }

    impl PhysicsWorld {
        /// Create a new physics world with the given gravity (m/s², Y-down).
        pub fn new(gravity: Vec2) -> Self {
            Self {
                gravity: vec2_to_na(gravity),
                pixels_per_meter: 30.0,
                particle_radius: 3.0,
                particle_material: ColliderMaterial::default(),
                integration_parameters: IntegrationParameters::default(),
                physics_pipeline: PhysicsPipeline::new(),
                island_manager: IslandManager::new(),
                broad_phase: DefaultBroadPhase::new(),
                narrow_phase: NarrowPhase::new(),
                bodies: RigidBodySet::new(),
                colliders: ColliderSet::new(),
                impulse_joints: ImpulseJointSet::new(),
                multibody_joints: MultibodyJointSet::new(),
                ccd_solver: CCDSolver::new(),
                query_pipeline: QueryPipeline::new(),
            }
        }

        /// Set how many canvas pixels make up one physics meter.
        pub fn with_pixels_per_meter(mut self, pixels_per_meter: f32) -> Self {
            self.pixels_per_meter = pixels_per_meter.max(f32::EPSILON);
            self
        }

        /// Set the collider radius (pixels) used for newly spawned particles.
        pub fn with_particle_radius(mut self, radius: f32) -> Self {
            self.particle_radius = radius.max(0.01);
            self
        }

        pub fn with_particle_material(mut self, material: ColliderMaterial) -> Self {
            self.particle_material = material;
            self
        }

        /// Set the integration timestep.
        pub fn set_dt(&mut self, dt: f32) {
            self.integration_parameters.dt = dt;
        }

        pub fn dt(&self) -> f32 {
            self.integration_parameters.dt
        }

        /// Number of rigid bodies in the simulation (edges, walls and particles).
        pub fn body_count(&self) -> usize {
            self.bodies.len()
        }

        /// Number of colliders in the simulation.
        pub fn collider_count(&self) -> usize {
            self.colliders.len()
        }

        /// Current linear velocity of a particle in pixels per second.
        pub fn particle_velocity(&self, particle: ParticleHandle) -> Vec2 {
            self.bodies
                .get(unpack_handle(particle.0))
                .map(|rb| na_to_vec2(rb.linvel()) * self.pixels_per_meter)
                .unwrap_or(Vec2::ZERO)
        }

        fn to_world(&self, p: Vec2) -> nalgebra::Point2<f32> {
            let m = p / self.pixels_per_meter;
            nalgebra::Point2::new(m.x, m.y)
        }

        fn insert_fixed(&mut self, collider: Option<Collider>) -> RigidBodyHandle {
            let handle = self.bodies.insert(RigidBodyBuilder::fixed().build());
            if let Some(collider) = collider {
                self.colliders
                    .insert_with_parent(collider, handle, &mut self.bodies);
            }
            handle
        }

        fn remove(&mut self, handle: RigidBodyHandle) {
            self.bodies.remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    impl PhysicsBackend for PhysicsWorld {
        fn create_static_edge(&mut self, vertices: &[Vec2]) -> EdgeHandle {
            let collider = if vertices.len() >= 2 {
                let points = vertices.iter().map(|v| self.to_world(*v)).collect();
                Some(ColliderBuilder::polyline(points, None).build())
            } else {
                None
            };
            EdgeHandle(pack_handle(self.insert_fixed(collider)))
        }

        fn remove_static_edge(&mut self, edge: EdgeHandle) {
            self.remove(unpack_handle(edge.0));
        }

        fn set_gravity(&mut self, gravity: Vec2) {
            self.gravity = vec2_to_na(gravity);
            // Sleeping particles would otherwise ignore the new direction.
            for (_, rb) in self.bodies.iter_mut() {
                if rb.is_dynamic() {
                    rb.wake_up(true);
                }
            }
        }

        fn gravity(&self) -> Vec2 {
            na_to_vec2(&self.gravity)
        }

        fn step(&mut self) {
            self.physics_pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                Some(&mut self.query_pipeline),
                &(),
                &(),
            );
        }

        fn spawn_particle(&mut self, position: Vec2, velocity: Vec2) -> ParticleHandle {
            let pos = self.to_world(position);
            let rb = RigidBodyBuilder::dynamic()
                .translation(nalgebra::Vector2::new(pos.x, pos.y))
                .linvel(vec2_to_na(velocity / self.pixels_per_meter))
                .locked_axes(LockedAxes::ROTATION_LOCKED)
                .build();
            let handle = self.bodies.insert(rb);

            let collider = ColliderBuilder::ball(self.particle_radius / self.pixels_per_meter)
                .restitution(self.particle_material.restitution)
                .friction(self.particle_material.friction)
                .density(self.particle_material.density)
                .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);

            ParticleHandle(pack_handle(handle))
        }

        fn remove_particle(&mut self, particle: ParticleHandle) {
            self.remove(unpack_handle(particle.0));
        }

        fn particle_position(&self, particle: ParticleHandle) -> Option<Vec2> {
            self.bodies
                .get(unpack_handle(particle.0))
                .map(|rb| na_to_vec2(rb.translation()) * self.pixels_per_meter)
        }

        fn create_boundary_walls(&mut self, width: f32, height: f32) {
            let ppm = self.pixels_per_meter;
            let half_t = WALL_THICKNESS / 2.0;
            // (center, half extents) in pixels
            let walls = [
                (Vec2::new(width / 2.0, -half_t), Vec2::new(width / 2.0 + WALL_THICKNESS, half_t)),
                (Vec2::new(width / 2.0, height + half_t), Vec2::new(width / 2.0 + WALL_THICKNESS, half_t)),
                (Vec2::new(-half_t, height / 2.0), Vec2::new(half_t, height / 2.0 + WALL_THICKNESS)),
                (Vec2::new(width + half_t, height / 2.0), Vec2::new(half_t, height / 2.0 + WALL_THICKNESS)),
            ];
            for (center, half) in walls {
                let collider = ColliderBuilder::cuboid(half.x / ppm, half.y / ppm)
                    .translation(vec2_to_na(center / ppm))
                    .build();
                self.insert_fixed(Some(collider));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

}
