use bytemuck::{Pod, Zeroable};

/// Per-particle render data read by the fluid renderer.
/// Must match the host protocol: 4 floats = 16 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// X position in canvas pixels.
    pub x: f32,
    /// Y position in canvas pixels.
    pub y: f32,
    /// Rendered sprite size in pixels.
    pub size: f32,
    /// Opacity (1.0 = opaque). Fades out over a finite particle lifetime.
    pub alpha: f32,
}

impl ParticleInstance {
    pub const FLOATS: usize = 4;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Particle instances rebuilt after every physics step.
pub struct ParticleBuffer {
    pub instances: Vec<ParticleInstance>,
}

impl ParticleBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: ParticleInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Flat float view for hosts that copy the buffer out.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for shared-memory reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for ParticleBuffer {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}
