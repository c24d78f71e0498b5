//! Interactive collider authoring.
//!
//! Pointer presses in edit mode build freehand polylines one vertex at a time.
//! After every press the current polyline is simplified and rebuilt as a static
//! edge body in the physics world, and the whole set is saved through the
//! geometry codec. Each polyline and the edge built from it live together in
//! one [`AuthoredCollider`] record, so the two can never drift out of step.

use crate::core::physics::{EdgeHandle, PhysicsBackend};
use crate::config::Parameters;
use crate::error::StorageError;
use crate::geometry::codec;
use crate::geometry::{Point, Polyline};
use crate::storage::Storage;

/// One authored polyline and the edge body currently built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredCollider {
    line: Polyline,
    edge: EdgeHandle,
}

impl AuthoredCollider {
    fn build<P: PhysicsBackend>(mut line: Polyline, tolerance: f32, physics: &mut P) -> Self {
        line.simplify(tolerance);
        let edge = physics.create_static_edge(line.points());
        Self { line, edge }
    }

    pub fn line(&self) -> &Polyline {
        &self.line
    }

    pub fn edge(&self) -> EdgeHandle {
        self.edge
    }
}

/// Owns the authored geometry set and the edit-mode state machine.
#[derive(Debug)]
pub struct ColliderAuthor {
    colliders: Vec<AuthoredCollider>,
    edit_mode: bool,
    /// Set when edit mode is entered; the next stroke point consumes it and
    /// opens a new polyline instead of extending the last one.
    drawing: bool,
    /// Whether the preview segment from the last vertex to the pointer shows.
    guide: bool,
    tolerance: f32,
    storage_key: String,
}

impl ColliderAuthor {
    pub fn new(storage_key: impl Into<String>, tolerance: f32) -> Self {
        Self {
            colliders: Vec::new(),
            edit_mode: false,
            drawing: false,
            guide: false,
            tolerance,
            storage_key: storage_key.into(),
        }
    }

    pub fn from_parameters(params: &Parameters) -> Self {
        Self::new(params.lines_filename.clone(), params.simplify_tolerance)
    }

    pub fn colliders(&self) -> &[AuthoredCollider] {
        &self.colliders
    }

    pub fn lines(&self) -> impl Iterator<Item = &Polyline> {
        self.colliders.iter().map(|c| &c.line)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.colliders.iter().map(|c| c.edge)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn is_guide_visible(&self) -> bool {
        self.guide
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Flip edit mode. Entering it hides the guide and arms a new stroke.
    /// Returns the new edit-mode state.
    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.drawing = self.edit_mode;
        if self.edit_mode {
            self.guide = false;
        }
        log::debug!("Edit mode {}", if self.edit_mode { "on" } else { "off" });
        self.edit_mode
    }

    /// Add a vertex from a pointer press. Starts a new polyline when a stroke
    /// is armed (or none exists yet), otherwise extends the last one. The
    /// affected polyline is committed as an edge and the set is saved.
    ///
    /// Ignored outside edit mode or for non-finite points; returns whether
    /// the press was used.
    pub fn begin_or_continue_stroke<P, S>(&mut self, point: Point, physics: &mut P, storage: &mut S) -> bool
    where
        P: PhysicsBackend,
        S: Storage + ?Sized,
    {
        if !self.edit_mode {
            return false;
        }
        if !point.is_finite() {
            log::warn!("Ignoring stroke point {:?}: not finite", point);
            return false;
        }

        let start_new = self.drawing || self.colliders.is_empty();
        self.drawing = false;

        if start_new {
            let mut line = Polyline::new();
            line.push(point);
            self.colliders
                .push(AuthoredCollider::build(line, self.tolerance, physics));
        } else if let Some(current) = self.colliders.last_mut() {
            current.line.push(point);
            self.recommit_last(physics);
        }

        self.persist(storage);
        self.guide = true;
        true
    }

    /// Re-simplify the last polyline and replace its edge with one built from
    /// the result, then save. Returns the new edge, or `None` when empty.
    pub fn commit_edge_from_current_line<P, S>(&mut self, physics: &mut P, storage: &mut S) -> Option<EdgeHandle>
    where
        P: PhysicsBackend,
        S: Storage + ?Sized,
    {
        let edge = self.recommit_last(physics)?;
        self.persist(storage);
        Some(edge)
    }

    /// Remove the most recent polyline and its edge, then save.
    /// A no-op outside edit mode or when nothing is authored.
    pub fn undo_last<P, S>(&mut self, physics: &mut P, storage: &mut S) -> bool
    where
        P: PhysicsBackend,
        S: Storage + ?Sized,
    {
        if !self.edit_mode {
            return false;
        }
        let Some(removed) = self.colliders.pop() else {
            return false;
        };
        physics.remove_static_edge(removed.edge);
        self.persist(storage);
        true
    }

    /// Replace the whole set with the polylines encoded in `text`, building
    /// one edge per polyline. Does not write back to storage.
    pub fn load_from_storage<P: PhysicsBackend>(&mut self, text: &str, physics: &mut P) -> usize {
        self.clear(physics);
        for line in codec::decode(text) {
            self.colliders
                .push(AuthoredCollider::build(line, self.tolerance, physics));
        }
        self.colliders.len()
    }

    /// Read the persisted set from storage. A missing or unreadable file
    /// leaves the set empty.
    pub fn load<P, S>(&mut self, physics: &mut P, storage: &S) -> usize
    where
        P: PhysicsBackend,
        S: Storage + ?Sized,
    {
        match storage.read(&self.storage_key) {
            Ok(text) => {
                let count = self.load_from_storage(&text, physics);
                log::info!("Loaded {} collider lines from {}", count, self.storage_key);
                count
            }
            Err(StorageError::NotFound(_)) => {
                log::warn!("No collider data at {}; starting empty", self.storage_key);
                self.clear(physics);
                0
            }
            Err(e) => {
                log::warn!("Could not read collider data: {}; starting empty", e);
                self.clear(physics);
                0
            }
        }
    }

    /// Encode the current set for persistence.
    pub fn encode(&self) -> String {
        let lines: Vec<Polyline> = self.lines().cloned().collect();
        codec::encode(&lines)
    }

    /// Overwrite the persisted set with the in-memory one.
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), StorageError> {
        storage.write(&self.storage_key, &self.encode())
    }

    /// Drop every record and destroy its edge.
    pub fn clear<P: PhysicsBackend>(&mut self, physics: &mut P) {
        for collider in self.colliders.drain(..) {
            physics.remove_static_edge(collider.edge);
        }
    }

    fn recommit_last<P: PhysicsBackend>(&mut self, physics: &mut P) -> Option<EdgeHandle> {
        let current = self.colliders.last_mut()?;
        current.line.simplify(self.tolerance);
        let fresh = physics.create_static_edge(current.line.points());
        let stale = std::mem::replace(&mut current.edge, fresh);
        physics.remove_static_edge(stale);
        Some(fresh)
    }

    // Save failures keep the in-memory edit.
    fn persist<S: Storage + ?Sized>(&self, storage: &mut S) {
        match self.save(storage) {
            Ok(()) => log::info!("Created new save with collider data."),
            Err(e) => log::warn!("Was not able to save collider data: {}", e),
        }
    }
}
