//! Edit-mode overlay data: authored lines, the guide segment and the reticle.
//!
//! Everything is returned as point lists in canvas pixels so the host can
//! stroke them with whatever line renderer it has.

use glam::Vec2;
use serde::Serialize;

use crate::authoring::ColliderAuthor;

/// Overlay geometry for one frame of edit mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditPreview {
    /// Every authored polyline, in drawing order.
    pub lines: Vec<Vec<[f32; 2]>>,
    /// Segment from the last vertex of the last polyline to the pointer.
    pub guide: Option<[[f32; 2]; 2]>,
    /// Vertical and horizontal strokes of the crosshair around the pointer.
    pub reticle: [[[f32; 2]; 2]; 2],
    pub reticle_stroke_weight: f32,
}

impl EditPreview {
    /// Total number of points across lines, guide and reticle.
    pub fn point_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum::<usize>()
            + self.guide.map_or(0, |_| 2)
            + 4
    }
}

/// Build the overlay, or `None` outside edit mode.
pub fn edit_preview(
    author: &ColliderAuthor,
    pointer: Vec2,
    reticle_size: f32,
    reticle_stroke_weight: f32,
) -> Option<EditPreview> {
    if !author.is_edit_mode() {
        return None;
    }

    let lines = author
        .lines()
        .map(|l| l.points().iter().map(|p| p.to_array()).collect())
        .collect();

    let guide = author
        .is_guide_visible()
        .then(|| author.lines().last().and_then(|l| l.last()))
        .flatten()
        .map(|last| [last.to_array(), pointer.to_array()]);

    Some(EditPreview {
        lines,
        guide,
        reticle: reticle(pointer, reticle_size),
        reticle_stroke_weight,
    })
}

fn reticle(center: Vec2, size: f32) -> [[[f32; 2]; 2]; 2] {
    [
        [[center.x, center.y - size], [center.x, center.y + size]],
        [[center.x - size, center.y], [center.x + size, center.y]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::RecordingPhysics;

    #[test]
    fn nothing_outside_edit_mode() {
        let author = ColliderAuthor::new("lines.txt", 0.3);
        assert!(edit_preview(&author, Vec2::ZERO, 10.0, 1.0).is_none());
    }

    #[test]
    fn guide_follows_pointer_after_first_press() {
        let mut physics = RecordingPhysics::default();
        let mut store = MemoryStorage::new();
        let mut author = ColliderAuthor::new("lines.txt", 0.3);
        author.toggle_edit_mode();

        let preview = edit_preview(&author, Vec2::new(5.0, 5.0), 10.0, 1.0).unwrap();
        assert!(preview.guide.is_none());

        author.begin_or_continue_stroke(Vec2::new(1.0, 2.0), &mut physics, &mut store);
        let preview = edit_preview(&author, Vec2::new(50.0, 60.0), 10.0, 2.0).unwrap();
        assert_eq!(preview.lines, vec![vec![[1.0, 2.0]]]);
        assert_eq!(preview.guide, Some([[1.0, 2.0], [50.0, 60.0]]));
        assert_eq!(preview.reticle_stroke_weight, 2.0);
        assert_eq!(preview.point_count(), 1 + 2 + 4);
    }

    #[test]
    fn serializes_for_the_host() {
        let mut author = ColliderAuthor::new("lines.txt", 0.3);
        author.toggle_edit_mode();
        let preview = edit_preview(&author, Vec2::new(1.0, 1.0), 2.0, 1.0).unwrap();
        let json = serde_json::to_string(&preview).unwrap();
        assert!(json.contains("\"guide\":null"));
        assert!(json.contains("\"reticle\":[[[1.0,-1.0],[1.0,3.0]]"));
    }

    #[test]
    fn reticle_is_centred_on_pointer() {
        let r = reticle(Vec2::new(100.0, 50.0), 10.0);
        assert_eq!(r[0], [[100.0, 40.0], [100.0, 60.0]]);
        assert_eq!(r[1], [[90.0, 50.0], [110.0, 50.0]]);
    }
}
