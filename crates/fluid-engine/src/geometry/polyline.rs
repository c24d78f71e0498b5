use glam::Vec2;

/// A 2D canvas coordinate in pixels.
pub type Point = Vec2;

/// An ordered sequence of points in drawing order.
///
/// Grows one vertex at a time while the operator clicks, and can be thinned in
/// place with [`Polyline::simplify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Append a vertex at the end of the line.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove vertices that lie within `tolerance` pixels of the line through
    /// their neighbours (Ramer–Douglas–Peucker). Both endpoints are kept.
    pub fn simplify(&mut self, tolerance: f32) {
        let n = self.points.len();
        if n < 3 {
            return;
        }

        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;

        let mut stack = vec![(0usize, n - 1)];
        while let Some((start, end)) = stack.pop() {
            if end <= start + 1 {
                continue;
            }
            let (a, b) = (self.points[start], self.points[end]);
            let mut max_dist = 0.0f32;
            let mut max_idx = start;
            for i in start + 1..end {
                let d = distance_to_segment(self.points[i], a, b);
                if d > max_dist {
                    max_dist = d;
                    max_idx = i;
                }
            }
            if max_dist > tolerance {
                keep[max_idx] = true;
                stack.push((start, max_idx));
                stack.push((max_idx, end));
            }
        }

        let mut idx = 0;
        self.points.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }
}

/// Perpendicular distance from `p` to the segment `a`-`b`.
/// Degenerates to point distance when `a == b`.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
