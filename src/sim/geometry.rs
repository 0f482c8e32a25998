//! Swept segment vs box intersection
//!
//! A saber blade is sampled at a handful of points. Between two ticks each
//! pair of neighbouring samples sweeps a quad; the quad is tested against a
//! block's axis-aligned box by checking its corners and then its four edges.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Segments shorter than this are treated as points
const DEGENERATE_LEN: f32 = 1e-6;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Cube of edge `size` centered on `center`
    pub fn from_center_size(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size * 0.5);
        Self::new(center - half, center + half)
    }

    /// Inclusive point test
    #[inline]
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Slab test of a ray against a box
///
/// `dir` must be normalized. Returns the distance to the entry point, or 0.0
/// when the origin already lies inside the box.
pub fn ray_aabb(origin: Vec3, dir: Vec3, aabb: &Aabb) -> Option<f32> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let lo = aabb.min[axis];
        let hi = aabb.max[axis];

        if d.abs() < DEGENERATE_LEN {
            // Parallel to this slab
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (lo - o) * inv;
        let mut t2 = (hi - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

/// Intersect the segment `a`→`b` with a box
///
/// A ray hit only counts when the entry parameter lies within the segment's
/// length. Returns the entry point.
pub fn segment_aabb(a: Vec3, b: Vec3, aabb: &Aabb) -> Option<Vec3> {
    let delta = b - a;
    let len = delta.length();
    if len < DEGENERATE_LEN {
        return aabb.contains_point(a).then_some(a);
    }
    let dir = delta / len;
    ray_aabb(a, dir, aabb)
        .filter(|&t| t <= len)
        .map(|t| a + dir * t)
}

/// One blade sample pair at the previous and current tick
#[derive(Debug, Clone, Copy)]
pub struct SweptPair {
    pub prev: [Vec3; 2],
    pub curr: [Vec3; 2],
}

impl SweptPair {
    pub fn new(prev_a: Vec3, prev_b: Vec3, curr_a: Vec3, curr_b: Vec3) -> Self {
        Self {
            prev: [prev_a, prev_b],
            curr: [curr_a, curr_b],
        }
    }

    /// Test the swept quad against a box
    ///
    /// Corners first, then the two blade edges and the two sweep edges. The
    /// first intersecting feature wins; no attempt is made to find the
    /// closest contact.
    pub fn hit_aabb(&self, aabb: &Aabb) -> Option<Vec3> {
        let [pa, pb] = self.prev;
        let [ca, cb] = self.curr;

        if let Some(corner) = [ca, cb, pa, pb].into_iter().find(|p| aabb.contains_point(*p)) {
            return Some(corner);
        }

        [(ca, cb), (pa, pb), (pa, ca), (pb, cb)]
            .into_iter()
            .find_map(|(from, to)| segment_aabb(from, to, aabb))
    }
}
