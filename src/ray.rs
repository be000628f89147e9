//! Rays, intersection records and the batch ray descriptor.

use glam::Vec3A;

/// A ray in 3D space with a half-open `[tmin, tmax)` test interval.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct Ray {
    /// The starting point of the ray.
    pub pos: Vec3A,
    /// The direction vector of the ray. Not required to be normalized.
    pub dir: Vec3A,
    /// Componentwise reciprocal of `dir`, used by the slab test. Zero
    /// components become signed infinities, which the slab comparisons
    /// handle under IEEE rules.
    pub inv_dir: Vec3A,
    /// The minimum `t` (distance) value for intersection tests.
    pub tmin: f32,
    /// The maximum `t` (distance) value for intersection tests. Exclusive.
    pub tmax: f32,
}

impl Ray {
    /// Creates a new `Ray` with the given origin, direction, and `t` range.
    #[inline]
    pub fn new(pos: Vec3A, dir: Vec3A, tmin: f32, tmax: f32) -> Self {
        Ray {
            pos,
            dir,
            inv_dir: dir.recip(),
            tmin,
            tmax,
        }
    }
}

/// Closest-hit state for one traversal.
///
/// `dist` enters traversal equal to the ray's `tmax` and only ever decreases;
/// the strict `t < dist` acceptance in the triangle test is what makes the
/// upper bound half-open and keeps the first of two equal-distance hits.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct HitRecord {
    /// True once any triangle has been accepted.
    pub hit: bool,
    /// Distance of the closest accepted hit, `tmax` while no hit.
    pub dist: f32,
    /// Möller–Trumbore barycentric applied to the second corner.
    pub u: f32,
    /// Möller–Trumbore barycentric applied to the third corner.
    /// The first corner carries `w = 1 - u - v`.
    pub v: f32,
    /// Index of the intersected face, -1 while no hit.
    pub face_id: i32,
}

impl HitRecord {
    /// Creates a record representing no hit, with `dist` primed to `tmax`.
    #[inline]
    pub fn new(tmax: f32) -> Self {
        Self {
            hit: false,
            dist: tmax,
            u: 0.0,
            v: 0.0,
            face_id: -1,
        }
    }
}

/// One entry of a harness ray batch, mutated in place by
/// [`Lbvh::intersect_batch`](crate::lbvh::Lbvh::intersect_batch).
///
/// `valid`, `pos`, `dir`, `tnear` and `tfar` are inputs; `isisect`, `isect`,
/// `ns` and `face_id` are outputs. Rays with `valid == false` get
/// `isisect = false` and are otherwise untouched.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RayDesc {
    pub valid: bool,
    pub pos: [f32; 3],
    pub dir: [f32; 3],
    pub tnear: f32,
    pub tfar: f32,
    pub isisect: bool,
    /// Hit point, reconstructed from the barycentrics.
    pub isect: [f32; 3],
    /// Interpolated shading normal. Not renormalized.
    pub ns: [f32; 3],
    pub face_id: i32,
}

impl RayDesc {
    /// Creates a valid descriptor with cleared outputs.
    pub fn new(pos: [f32; 3], dir: [f32; 3], tnear: f32, tfar: f32) -> Self {
        Self {
            valid: true,
            pos,
            dir,
            tnear,
            tfar,
            isisect: false,
            isect: [0.0; 3],
            ns: [0.0; 3],
            face_id: -1,
        }
    }
}
