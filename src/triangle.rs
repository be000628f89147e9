//! Triangle representation and Möller–Trumbore intersection.

use glam::Vec3A;

use crate::{
    aabb::Aabb,
    ray::{HitRecord, Ray},
};

#[derive(Clone, Copy, Default, Debug)]
pub struct Triangle {
    pub p0: Vec3A,
    pub p1: Vec3A,
    pub p2: Vec3A,
}

impl Triangle {
    /// Compute the bounding box of the triangle.
    #[inline(always)]
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::from_point(self.p0);
        aabb.extend(self.p1).extend(self.p2);
        aabb
    }

    /// Compute the centroid of the triangle.
    #[inline(always)]
    pub fn centroid(&self) -> Vec3A {
        (self.p0 + self.p1 + self.p2) / 3.0
    }

    /// Möller–Trumbore ray/triangle intersection with closest-hit refinement.
    ///
    /// Accepts a hit only for `ray.tmin <= t < ray.tmax` and `t < record.dist`,
    /// tightening `record.dist`, `record.u` and `record.v` on success. The
    /// strict bound on `record.dist` keeps the first of two equal-distance
    /// hits. Degenerate triangles (`det == 0`) never intersect.
    ///
    /// Based on Fast Minimum Storage Ray Triangle Intersection by T. Möller
    /// and B. Trumbore.
    #[inline(always)]
    pub fn intersect(&self, ray: &Ray, record: &mut HitRecord) -> bool {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;

        let pv = ray.dir.cross(e2);
        let det = e1.dot(pv);
        if det == 0.0 {
            return false;
        }
        let inv_det = 1.0 / det;

        let tv = ray.pos - self.p0;
        let u = tv.dot(pv) * inv_det;
        if u < 0.0 || u > 1.0 {
            return false;
        }

        let qv = tv.cross(e1);
        let v = ray.dir.dot(qv) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = e2.dot(qv) * inv_det;
        if t < ray.tmin || t >= ray.tmax || t >= record.dist {
            return false;
        }

        record.dist = t;
        record.u = u;
        record.v = v;
        true
    }
}
