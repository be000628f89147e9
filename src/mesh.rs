//! Borrowed triangle-mesh view with split position/normal indexing.

use bytemuck::{Pod, Zeroable, cast_slice};
use glam::{Vec3A, vec3a};

use crate::{aabb::Aabb, triangle::Triangle};

/// One triangle corner: a position index and a normal index, referenced
/// independently (Wavefront-style dereferenced indices). Both are element
/// indices into the packed xyz arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct VertexIndex {
    pub position: u32,
    pub normal: u32,
}

/// Read-only view of caller-owned mesh buffers.
///
/// `positions` and `normals` pack xyz triples; `indices` packs three
/// `(position, normal)` pairs per triangle, i.e. the raw
/// `(v0, n0, v1, n1, v2, n2)` stream of the harness contract. The view is
/// `Copy` and borrows the buffers for its lifetime; nothing is duplicated.
#[derive(Clone, Copy, Debug)]
pub struct Mesh<'a> {
    positions: &'a [f32],
    normals: &'a [f32],
    indices: &'a [VertexIndex],
}

impl<'a> Mesh<'a> {
    /// Wraps the packed harness buffers. `indices.len()` must be a multiple
    /// of 6 (two u32 per corner, three corners per triangle).
    pub fn new(positions: &'a [f32], normals: &'a [f32], indices: &'a [u32]) -> Self {
        debug_assert_eq!(positions.len() % 3, 0);
        debug_assert_eq!(normals.len() % 3, 0);
        debug_assert_eq!(indices.len() % 6, 0);
        Self {
            positions,
            normals,
            indices: cast_slice(indices),
        }
    }

    #[inline(always)]
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline(always)]
    pub fn position_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline(always)]
    pub fn normal_count(&self) -> usize {
        self.normals.len() / 3
    }

    #[inline(always)]
    pub fn indices(&self) -> &'a [VertexIndex] {
        self.indices
    }

    #[inline(always)]
    pub fn position(&self, index: u32) -> Vec3A {
        let i = index as usize * 3;
        vec3a(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    #[inline(always)]
    pub fn normal(&self, index: u32) -> Vec3A {
        let i = index as usize * 3;
        vec3a(self.normals[i], self.normals[i + 1], self.normals[i + 2])
    }

    /// The three corner positions of a face.
    #[inline(always)]
    pub fn triangle(&self, face_id: u32) -> Triangle {
        let id = face_id as usize * 3;
        Triangle {
            p0: self.position(self.indices[id].position),
            p1: self.position(self.indices[id + 1].position),
            p2: self.position(self.indices[id + 2].position),
        }
    }

    /// Reconstructs a surface point from barycentrics: `u` weights the second
    /// corner, `v` the third, `w = 1 - u - v` the first.
    #[inline(always)]
    pub fn calc_position(&self, face_id: u32, u: f32, v: f32, w: f32) -> Vec3A {
        let id = face_id as usize * 3;
        self.position(self.indices[id].position) * w
            + self.position(self.indices[id + 1].position) * u
            + self.position(self.indices[id + 2].position) * v
    }

    /// Interpolates the shading normal with the same corner weights as
    /// [`calc_position`](Self::calc_position). Not renormalized.
    #[inline(always)]
    pub fn calc_normal(&self, face_id: u32, u: f32, v: f32, w: f32) -> Vec3A {
        let id = face_id as usize * 3;
        self.normal(self.indices[id].normal) * w
            + self.normal(self.indices[id + 1].normal) * u
            + self.normal(self.indices[id + 2].normal) * v
    }

    /// Bounds of every position referenced by a face.
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        for vi in self.indices {
            aabb.extend(self.position(vi.position));
        }
        aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3a;

    // A quad of two triangles sharing an edge, with one shared normal.
    fn quad() -> (Vec<f32>, Vec<f32>, Vec<u32>) {
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let normals = vec![0.0, 0.0, 1.0];
        let indices = vec![0, 0, 1, 0, 2, 0, 0, 0, 2, 0, 3, 0];
        (positions, normals, indices)
    }

    #[test]
    fn test_counts_and_decoding() {
        let (positions, normals, indices) = quad();
        let mesh = Mesh::new(&positions, &normals, &indices);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.position_count(), 4);
        assert_eq!(mesh.normal_count(), 1);
        assert_eq!(mesh.position(2), vec3a(1.0, 1.0, 0.0));
        assert_eq!(mesh.normal(0), vec3a(0.0, 0.0, 1.0));
        assert_eq!(mesh.indices()[4], VertexIndex { position: 2, normal: 0 });
    }

    #[test]
    fn test_triangle_corners() {
        let (positions, normals, indices) = quad();
        let mesh = Mesh::new(&positions, &normals, &indices);
        let tri = mesh.triangle(1);
        assert_eq!(tri.p0, vec3a(0.0, 0.0, 0.0));
        assert_eq!(tri.p1, vec3a(1.0, 1.0, 0.0));
        assert_eq!(tri.p2, vec3a(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_calc_position_corner_weights() {
        let (positions, normals, indices) = quad();
        let mesh = Mesh::new(&positions, &normals, &indices);
        // w selects the first corner, u the second, v the third.
        assert_eq!(mesh.calc_position(0, 0.0, 0.0, 1.0), mesh.triangle(0).p0);
        assert_eq!(mesh.calc_position(0, 1.0, 0.0, 0.0), mesh.triangle(0).p1);
        assert_eq!(mesh.calc_position(0, 0.0, 1.0, 0.0), mesh.triangle(0).p2);
        let mid = mesh.calc_position(0, 0.25, 0.25, 0.5);
        assert!((mid - vec3a(0.5, 0.25, 0.0)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_calc_normal_not_renormalized() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = vec![
            0.0, 0.0, 2.0, //
            0.0, 0.0, 4.0,
        ];
        let indices = vec![0, 0, 1, 1, 2, 0];
        let mesh = Mesh::new(&positions, &normals, &indices);
        let n = mesh.calc_normal(0, 0.5, 0.0, 0.5);
        assert_eq!(n, vec3a(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_aabb_merges_referenced_positions() {
        let (positions, normals, indices) = quad();
        let mesh = Mesh::new(&positions, &normals, &indices);
        let aabb = mesh.aabb();
        assert_eq!(aabb.min, vec3a(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, vec3a(1.0, 1.0, 0.0));
    }
}
