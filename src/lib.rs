//! # Agglomerative LBVH Construction and Traversal
//!
//! - Linear BVH builder over 30-bit morton-sorted triangle leaves, assembled
//!   bottom-up by the radix-tree-forest climb: every leaf climbs toward the
//!   root and each internal node is claimed through one atomic exchange, with
//!   no locks.
//! - Iterative stack traversal with slab ray/AABB rejection, Möller–Trumbore
//!   triangle intersection and closest-hit refinement.
//! - A batch entry point mirroring the host harness contract: submit the mesh
//!   once, then submit ray batches from as many threads as you like.
//!
//! Building optionally uses [rayon](https://github.com/rayon-rs/rayon) via the
//! `parallel` feature (on by default). The mesh is borrowed, not copied: the
//! BVH stores slices into caller-owned position/normal/index buffers and only
//! ever reads them.
//!
//! ## Example
//!
//! ```
//! use albvh::lbvh::Lbvh;
//! use albvh::mesh::Mesh;
//! use albvh::ray::{HitRecord, Ray};
//! use glam::vec3a;
//!
//! // A single triangle in the z = 0 plane, facing +z.
//! // Indices interleave (position, normal) pairs per corner.
//! let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! let normals = [0.0f32, 0.0, 1.0];
//! let indices = [0u32, 0, 1, 0, 2, 0];
//!
//! let mesh = Mesh::new(&positions, &normals, &indices);
//! let bvh = Lbvh::build(mesh);
//!
//! let ray = Ray::new(vec3a(0.25, 0.25, 1.0), vec3a(0.0, 0.0, -1.0), 0.0, 10.0);
//! let mut record = HitRecord::new(ray.tmax);
//! bvh.traverse(&ray, &mut record);
//!
//! assert!(record.hit);
//! assert_eq!(record.face_id, 0);
//! assert!((record.dist - 1.0).abs() < 1e-6);
//! ```

pub mod aabb;
pub mod lbvh;
pub mod mesh;
pub mod morton;
pub mod ray;
pub mod test_util;
pub mod triangle;

/// Sentinel for unset node links and the root of an empty tree.
pub const INVALID: u32 = u32::MAX;
