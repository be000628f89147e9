//! Deterministic sampling helpers and indexed-mesh generators for tests and
//! examples.

pub mod sampling {
    use std::f32::consts::TAU;

    use glam::{Vec2, Vec3A, vec3a};

    #[inline(always)]
    pub fn uhash(x: u32) -> u32 {
        // from https://nullprogram.com/blog/2018/07/31/
        let mut x = x ^ (x >> 16);
        x = x.wrapping_mul(0x7feb352d);
        x = x ^ (x >> 15);
        x = x.wrapping_mul(0x846ca68b);
        x ^ (x >> 16)
    }

    #[inline(always)]
    pub fn uhash2(a: u32, b: u32) -> u32 {
        uhash(a.wrapping_mul(1597334673) ^ b.wrapping_mul(3812015801))
    }

    #[inline(always)]
    pub fn unormf(n: u32) -> f32 {
        n as f32 * (1.0 / 0xffffffffu32 as f32)
    }

    /// Deterministic white noise in `0.0..=1.0` on an integer lattice.
    #[inline(always)]
    pub fn hash_noise(x: u32, y: u32, seed: u32) -> f32 {
        unormf(uhash2(x, (y << 11).wrapping_add(seed)))
    }

    /// Uniform direction on the unit sphere from two uniform samples.
    #[inline(always)]
    pub fn uniform_sample_sphere(urand: Vec2) -> Vec3A {
        let z = 1.0 - 2.0 * urand.x;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let theta = urand.y * TAU;
        vec3a(r * theta.cos(), r * theta.sin(), z)
    }
}

pub mod geometry {
    use glam::{Vec3A, vec3a};

    use super::sampling::hash_noise;
    use crate::mesh::Mesh;

    /// Owned mesh buffers in the packed harness layout: xyz position and
    /// normal triples, indices interleaving `(position, normal)` per corner.
    #[derive(Default)]
    pub struct MeshBuffers {
        pub positions: Vec<f32>,
        pub normals: Vec<f32>,
        pub indices: Vec<u32>,
    }

    impl MeshBuffers {
        pub fn new() -> Self {
            Self::default()
        }

        /// Borrow as a mesh view.
        pub fn mesh(&self) -> Mesh<'_> {
            Mesh::new(&self.positions, &self.normals, &self.indices)
        }

        /// Appends a triangle with three fresh positions and one face normal
        /// computed from the winding.
        pub fn push_triangle(&mut self, p0: Vec3A, p1: Vec3A, p2: Vec3A) {
            let base = (self.positions.len() / 3) as u32;
            let normal_index = (self.normals.len() / 3) as u32;
            for p in [p0, p1, p2] {
                self.positions.extend(p.to_array());
            }
            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            self.normals.extend(normal.to_array());
            for corner in 0..3 {
                self.indices.extend([base + corner, normal_index]);
            }
        }
    }

    /// The unit right triangle in the z = 0 plane, facing +z.
    pub fn unit_triangle() -> MeshBuffers {
        let mut buffers = MeshBuffers::new();
        buffers.push_triangle(
            vec3a(0.0, 0.0, 0.0),
            vec3a(1.0, 0.0, 0.0),
            vec3a(0.0, 1.0, 0.0),
        );
        buffers
    }

    /// `count` small random triangles scattered through a cube with the
    /// given half extent. Deterministic for a fixed seed.
    pub fn triangle_soup(count: usize, half_extent: f32, seed: u32) -> MeshBuffers {
        let mut buffers = MeshBuffers::new();
        for face in 0..count as u32 {
            let sample = |k: u32| {
                vec3a(
                    hash_noise(face, k, seed),
                    hash_noise(face, k + 1, seed),
                    hash_noise(face, k + 2, seed),
                )
            };
            let center = (sample(0) * 2.0 - 1.0) * half_extent;
            let scale = 0.05 * half_extent;
            buffers.push_triangle(
                center + (sample(10) * 2.0 - 1.0) * scale,
                center + (sample(20) * 2.0 - 1.0) * scale,
                center + (sample(30) * 2.0 - 1.0) * scale,
            );
        }
        buffers
    }

    /// A height field over `[-1, 1]^2` in xz with shared grid positions and
    /// one normal per face; `res` quads per side, `2 * res^2` triangles.
    pub fn terrain(res: usize, seed: u32) -> MeshBuffers {
        // Smooth deterministic heights: a few octaves of bilinear lattice
        // noise.
        let height = |x: usize, z: usize| -> f32 {
            let bilinear = |cell: u32| -> f32 {
                let (cx, fx) = (x as u32 / cell, (x as u32 % cell) as f32 / cell as f32);
                let (cz, fz) = (z as u32 / cell, (z as u32 % cell) as f32 / cell as f32);
                let h00 = hash_noise(cx, cz, seed);
                let h10 = hash_noise(cx + 1, cz, seed);
                let h01 = hash_noise(cx, cz + 1, seed);
                let h11 = hash_noise(cx + 1, cz + 1, seed);
                let a = h00 + (h10 - h00) * fx;
                let b = h01 + (h11 - h01) * fx;
                a + (b - a) * fz
            };
            bilinear(16) * 0.6 + bilinear(4) * 0.3 + bilinear(1) * 0.1
        };

        let mut buffers = MeshBuffers::new();
        let stride = res + 1;
        for z in 0..stride {
            for x in 0..stride {
                let fx = (x as f32 / res as f32) * 2.0 - 1.0;
                let fz = (z as f32 / res as f32) * 2.0 - 1.0;
                buffers.positions.extend([fx, height(x, z), fz]);
            }
        }

        let position = |index: u32| -> Vec3A {
            let i = index as usize * 3;
            vec3a(
                buffers.positions[i],
                buffers.positions[i + 1],
                buffers.positions[i + 2],
            )
        };
        let mut faces: Vec<[u32; 3]> = Vec::with_capacity(res * res * 2);
        for z in 0..res {
            for x in 0..res {
                let v00 = (z * stride + x) as u32;
                let v10 = v00 + 1;
                let v01 = v00 + stride as u32;
                let v11 = v01 + 1;
                faces.push([v00, v01, v10]);
                faces.push([v10, v01, v11]);
            }
        }
        for [a, b, c] in faces {
            let normal = (position(b) - position(a))
                .cross(position(c) - position(a))
                .normalize_or_zero();
            let normal_index = (buffers.normals.len() / 3) as u32;
            buffers.normals.extend(normal.to_array());
            buffers.indices.extend([a, normal_index, b, normal_index, c, normal_index]);
        }
        buffers
    }
}
