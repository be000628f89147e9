#[cfg(test)]
mod tests {
    use albvh::{
        lbvh::Lbvh,
        mesh::Mesh,
        ray::{HitRecord, Ray, RayDesc},
        test_util::{
            geometry::{terrain, triangle_soup, unit_triangle},
            sampling::{hash_noise, uniform_sample_sphere},
        },
    };
    use glam::{Vec3A, vec2, vec3a};

    fn brute_force(mesh: &Mesh, ray: &Ray) -> HitRecord {
        let mut record = HitRecord::new(ray.tmax);
        for face_id in 0..mesh.face_count() as u32 {
            if mesh.triangle(face_id).intersect(ray, &mut record) {
                record.face_id = face_id as i32;
                record.hit = true;
            }
        }
        record
    }

    fn scene_ray(i: u32, seed: u32, radius: f32, spread: f32) -> Ray {
        let origin = uniform_sample_sphere(vec2(hash_noise(i, 0, seed), hash_noise(i, 1, seed)))
            * radius;
        let target = (vec3a(
            hash_noise(i, 2, seed),
            hash_noise(i, 3, seed),
            hash_noise(i, 4, seed),
        ) * 2.0
            - 1.0)
            * spread;
        Ray::new(origin, (target - origin).normalize(), 0.0, 1000.0)
    }

    #[test]
    fn matches_brute_force_on_large_soup() {
        let buffers = triangle_soup(100_000, 10.0, 7);
        let mesh = buffers.mesh();
        let bvh = Lbvh::build(mesh);
        bvh.validate();

        for i in 0..1_000u32 {
            let ray = scene_ray(i, 1, 25.0, 8.0);
            let expected = brute_force(&bvh.mesh(), &ray);
            let mut record = HitRecord::new(ray.tmax);
            bvh.traverse(&ray, &mut record);

            assert_eq!(record.hit, expected.hit, "ray {i} hit flag diverged");
            if expected.hit {
                assert!(
                    (record.dist - expected.dist).abs() <= expected.dist.abs() * 1e-6 + 1e-6,
                    "ray {i}: bvh dist {} vs brute force {}",
                    record.dist,
                    expected.dist
                );
                // Same face means identical arithmetic, so identical
                // barycentrics.
                if record.face_id == expected.face_id {
                    assert_eq!(record.u, expected.u, "ray {i}");
                    assert_eq!(record.v, expected.v, "ray {i}");
                }
            }
        }
    }

    #[test]
    fn rebuild_has_identical_outcomes() {
        let buffers = terrain(64, 3);
        let mesh = buffers.mesh();
        let first = Lbvh::build(mesh);
        let second = Lbvh::build(mesh);

        for i in 0..200u32 {
            let ray = scene_ray(i, 5, 4.0, 1.0);
            let mut a = HitRecord::new(ray.tmax);
            first.traverse(&ray, &mut a);
            let mut b = HitRecord::new(ray.tmax);
            second.traverse(&ray, &mut b);
            assert_eq!(a.hit, b.hit, "ray {i}");
            if a.hit {
                assert_eq!(a.dist.to_bits(), b.dist.to_bits(), "ray {i}");
                assert_eq!(a.face_id, b.face_id, "ray {i}");
            }
        }
    }

    #[test]
    fn terrain_validates_and_hits_from_above() {
        let buffers = terrain(128, 9);
        let bvh = Lbvh::build(buffers.mesh());
        let stats = bvh.validate();
        assert_eq!(stats.leaf_count, 128 * 128 * 2);

        // Vertical probes over the interior always strike the height field.
        for i in 0..100u32 {
            let x = (hash_noise(i, 0, 2) * 2.0 - 1.0) * 0.9;
            let z = (hash_noise(i, 1, 2) * 2.0 - 1.0) * 0.9;
            let ray = Ray::new(vec3a(x, 2.0, z), vec3a(0.0, -1.0, 0.0), 0.0, 10.0);
            let mut record = HitRecord::new(ray.tmax);
            bvh.traverse(&ray, &mut record);
            assert!(record.hit, "probe {i} at ({x}, {z}) missed");
        }
    }

    #[test]
    fn hit_any_agrees_on_hit_existence() {
        let buffers = triangle_soup(2_000, 5.0, 11);
        let mesh = buffers.mesh();
        let bvh = Lbvh::build(mesh);

        for i in 0..200u32 {
            let ray = scene_ray(i, 13, 12.0, 4.0);
            let mut closest = HitRecord::new(ray.tmax);
            bvh.traverse(&ray, &mut closest);
            let mut any = HitRecord::new(ray.tmax);
            bvh.traverse_any(&ray, &mut any);

            assert_eq!(closest.hit, any.hit, "ray {i}");
            if closest.hit {
                assert!(any.dist >= closest.dist, "ray {i}");
            }
        }
    }

    #[test]
    fn batch_interface_round_trip() {
        let buffers = unit_triangle();
        let bvh = Lbvh::build(buffers.mesh());

        let mut rays = [
            RayDesc::new([0.25, 0.25, 1.0], [0.0, 0.0, -1.0], 0.0, 10.0),
            RayDesc::new([2.0, 2.0, 1.0], [0.0, 0.0, -1.0], 0.0, 10.0),
            // tfar short of the surface.
            RayDesc::new([0.25, 0.25, 1.0], [0.0, 0.0, -1.0], 0.0, 0.5),
            RayDesc {
                valid: false,
                ..RayDesc::new([0.25, 0.25, 1.0], [0.0, 0.0, -1.0], 0.0, 10.0)
            },
        ];
        bvh.intersect_batch(&mut rays, false);

        assert!(rays[0].isisect);
        assert_eq!(rays[0].face_id, 0);
        let isect = Vec3A::from_array(rays[0].isect);
        assert!((isect - vec3a(0.25, 0.25, 0.0)).abs().max_element() < 1e-5);
        let ns = Vec3A::from_array(rays[0].ns);
        assert!((ns - vec3a(0.0, 0.0, 1.0)).abs().max_element() < 1e-6);

        assert!(!rays[1].isisect);
        assert!(!rays[2].isisect);
        assert!(!rays[3].isisect);
        assert_eq!(rays[3].isect, [0.0; 3]);
    }

    #[test]
    fn grazing_tfar_never_hits() {
        // A ray whose tfar lands exactly on the surface: the interval is
        // half-open, so this must miss no matter how it is traversed.
        let buffers = unit_triangle();
        let bvh = Lbvh::build(buffers.mesh());
        let ray = Ray::new(vec3a(0.25, 0.25, 1.0), vec3a(0.0, 0.0, -1.0), 0.0, 1.0);
        let mut record = HitRecord::new(ray.tmax);
        bvh.traverse(&ray, &mut record);
        assert!(!record.hit);
    }
}
