//! Constant-density participating media (smoke, fog).

use std::sync::Arc;

use crate::{
    gen_f32,
    hittable::{HitRecord, Hittable},
    Isotropic, Material, Texture,
};
use lumen_math::{Aabb, Color, Interval, Ray, Vec3};

/// A volume of uniform density filling a closed boundary.
///
/// Rays that enter the boundary travel an exponentially distributed
/// distance before scattering; if that distance exits the boundary first
/// the ray passes through.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self::with_phase(boundary, density, Arc::new(Isotropic::new(albedo)))
    }

    pub fn from_texture(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self::with_phase(boundary, density, Arc::new(Isotropic::from_texture(albedo)))
    }

    fn with_phase(boundary: Arc<dyn Hittable>, density: f32, phase_function: Arc<dyn Material>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        // Entry and exit of the boundary along the whole line
        let entry = self.boundary.hit(ray, Interval::UNIVERSE)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 0.0001, f32::INFINITY))?;

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(&mut rand::thread_rng()).ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;

        // Normal and facing are arbitrary inside a volume
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: self.phase_function.as_ref(),
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};

    fn unit_ball() -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Lambertian::new(Color::ONE)),
        ))
    }

    #[test]
    fn test_dense_medium_scatters_inside_boundary() {
        let fog = ConstantMedium::new(unit_ball(), 1.0e6, Color::splat(0.5));
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        for _ in 0..50 {
            let rec = fog.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
            assert!(rec.t >= 4.0 && rec.t <= 6.0);
            assert!(rec.t < 4.01, "dense fog should scatter near the surface");
        }
    }

    #[test]
    fn test_thin_medium_lets_rays_through() {
        let fog = ConstantMedium::new(unit_ball(), 1.0e-6, Color::splat(0.5));
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let passed = (0..50)
            .filter(|_| fog.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none())
            .count();
        assert!(passed >= 45);
    }

    #[test]
    fn test_ray_missing_boundary_misses_medium() {
        let fog = ConstantMedium::new(unit_ball(), 1.0e6, Color::ONE);
        let ray = Ray::new_simple(Vec3::new(0.0, 3.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(fog.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
        assert_eq!(fog.bounding_box(0.0, 1.0), unit_ball().bounding_box(0.0, 1.0));
    }

    #[test]
    fn test_ray_starting_inside_scatters_ahead() {
        let fog = ConstantMedium::new(unit_ball(), 1.0e6, Color::ONE);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let rec = fog.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!(rec.t > 0.0 && rec.t < 1.0);
    }
}
