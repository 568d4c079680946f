//! Material trait for surface scattering.

use std::sync::Arc;

use crate::{
    gen_f32, hittable::HitRecord, random_in_unit_sphere, random_unit_vector, SolidColor, Texture,
};
use lumen_math::{Color, Point3, Ray, Vec3Ext};
use rand::RngCore;

/// Outcome of a ray that was not absorbed.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel fraction of the scattered light that survives
    pub attenuation: Color,
    /// The outgoing ray
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// Materials hold no per-hit state: scattering is a pure function of the
/// incoming ray, the hit record and the caller's random numbers.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray, or `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Light emitted at the given surface coordinates and point.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Point3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Diffuse surface with a constant color.
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn from_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = ray_in.direction().normalize().reflect(rec.normal);
        let direction = if self.fuzz > 0.0 {
            reflected + self.fuzz * random_in_unit_sphere(rng)
        } else {
            reflected
        };

        // Fuzz may push the ray below the surface; treat that as absorbed
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ratio: f32) -> f32 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            unit_direction.reflect(rec.normal)
        } else {
            unit_direction.refract(rec.normal, refraction_ratio)
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(emit)))
    }

    pub fn from_texture(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Point3) -> Color {
        self.emit.value(u, v, p)
    }
}

/// Phase function of a participating medium: scatters uniformly in all
/// directions regardless of the incoming ray.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn from_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Isotropic {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, random_in_unit_sphere(rng), ray_in.time()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_on_plane<'a>(ray: &Ray, material: &'a dyn Material) -> HitRecord<'a> {
        // Surface z = 0 with outward normal +Z, hit at t = 1
        HitRecord::new(ray, 1.0, Vec3::Z, (0.25, 0.75), material)
    }

    #[test]
    fn test_metal_without_fuzz_reflects_exactly() {
        let metal = Metal::new(Color::new(0.8, 0.6, 0.2), 0.0);
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -1.0), 0.3);
        let rec = hit_on_plane(&ray, &metal);
        let result = metal.scatter(&ray, &rec, &mut rng).unwrap();

        let expected = ray.direction().normalize().reflect(Vec3::Z);
        assert_eq!(result.scattered.direction(), expected);
        assert!((expected - Vec3::new(1.0, 0.0, 1.0).normalize()).length() < 1e-6);
        assert_eq!(result.scattered.origin(), rec.p);
        assert_eq!(result.scattered.time(), 0.3);
        assert_eq!(result.attenuation, Color::new(0.8, 0.6, 0.2));
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        let metal = Metal::new(Color::ONE, 5.0);
        assert_eq!(metal.fuzz, 1.0);
    }

    /// Always draws the largest sample, so Schlick's coin never picks reflection.
    struct MaxRng;

    impl RngCore for MaxRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0xff);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_dielectric_with_unit_ratio_passes_straight_through() {
        let glass = Dielectric::new(1.0);
        let mut rng = MaxRng;

        for dir in [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.3, 0.1, -1.0).normalize(),
            Vec3::new(-0.5, 0.2, -0.4).normalize(),
        ] {
            let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 1.0), dir);
            let rec = hit_on_plane(&ray, &glass);
            let result = glass.scatter(&ray, &rec, &mut rng).unwrap();

            assert!((result.scattered.direction() - dir).length() < 1e-5);
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let glass = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(3);

        // Leaving the glass at a grazing angle: the normal stored in the
        // record faces the ray, front_face is false.
        let dir = Vec3::new(1.0, 0.0, 0.3).normalize();
        let ray = Ray::new_simple(Vec3::new(-1.0, 0.0, -0.3), dir);
        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, (0.0, 0.0), &glass);
        assert!(!rec.front_face);

        let result = glass.scatter(&ray, &rec, &mut rng).unwrap();
        assert!((result.scattered.direction() - dir.reflect(rec.normal)).length() < 1e-6);
    }

    #[test]
    fn test_lambertian_scatters_above_surface() {
        let lambertian = Lambertian::new(Color::new(0.1, 0.2, 0.3));
        let mut rng = StdRng::seed_from_u64(4);
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = hit_on_plane(&ray, &lambertian);

        for _ in 0..200 {
            let result = lambertian.scatter(&ray, &rec, &mut rng).unwrap();
            assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
            assert_eq!(result.attenuation, Color::new(0.1, 0.2, 0.3));
        }
    }

    #[test]
    fn test_light_emits_and_absorbs() {
        let light = DiffuseLight::new(Color::splat(4.0));
        let mut rng = StdRng::seed_from_u64(5);
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = hit_on_plane(&ray, &light);

        assert!(light.scatter(&ray, &rec, &mut rng).is_none());
        assert_eq!(light.emitted(rec.u, rec.v, rec.p), Color::splat(4.0));
        assert_eq!(Lambertian::new(Color::ONE).emitted(0.0, 0.0, rec.p), Color::ZERO);
    }

    #[test]
    fn test_isotropic_ignores_incoming_direction() {
        let fog = Isotropic::new(Color::splat(0.5));
        let mut rng = StdRng::seed_from_u64(6);
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = hit_on_plane(&ray, &fog);

        let mut saw_backward = false;
        for _ in 0..200 {
            let result = fog.scatter(&ray, &rec, &mut rng).unwrap();
            assert!(result.scattered.direction().length_squared() < 1.0);
            saw_backward |= result.scattered.direction().z > 0.0;
        }
        assert!(saw_backward);
    }
}
