//! Camera for ray generation.

use crate::{gen_f32, random_in_unit_disk};
use lumen_math::{Point3, Ray, Vec3};
use rand::RngCore;

/// Everything needed to place a camera, gathered with a builder.
#[derive(Debug, Clone, Copy)]
pub struct CameraSettings {
    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f32,       // Vertical field of view in degrees
    aperture: f32,   // Lens diameter, 0 for a pinhole
    focus_dist: f32, // Distance from camera to plane of perfect focus

    aspect_ratio: f32,

    // Shutter
    time0: f32,
    time1: f32,
}

impl CameraSettings {
    /// Create settings for a pinhole camera at the origin looking down -Z.
    pub fn new() -> Self {
        Self {
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            aspect_ratio: 16.0 / 9.0,
            time0: 0.0,
            time1: 0.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the viewport width / height ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set the interval over which ray times are drawn.
    pub fn with_shutter(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Shutter interval as `(open, close)`.
    pub fn shutter(&self) -> (f32, f32) {
        (self.time0, self.time1)
    }

    /// Compute the camera basis and viewport.
    pub fn build(&self) -> Camera {
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = self.look_from;
        let horizontal = self.focus_dist * viewport_width * u;
        let vertical = self.focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - self.focus_dist * w;

        Camera {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: self.aperture / 2.0,
            time0: self.time0,
            time1: self.time1,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera for generating rays into the scene. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
    time0: f32,
    time1: f32,
}

impl Camera {
    /// Generate a ray through viewport coordinates `(s, t)`.
    ///
    /// `s` runs left to right and `t` bottom to top, both over [0, 1].
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        let ray_origin = self.origin + offset;
        let ray_direction =
            self.lower_left_corner + s * self.horizontal + t * self.vertical - ray_origin;
        let ray_time = self.time0 + (self.time1 - self.time0) * gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }
}

impl Default for Camera {
    fn default() -> Self {
        CameraSettings::default().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_center_ray_hits_look_at() {
        let camera = CameraSettings::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, -7.0), Vec3::Y)
            .with_lens(40.0, 0.0, 10.0)
            .with_aspect_ratio(2.0)
            .build();

        let mut rng = StdRng::seed_from_u64(42);
        let ray = camera.get_ray(0.5, 0.5, &mut rng);

        assert_eq!(ray.origin(), Vec3::new(1.0, 2.0, 3.0));
        assert!((ray.at(1.0) - Vec3::new(1.0, 2.0, -7.0)).length() < 1e-4);
    }

    #[test]
    fn test_camera_corners_follow_viewport_orientation() {
        let camera = CameraSettings::new()
            .with_lens(90.0, 0.0, 1.0)
            .with_aspect_ratio(1.0)
            .build();
        let mut rng = StdRng::seed_from_u64(1);

        // 90 degree vfov at focus 1: viewport spans [-1, 1] in x and y
        let bottom_left = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((bottom_left.direction() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-5);

        let top_right = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((top_right.direction() - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_aperture_and_shutter_sampling() {
        let camera = CameraSettings::new()
            .with_lens(60.0, 2.0, 5.0)
            .with_shutter(0.25, 0.75)
            .build();
        let mut rng = StdRng::seed_from_u64(7);

        let mut moved = false;
        for _ in 0..200 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin().length() <= 1.0 + 1e-5);
            assert!((0.25..=0.75).contains(&ray.time()));
            moved |= ray.origin().length() > 1e-3;

            // Every lens sample still converges on the focus plane
            assert!((ray.at(1.0) - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
        }
        assert!(moved);
    }
}
