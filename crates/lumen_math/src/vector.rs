// Optics helpers on top of glam::Vec3.
//
// glam already provides dot, cross, length and normalize; this adds the
// few operations the scattering code needs.

use glam::Vec3;

/// Components below this magnitude count as zero.
const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// Extension trait for Vec3 with ray tracing utilities.
pub trait Vec3Ext {
    /// True if every component is within 1e-8 of zero.
    fn near_zero(&self) -> bool;

    /// Mirror reflection of `self` about the normal `n`.
    fn reflect(&self, n: Vec3) -> Vec3;

    /// Snell refraction of the unit vector `self` through a surface with
    /// normal `n`, where `eta_ratio` is eta_incident / eta_transmitted.
    fn refract(&self, n: Vec3, eta_ratio: f32) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn near_zero(&self) -> bool {
        self.x.abs() < NEAR_ZERO_EPSILON
            && self.y.abs() < NEAR_ZERO_EPSILON
            && self.z.abs() < NEAR_ZERO_EPSILON
    }

    #[inline]
    fn reflect(&self, n: Vec3) -> Vec3 {
        *self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract(&self, n: Vec3, eta_ratio: f32) -> Vec3 {
        let cos_theta = (-*self).dot(n).min(1.0);
        let r_out_perp = eta_ratio * (*self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_zero() {
        assert!(Vec3::ZERO.near_zero());
        assert!(Vec3::splat(1e-9).near_zero());
        assert!(!Vec3::new(0.0, 1e-6, 0.0).near_zero());
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(v.reflect(Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_unit_ratio_passes_through() {
        let v = Vec3::new(0.6, -0.8, 0.0);
        let out = v.refract(Vec3::Y, 1.0);
        assert!((out - v).length() < 1e-5);
    }
}
