//! Axis-aligned rectangles and boxes built from them.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    Material,
};
use lumen_math::{Aabb, Interval, Point3, Ray, Vec3};

/// Thickness added along the plane axis so the BVH never sees a flat box.
const PLANE_PAD: f32 = 0.0001;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes spanning a plane perpendicular to `self`, in xyz order.
    fn others(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }
}

/// A rectangle lying in the plane `axis = k`, bounded by `a` and `b` on the
/// other two axes.
///
/// The outward normal points along the positive plane axis.
pub struct AxisRect {
    axis: Axis,
    a: Interval,
    b: Interval,
    k: f32,
    material: Arc<dyn Material>,
}

impl AxisRect {
    pub fn new(axis: Axis, a: Interval, b: Interval, k: f32, material: Arc<dyn Material>) -> Self {
        Self {
            axis,
            a,
            b,
            k,
            material,
        }
    }

    /// Rectangle in the plane z = k.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Axis::Z, Interval::new(x0, x1), Interval::new(y0, y1), k, material)
    }

    /// Rectangle in the plane y = k.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Axis::Y, Interval::new(x0, x1), Interval::new(z0, z1), k, material)
    }

    /// Rectangle in the plane x = k.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Axis::X, Interval::new(y0, y1), Interval::new(z0, z1), k, material)
    }
}

impl Hittable for AxisRect {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let n = self.axis.index();
        let (ai, bi) = self.axis.others();

        // Parallel rays never cross the plane
        let dn = ray.direction()[n];
        if dn == 0.0 {
            return None;
        }

        let t = (self.k - ray.origin()[n]) / dn;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        if !self.a.contains(p[ai]) || !self.b.contains(p[bi]) {
            return None;
        }

        let u = (p[ai] - self.a.min) / self.a.size();
        let v = (p[bi] - self.b.min) / self.b.size();

        let mut outward_normal = Vec3::ZERO;
        outward_normal[n] = 1.0;

        Some(HitRecord::new(ray, t, outward_normal, (u, v), self.material.as_ref()))
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        let n = self.axis.index();
        let (ai, bi) = self.axis.others();

        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;
        lo[n] = self.k - PLANE_PAD;
        hi[n] = self.k + PLANE_PAD;
        lo[ai] = self.a.min;
        hi[ai] = self.a.max;
        lo[bi] = self.b.min;
        hi[bi] = self.b.max;

        Some(Aabb::from_points(lo, hi))
    }
}

/// An axis-aligned box made of six rectangles.
pub struct Cuboid {
    min: Point3,
    max: Point3,
    sides: HittableList,
}

impl Cuboid {
    pub fn new(p0: Point3, p1: Point3, material: Arc<dyn Material>) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);

        let mut sides = HittableList::new();
        sides.add(Arc::new(AxisRect::xy(min.x, max.x, min.y, max.y, max.z, material.clone())));
        sides.add(Arc::new(AxisRect::xy(min.x, max.x, min.y, max.y, min.z, material.clone())));
        sides.add(Arc::new(AxisRect::xz(min.x, max.x, min.z, max.z, max.y, material.clone())));
        sides.add(Arc::new(AxisRect::xz(min.x, max.x, min.z, max.z, min.y, material.clone())));
        sides.add(Arc::new(AxisRect::yz(min.y, max.y, min.z, max.z, max.x, material.clone())));
        sides.add(Arc::new(AxisRect::yz(min.y, max.y, min.z, max.z, min.x, material)));

        Self { min, max, sides }
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.sides.hit(ray, ray_t)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(Aabb::from_points(self.min, self.max))
    }
}
