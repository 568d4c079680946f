//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over shared hittables, split on a random axis at the median
//! of the box minimums.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable, HittableList};
use lumen_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

/// BVH node - either a branch with two children or empty.
///
/// A single object is stored on both sides of its node, so every non-empty
/// node has exactly two children.
pub enum BvhNode {
    /// Internal node with two children.
    Node {
        left: Arc<dyn Hittable>,
        right: Arc<dyn Hittable>,
        /// `None` when a child had no box; the node is then always entered.
        bbox: Option<Aabb>,
    },
    /// No objects at all; never hit, no box.
    Empty,
}

impl BvhNode {
    /// Build a BVH over `objects` for the shutter interval `[time0, time1]`.
    pub fn new(objects: Vec<Arc<dyn Hittable>>, time0: f32, time1: f32) -> Self {
        Self::with_rng(objects, time0, time1, &mut rand::thread_rng())
    }

    /// Build a BVH from every object in `list`.
    pub fn from_list(list: HittableList, time0: f32, time1: f32) -> Self {
        Self::new(list.into_objects(), time0, time1)
    }

    /// Build a BVH, drawing split axes from `rng`.
    pub fn with_rng(
        mut objects: Vec<Arc<dyn Hittable>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }
        Self::build(&mut objects, time0, time1, rng)
    }

    /// Recursive construction over a non-empty slice.
    fn build(
        objects: &mut [Arc<dyn Hittable>],
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> Self {
        let axis = rng.gen_range(0..3);
        let key = |object: &Arc<dyn Hittable>| box_min(object.as_ref(), axis, time0, time1);

        let (left, right): (Arc<dyn Hittable>, Arc<dyn Hittable>) = match objects.len() {
            1 => (objects[0].clone(), objects[0].clone()),
            2 => {
                if key(&objects[0]) <= key(&objects[1]) {
                    (objects[0].clone(), objects[1].clone())
                } else {
                    (objects[1].clone(), objects[0].clone())
                }
            }
            n => {
                objects.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal));

                let (lo, hi) = objects.split_at_mut(n / 2);
                (
                    Arc::new(Self::build(lo, time0, time1, rng)),
                    Arc::new(Self::build(hi, time0, time1, rng)),
                )
            }
        };

        let bbox = match (
            left.bounding_box(time0, time1),
            right.bounding_box(time0, time1),
        ) {
            (Some(l), Some(r)) => Some(Aabb::surrounding(&l, &r)),
            _ => {
                log::warn!("No bounding box in BVH node construction; node will always be entered");
                None
            }
        };

        BvhNode::Node { left, right, bbox }
    }
}

/// Sort key: minimum of the object's box on `axis`, or 0 without a box.
fn box_min(object: &dyn Hittable, axis: usize, time0: f32, time1: f32) -> f32 {
    match object.bounding_box(time0, time1) {
        Some(bbox) => bbox.axis_interval(axis).min,
        None => {
            log::warn!("No bounding box in BVH construction; sorting object as if at origin");
            0.0
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let BvhNode::Node { left, right, bbox } = self else {
            return None;
        };

        if let Some(bbox) = bbox {
            if !bbox.hit(ray, ray_t) {
                return None;
            }
        }

        let hit_left = left.hit(ray, ray_t);

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = right.hit(ray, ray_t.with_max(right_max));

        hit_right.or(hit_left)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        match self {
            BvhNode::Node { bbox, .. } => *bbox,
            BvhNode::Empty => None,
        }
    }
}
