//! Lumen renderer - CPU path tracing.
//!
//! A Monte Carlo ray tracer: shared read-only scenes (BVH over spheres,
//! rectangles and volumes), texture-driven materials, and a renderer that
//! splits the image across worker threads and reassembles it in order.

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod medium;
mod parallel;
mod perlin;
mod ppm;
mod progress;
mod rect;
mod renderer;
mod sampling;
mod sphere;
mod texture;

pub use bucket::{generate_buckets, render_bucket, render_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult};
pub use medium::ConstantMedium;
pub use parallel::{partition_rows, render_parallel, render_with, Scheduler};
pub use perlin::Perlin;
pub use ppm::write_ppm;
pub use progress::{LogProgress, NoProgress, Progress, ProgressMonitor, StartLatch};
pub use rect::{Axis, AxisRect, Cuboid};
pub use renderer::{color_to_rgb, ray_color, render, render_pixel, ImageBuffer, RenderConfig, Rgb};
pub use sampling::{gen_f32, random_in_unit_disk, random_in_unit_sphere, random_unit_vector};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{CheckerTexture, ImageTexture, NoiseStyle, NoiseTexture, SolidColor, Texture};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Color, Interval, Point3, Ray, Vec3, Vec3Ext};
