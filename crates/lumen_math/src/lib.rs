// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::Vec3Ext;

/// A position in world space.
pub type Point3 = Vec3;

/// Linear RGB color, nominally in [0, 1] per channel.
pub type Color = Vec3;
