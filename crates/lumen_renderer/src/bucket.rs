//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use std::thread;

use rayon::prelude::*;

use crate::renderer::{color_to_rgb, render_pixel};
use crate::{
    Camera, Hittable, ImageBuffer, Progress, ProgressMonitor, RenderConfig, RenderError,
    RenderResult, Rgb,
};
use rand::RngCore;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets are rendered from the center outward so the middle of the
/// frame fills in first.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let dist = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| {
        dist(a)
            .partial_cmp(&dist(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec<Rgb> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let color = render_pixel(camera, world, global_x, global_y, config, rng);
            pixels.push(color_to_rgb(color));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Rgb>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Rgb>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their place in `image`.
    pub fn blit(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (local_y, row) in self.pixels.chunks(width.max(1)).enumerate() {
            for (local_x, &rgb) in row.iter().enumerate() {
                image.set(
                    self.bucket.x + local_x as u32,
                    self.bucket.y + local_y as u32,
                    rgb,
                );
            }
        }
    }
}

/// Render every bucket on a rayon pool of `config.threads` threads.
///
/// The pool runs on a helper thread so the calling thread can keep
/// reporting completed buckets to `monitor`.
pub fn render_buckets(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    monitor: &mut dyn ProgressMonitor,
) -> RenderResult<ImageBuffer> {
    let buckets = generate_buckets(config.image_width, config.image_height, config.bucket_size);
    let progress = Progress::new(buckets.len());

    // Zero lets rayon pick one thread per core
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.unwrap_or(0))
        .thread_name(|i| format!("lumen-bucket-{i}"))
        .build()?;

    log::info!(
        "Rendering {}x{} at {} spp in {} buckets on {} threads",
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
        buckets.len(),
        pool.current_num_threads()
    );

    let result = thread::scope(|scope| -> RenderResult<Vec<BucketResult>> {
        let (buckets, progress, pool) = (&buckets, &progress, &pool);
        let handle = thread::Builder::new()
            .name("lumen-bucket-driver".into())
            .spawn_scoped(scope, move || {
                pool.install(|| {
                    buckets
                        .par_iter()
                        .map(|bucket| {
                            let mut rng = rand::thread_rng();
                            let pixels = render_bucket(bucket, camera, world, config, &mut rng);
                            progress.mark_complete();
                            BucketResult::new(*bucket, pixels)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .map_err(|source| RenderError::Spawn { worker: 0, source })?;

        loop {
            let remaining = progress.remaining();
            monitor.update(remaining, progress.total());
            if remaining == 0 || handle.is_finished() {
                break;
            }
            thread::sleep(config.progress_interval);
        }

        handle.join().map_err(|_| {
            log::error!("Bucket render panicked");
            RenderError::WorkerPanicked { worker: 0 }
        })
    });
    monitor.finish();

    let mut image = ImageBuffer::new(config.image_width, config.image_height);
    for bucket_result in result? {
        bucket_result.blit(&mut image);
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::tests::{quadrant_camera, quadrant_config, Quadrants};
    use crate::{render, NoProgress};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!((first.x, first.y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_buckets_match_single_threaded_render() {
        let world = Quadrants::new();
        let camera = quadrant_camera();
        let reference = render(
            &camera,
            &world,
            &quadrant_config(1),
            &mut StdRng::seed_from_u64(8),
        );

        for bucket_size in [1, 2, 4, 64] {
            let config = RenderConfig {
                bucket_size,
                ..quadrant_config(3)
            };
            let image = render_buckets(&camera, &world, &config, &mut NoProgress).unwrap();
            assert_eq!(image, reference, "bucket_size={bucket_size}");
        }
    }
}
