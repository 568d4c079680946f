//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative ray bouncing with a configurable depth budget
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use crate::{gen_f32, write_ppm, Camera, Hittable, Progress, RenderResult, DEFAULT_BUCKET_SIZE};
use lumen_math::{Color, Interval, Ray};
use rand::RngCore;

/// Hits closer than this are ignored so bounced rays do not re-hit their
/// own surface.
const T_MIN: f32 = 0.001;

/// An 8-bit RGB pixel.
pub type Rgb = [u8; 3];

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Whether to use sky gradient instead of solid background
    pub use_sky_gradient: bool,
    /// Worker count; `None` uses every available core
    pub threads: Option<usize>,
    /// How often the orchestrator polls worker progress
    pub progress_interval: Duration,
    /// Edge length of a tile for the bucket scheduler
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            use_sky_gradient: false,
            threads: None,
            progress_interval: Duration::from_millis(100),
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Default settings with the height derived from `width / aspect_ratio`.
    pub fn for_aspect(width: u32, aspect_ratio: f32) -> Self {
        let height = ((width as f32 / aspect_ratio) as u32).max(1);
        Self {
            image_width: width,
            image_height: height,
            ..Self::default()
        }
    }

    /// Number of row workers to run, at least one and at most one per row.
    pub fn worker_count(&self) -> usize {
        let requested = self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        requested.clamp(1, (self.image_height as usize).max(1))
    }
}

/// Compute the color seen by a ray.
///
/// Follows the ray through up to `depth` bounces, carrying the product of
/// the attenuations so far. Emission and background are weighted by that
/// product; an exhausted budget contributes nothing further.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    let mut throughput = Color::ONE;
    let mut color = Color::ZERO;

    for _ in 0..depth {
        let Some(rec) = world.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            let background = if config.use_sky_gradient {
                sky_gradient(&ray)
            } else {
                config.background
            };
            return color + throughput * background;
        };

        // Get emission from material (for lights)
        color += throughput * rec.material.emitted(rec.u, rec.v, rec.p);

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            None => return color,
        }
    }

    color
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert an averaged linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> Rgb {
    let quantize = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// `(x, y)` are image coordinates with `y = 0` at the top row.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // The camera's t axis points up, image rows count down
    let j = config.image_height.saturating_sub(1 + y);
    let s_scale = 1.0 / config.image_width.saturating_sub(1).max(1) as f32;
    let t_scale = 1.0 / config.image_height.saturating_sub(1).max(1) as f32;

    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let s = (x as f32 + gen_f32(rng)) * s_scale;
        let t = (j as f32 + gen_f32(rng)) * t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, world, config.max_depth, config, rng);
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Render the rows in `rows`, top to bottom and left to right.
///
/// Marks `progress` once per finished row.
pub(crate) fn render_rows(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rows: Range<u32>,
    progress: &Progress,
    rng: &mut dyn RngCore,
) -> Vec<Rgb> {
    let mut pixels = Vec::with_capacity(rows.len() * config.image_width as usize);

    for y in rows {
        for x in 0..config.image_width {
            let color = render_pixel(camera, world, x, y, config, rng);
            pixels.push(color_to_rgb(color));
        }
        progress.mark_complete();
    }

    pixels
}

/// A finished 8-bit image, row-major with the top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Wrap already-rendered pixels, or `None` if the count does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgb: Rgb) {
        let index = self.index(x, y);
        self.pixels[index] = rgb;
    }

    /// Serialize as plain-text PPM.
    pub fn write_ppm<W: Write>(&self, out: W) -> RenderResult<()> {
        write_ppm(out, self.width, self.height, &self.pixels)?;
        Ok(())
    }

    /// Write a PPM file at `path`.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let file = File::create(path.as_ref())?;
        self.write_ppm(BufWriter::new(file))?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.as_ref().display());
        Ok(())
    }
}

/// Render the entire scene on the calling thread.
///
/// Reference implementation for the parallel schedulers.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let progress = Progress::new(config.image_height as usize);
    let pixels = render_rows(camera, world, config, 0..config.image_height, &progress, rng);

    ImageBuffer {
        width: config.image_width,
        height: config.image_height,
        pixels,
    }
}
