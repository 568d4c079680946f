//! Procedural and image textures.

use std::sync::Arc;

use crate::Perlin;
use lumen_math::{Color, Interval, Point3};

/// Maps a surface coordinate (and/or world point) to a color.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Point3) -> Color;
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Point3) -> Color {
        self.color
    }
}

/// 3D checkerboard driven by the world point, so the pattern does not
/// depend on how the surface is parametrized.
pub struct CheckerTexture {
    odd: Arc<dyn Texture>,
    even: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(odd: Arc<dyn Texture>, even: Arc<dyn Texture>) -> Self {
        Self { odd, even }
    }

    pub fn from_colors(odd: Color, even: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(odd)), Arc::new(SolidColor::new(even)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Point3) -> Color {
        let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// How a [`NoiseTexture`] turns Perlin noise into a gray level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseStyle {
    /// Plain noise remapped from [-1, 1] to [0, 1].
    Smooth,
    /// Seven octaves of turbulence.
    Turbulence,
    /// Turbulence used as the phase of a sine wave along z.
    #[default]
    Marble,
}

/// Number of octaves summed for turbulence.
const TURBULENCE_DEPTH: usize = 7;

/// Perlin-noise gray texture.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
    style: NoiseStyle,
}

impl NoiseTexture {
    pub fn new(noise: Perlin, scale: f32) -> Self {
        Self::with_style(noise, scale, NoiseStyle::default())
    }

    pub fn with_style(noise: Perlin, scale: f32, style: NoiseStyle) -> Self {
        Self { noise, scale, style }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Point3) -> Color {
        let gray = match self.style {
            NoiseStyle::Smooth => 0.5 * (1.0 + self.noise.noise(self.scale * p)),
            NoiseStyle::Turbulence => self.noise.turb(self.scale * p, TURBULENCE_DEPTH),
            NoiseStyle::Marble => {
                0.5 * (1.0 + (self.scale * p.z + 10.0 * self.noise.turb(p, TURBULENCE_DEPTH)).sin())
            }
        };
        Color::splat(gray)
    }
}

/// Returned wherever image data is missing, so failures stand out in the render.
const MISSING_IMAGE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

const BYTES_PER_PIXEL: usize = 3;

/// Nearest-pixel lookup into a decoded RGB8 image.
///
/// Never reads files itself; decoding happens before the scene is built.
pub struct ImageTexture {
    data: Option<Vec<u8>>,
    width: usize,
    height: usize,
}

impl ImageTexture {
    /// Wrap a row-major RGB8 buffer, top row first.
    ///
    /// A buffer too small for `width * height` pixels is treated as missing.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        let expected = width * height * BYTES_PER_PIXEL;

        if width == 0 || height == 0 || data.len() < expected {
            log::warn!(
                "Image texture buffer has {} bytes, expected {} for {}x{}; using placeholder",
                data.len(),
                expected,
                width,
                height
            );
            return Self::missing();
        }

        Self {
            data: Some(data),
            width,
            height,
        }
    }

    /// A texture with no image data; every lookup yields the sentinel color.
    pub fn missing() -> Self {
        Self {
            data: None,
            width: 0,
            height: 0,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.data.is_none()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Point3) -> Color {
        let Some(data) = &self.data else {
            return MISSING_IMAGE_COLOR;
        };

        // Clamp to [0,1] x [1,0]; image row 0 is the top of the picture
        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        let v = 1.0 - unit.clamp(v);

        let i = ((u * self.width as f32) as usize).min(self.width - 1);
        let j = ((v * self.height as f32) as usize).min(self.height - 1);

        let offset = j * self.width * BYTES_PER_PIXEL + i * BYTES_PER_PIXEL;
        let pixel = &data[offset..offset + BYTES_PER_PIXEL];

        let color_scale = 1.0 / 255.0;
        Color::new(
            color_scale * pixel[0] as f32,
            color_scale * pixel[1] as f32,
            color_scale * pixel[2] as f32,
        )
    }
}
