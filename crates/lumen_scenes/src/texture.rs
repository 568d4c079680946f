//! Image texture loading.

use std::path::Path;

use lumen_renderer::ImageTexture;
use thiserror::Error;

/// Errors that can occur while preparing scene assets.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to load texture {path}: {source}")]
    TextureLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Decode an image file into an RGB8 [`ImageTexture`].
pub fn try_load_image_texture(path: impl AsRef<Path>) -> SceneResult<ImageTexture> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| SceneError::TextureLoad {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    log::debug!(
        "Loaded texture: {} ({}x{}, {:.1} KB)",
        path.display(),
        width,
        height,
        (width * height * 3) as f32 / 1024.0
    );

    Ok(ImageTexture::new(rgb.into_raw(), width, height))
}

/// Like [`try_load_image_texture`], but a failure is logged and yields the
/// magenta placeholder texture instead.
pub fn load_image_texture(path: impl AsRef<Path>) -> ImageTexture {
    try_load_image_texture(path).unwrap_or_else(|err| {
        log::error!("{err}");
        ImageTexture::missing()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::{Color, Vec3};
    use lumen_renderer::Texture;

    #[test]
    fn test_missing_file_yields_placeholder() {
        let _ = env_logger::builder().is_test(true).try_init();

        let path = std::env::temp_dir().join("lumen-does-not-exist.png");
        assert!(matches!(
            try_load_image_texture(&path),
            Err(SceneError::TextureLoad { .. })
        ));

        let texture = load_image_texture(&path);
        assert!(texture.is_missing());
        assert_eq!(texture.value(0.5, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_png_round_trips_through_texture() {
        let path = std::env::temp_dir().join(format!("lumen-texture-{}.png", std::process::id()));
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        img.save(&path).unwrap();

        let texture = try_load_image_texture(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(!texture.is_missing());
        assert_eq!(texture.value(0.1, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(texture.value(0.9, 0.5, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
    }
}
