//! Lumen demo scenes.
//!
//! Each [`SceneKind`] builds a ready-to-render [`Scene`]: a BVH over the
//! scene's objects, camera settings and a background.

mod scenes;
mod texture;

use std::path::PathBuf;
use std::sync::Arc;

use lumen_math::Color;
use lumen_renderer::{CameraSettings, Hittable, RenderConfig};
use rand::RngCore;

pub use texture::{load_image_texture, try_load_image_texture, SceneError, SceneResult};

/// A built scene, read-only from here on.
pub struct Scene {
    /// Root of the scene, usually a BVH
    pub world: Arc<dyn Hittable>,
    pub camera: CameraSettings,
    /// Color returned by rays that escape the scene
    pub background: Color,
    /// Use the white-to-blue sky instead of `background`
    pub use_sky_gradient: bool,
}

impl Scene {
    pub fn aspect_ratio(&self) -> f32 {
        self.camera.aspect_ratio()
    }

    /// Copy the scene's background settings into `config`.
    pub fn configure(&self, config: &mut RenderConfig) {
        config.background = self.background;
        config.use_sky_gradient = self.use_sky_gradient;
    }
}

/// The built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    /// Ground plane covered in small random spheres plus three large ones
    #[default]
    RandomSpheres,
    /// Two checkered spheres
    TwoSpheres,
    /// Marble sphere on a marble ground
    TwoPerlinSpheres,
    /// Image-textured globe
    Earth,
    /// Perlin spheres lit by a rectangle and a sphere light
    SimpleLight,
    /// The Cornell box with two blocks
    CornellBox,
    /// The Cornell box with smoke and fog blocks
    CornellSmoke,
    /// Everything at once
    FinalScene,
}

impl SceneKind {
    pub const ALL: [SceneKind; 8] = [
        SceneKind::RandomSpheres,
        SceneKind::TwoSpheres,
        SceneKind::TwoPerlinSpheres,
        SceneKind::Earth,
        SceneKind::SimpleLight,
        SceneKind::CornellBox,
        SceneKind::CornellSmoke,
        SceneKind::FinalScene,
    ];

    /// Build the scene using the thread RNG for random placement.
    pub fn build(self, options: &SceneOptions) -> Scene {
        self.build_with_rng(options, &mut rand::thread_rng())
    }

    /// Build the scene, drawing every random choice from `rng`.
    pub fn build_with_rng(self, options: &SceneOptions, rng: &mut dyn RngCore) -> Scene {
        log::info!("Building scene {self:?}");
        match self {
            SceneKind::RandomSpheres => scenes::random_spheres(rng),
            SceneKind::TwoSpheres => scenes::two_spheres(rng),
            SceneKind::TwoPerlinSpheres => scenes::two_perlin_spheres(rng),
            SceneKind::Earth => scenes::earth(options, rng),
            SceneKind::SimpleLight => scenes::simple_light(rng),
            SceneKind::CornellBox => scenes::cornell_box(rng),
            SceneKind::CornellSmoke => scenes::cornell_smoke(rng),
            SceneKind::FinalScene => scenes::final_scene(options, rng),
        }
    }
}

/// External assets used by some scenes.
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Image wrapped around the globe in the earth and final scenes
    pub earth_texture: PathBuf,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            earth_texture: PathBuf::from("earthmap.jpg"),
        }
    }
}
