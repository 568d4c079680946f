//! Scene builders.

use std::sync::Arc;

use lumen_math::{Color, Point3, Vec3};
use lumen_renderer::{
    gen_f32, AxisRect, BvhNode, CameraSettings, CheckerTexture, ConstantMedium, Cuboid,
    Dielectric, DiffuseLight, Hittable, HittableList, Lambertian, Material, Metal, MovingSphere,
    NoiseTexture, Perlin, Sphere, Texture,
};
use rand::{Rng, RngCore};

use crate::{load_image_texture, Scene, SceneOptions};

const WIDE: f32 = 16.0 / 9.0;
const SQUARE: f32 = 1.0;

fn random_color(rng: &mut dyn RngCore, min: f32, max: f32) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

/// Wrap everything in `objects` in a BVH built for the shutter `[0, 1]`.
fn into_bvh(objects: HittableList, rng: &mut dyn RngCore) -> Arc<dyn Hittable> {
    Arc::new(BvhNode::with_rng(objects.into_objects(), 0.0, 1.0, rng))
}

/// Camera used by the outdoor sphere scenes.
fn outdoor_camera() -> CameraSettings {
    CameraSettings::new()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_aspect_ratio(WIDE)
}

fn sky_scene(world: Arc<dyn Hittable>, camera: CameraSettings) -> Scene {
    Scene {
        world,
        camera,
        background: Color::new(0.70, 0.80, 1.00),
        use_sky_gradient: true,
    }
}

fn dark_scene(world: Arc<dyn Hittable>, camera: CameraSettings) -> Scene {
    Scene {
        world,
        camera,
        background: Color::ZERO,
        use_sky_gradient: false,
    }
}

pub(crate) fn random_spheres(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();

    let checker: Arc<dyn Texture> = Arc::new(CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::from_texture(checker)),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Point3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            // Keep the area around the large metal sphere clear
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // Diffuse, bouncing during the shutter
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                let center1 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                world.add(Arc::new(MovingSphere::new(
                    center,
                    center1,
                    0.0,
                    1.0,
                    0.2,
                    Arc::new(Lambertian::new(albedo)),
                )));
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))));
            } else {
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))));
            }
        }
    }

    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    let camera = outdoor_camera()
        .with_lens(20.0, 0.1, 10.0)
        .with_shutter(0.0, 1.0);
    sky_scene(into_bvh(world, rng), camera)
}

pub(crate) fn two_spheres(rng: &mut dyn RngCore) -> Scene {
    let checker: Arc<dyn Material> = Arc::new(Lambertian::from_texture(Arc::new(
        CheckerTexture::from_colors(Color::new(0.2, 0.3, 0.1), Color::new(0.9, 0.9, 0.9)),
    )));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Point3::new(0.0, -10.0, 0.0), 10.0, checker.clone())));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 10.0, 0.0), 10.0, checker)));

    sky_scene(into_bvh(world, rng), outdoor_camera())
}

/// Marble ground sphere and a marble ball resting on it.
fn perlin_spheres(rng: &mut dyn RngCore) -> HittableList {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::from_texture(Arc::new(
        NoiseTexture::new(Perlin::new(rng), 4.0),
    )));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone())));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, marble)));
    world
}

pub(crate) fn two_perlin_spheres(rng: &mut dyn RngCore) -> Scene {
    let world = perlin_spheres(rng);
    sky_scene(into_bvh(world, rng), outdoor_camera())
}

pub(crate) fn earth(options: &SceneOptions, rng: &mut dyn RngCore) -> Scene {
    let earth_surface = Arc::new(Lambertian::from_texture(Arc::new(load_image_texture(
        &options.earth_texture,
    ))));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Point3::ZERO, 2.0, earth_surface)));

    sky_scene(into_bvh(world, rng), outdoor_camera())
}

pub(crate) fn simple_light(rng: &mut dyn RngCore) -> Scene {
    let mut world = perlin_spheres(rng);

    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(4.0)));
    world.add(Arc::new(AxisRect::xy(3.0, 5.0, 1.0, 3.0, -2.0, light.clone())));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 7.0, 0.0), 2.0, light)));

    let camera = CameraSettings::new()
        .with_position(Point3::new(26.0, 3.0, 6.0), Point3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_aspect_ratio(WIDE);
    dark_scene(into_bvh(world, rng), camera)
}

/// The five walls of the Cornell box plus the given ceiling light.
fn cornell_walls(light: AxisRect) -> HittableList {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));

    let mut walls = HittableList::new();
    walls.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    walls.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    walls.add(Arc::new(light));
    walls.add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    walls.add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    walls.add(Arc::new(AxisRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white)));
    walls
}

fn cornell_camera() -> CameraSettings {
    CameraSettings::new()
        .with_position(Point3::new(278.0, 278.0, -800.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_aspect_ratio(SQUARE)
}

/// The short and tall blocks standing in the Cornell box.
fn cornell_blocks(material: Arc<dyn Material>) -> [Arc<dyn Hittable>; 2] {
    [
        Arc::new(Cuboid::new(
            Point3::new(130.0, 0.0, 65.0),
            Point3::new(295.0, 165.0, 230.0),
            material.clone(),
        )),
        Arc::new(Cuboid::new(
            Point3::new(265.0, 0.0, 295.0),
            Point3::new(430.0, 330.0, 460.0),
            material,
        )),
    ]
}

pub(crate) fn cornell_box(rng: &mut dyn RngCore) -> Scene {
    let light = Arc::new(DiffuseLight::new(Color::splat(15.0)));
    let mut world = cornell_walls(AxisRect::xz(213.0, 343.0, 227.0, 332.0, 554.0, light));

    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    for block in cornell_blocks(white) {
        world.add(block);
    }

    dark_scene(into_bvh(world, rng), cornell_camera())
}

pub(crate) fn cornell_smoke(rng: &mut dyn RngCore) -> Scene {
    let light = Arc::new(DiffuseLight::new(Color::splat(7.0)));
    let mut world = cornell_walls(AxisRect::xz(113.0, 443.0, 127.0, 432.0, 554.0, light));

    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let [short, tall] = cornell_blocks(white);
    world.add(Arc::new(ConstantMedium::new(short, 0.01, Color::ONE)));
    world.add(Arc::new(ConstantMedium::new(tall, 0.01, Color::ZERO)));

    dark_scene(into_bvh(world, rng), cornell_camera())
}

pub(crate) fn final_scene(options: &SceneOptions, rng: &mut dyn RngCore) -> Scene {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.48, 0.83, 0.53)));

    // Field of blocks of random height
    let boxes_per_side = 20;
    let mut boxes = HittableList::new();
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = rng.gen_range(1.0..101.0);
            boxes.add(Arc::new(Cuboid::new(
                Point3::new(x0, 0.0, z0),
                Point3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            )));
        }
    }

    let mut world = HittableList::new();
    world.add(into_bvh(boxes, rng));

    let light = Arc::new(DiffuseLight::new(Color::splat(7.0)));
    world.add(Arc::new(AxisRect::xz(123.0, 423.0, 147.0, 412.0, 554.0, light)));

    let center0 = Point3::new(400.0, 400.0, 200.0);
    let center1 = center0 + Vec3::new(30.0, 0.0, 0.0);
    world.add(Arc::new(MovingSphere::new(
        center0,
        center1,
        0.0,
        1.0,
        50.0,
        Arc::new(Lambertian::new(Color::new(0.7, 0.3, 0.1))),
    )));

    world.add(Arc::new(Sphere::new(
        Point3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    // Glass ball filled with blue smoke
    let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Point3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(boundary.clone());
    world.add(Arc::new(ConstantMedium::new(boundary, 0.2, Color::new(0.2, 0.4, 0.9))));

    // Thin mist over everything
    let mist: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Point3::ZERO,
        5000.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(Arc::new(ConstantMedium::new(mist, 0.0001, Color::ONE)));

    let earth_surface = Arc::new(Lambertian::from_texture(Arc::new(load_image_texture(
        &options.earth_texture,
    ))));
    world.add(Arc::new(Sphere::new(Point3::new(400.0, 200.0, 400.0), 100.0, earth_surface)));

    let noise = Arc::new(Lambertian::from_texture(Arc::new(NoiseTexture::new(
        Perlin::new(rng),
        0.1,
    ))));
    world.add(Arc::new(Sphere::new(Point3::new(220.0, 280.0, 300.0), 80.0, noise)));

    // Cluster of small white spheres
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let offset = Vec3::new(-100.0, 270.0, 395.0);
    let cluster: HittableList = (0..1000)
        .map(|_| {
            let center = random_color(rng, 0.0, 165.0) + offset;
            Arc::new(Sphere::new(center, 10.0, white.clone())) as Arc<dyn Hittable>
        })
        .collect();
    world.add(into_bvh(cluster, rng));

    let camera = CameraSettings::new()
        .with_position(Point3::new(478.0, 278.0, -600.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_aspect_ratio(SQUARE)
        .with_shutter(0.0, 1.0);
    dark_scene(into_bvh(world, rng), camera)
}

#[cfg(test)]
mod tests {
    use crate::{SceneKind, SceneOptions};
    use lumen_math::{Interval, Ray, Vec3};
    use lumen_renderer::Hittable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options() -> SceneOptions {
        SceneOptions {
            earth_texture: std::env::temp_dir().join("lumen-no-earth.jpg"),
        }
    }

    #[test]
    fn test_every_scene_builds_with_bounds() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = StdRng::seed_from_u64(1);

        for kind in SceneKind::ALL {
            let scene = kind.build_with_rng(&options(), &mut rng);
            assert!(
                scene.world.bounding_box(0.0, 1.0).is_some(),
                "{kind:?} has no bounding box"
            );
            assert!(scene.aspect_ratio() > 0.0);
        }
    }

    #[test]
    fn test_cornell_box_view_hits_tall_block() {
        let scene = SceneKind::CornellBox.build_with_rng(&options(), &mut StdRng::seed_from_u64(2));
        assert_eq!(scene.aspect_ratio(), 1.0);
        assert!(!scene.use_sky_gradient);

        // Straight down the middle of the box the tall block faces the camera
        let ray = Ray::new_simple(Vec3::new(278.0, 278.0, -800.0), Vec3::Z);
        let rec = scene.world.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1095.0).abs() < 1e-2);
    }

    #[test]
    fn test_random_spheres_uses_sky_and_motion_blur() {
        let scene =
            SceneKind::RandomSpheres.build_with_rng(&options(), &mut StdRng::seed_from_u64(3));
        assert!(scene.use_sky_gradient);
        assert_eq!(scene.camera.shutter(), (0.0, 1.0));

        // The ground sphere is always below the camera
        let ray = Ray::new_simple(Vec3::new(13.0, 2.0, 3.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(scene.world.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());
    }
}
