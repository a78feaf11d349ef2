//! Single-pass rendering of a scene into a raster.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use umbra_core::sampling::gen_f64;
use umbra_core::{Pixel, Raster, Scene, Thing};

use crate::error::RenderResult;
use crate::trace::path_trace;

/// Render one pass of `scene`.
///
/// Every pixel receives `samples` jittered rays. Rows run in parallel on a
/// pool of `settings.workers` threads (0 = all cores), each with its own
/// generator seeded from the scene's root seed, so a fixed seed always
/// gives the same raster.
pub fn render_pass(scene: &Scene) -> RenderResult<Raster> {
    let settings = &scene.settings;
    let mut raster = scene.blank_raster();
    if settings.width == 0 || settings.height == 0 {
        return Ok(raster);
    }

    let things = scene.prepared_things();

    // Draw every row seed up front so rows can run in any order
    let mut root = StdRng::seed_from_u64(scene.effective_seed());
    let row_seeds: Vec<u64> = (0..settings.height).map(|_| root.gen()).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers)
        .build()?;

    pool.install(|| {
        raster
            .pixels
            .par_chunks_mut(settings.width as usize)
            .zip(row_seeds.par_iter())
            .enumerate()
            .for_each(|(y, (row, &seed))| {
                let mut rng = StdRng::seed_from_u64(seed);
                render_row(scene, &things, y as u32, row, &mut rng);
            });
    });

    Ok(raster)
}

fn render_row(scene: &Scene, things: &[Thing], y: u32, row: &mut [Pixel], rng: &mut StdRng) {
    let settings = &scene.settings;

    for (x, pixel) in row.iter_mut().enumerate() {
        for _ in 0..settings.samples {
            let ju = gen_f64(rng);
            let jv = gen_f64(rng);
            let ray = scene.camera.cast_ray(
                x as u32,
                y,
                settings.width,
                settings.height,
                ju,
                jv,
                rng,
            );

            match path_trace(things, settings, &ray, 0, None, rng) {
                Some(radiance) => {
                    pixel.color += radiance.color;
                    pixel.alpha += radiance.alpha;
                }
                None => pixel.color += settings.miss_color(),
            }
            pixel.rays += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::{Camera, Material, RenderSettings, Sdf3};
    use umbra_math::DVec3;

    fn small_scene(seed: u64) -> Scene {
        let settings = RenderSettings {
            width: 16,
            height: 12,
            samples: 2,
            bounces: 2,
            workers: 2,
            ..Default::default()
        };
        let mut scene = Scene::new(Camera::default(), settings).with_seed(seed);
        scene.add(Thing::new(
            Material::light(DVec3::splat(3.0)),
            Sdf3::sphere(1.0).translate(DVec3::new(0.0, 4.0, 0.0)),
        ));
        scene.add(Thing::new(Material::matt(DVec3::splat(0.6)), Sdf3::sphere(1.5)));
        scene
    }

    #[test]
    fn test_every_pixel_gets_samples() {
        let raster = render_pass(&small_scene(42)).unwrap();
        assert_eq!((raster.width, raster.height), (16, 12));
        assert!(raster.pixels.iter().all(|p| p.rays == 2));
        assert!(raster.pixels.iter().all(|p| p.color.is_finite()));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let a = render_pass(&small_scene(7)).unwrap();
        let b = render_pass(&small_scene(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let mut single = small_scene(7);
        single.settings.workers = 1;
        let mut many = small_scene(7);
        many.settings.workers = 4;
        assert_eq!(render_pass(&single).unwrap(), render_pass(&many).unwrap());
    }

    #[test]
    fn test_background_shows_where_rays_miss() {
        let settings = RenderSettings {
            width: 2,
            height: 2,
            samples: 3,
            background: Some(DVec3::new(1.0, 0.0, 0.0)),
            ..Default::default()
        };
        let mut scene = Scene::new(Camera::default(), settings).with_seed(5);
        let raster = render_pass(&scene).unwrap();
        scene.merge(&raster).unwrap();

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(scene.resolve(x, y), [255, 0, 0, 255]);
        }
    }

    #[test]
    fn test_ambient_fills_misses_without_background() {
        let settings = RenderSettings {
            width: 2,
            height: 2,
            ..Default::default()
        };
        let scene = Scene::new(Camera::default(), settings).with_seed(5);
        let raster = render_pass(&scene).unwrap();
        let ambient = scene.settings.ambient;
        assert!(raster.pixels.iter().all(|p| p.color == ambient && p.alpha == 0.0));
    }

    #[test]
    fn test_empty_image() {
        let mut scene = small_scene(1);
        scene.settings.width = 0;
        let raster = render_pass(&scene).unwrap();
        assert!(raster.pixels.is_empty());
    }
}
