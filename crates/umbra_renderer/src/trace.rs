//! Recursive path tracing with shadow-catcher support.

use rand::RngCore;
use umbra_core::sampling::random_in_unit_sphere;
use umbra_core::{brightness, Color, RenderSettings, SurfaceHit, Thing, WHITE};
use umbra_math::{DVec3, Ray};

use crate::march::march;

/// Light carried back along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radiance {
    pub color: Color,
    /// Shadow-catcher alpha; 1 for ordinary surfaces.
    pub alpha: f64,
    /// Scatter events along the path.
    pub bounces: u32,
}

/// Compute the light arriving along `ray`.
///
/// Returns `None` only when a primary ray (depth 0) hits nothing, so the
/// caller can tell background from geometry.
pub fn path_trace(
    things: &[Thing],
    settings: &RenderSettings,
    ray: &Ray,
    depth: u32,
    bypass: Option<usize>,
    rng: &mut dyn RngCore,
) -> Option<Radiance> {
    let Some(hit) = march(things, settings, ray, bypass) else {
        if depth == 0 {
            return None;
        }
        return Some(Radiance {
            color: settings.ambient,
            alpha: 1.0,
            bounces: 0,
        });
    };

    let thing = &things[hit.index];
    let invisible = thing.material.is_invisible();
    let shadow = &settings.shadow;

    let mut color = Color::ZERO;
    let mut alpha = 1.0;
    let mut bounces = 0;

    if depth == 0 && invisible {
        alpha = shadow.high;
        // A catcher in direct light has no shadow to show
        if brightness(direct_light(things, settings, hit.position, rng)) > 0.0 {
            alpha = 0.0;
        }
    }

    if alpha > 0.0 && depth <= settings.bounces {
        let surface = SurfaceHit {
            position: hit.position,
            normal: thing.normal(hit.position),
        };

        if let Some(scatter) = thing.material.scatter(ray, &surface, rng) {
            // Catchers seen indirectly pass ambient light straight through
            let (attenuation, incoming) = if depth > 0 && invisible {
                (WHITE, settings.ambient)
            } else {
                match path_trace(
                    things,
                    settings,
                    &scatter.scattered,
                    depth + 1,
                    Some(hit.index),
                    rng,
                ) {
                    Some(traced) => {
                        bounces = traced.bounces;
                        (scatter.attenuation, traced.color)
                    }
                    None => (scatter.attenuation, settings.ambient),
                }
            };

            color += attenuation * incoming;

            // Light reaching a catcher only thins its shadow
            if depth == 0 && invisible {
                alpha = shadow
                    .high
                    .min((alpha - brightness(incoming) / shadow.divisor).max(0.0));
                color = attenuation;
            }
        }

        bounces += 1;
    }

    if let Some(light) = thing.material.emission() {
        color += light;
    }

    Some(Radiance {
        color,
        alpha,
        bounces,
    })
}

/// Sum the emission of every light visible from `position`.
///
/// Each light is sampled once at a point jittered around its bounding
/// sphere center, which softens shadow edges.
pub fn direct_light(
    things: &[Thing],
    settings: &RenderSettings,
    position: DVec3,
    rng: &mut dyn RngCore,
) -> Color {
    let mut color = Color::ZERO;

    for (index, thing) in things.iter().enumerate() {
        let Some(light) = thing.material.emission() else {
            continue;
        };

        let sphere = thing.sphere();
        let mut target = sphere.center;
        if !sphere.is_unbounded() {
            target += random_in_unit_sphere(rng) * (sphere.radius * settings.shadow.radius);
        }

        let ray = Ray::towards(position, target);
        if march(things, settings, &ray, None).map(|hit| hit.index) == Some(index) {
            color += light;
        }
    }

    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_core::{Material, Sdf3};

    fn prepared(mut things: Vec<Thing>) -> Vec<Thing> {
        things.iter_mut().for_each(Thing::prepare);
        things
    }

    fn light_above() -> Thing {
        Thing::new(
            Material::light(DVec3::splat(4.0)),
            Sdf3::sphere(1.0).translate(DVec3::new(0.0, 10.0, 0.0)),
        )
    }

    #[test]
    fn test_primary_miss_is_none() {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = RenderSettings::default();
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        assert!(path_trace(&[], &settings, &ray, 0, None, &mut rng).is_none());

        let deeper = path_trace(&[], &settings, &ray, 1, None, &mut rng).unwrap();
        assert_eq!(deeper.color, settings.ambient);
        assert_eq!(deeper.alpha, 1.0);
    }

    #[test]
    fn test_light_seen_directly() {
        let mut rng = StdRng::seed_from_u64(42);
        let things = prepared(vec![light_above()]);
        let settings = RenderSettings::default();
        let ray = Ray::new(DVec3::ZERO, DVec3::Y);

        let r = path_trace(&things, &settings, &ray, 0, None, &mut rng).unwrap();
        assert_eq!(r.color, DVec3::splat(4.0));
        assert_eq!(r.alpha, 1.0);
    }

    #[test]
    fn test_lit_diffuse_with_zero_bounces() {
        let mut rng = StdRng::seed_from_u64(42);
        let things = prepared(vec![
            light_above(),
            Thing::new(Material::matt(DVec3::splat(0.5)), Sdf3::sphere(1.0)),
        ]);
        let settings = RenderSettings {
            bounces: 0,
            ..Default::default()
        };
        let ray = Ray::towards(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO);

        for _ in 0..20 {
            let r = path_trace(&things, &settings, &ray, 0, None, &mut rng).unwrap();
            assert!(r.color.is_finite());
            // Either the light or the ambient was reached, never nothing
            assert!(r.color.min_element() > 0.0);
            assert_eq!(r.bounces, 1);
        }
    }

    #[test]
    fn test_direct_light_and_occlusion() {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = RenderSettings::default();

        let open = prepared(vec![light_above()]);
        let lit = direct_light(&open, &settings, DVec3::ZERO, &mut rng);
        assert_eq!(lit, DVec3::splat(4.0));

        let blocked = prepared(vec![
            light_above(),
            Thing::new(
                Material::Nothing,
                Sdf3::cube(10.0, 0.5, 10.0).translate(DVec3::new(0.0, 5.0, 0.0)),
            ),
        ]);
        let dark = direct_light(&blocked, &settings, DVec3::ZERO, &mut rng);
        assert_eq!(dark, DVec3::ZERO);
    }

    #[test]
    fn test_catcher_in_light_is_transparent() {
        let mut rng = StdRng::seed_from_u64(42);
        let things = prepared(vec![
            light_above(),
            Thing::new(Material::shadows_only(), Sdf3::cube(20.0, 1.0, 20.0)),
        ]);
        let settings = RenderSettings::default();
        let ray = Ray::towards(DVec3::new(0.0, 5.0, 5.0), DVec3::new(0.0, 0.5, 0.0));

        let r = path_trace(&things, &settings, &ray, 0, None, &mut rng).unwrap();
        assert_eq!(r.alpha, 0.0);
    }

    #[test]
    fn test_catcher_in_shadow_keeps_alpha() {
        let mut rng = StdRng::seed_from_u64(42);
        let things = prepared(vec![
            light_above(),
            Thing::new(Material::shadows_only(), Sdf3::cube(20.0, 1.0, 20.0)),
            // Blocker between the light and the floor
            Thing::new(
                Material::Nothing,
                Sdf3::cube(6.0, 0.5, 6.0).translate(DVec3::new(0.0, 5.0, 0.0)),
            ),
        ]);
        let settings = RenderSettings {
            ambient: DVec3::ZERO,
            ..Default::default()
        };
        let ray = Ray::towards(DVec3::new(0.0, 3.0, 1.0), DVec3::new(0.0, 0.5, 0.0));

        let r = path_trace(&things, &settings, &ray, 0, None, &mut rng).unwrap();
        assert!(r.alpha > 0.0);
        assert!(r.alpha <= settings.shadow.high);
        // The catcher reports its own attenuation, not the light it saw
        assert_eq!(r.color, umbra_core::BLACK);
    }
}
