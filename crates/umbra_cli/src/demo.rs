//! Built-in showroom scene, written out by `umbra demo`.

use umbra_core::parts::work_bench;
use umbra_core::{Camera, Material, RenderSettings, Scene, Sdf2, Sdf3, Thing};
use umbra_math::DVec3;

/// One of each primitive in `material`, laid out around `origin`.
fn sampler(material: &Material, origin: DVec3) -> Vec<Thing> {
    let at = |offset: DVec3, sdf: Sdf3| {
        Thing::new(material.clone(), sdf.translate(origin + offset))
    };

    let mut things = vec![
        at(DVec3::new(0.0, 0.0, 500.0), Sdf3::sphere(500.0)),
        at(DVec3::new(0.0, 2000.0, 500.0), Sdf3::cube(1000.0, 1000.0, 1000.0)),
        at(DVec3::new(-1500.0, 0.0, 500.0), Sdf3::cylinder(1000.0, 500.0)),
        at(DVec3::new(1500.0, 2000.0, 500.0), Sdf3::cone(1000.0, 500.0)),
        at(DVec3::new(1500.0, 0.0, 500.0), Sdf3::torus(500.0, 350.0)),
        at(DVec3::new(-1500.0, 2000.0, 500.0), Sdf3::pyramid(1000.0, 1000.0)),
    ];

    for sides in 3..=8u32 {
        let x = f64::from(sides - 3) * 600.0 - 1450.0;
        things.push(at(
            DVec3::new(x, -1250.0, 250.0),
            Sdf3::extrude(500.0, Sdf2::polygon(sides, 250.0)),
        ));
    }

    things
}

/// Sphere trimmed by a cube, with three axis-aligned bars.
fn bored_ball(bars: f64, bored: bool) -> Sdf3 {
    let ball = Sdf3::intersection(vec![Sdf3::sphere(500.0), Sdf3::cube(900.0, 900.0, 900.0)]);
    let bar = || Sdf3::cylinder(bars, 200.0);
    let parts = vec![
        ball,
        bar(),
        bar().rotate(DVec3::X, 90.0),
        bar().rotate(DVec3::Y, 90.0),
    ];

    if bored {
        Sdf3::difference(parts)
    } else {
        Sdf3::union(parts)
    }
}

pub fn showroom() -> Scene {
    let settings = RenderSettings {
        width: 1280,
        height: 720,
        passes: 10,
        ..Default::default()
    };
    let camera = Camera::new(
        DVec3::new(0.0, -8000.0, 8000.0),
        DVec3::new(0.0, -1000.0, 500.0),
        DVec3::Z,
        40.0,
    );
    let mut scene = Scene::new(camera, settings);

    scene.add(work_bench(25000.0));
    scene.add(Thing::new(
        Material::light(DVec3::splat(4.0)),
        Sdf3::sphere(10000.0).translate(DVec3::new(-7500.0, 0.0, 20000.0)),
    ));

    let brass = Material::brass();
    scene.add(Thing::new(
        brass.clone(),
        bored_ball(1002.0, true).translate(DVec3::new(-5500.0, 0.0, 500.0)),
    ));
    scene.add(Thing::new(
        brass.clone(),
        bored_ball(1250.0, false).translate(DVec3::new(5500.0, 0.0, 500.0)),
    ));
    scene.add(Thing::new(
        brass.clone(),
        Sdf3::cube(800.0, 800.0, 800.0)
            .round(100.0)
            .translate(DVec3::new(6500.0, 3500.0, 500.0)),
    ));
    scene.add(Thing::new(
        brass,
        Sdf3::cylinder(800.0, 500.0)
            .round(100.0)
            .translate(DVec3::new(-6500.0, 3500.0, 500.0)),
    ));

    let samplers = [
        (Material::steel(), DVec3::new(-2500.0, -2750.0, 0.0)),
        (Material::copper(), DVec3::new(2500.0, -2750.0, 0.0)),
        (Material::stainless(), DVec3::new(-2500.0, 2250.0, 0.0)),
        (Material::gold(), DVec3::new(2500.0, 2250.0, 0.0)),
    ];
    for (material, origin) in &samplers {
        for thing in sampler(material, *origin) {
            scene.add(thing);
        }
    }

    for i in 0..9 {
        let tint = if i % 2 == 0 {
            DVec3::new(0.5, 1.0, 0.5)
        } else {
            DVec3::new(0.5, 0.5, 1.0)
        };
        scene.add(Thing::new(
            Material::glass(tint, 1.5),
            Sdf3::sphere(250.0).translate(DVec3::new(0.0, f64::from(i) * 1000.0 - 3500.0, 250.0)),
        ));
    }

    scene
}
