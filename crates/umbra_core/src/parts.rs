//! Ready-made things for building scenes.

use glam::DVec3;

use crate::material::Material;
use crate::sdf3::Sdf3;
use crate::thing::Thing;

/// Invisible ground slab whose top face is the z = 0 plane. Only the
/// shadows cast onto it show up.
pub fn space_time(size: f64) -> Thing {
    Thing::new(Material::shadows_only(), ground(size))
}

/// Dark wooden ground slab whose top face is the z = 0 plane.
pub fn work_bench(size: f64) -> Thing {
    Thing::new(Material::matt(DVec3::new(0.16, 0.12, 0.09)), ground(size))
}

fn ground(size: f64) -> Sdf3 {
    Sdf3::cube(size, size, 10.0).translate(DVec3::new(0.0, 0.0, -5.0))
}

/// An 18-tooth gear lying flat in the XY plane, with a hole through its hub.
pub fn gear_wheel() -> Sdf3 {
    Sdf3::difference(vec![Sdf3::union(gear_body()), gear_hole()])
}

/// Hub disc followed by the teeth.
fn gear_body() -> Vec<Sdf3> {
    let tooth = Sdf3::intersection(vec![
        Sdf3::cylinder(200.0, 110.0),
        Sdf3::cube(200.0, 200.0, 200.0),
    ])
    .distort(DVec3::new(1.0, 0.4, 1.0))
    .translate(DVec3::new(400.0, 0.0, 0.0));

    let mut wheel = vec![Sdf3::cylinder(200.0, 420.0)];
    wheel.extend((0..18).map(|i| tooth.clone().rotate(DVec3::Z, f64::from(i) * 20.0)));
    wheel
}

fn gear_hole() -> Sdf3 {
    Sdf3::cylinder(400.0, 200.0)
}
