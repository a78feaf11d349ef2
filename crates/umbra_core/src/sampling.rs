//! Random sampling helpers shared by the camera and materials.
//!
//! All sampling goes through an explicit `RngCore` so a render is
//! reproducible from its seed.

use glam::DVec3;
use rand::{Rng, RngCore};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen()
}

/// Random point strictly inside the unit ball (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> DVec3 {
    loop {
        let v = DVec3::new(
            gen_f64(rng) * 2.0 - 1.0,
            gen_f64(rng) * 2.0 - 1.0,
            gen_f64(rng) * 2.0 - 1.0,
        );
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}
