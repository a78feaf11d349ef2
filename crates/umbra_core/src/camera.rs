//! Camera for ray generation.

use std::f64::consts::PI;

use glam::DVec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use umbra_math::Ray;

use crate::sampling::gen_f64;

/// Pinhole or thin-lens camera.
///
/// The basis is computed once at construction; `cast_ray` only combines it
/// with pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub origin: DVec3,
    // Basis: u points left, v up, w forward
    pub u: DVec3,
    pub v: DVec3,
    pub w: DVec3,
    /// Focal length for the field of view, `1 / tan(vfov / 2)`.
    pub scale: f64,
    /// Distance to the plane of perfect focus.
    pub focus: f64,
    /// Lens radius; 0 is a pinhole.
    pub aperture: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y, 40.0)
    }
}

impl Camera {
    /// Create a pinhole camera at `look_from` aimed at `look_at`.
    ///
    /// `vfov` is the vertical field of view in degrees.
    pub fn new(look_from: DVec3, look_at: DVec3, vup: DVec3, vfov: f64) -> Self {
        let w = (look_at - look_from).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u).normalize();
        Self {
            origin: look_from,
            u,
            v,
            w,
            scale: 1.0 / (vfov.to_radians() / 2.0).tan(),
            focus: (look_at - look_from).length(),
            aperture: 0.0,
        }
    }

    /// Set lens settings: focus on `point` with the given aperture radius.
    pub fn with_focus(mut self, point: DVec3, aperture: f64) -> Self {
        self.focus = (point - self.origin).length();
        self.aperture = aperture;
        self
    }

    /// Generate a ray through pixel (x, y) offset by the jitter (ju, jv).
    #[allow(clippy::too_many_arguments)]
    pub fn cast_ray(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        ju: f64,
        jv: f64,
        rng: &mut dyn RngCore,
    ) -> Ray {
        let aspect = width as f64 / height.max(1) as f64;
        let px = ((x as f64 + ju - 0.5) / (width as f64 - 1.0).max(1.0)) * 2.0 - 1.0;
        let py = ((y as f64 + jv - 0.5) / (height as f64 - 1.0).max(1.0)) * 2.0 - 1.0;

        let direction = (self.w * self.scale - self.u * (px * aspect) - self.v * py).normalize();

        if self.aperture <= 0.0 {
            return Ray::new(self.origin, direction);
        }

        // Thin lens: move the origin within the aperture disk and re-aim at
        // the point the pinhole ray would reach on the focal plane
        let focus_point = self.origin + direction * self.focus;
        let angle = gen_f64(rng) * 2.0 * PI;
        let radius = gen_f64(rng) * self.aperture;
        let origin =
            self.origin + self.u * (angle.cos() * radius) + self.v * (angle.sin() * radius);

        Ray::towards(origin, focus_point)
    }
}
