//! Surface materials.
//!
//! A closed set of serde-tagged variants. Each can emit light, scatter an
//! incoming ray, or both.

use glam::DVec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use umbra_math::{Ray, Vec3Ext};

use crate::color::{Color, BLACK};
use crate::sampling::{gen_f64, random_in_unit_sphere};

/// Where a ray met a surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    pub position: DVec3,
    /// Unit outward normal.
    pub normal: DVec3,
}

/// A scattered ray and the color it is filtered by.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How light interacts with a surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Material {
    /// Neither scatters nor emits.
    #[default]
    Nothing,
    /// Constant radiance, never scatters.
    Emitter { color: Color },
    /// Lambertian.
    Diffuse { color: Color },
    /// Mirror reflection perturbed by `roughness` (0 = perfect mirror).
    Metallic { color: Color, roughness: f64 },
    /// Glass-like: reflects or refracts with Schlick probability.
    Dielectric { color: Color, refractive_index: f64 },
    /// Shadow catcher: only shows up where it is shadowed.
    Invisible { color: Color },
}

impl Material {
    pub fn light(color: Color) -> Self {
        Self::Emitter { color }
    }

    pub fn matt(color: Color) -> Self {
        Self::Diffuse { color }
    }

    pub fn metal(color: Color, roughness: f64) -> Self {
        Self::Metallic { color, roughness }
    }

    pub fn glass(color: Color, refractive_index: f64) -> Self {
        Self::Dielectric {
            color,
            refractive_index,
        }
    }

    /// A surface that only catches shadows.
    pub fn shadows_only() -> Self {
        Self::Invisible { color: BLACK }
    }

    pub fn steel() -> Self {
        Self::metal(DVec3::splat(0.4), 0.95)
    }

    pub fn stainless() -> Self {
        Self::metal(DVec3::splat(0.4), 0.3)
    }

    pub fn gold() -> Self {
        Self::metal(DVec3::new(0.93, 0.78, 0.31), 0.0)
    }

    pub fn copper() -> Self {
        Self::metal(DVec3::new(0.68, 0.45, 0.41), 0.8)
    }

    pub fn brass() -> Self {
        Self::metal(DVec3::new(0.80, 0.58, 0.45), 0.9)
    }

    /// Emitted radiance, if this is a light.
    pub fn emission(&self) -> Option<Color> {
        match self {
            Self::Emitter { color } => Some(*color),
            _ => None,
        }
    }

    pub fn is_invisible(&self) -> bool {
        matches!(self, Self::Invisible { .. })
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` when the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        hit: &SurfaceHit,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match *self {
            Self::Nothing | Self::Emitter { .. } => None,

            Self::Diffuse { color } | Self::Invisible { color } => {
                let mut direction = hit.normal + random_in_unit_sphere(rng);

                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-12 {
                    direction = hit.normal;
                }

                Some(ScatterResult {
                    attenuation: color,
                    scattered: Ray::new(hit.position, direction.normalize()),
                })
            }

            Self::Metallic { color, roughness } => {
                let mut reflected = ray_in.direction.normalize().reflect_about(hit.normal);
                if roughness > 0.0 {
                    let fuzz = (random_in_unit_sphere(rng) - hit.normal) * roughness;
                    reflected = (reflected + hit.normal + fuzz).normalize();
                }

                // Only scatter if the reflected ray leaves the surface
                if reflected.dot(hit.normal) > 0.0 {
                    Some(ScatterResult {
                        attenuation: color,
                        scattered: Ray::new(hit.position, reflected),
                    })
                } else {
                    None
                }
            }

            Self::Dielectric {
                color,
                refractive_index,
            } => {
                let unit = ray_in.direction.normalize();
                let cos_in = unit.dot(hit.normal);

                // Leaving the material when travelling along the normal
                let (outward, ni_over_nt, cosine) = if cos_in > 0.0 {
                    (-hit.normal, refractive_index, refractive_index * cos_in)
                } else {
                    (hit.normal, 1.0 / refractive_index, -cos_in)
                };

                let mut direction = unit.reflect_about(hit.normal);
                if gen_f64(rng) >= reflectance(cosine.min(1.0), refractive_index) {
                    if let Some(refracted) = unit.refract_through(outward, ni_over_nt) {
                        direction = refracted;
                    }
                }

                Some(ScatterResult {
                    attenuation: color,
                    scattered: Ray::new(hit.position, direction.normalize()),
                })
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Schlick's approximation for reflectance.
#[inline]
fn reflectance(cosine: f64, refractive_index: f64) -> f64 {
    let r0 = (1.0 - refractive_index) / (1.0 + refractive_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
