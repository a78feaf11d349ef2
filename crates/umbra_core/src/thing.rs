//! A renderable object: one shape with one material.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use umbra_math::BoundingSphere;

use crate::material::Material;
use crate::sdf3::{DistanceFn3, Sdf3};

/// Central-difference step for normals.
const NORMAL_EPSILON: f64 = 1e-6;

/// A shape paired with its material.
///
/// Call `prepare` before marching; it compiles the distance closure once and
/// caches the bounding sphere so per-sample queries stay cheap.
#[derive(Clone, Serialize, Deserialize)]
pub struct Thing {
    pub material: Material,
    pub sdf: Sdf3,

    // Cached values (computed in prepare)
    #[serde(skip)]
    compiled: Option<DistanceFn3>,
    #[serde(skip)]
    sphere: Option<BoundingSphere>,
}

impl std::fmt::Debug for Thing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thing")
            .field("material", &self.material)
            .field("sdf", &self.sdf)
            .field("prepared", &self.compiled.is_some())
            .finish()
    }
}

impl Thing {
    pub fn new(material: Material, sdf: Sdf3) -> Self {
        Self {
            material,
            sdf,
            compiled: None,
            sphere: None,
        }
    }

    /// Compile the distance function and cache the bounding sphere.
    pub fn prepare(&mut self) {
        self.compiled = Some(self.sdf.compile());
        self.sphere = Some(self.sdf.bounding_sphere());
    }

    pub fn is_prepared(&self) -> bool {
        self.compiled.is_some()
    }

    /// Signed distance from `point` to the surface.
    pub fn distance(&self, point: DVec3) -> f64 {
        match &self.compiled {
            Some(f) => f(point),
            None => self.sdf.distance(point),
        }
    }

    /// Outward surface normal, from the distance gradient.
    pub fn normal(&self, point: DVec3) -> DVec3 {
        let dx = DVec3::new(NORMAL_EPSILON, 0.0, 0.0);
        let dy = DVec3::new(0.0, NORMAL_EPSILON, 0.0);
        let dz = DVec3::new(0.0, 0.0, NORMAL_EPSILON);
        DVec3::new(
            self.distance(point + dx) - self.distance(point - dx),
            self.distance(point + dy) - self.distance(point - dy),
            self.distance(point + dz) - self.distance(point - dz),
        )
        .normalize()
    }

    pub fn sphere(&self) -> BoundingSphere {
        self.sphere.unwrap_or_else(|| self.sdf.bounding_sphere())
    }

    /// Lower bound on `distance(point)`.
    pub fn bounding_distance(&self, point: DVec3) -> f64 {
        self.sphere().distance(point)
    }
}
