use crate::DVec3;

/// A ray in 3D space with an origin and a direction.
///
/// The marcher steps along `direction` by signed distances, so rays handed
/// to it are expected to carry a unit-length direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray from `origin` aimed at `target`, with a unit direction.
    pub fn towards(origin: DVec3, target: DVec3) -> Self {
        Self {
            origin,
            direction: (target - origin).normalize(),
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}
