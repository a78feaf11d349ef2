//! Bounding spheres for cheap rejection of rays and distance queries.

use crate::{DMat4, DVec3, Mat4Ext, Ray};

/// A conservative sphere containing an entire shape.
///
/// An infinite radius marks an unbounded shape (infinite domain repetition):
/// every ray crosses it and its distance is always `-inf`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a new bounding sphere.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// A sphere enclosing all of space.
    pub fn unbounded() -> Self {
        Self {
            center: DVec3::ZERO,
            radius: f64::INFINITY,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.radius.is_infinite()
    }

    /// Signed distance from `point` to the sphere surface.
    ///
    /// A lower bound on the distance to anything inside the sphere.
    #[inline]
    pub fn distance(&self, point: DVec3) -> f64 {
        (point - self.center).length() - self.radius
    }

    /// Analytic ray/sphere test.
    ///
    /// True when either intersection of the ray's line with the sphere lies
    /// further along the ray than `threshold`. Expects a unit direction.
    pub fn crossed_by(&self, ray: &Ray, threshold: f64) -> bool {
        let to = ray.origin - self.center;
        let b = to.dot(ray.direction);
        let c = to.dot(to) - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return false;
        }
        let root = discriminant.sqrt();
        let t1 = -b - root;
        let t2 = -b + root;
        t1 > threshold || t2 > threshold
    }

    /// Apply an affine transform, scaling the radius by the matrix's
    /// largest stretch so the result stays conservative.
    pub fn transformed(&self, matrix: &DMat4) -> Self {
        Self {
            center: matrix.transform_point3(self.center),
            radius: self.radius * matrix.max_stretch(),
        }
    }

    /// Grow by `amount` in every direction.
    pub fn expanded(&self, amount: f64) -> Self {
        Self {
            center: self.center,
            radius: self.radius + amount,
        }
    }

    /// A sphere enclosing every sphere in `spheres`.
    ///
    /// Centered on the average of the child centers. The radius grows until it
    /// reaches the farthest point of every child, `|c_i - center| + r_i`,
    /// which includes each child's six axis extremes.
    pub fn enclosing(spheres: &[BoundingSphere]) -> Self {
        if spheres.is_empty() {
            return Self::new(DVec3::ZERO, 0.0);
        }
        if spheres.iter().any(|s| s.is_unbounded()) {
            return Self::unbounded();
        }

        let center = spheres.iter().map(|s| s.center).sum::<DVec3>() / spheres.len() as f64;
        let radius = spheres
            .iter()
            .map(|s| (s.center - center).length() + s.radius)
            .fold(0.0, f64::max);

        Self { center, radius }
    }
}
