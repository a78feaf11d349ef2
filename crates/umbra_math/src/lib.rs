//! Vector and matrix algebra for the umbra SDF path tracer.
//!
//! Everything is double precision: scenes are modelled in the thousands of
//! units while hit thresholds sit around 1e-4, which is beyond what `f32`
//! can resolve at those magnitudes.

// Re-export glam for convenience
pub use glam::*;

mod ray;
mod sphere;
mod transform;
mod vector;

pub use ray::Ray;
pub use sphere::BoundingSphere;
pub use transform::Mat4Ext;
pub use vector::{clamp, sign, Vec3Ext};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_creation() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_dvec3_operations() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, DVec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(DVec3::X.cross(DVec3::Y), DVec3::Z);
    }
}
