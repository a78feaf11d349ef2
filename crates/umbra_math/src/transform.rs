// Transform utilities for DMat4
//
// Extends glam::DMat4 with the helpers the SDF transform nodes need.
// Note: glam::DMat4 already provides transform_point3(), determinant() and inverse()

use glam::{DMat4, DVec3};

/// Extension trait for DMat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Rotation of `degrees` about `axis` (normalized here), right-handed.
    fn rotation_degrees(axis: DVec3, degrees: f64) -> Self;

    /// Upper bound on how much the linear part can lengthen any vector.
    ///
    /// Square root of the largest absolute row sum of `MᵀM` (Gershgorin), so
    /// it holds under shear too. Exact for rotations and axis scales, whose
    /// `MᵀM` is diagonal.
    fn max_stretch(&self) -> f64;
}

impl Mat4Ext for DMat4 {
    fn rotation_degrees(axis: DVec3, degrees: f64) -> Self {
        DMat4::from_axis_angle(axis.normalize(), degrees.to_radians())
    }

    fn max_stretch(&self) -> f64 {
        let columns = [
            self.x_axis.truncate(),
            self.y_axis.truncate(),
            self.z_axis.truncate(),
        ];
        columns
            .iter()
            .map(|a| columns.iter().map(|b| a.dot(*b).abs()).sum::<f64>())
            .fold(0.0, f64::max)
            .sqrt()
    }
}
