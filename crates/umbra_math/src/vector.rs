//! Vector helpers glam does not provide directly.

use glam::DVec3;

/// Extension trait for DVec3 with the optics and domain helpers used by
/// the shading and SDF code.
pub trait Vec3Ext {
    /// Reflect this vector about a (unit) normal.
    fn reflect_about(self, normal: DVec3) -> DVec3;

    /// Refract this vector through a surface with the given (unit) normal.
    ///
    /// `ni_over_nt` is the ratio of refractive indices across the surface.
    /// Returns `None` on total internal reflection.
    fn refract_through(self, normal: DVec3, ni_over_nt: f64) -> Option<DVec3>;

    /// Floor-based modulo per component, always in `[0, period)`.
    fn modulo(self, period: DVec3) -> DVec3;
}

impl Vec3Ext for DVec3 {
    #[inline]
    fn reflect_about(self, normal: DVec3) -> DVec3 {
        self - 2.0 * self.dot(normal) * normal
    }

    fn refract_through(self, normal: DVec3, ni_over_nt: f64) -> Option<DVec3> {
        let uv = self.normalize();
        let dt = uv.dot(normal);
        let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
        if discriminant > 0.0 {
            Some((uv - normal * dt) * ni_over_nt - normal * discriminant.sqrt())
        } else {
            None
        }
    }

    #[inline]
    fn modulo(self, period: DVec3) -> DVec3 {
        self - period * (self / period).floor()
    }
}

/// Sign of a value: -1, 0 or 1.
///
/// Unlike `f64::signum` this returns 0 for zero, which the polygon and
/// triangle distance functions rely on.
#[inline]
pub fn sign(value: f64) -> f64 {
    if value < 0.0 {
        -1.0
    } else if value > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Clamp without the `min <= max` assertion of `f64::clamp`.
#[inline]
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    high.min(low.max(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect() {
        let v = DVec3::new(1.0, -1.0, 0.0);
        let r = v.reflect_about(DVec3::Y);
        assert!((r - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_refract_normal_incidence_goes_straight() {
        // Straight down onto an upward normal: no bend at any index ratio
        let v = DVec3::NEG_Y;
        let r = v.refract_through(DVec3::Y, 1.0 / 1.5).unwrap();
        assert!((r - DVec3::NEG_Y).length() < 1e-12);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Grazing exit from glass into air cannot refract
        let v = DVec3::new(1.0, 0.1, 0.0).normalize();
        assert!(v.refract_through(DVec3::NEG_Y, 1.5).is_none());
    }

    #[test]
    fn test_modulo_negative() {
        let m = DVec3::new(-1.0, 5.0, 2.5).modulo(DVec3::splat(2.0));
        assert!((m - DVec3::new(1.0, 1.0, 0.5)).length() < 1e-12);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(2.0), 1.0);
    }
}
