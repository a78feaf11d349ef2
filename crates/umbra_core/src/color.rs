//! Linear RGB colors.
//!
//! Colors are plain `DVec3`s: non-negative per channel, unclamped, and summed
//! additively until the resolve step tone-maps them.

use glam::DVec3;

/// Color type alias (linear RGB, typically 0-1 but unbounded above)
pub type Color = DVec3;

pub const WHITE: Color = DVec3::ONE;

/// Near-black that still reflects a trace of light.
pub const BLACK: Color = DVec3::splat(0.001);

/// Perceived brightness (Rec. 601 luma weights).
#[inline]
pub fn brightness(color: Color) -> f64 {
    0.299 * color.x + 0.587 * color.y + 0.114 * color.z
}

/// Color from a 0xRRGGBB literal.
pub fn hex(rgb: u32) -> Color {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f64 / 255.0;
    DVec3::new(channel(16), channel(8), channel(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_of_white() {
        assert!((brightness(WHITE) - 1.0).abs() < 1e-12);
        assert_eq!(brightness(Color::ZERO), 0.0);
    }

    #[test]
    fn test_hex() {
        let c = hex(0xff8000);
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(c.z, 0.0);
    }
}
