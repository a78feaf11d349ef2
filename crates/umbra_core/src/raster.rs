//! Accumulated per-pixel samples and their resolve to 8-bit RGBA.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{CoreError, CoreResult};

/// Summed samples for one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub color: Color,
    pub rays: u32,
    /// Summed shadow-catcher alpha.
    pub alpha: f64,
}

impl Pixel {
    /// Add another pixel's samples to this one.
    #[inline]
    pub fn merge(&mut self, other: &Pixel) {
        self.color += other.color;
        self.rays += other.rays;
        self.alpha += other.alpha;
    }
}

/// How resolve turns accumulated alpha into output alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlphaMode {
    /// Transparent background; shadow catchers produce partial alpha.
    /// `low` is the penumbra cut-off, `high` the catcher's alpha limit.
    Shadow { low: f64, high: f64 },
    /// Opaque output with this color where nothing was hit.
    Background(Color),
}

/// Row-major grid of accumulated pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

impl Raster {
    /// An empty raster with every pixel zeroed.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::default(); width as usize * height as usize],
        }
    }

    /// Build from existing pixels, checking the count matches the size.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> CoreResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(CoreError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> &Pixel {
        &self.pixels[self.index(x, y)]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Pixel {
        let index = self.index(x, y);
        &mut self.pixels[index]
    }

    /// Total rays accumulated across all pixels.
    pub fn total_rays(&self) -> u64 {
        self.pixels.iter().map(|p| p.rays as u64).sum()
    }

    /// Add `other` into this raster pixel by pixel.
    pub fn merge(&mut self, other: &Raster) -> CoreResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(CoreError::RasterMismatch {
                expected: (self.width, self.height),
                actual: (other.width, other.height),
            });
        }
        for (mine, theirs) in self.pixels.iter_mut().zip(&other.pixels) {
            mine.merge(theirs);
        }
        Ok(())
    }

    /// Average, gamma-correct and quantize one pixel.
    pub fn resolve(&self, x: u32, y: u32, mode: AlphaMode) -> [u8; 4] {
        let pixel = self.pixel(x, y);

        if pixel.rays == 0 {
            return match mode {
                AlphaMode::Shadow { .. } => [0, 0, 0, 0],
                AlphaMode::Background(background) => opaque(background),
            };
        }

        let rays = pixel.rays as f64;
        let color = gamma(pixel.color / rays);
        let mut alpha = pixel.alpha / rays;

        match mode {
            AlphaMode::Shadow { low, high } => {
                if color == DVec3::ZERO {
                    return [0, 0, 0, 0];
                }
                if alpha < low {
                    alpha = 0.0;
                }
                if alpha < high + 0.01 {
                    let [r, g, b, _] = opaque(color);
                    return [r, g, b, to_byte(alpha)];
                }
                opaque(color)
            }
            AlphaMode::Background(background) => {
                if color == DVec3::ZERO {
                    opaque(background)
                } else {
                    opaque(color)
                }
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Square-root gamma, clamped to [0, 1].
#[inline]
fn gamma(color: Color) -> Color {
    DVec3::new(
        color.x.max(0.0).sqrt(),
        color.y.max(0.0).sqrt(),
        color.z.max(0.0).sqrt(),
    )
    .min(DVec3::ONE)
}

#[inline]
fn to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[inline]
fn opaque(color: Color) -> [u8; 4] {
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADOW: AlphaMode = AlphaMode::Shadow {
        low: 0.05,
        high: 0.6,
    };

    fn sample(seed: u32) -> Raster {
        let mut raster = Raster::new(3, 2);
        for (i, pixel) in raster.pixels.iter_mut().enumerate() {
            let k = (i as u32 + seed) as f64;
            pixel.color = DVec3::new(k * 0.25, k * 0.125, 1.0 / (k + 1.0));
            pixel.rays = i as u32 + seed;
            pixel.alpha = k * 0.5;
        }
        raster
    }

    #[test]
    fn test_merge_commutative() {
        let (a, b) = (sample(1), sample(7));

        let mut ab = a.clone();
        ab.merge(&b).unwrap();
        let mut ba = b.clone();
        ba.merge(&a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_associative() {
        let (a, b, c) = (sample(1), sample(2), sample(3));

        let mut left = a.clone();
        left.merge(&b).unwrap();
        left.merge(&c).unwrap();

        let mut bc = b.clone();
        bc.merge(&c).unwrap();
        let mut right = a.clone();
        right.merge(&bc).unwrap();

        for (l, r) in left.pixels.iter().zip(&right.pixels) {
            assert_eq!(l.rays, r.rays);
            assert!((l.color - r.color).length() < 1e-12);
            assert!((l.alpha - r.alpha).abs() < 1e-12);
        }
    }

    #[test]
    fn test_merge_size_mismatch() {
        let mut a = Raster::new(2, 2);
        let err = a.merge(&Raster::new(3, 2)).unwrap_err();
        assert_eq!(
            err,
            CoreError::RasterMismatch {
                expected: (2, 2),
                actual: (3, 2)
            }
        );
    }

    #[test]
    fn test_from_pixels_checks_count() {
        assert!(Raster::from_pixels(2, 2, vec![Pixel::default(); 4]).is_ok());
        assert!(matches!(
            Raster::from_pixels(2, 2, vec![Pixel::default(); 3]),
            Err(CoreError::PixelCount { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_resolve_zero_rays() {
        let raster = Raster::new(1, 1);
        assert_eq!(raster.resolve(0, 0, SHADOW), [0, 0, 0, 0]);

        let bg = AlphaMode::Background(DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(raster.resolve(0, 0, bg), [255, 0, 0, 255]);
    }

    #[test]
    fn test_resolve_gamma_and_average() {
        let mut raster = Raster::new(1, 1);
        // Four rays averaging 0.25 resolve to sqrt(0.25) = 0.5
        *raster.pixel_mut(0, 0) = Pixel {
            color: DVec3::splat(1.0),
            rays: 4,
            alpha: 4.0,
        };
        assert_eq!(raster.resolve(0, 0, SHADOW), [127, 127, 127, 255]);
        let bg = AlphaMode::Background(DVec3::ZERO);
        assert_eq!(raster.resolve(0, 0, bg), [127, 127, 127, 255]);
    }

    #[test]
    fn test_resolve_shadow_alpha() {
        let mut raster = Raster::new(3, 1);
        let c = DVec3::splat(0.01);
        // Partial shadow, below the penumbra cut-off, and black
        *raster.pixel_mut(0, 0) = Pixel { color: c, rays: 1, alpha: 0.5 };
        *raster.pixel_mut(1, 0) = Pixel { color: c, rays: 1, alpha: 0.02 };
        *raster.pixel_mut(2, 0) = Pixel { color: DVec3::ZERO, rays: 1, alpha: 1.0 };

        assert_eq!(raster.resolve(0, 0, SHADOW)[3], 127);
        assert_eq!(raster.resolve(1, 0, SHADOW)[3], 0);
        assert_eq!(raster.resolve(2, 0, SHADOW), [0, 0, 0, 0]);
    }

    #[test]
    fn test_resolve_clamps_bright_pixels() {
        let mut raster = Raster::new(1, 1);
        *raster.pixel_mut(0, 0) = Pixel {
            color: DVec3::splat(9.0),
            rays: 1,
            alpha: 1.0,
        };
        assert_eq!(raster.resolve(0, 0, SHADOW), [255, 255, 255, 255]);
    }
}
