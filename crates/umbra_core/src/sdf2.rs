//! 2D signed distance fields.
//!
//! These are profiles: they only become solids through `Sdf3::extrude` or
//! `Sdf3::revolve`.
//!
//! Formulas follow https://iquilezles.org/articles/distfunctions2d/

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use umbra_math::{clamp, sign, DVec2};

/// A compiled 2D distance function.
pub type DistanceFn2 = Arc<dyn Fn(DVec2) -> f64 + Send + Sync>;

/// A 2D shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sdf2 {
    Circle { radius: f64 },
    /// Axis-aligned rectangle given by its half extents.
    Rectangle { half: DVec2 },
    Triangle { points: [DVec2; 3] },
    /// Regular polygon with `sides` vertices on a circle of `radius`.
    Polygon { sides: u32, radius: f64 },
    /// Uneven capsule: circle `bottom` at the origin joined to circle `top`
    /// at `(0, height)`.
    Stadium { height: f64, bottom: f64, top: f64 },
    /// Parabolic arch from `(-width, 0)` through `(0, height)` to
    /// `(width, 0)`, closed along the x axis.
    Parabola { width: f64, height: f64 },
}

impl Sdf2 {
    pub fn circle(radius: f64) -> Self {
        Self::Circle { radius }
    }

    /// Rectangle of full size `width` x `height`, centered on the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::Rectangle {
            half: DVec2::new(width, height) / 2.0,
        }
    }

    pub fn triangle(p0: DVec2, p1: DVec2, p2: DVec2) -> Self {
        Self::Triangle {
            points: [p0, p1, p2],
        }
    }

    pub fn polygon(sides: u32, radius: f64) -> Self {
        Self::Polygon { sides, radius }
    }

    pub fn stadium(height: f64, bottom: f64, top: f64) -> Self {
        Self::Stadium {
            height,
            bottom,
            top,
        }
    }

    pub fn parabola(width: f64, height: f64) -> Self {
        Self::Parabola { width, height }
    }

    /// Evaluate the distance at a single point.
    ///
    /// Compiles the shape on every call; use `compile` when sampling often.
    pub fn distance(&self, point: DVec2) -> f64 {
        self.compile()(point)
    }

    /// Conservative bounding circle as (center, radius).
    pub fn bounding_circle(&self) -> (DVec2, f64) {
        match *self {
            Self::Circle { radius } => (DVec2::ZERO, radius),
            Self::Rectangle { half } => (DVec2::ZERO, half.length()),
            Self::Triangle { points } => (
                DVec2::ZERO,
                points.iter().map(|p| p.length()).fold(0.0, f64::max),
            ),
            Self::Polygon { radius, .. } => (DVec2::ZERO, radius),
            Self::Stadium {
                height,
                bottom,
                top,
            } => (
                DVec2::new(0.0, height / 2.0),
                height.abs() / 2.0 + bottom.max(top),
            ),
            Self::Parabola { width, height } => (
                DVec2::new(0.0, height / 2.0),
                DVec2::new(width, height / 2.0).length(),
            ),
        }
    }

    /// Build the distance closure for this shape.
    pub fn compile(&self) -> DistanceFn2 {
        match *self {
            Self::Circle { radius } => Arc::new(move |p: DVec2| p.length() - radius),

            Self::Rectangle { half } => Arc::new(move |p: DVec2| {
                let d = p.abs() - half;
                d.max(DVec2::ZERO).length() + d.x.max(d.y).min(0.0)
            }),

            Self::Triangle { points: [p0, p1, p2] } => {
                let e0 = p1 - p0;
                let e1 = p2 - p1;
                let e2 = p0 - p2;
                let s = sign(e0.perp_dot(e2));
                Arc::new(move |p: DVec2| {
                    let v0 = p - p0;
                    let v1 = p - p1;
                    let v2 = p - p2;
                    let pq0 = v0 - e0 * clamp(v0.dot(e0) / e0.dot(e0), 0.0, 1.0);
                    let pq1 = v1 - e1 * clamp(v1.dot(e1) / e1.dot(e1), 0.0, 1.0);
                    let pq2 = v2 - e2 * clamp(v2.dot(e2) / e2.dot(e2), 0.0, 1.0);
                    // x: squared distance to the nearest edge, y: inside test
                    let d = DVec2::new(pq0.dot(pq0), s * v0.perp_dot(e0))
                        .min(DVec2::new(pq1.dot(pq1), s * v1.perp_dot(e1)))
                        .min(DVec2::new(pq2.dot(pq2), s * v2.perp_dot(e2)));
                    -d.x.sqrt() * sign(d.y)
                })
            }

            Self::Polygon { sides, radius } => {
                let n = sides as f64 / 2.0;
                let o = PI / 2.0 / n;
                let (sin_o, cos_o) = o.sin_cos();
                Arc::new(move |p: DVec2| {
                    let a = p.y.atan2(p.x);
                    // Edge normal and nearest vertex angle for this sector
                    let t = (a / PI * n).round() / n * PI;
                    let d = ((a + o) / PI * n).round() / n * PI - o;
                    let f = DVec2::new(t.cos(), t.sin());

                    if DVec2::new(p.x, -p.y).dot(DVec2::new(f.y, f.x)).abs() < sin_o * radius {
                        return p.dot(f) - cos_o * radius;
                    }
                    (p - DVec2::new(d.cos(), d.sin()) * radius).length()
                })
            }

            Self::Stadium {
                height,
                bottom,
                top,
            } => {
                let b = (bottom - top) / height;
                let a = (1.0 - b * b).max(0.0).sqrt();
                Arc::new(move |p: DVec2| {
                    let p = DVec2::new(p.x.abs(), p.y);
                    let k = p.dot(DVec2::new(-b, a));
                    if k < 0.0 {
                        return p.length() - bottom;
                    }
                    if k > a * height {
                        return (p - DVec2::new(0.0, height)).length() - top;
                    }
                    p.dot(DVec2::new(a, b)) - bottom
                })
            }

            Self::Parabola { width, height } => {
                let ik = width * width / height;
                Arc::new(move |pos: DVec2| {
                    let px = pos.x.abs();
                    let p = ik * (height - pos.y - 0.5 * ik) / 3.0;
                    let q = px * ik * ik * 0.25;
                    let h = q * q - p * p * p;
                    let r = h.abs().sqrt();
                    let x = if h > 0.0 {
                        (q + r).cbrt() - (q - r).abs().cbrt() * sign(r - q)
                    } else {
                        2.0 * (r.atan2(q) / 3.0).cos() * p.sqrt()
                    };
                    let x = x.min(width);
                    let arc = (DVec2::new(px, pos.y) - DVec2::new(x, height - x * x / ik)).length()
                        * sign(ik * (pos.y - height) + px * px);
                    // Close the arch along the x axis
                    arc.max(-pos.y)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_circle() {
        let c = Sdf2::circle(2.0);
        assert!(c.distance(DVec2::new(2.0, 0.0)).abs() < EPS);
        assert!((c.distance(DVec2::ZERO) + 2.0).abs() < EPS);
        assert!((c.distance(DVec2::new(0.0, 5.0)) - 3.0).abs() < EPS);
    }

    #[test]
    fn test_rectangle() {
        let r = Sdf2::rectangle(4.0, 2.0);
        assert!(r.distance(DVec2::new(2.0, 0.0)).abs() < EPS);
        assert!(r.distance(DVec2::new(0.0, 1.0)).abs() < EPS);
        assert!((r.distance(DVec2::ZERO) + 1.0).abs() < EPS);
        // Outside a corner the distance is to the corner point
        let d = r.distance(DVec2::new(5.0, 5.0));
        assert!((d - DVec2::new(3.0, 4.0).length()).abs() < EPS);
    }

    #[test]
    fn test_triangle() {
        let t = Sdf2::triangle(
            DVec2::new(0.0, 2.0),
            DVec2::new(-1.0, 0.0),
            DVec2::new(1.0, 0.0),
        );
        // Midpoint of the base edge
        assert!(t.distance(DVec2::new(0.0, 0.0)).abs() < EPS);
        assert!(t.distance(DVec2::new(0.0, 0.5)) < 0.0);
        assert!((t.distance(DVec2::new(0.0, -3.0)) - 3.0).abs() < EPS);
    }

    #[test]
    fn test_polygon_hexagon() {
        let hex = Sdf2::polygon(6, 1.0);
        // Vertices sit on the circumcircle, half a sector off the x axis
        for i in 0..6 {
            let a = (2 * i + 1) as f64 * PI / 6.0;
            let vertex = DVec2::new(a.cos(), a.sin());
            assert!(hex.distance(vertex).abs() < 1e-6, "vertex {}", i);
        }
        // Inradius of a unit hexagon
        let apothem = (PI / 6.0).cos();
        assert!((hex.distance(DVec2::ZERO) + apothem).abs() < 1e-6);
        assert!(hex.distance(DVec2::new(3.0, 0.0)) > 1.0);
    }

    #[test]
    fn test_stadium() {
        let s = Sdf2::stadium(4.0, 1.0, 0.5);
        assert!(s.distance(DVec2::new(0.0, -1.0)).abs() < EPS);
        assert!(s.distance(DVec2::new(0.0, 4.5)).abs() < EPS);
        assert!(s.distance(DVec2::new(0.0, 2.0)) < 0.0);
        assert!(s.distance(DVec2::new(5.0, 2.0)) > 0.0);
    }

    #[test]
    fn test_parabola() {
        let p = Sdf2::parabola(2.0, 1.0);
        // Apex, feet and interior
        assert!(p.distance(DVec2::new(0.0, 1.0)).abs() < 1e-6);
        assert!(p.distance(DVec2::new(2.0, 0.0)).abs() < 1e-6);
        assert!(p.distance(DVec2::new(0.0, 0.5)) < 0.0);
        // Below the closing edge is outside
        assert!(p.distance(DVec2::new(0.0, -0.5)) > 0.0);
        assert!(p.distance(DVec2::new(0.0, 3.0)) > 0.0);
    }

    #[test]
    fn test_bounding_circles_contain_surfaces() {
        let shapes = [
            Sdf2::circle(1.5),
            Sdf2::rectangle(3.0, 1.0),
            Sdf2::polygon(5, 2.0),
            Sdf2::stadium(3.0, 1.0, 0.25),
            Sdf2::parabola(2.0, 3.0),
        ];
        for shape in &shapes {
            let (center, radius) = shape.bounding_circle();
            // Sample a ring just outside the bounding circle: must be exterior
            for i in 0..64 {
                let a = i as f64 / 64.0 * 2.0 * PI;
                let outside = center + DVec2::new(a.cos(), a.sin()) * (radius + 1e-3);
                assert!(shape.distance(outside) > 0.0, "{:?} at {:?}", shape, outside);
            }
        }
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Sdf2::circle(1.0)).unwrap();
        assert!(json.contains("\"type\":\"circle\""));
        let back: Sdf2 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Sdf2::circle(1.0));
    }
}
