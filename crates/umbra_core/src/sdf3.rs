//! 3D signed distance fields.
//!
//! An `Sdf3` is a tree of primitives, combinators and boolean operations.
//! `compile` walks the tree once and returns a single closure that captures
//! each child's already-compiled closure, so per-sample evaluation never
//! re-traverses the tree.
//!
//! Every distance is a conservative estimate (negative inside, zero on the
//! surface) and every bounding sphere contains the whole shape.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use umbra_math::{BoundingSphere, DMat4, DVec2, DVec3, Mat4Ext, Vec3Ext};

use crate::csg;
use crate::sdf2::Sdf2;

/// A compiled 3D distance function.
pub type DistanceFn3 = Arc<dyn Fn(DVec3) -> f64 + Send + Sync>;

/// A 3D shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sdf3 {
    // Primitives
    Sphere {
        radius: f64,
    },
    /// Axis-aligned box given by its half extents.
    Cube {
        half: DVec3,
    },
    /// Ring around the Y axis.
    Torus {
        major: f64,
        minor: f64,
    },
    /// Cone along Z with its tip at `+height/2` and base at `-height/2`.
    Cone {
        height: f64,
        radius: f64,
    },
    Ellipsoid {
        radii: DVec3,
    },
    /// 2D profile in XY, capped along Z.
    Extrude {
        half_height: f64,
        shape: Sdf2,
    },
    /// 2D profile swept around the Y axis; profile x is the distance from
    /// the axis minus `offset`, profile y is Y.
    Revolve {
        offset: f64,
        shape: Sdf2,
    },

    // Combinators
    /// Affine transform. Stores the inverse to map sample points back into
    /// the child's space.
    Transform {
        matrix: DMat4,
        inverse: DMat4,
        shape: Box<Sdf3>,
    },
    Scale {
        factor: f64,
        shape: Box<Sdf3>,
    },
    /// Non-uniform scale.
    Distort {
        factor: DVec3,
        shape: Box<Sdf3>,
    },
    Round {
        radius: f64,
        shape: Box<Sdf3>,
    },
    /// Shell of `thickness` around the child's surface.
    Hollow {
        thickness: f64,
        shape: Box<Sdf3>,
    },
    /// Stretch by clamping the domain to `[-half, half]`.
    Elongate {
        half: DVec3,
        shape: Box<Sdf3>,
    },
    /// `2 * count + 1` copies per axis spaced by `offset`.
    Repeat {
        count: DVec3,
        offset: DVec3,
        shape: Box<Sdf3>,
    },
    /// Endless tiling with the given cell size.
    RepeatInfinite {
        period: DVec3,
        shape: Box<Sdf3>,
    },

    // Boolean operations
    Union {
        items: Vec<Sdf3>,
    },
    /// `items[0]` minus every following item.
    Difference {
        items: Vec<Sdf3>,
    },
    Intersection {
        items: Vec<Sdf3>,
    },
}

impl Sdf3 {
    // =========================================================================
    // Primitives
    // =========================================================================

    pub fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Box of full size `x` by `y` by `z`, centered on the origin.
    pub fn cube(x: f64, y: f64, z: f64) -> Self {
        Self::Cube {
            half: DVec3::new(x, y, z) / 2.0,
        }
    }

    /// Box with edges rounded by `r`; overall size stays `x` by `y` by `z`.
    pub fn cube_rounded(x: f64, y: f64, z: f64, r: f64) -> Self {
        let d = r * 2.0;
        Self::cube(x - d, y - d, z - d).round(r)
    }

    /// Cylinder along Z of total height `h`.
    pub fn cylinder(h: f64, r: f64) -> Self {
        Self::extrude(h, Sdf2::circle(r))
    }

    /// Cylinder with edges rounded by `ro`.
    pub fn cylinder_rounded(h: f64, r: f64, ro: f64) -> Self {
        Self::cylinder(h - ro * 2.0, r - ro).round(ro)
    }

    /// Capsule along Z between spheres of radius `r1` (bottom) and `r2`
    /// (top) whose centers are `h` apart, centered on the origin.
    pub fn capsule(h: f64, r1: f64, r2: f64) -> Self {
        Self::revolve(0.0, Sdf2::stadium(h, r1, r2))
            .rotate(DVec3::X, 90.0)
            .translate(DVec3::new(0.0, 0.0, -h / 2.0))
    }

    /// Torus in the XZ plane with the given outer and inner radii.
    pub fn torus(outer: f64, inner: f64) -> Self {
        let w = outer - inner;
        Self::Torus {
            major: outer - w / 2.0,
            minor: w / 2.0,
        }
    }

    pub fn cone(height: f64, radius: f64) -> Self {
        Self::Cone { height, radius }
    }

    pub fn ellipsoid(x: f64, y: f64, z: f64) -> Self {
        Self::Ellipsoid {
            radii: DVec3::new(x, y, z),
        }
    }

    /// Triangular prism: apex up along Z, `w` wide at the base, `w` deep.
    pub fn tri_prism(h: f64, w: f64) -> Self {
        let profile = Sdf2::triangle(
            DVec2::new(0.0, h),
            DVec2::new(-w / 2.0, 0.0),
            DVec2::new(w / 2.0, 0.0),
        );
        Self::extrude(w, profile)
            .rotate(DVec3::X, 90.0)
            .translate(DVec3::new(0.0, 0.0, -h / 2.0))
    }

    /// Square pyramid built from two crossed prisms.
    pub fn pyramid(h: f64, w: f64) -> Self {
        let prism = Self::tri_prism(h, w);
        Self::intersection(vec![prism.clone(), prism.rotate(DVec3::Z, 90.0)])
    }

    /// Extrude a 2D profile along Z to total height `h`.
    pub fn extrude(h: f64, shape: Sdf2) -> Self {
        Self::Extrude {
            half_height: h / 2.0,
            shape,
        }
    }

    pub fn revolve(offset: f64, shape: Sdf2) -> Self {
        Self::Revolve { offset, shape }
    }

    // =========================================================================
    // Combinators
    // =========================================================================

    pub fn translate(self, v: DVec3) -> Self {
        self.transform(DMat4::from_translation(v))
    }

    /// Rotate by `degrees` around `axis` (right-handed).
    pub fn rotate(self, axis: DVec3, degrees: f64) -> Self {
        self.transform(DMat4::rotation_degrees(axis, degrees))
    }

    /// Apply an affine transform.
    ///
    /// Any matrix works, but one that stretches unevenly gives a looser
    /// distance and slower marching. Prefer `scale` or `distort` for size.
    pub fn transform(self, matrix: DMat4) -> Self {
        Self::Transform {
            matrix,
            inverse: matrix.inverse(),
            shape: Box::new(self),
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::Scale {
            factor,
            shape: Box::new(self),
        }
    }

    pub fn distort(self, factor: DVec3) -> Self {
        Self::Distort {
            factor,
            shape: Box::new(self),
        }
    }

    pub fn round(self, radius: f64) -> Self {
        Self::Round {
            radius,
            shape: Box::new(self),
        }
    }

    pub fn hollow(self, thickness: f64) -> Self {
        Self::Hollow {
            thickness,
            shape: Box::new(self),
        }
    }

    pub fn elongate(self, half: DVec3) -> Self {
        Self::Elongate {
            half: half.abs(),
            shape: Box::new(self),
        }
    }

    pub fn repeat(self, count: DVec3, offset: DVec3) -> Self {
        Self::Repeat {
            count: count.abs(),
            offset,
            shape: Box::new(self),
        }
    }

    pub fn repeat_infinite(self, period: DVec3) -> Self {
        Self::RepeatInfinite {
            period,
            shape: Box::new(self),
        }
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate the distance at a single point.
    ///
    /// Compiles the whole tree on every call; use `compile` when sampling
    /// many points.
    pub fn distance(&self, point: DVec3) -> f64 {
        self.compile()(point)
    }

    /// Conservative bounding sphere of the shape.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        match self {
            Self::Sphere { radius } => BoundingSphere::new(DVec3::ZERO, *radius),
            Self::Cube { half } => BoundingSphere::new(DVec3::ZERO, half.length()),
            Self::Torus { major, minor } => BoundingSphere::new(DVec3::ZERO, major + minor),
            Self::Cone { height, radius } => {
                BoundingSphere::new(DVec3::ZERO, DVec2::new(height / 2.0, *radius).length())
            }
            Self::Ellipsoid { radii } => BoundingSphere::new(DVec3::ZERO, radii.max_element()),
            Self::Extrude { half_height, shape } => {
                let (center, radius) = shape.bounding_circle();
                BoundingSphere::new(
                    center.extend(0.0),
                    DVec2::new(radius, *half_height).length(),
                )
            }
            Self::Revolve { offset, shape } => {
                let (center, radius) = shape.bounding_circle();
                let reach = offset.abs() + center.x.abs() + radius;
                BoundingSphere::new(
                    DVec3::new(0.0, center.y, 0.0),
                    DVec2::new(reach, radius).length(),
                )
            }
            Self::Transform { matrix, shape, .. } => shape.bounding_sphere().transformed(matrix),
            Self::Scale { factor, shape } => {
                let inner = shape.bounding_sphere();
                BoundingSphere::new(inner.center * *factor, inner.radius * factor.abs())
            }
            Self::Distort { factor, shape } => {
                let inner = shape.bounding_sphere();
                BoundingSphere::new(
                    inner.center * *factor,
                    inner.radius * factor.abs().max_element(),
                )
            }
            Self::Round { radius, shape } => shape.bounding_sphere().expanded(*radius),
            Self::Hollow { thickness, shape } => {
                shape.bounding_sphere().expanded(thickness.abs())
            }
            Self::Elongate { half, shape } => shape.bounding_sphere().expanded(half.length()),
            Self::Repeat {
                count,
                offset,
                shape,
            } => shape
                .bounding_sphere()
                .expanded((*count * *offset).length()),
            Self::RepeatInfinite { .. } => BoundingSphere::unbounded(),
            Self::Union { items } | Self::Difference { items } | Self::Intersection { items } => {
                let spheres: Vec<BoundingSphere> =
                    items.iter().map(|item| item.bounding_sphere()).collect();
                BoundingSphere::enclosing(&spheres)
            }
        }
    }

    /// Build the distance closure for the whole tree.
    pub fn compile(&self) -> DistanceFn3 {
        match self {
            Self::Sphere { radius } => {
                let radius = *radius;
                Arc::new(move |p: DVec3| p.length() - radius)
            }

            Self::Cube { half } => {
                let half = *half;
                Arc::new(move |p: DVec3| {
                    let q = p.abs() - half;
                    q.max(DVec3::ZERO).length() + q.max_element().min(0.0)
                })
            }

            Self::Torus { major, minor } => {
                let (major, minor) = (*major, *minor);
                Arc::new(move |p: DVec3| {
                    let q = DVec2::new(DVec2::new(p.x, p.z).length() - major, p.y);
                    q.length() - minor
                })
            }

            Self::Cone { height, radius } => {
                let (height, radius) = (*height, *radius);
                let (sin, cos) = (height / radius).atan().sin_cos();
                Arc::new(move |p: DVec3| {
                    // Work relative to the tip
                    let z = p.z - height / 2.0;
                    let q = DVec2::new(DVec2::new(p.x, p.y).length(), z);
                    let d1 = -z - height;
                    let d2 = q.dot(DVec2::new(sin, cos)).max(z);
                    DVec2::new(d1, d2).max(DVec2::ZERO).length() + d1.max(d2).min(0.0)
                })
            }

            Self::Ellipsoid { radii } => {
                let radii = *radii;
                let inner = radii.min_element();
                Arc::new(move |p: DVec3| {
                    let k0 = (p / radii).length();
                    let k1 = (p / (radii * radii)).length();
                    if k1 == 0.0 {
                        return -inner;
                    }
                    k0 * (k0 - 1.0) / k1
                })
            }

            Self::Extrude { half_height, shape } => {
                let profile = shape.compile();
                let half_height = *half_height;
                Arc::new(move |p: DVec3| {
                    let d = profile(DVec2::new(p.x, p.y));
                    let w = DVec2::new(d, p.z.abs() - half_height);
                    w.x.max(w.y).min(0.0) + w.max(DVec2::ZERO).length()
                })
            }

            Self::Revolve { offset, shape } => {
                let profile = shape.compile();
                let offset = *offset;
                Arc::new(move |p: DVec3| {
                    profile(DVec2::new(DVec2::new(p.x, p.z).length() - offset, p.y))
                })
            }

            Self::Transform { inverse, shape, .. } => {
                let inner = shape.compile();
                let inverse = *inverse;
                // The inverse can lengthen steps, so shrink distances to match
                let stretch = inverse.max_stretch();
                Arc::new(move |p: DVec3| inner(inverse.transform_point3(p)) / stretch)
            }

            Self::Scale { factor, shape } => {
                let inner = shape.compile();
                let factor = *factor;
                Arc::new(move |p: DVec3| inner(p / factor) * factor)
            }

            Self::Distort { factor, shape } => {
                let inner = shape.compile();
                let factor = *factor;
                let shrink = factor.min_element();
                Arc::new(move |p: DVec3| inner(p / factor) * shrink)
            }

            Self::Round { radius, shape } => {
                let inner = shape.compile();
                let radius = *radius;
                Arc::new(move |p: DVec3| inner(p) - radius)
            }

            Self::Hollow { thickness, shape } => {
                let inner = shape.compile();
                let thickness = *thickness;
                Arc::new(move |p: DVec3| inner(p).abs() - thickness)
            }

            Self::Elongate { half, shape } => {
                let inner = shape.compile();
                let half = *half;
                Arc::new(move |p: DVec3| inner(p - p.clamp(-half, half)))
            }

            Self::Repeat {
                count,
                offset,
                shape,
            } => {
                let inner = shape.compile();
                let (count, offset) = (*count, *offset);
                Arc::new(move |p: DVec3| {
                    let cell = (p / offset).round().clamp(-count, count);
                    inner(p - cell * offset)
                })
            }

            Self::RepeatInfinite { period, shape } => {
                let inner = shape.compile();
                let period = *period;
                let half = period * 0.5;
                Arc::new(move |p: DVec3| inner((p + half).modulo(period) - half))
            }

            Self::Union { items } => csg::union(items),
            Self::Difference { items } => csg::difference(items),
            Self::Intersection { items } => csg::intersection(items),
        }
    }
}
