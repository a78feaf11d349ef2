//! Boolean operations over `Sdf3` children.
//!
//! Union and difference see each child through `bounded`, which never
//! reports less than the distance to the child's bounding sphere. Children
//! that underestimate (distorted ones) get raised to that floor, so skipping
//! a child whose sphere cannot change the running result gives the same
//! value as evaluating it.

use std::sync::Arc;

use umbra_math::{BoundingSphere, DVec3};

use crate::sdf3::{DistanceFn3, Sdf3};

impl Sdf3 {
    pub fn union(items: Vec<Sdf3>) -> Self {
        Self::Union { items }
    }

    /// The first item minus all the others.
    pub fn difference(items: Vec<Sdf3>) -> Self {
        Self::Difference { items }
    }

    pub fn intersection(items: Vec<Sdf3>) -> Self {
        Self::Intersection { items }
    }
}

/// Compiled children paired with their bounding spheres.
fn compile_children(items: &[Sdf3]) -> Vec<(DistanceFn3, BoundingSphere)> {
    items
        .iter()
        .map(|item| (item.compile(), item.bounding_sphere()))
        .collect()
}

/// Child distance, floored at the distance to its bounding sphere.
///
/// Still a lower bound on the true distance since the shape lies inside
/// the sphere.
#[inline]
fn bounded(f: &DistanceFn3, sphere: &BoundingSphere, p: DVec3) -> f64 {
    f(p).max(sphere.distance(p))
}

pub(crate) fn union(items: &[Sdf3]) -> DistanceFn3 {
    let children = compile_children(items);
    Arc::new(move |p: DVec3| {
        let mut iter = children.iter();
        let mut best = match iter.next() {
            Some((first, sphere)) => bounded(first, sphere, p),
            None => return f64::INFINITY,
        };
        for (f, sphere) in iter {
            if sphere.distance(p) > best {
                continue;
            }
            best = best.min(bounded(f, sphere, p));
        }
        best
    })
}

pub(crate) fn difference(items: &[Sdf3]) -> DistanceFn3 {
    let children = compile_children(items);
    Arc::new(move |p: DVec3| {
        let mut iter = children.iter();
        let mut result = match iter.next() {
            Some((first, sphere)) => bounded(first, sphere, p),
            None => return f64::INFINITY,
        };
        for (f, sphere) in iter {
            if -sphere.distance(p) < result {
                continue;
            }
            result = result.max(-bounded(f, sphere, p));
        }
        result
    })
}

pub(crate) fn intersection(items: &[Sdf3]) -> DistanceFn3 {
    let children: Vec<DistanceFn3> = items.iter().map(|item| item.compile()).collect();
    Arc::new(move |p: DVec3| {
        if children.is_empty() {
            return f64::INFINITY;
        }
        children
            .iter()
            .map(|f| f(p))
            .fold(f64::NEG_INFINITY, f64::max)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn scattered_spheres() -> Vec<Sdf3> {
        vec![
            Sdf3::sphere(1.0).translate(DVec3::new(-4.0, 0.0, 0.0)),
            Sdf3::cube(2.0, 1.0, 3.0).translate(DVec3::new(3.0, 1.0, 0.0)),
            Sdf3::sphere(0.5).translate(DVec3::new(0.0, 6.0, -2.0)),
            Sdf3::torus(2.0, 1.0).translate(DVec3::new(0.0, -5.0, 1.0)),
        ]
    }

    fn sample_points() -> Vec<DVec3> {
        let mut rng = StdRng::seed_from_u64(42);
        (0..500)
            .map(|_| {
                DVec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                )
            })
            .collect()
    }

    /// Union of every child with no pruning.
    fn naive_union(items: &[Sdf3], p: DVec3) -> f64 {
        compile_children(items)
            .iter()
            .map(|(f, sphere)| bounded(f, sphere, p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Difference of every child with no pruning.
    fn naive_difference(items: &[Sdf3], p: DVec3) -> f64 {
        let children = compile_children(items);
        let (first, sphere) = &children[0];
        children[1..]
            .iter()
            .map(|(f, sphere)| -bounded(f, sphere, p))
            .fold(bounded(first, sphere, p), f64::max)
    }

    /// Squashed shapes whose distances underestimate the true distance.
    fn distorted_items() -> Vec<Sdf3> {
        vec![
            Sdf3::cube(4.0, 4.0, 4.0)
                .distort(DVec3::new(1.0, 0.2, 1.0))
                .translate(DVec3::new(6.0, 0.0, 0.0)),
            Sdf3::sphere(1.0),
            Sdf3::cylinder(4.0, 2.0)
                .distort(DVec3::new(3.0, 0.3, 1.0))
                .rotate(DVec3::Z, 40.0)
                .translate(DVec3::new(-5.0, 2.0, 0.0)),
        ]
    }

    #[test]
    fn test_union_pruning_matches_naive() {
        let items = scattered_spheres();
        let union = Sdf3::union(items.clone()).compile();
        let compiled: Vec<DistanceFn3> = items.iter().map(|i| i.compile()).collect();

        for p in sample_points() {
            assert_eq!(union(p), naive_union(&items, p), "at {:?}", p);

            // Exact children are left alone by the sphere floor
            let plain = compiled.iter().map(|f| f(p)).fold(f64::INFINITY, f64::min);
            assert!((union(p) - plain).abs() < 1e-9, "at {:?}", p);
        }
    }

    #[test]
    fn test_difference_pruning_matches_naive() {
        let mut items = vec![Sdf3::cube(8.0, 8.0, 8.0)];
        items.extend(scattered_spheres());
        let difference = Sdf3::difference(items.clone()).compile();

        for p in sample_points() {
            assert_eq!(difference(p), naive_difference(&items, p), "at {:?}", p);
        }
    }

    #[test]
    fn test_pruning_matches_naive_with_distorted_children() {
        let items = distorted_items();
        let union = Sdf3::union(items.clone()).compile();

        let mut cut = vec![Sdf3::cube(20.0, 20.0, 20.0)];
        cut.extend(items);
        let difference = Sdf3::difference(cut.clone()).compile();

        for p in sample_points() {
            assert_eq!(union(p), naive_union(&distorted_items(), p), "at {:?}", p);
            assert_eq!(difference(p), naive_difference(&cut, p), "at {:?}", p);
        }
    }

    #[test]
    fn test_sphere_floor_keeps_lower_bound() {
        // Along X a squashed cube reports a tenth of its true distance
        let squashed = Sdf3::cube(2.0, 2.0, 2.0).distort(DVec3::new(1.0, 0.1, 1.0));
        let f = squashed.compile();
        let sphere = squashed.bounding_sphere();

        let p = DVec3::new(50.0, 0.0, 0.0);
        let floored = bounded(&f, &sphere, p);
        assert!((f(p) - 4.9).abs() < 1e-9);
        assert!((floored - sphere.distance(p)).abs() < 1e-12);
        // True distance to the face at x = 1
        assert!(floored <= 49.0);
    }

    #[test]
    fn test_cube_minus_concentric_sphere() {
        let cube = Sdf3::cube(2.0, 2.0, 2.0);
        let sphere = Sdf3::sphere(1.2);
        let shape = Sdf3::difference(vec![cube.clone(), sphere.clone()]);
        let f = shape.compile();

        // The corners survive, the middle is carved out
        assert!(f(DVec3::splat(0.95)) < 0.0);
        assert!(f(DVec3::new(-0.95, 0.95, -0.95)) < 0.0);
        assert!(f(DVec3::ZERO) > 0.0);

        for p in sample_points() {
            let expected = cube.distance(p).max(-sphere.distance(p));
            assert!((f(p) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_intersection() {
        let lens = Sdf3::intersection(vec![
            Sdf3::sphere(2.0).translate(DVec3::new(-1.0, 0.0, 0.0)),
            Sdf3::sphere(2.0).translate(DVec3::new(1.0, 0.0, 0.0)),
        ]);
        let f = lens.compile();
        assert!(f(DVec3::ZERO) < 0.0);
        assert!(f(DVec3::new(1.0, 0.0, 0.0)).abs() < 1e-12);
        assert!(f(DVec3::new(2.0, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_boolean_spheres_enclose_children() {
        let items = scattered_spheres();
        for shape in [
            Sdf3::union(items.clone()),
            Sdf3::difference(items.clone()),
            Sdf3::intersection(items.clone()),
        ] {
            let outer = shape.bounding_sphere();
            for item in &items {
                let inner = item.bounding_sphere();
                let far = (inner.center - outer.center).length() + inner.radius;
                assert!(far <= outer.radius + 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_booleans_are_empty_space() {
        for shape in [
            Sdf3::union(vec![]),
            Sdf3::difference(vec![]),
            Sdf3::intersection(vec![]),
        ] {
            assert_eq!(shape.distance(DVec3::ZERO), f64::INFINITY);
        }
    }
}
