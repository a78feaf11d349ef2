//! Sphere tracing against prepared things.

use umbra_core::{RenderSettings, Thing};
use umbra_math::{DVec3, Ray};

/// The nearest surface a ray reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the thing that was hit.
    pub index: usize,
    pub position: DVec3,
    /// Marching steps taken, including the bypass exit.
    pub steps: u32,
}

/// March `ray` through `things` until it comes within `threshold` of a
/// surface or travels beyond `horizon`.
///
/// `bypass` names a thing the ray starts inside of (a refracted ray); the
/// ray first steps out of it before marching normally. The direction must
/// be unit length.
pub fn march(
    things: &[Thing],
    settings: &RenderSettings,
    ray: &Ray,
    bypass: Option<usize>,
) -> Option<Hit> {
    let threshold = settings.threshold;
    let horizon = settings.horizon;
    let mut pos = ray.origin;
    let mut steps = 0;

    // Step out of the bypassed thing
    if let Some(thing) = bypass.and_then(|index| things.get(index)) {
        loop {
            let dist = thing.distance(pos);
            if dist > 0.0 {
                break;
            }
            pos += ray.direction * dist.abs().max(threshold);
            steps += 1;
            if (pos - ray.origin).length() >= horizon {
                return None;
            }
        }
    }

    // Shadow acne
    pos += ray.direction * (threshold * 10.0);

    // Analytic sphere test rules most things in or out before any SDF work
    let candidates: Vec<usize> = things
        .iter()
        .enumerate()
        .filter(|(_, thing)| thing.sphere().crossed_by(ray, threshold))
        .map(|(index, _)| index)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    while (pos - ray.origin).length() < horizon {
        let mut nearest: Option<usize> = None;
        let mut best = f64::INFINITY;

        for &index in &candidates {
            let thing = &things[index];
            if nearest.is_some() && thing.bounding_distance(pos) > best {
                continue;
            }
            let dist = thing.distance(pos);
            if nearest.is_none() || dist < best {
                nearest = Some(index);
                best = dist;
            }
        }

        steps += 1;

        let index = nearest?;
        if best < threshold {
            return Some(Hit {
                index,
                position: pos,
                steps,
            });
        }

        pos += ray.direction * best;
    }

    None
}
