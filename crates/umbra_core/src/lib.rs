//! umbra core - SDF scene description.
//!
//! This crate provides:
//!
//! - **Geometry**: `Sdf2` / `Sdf3` signed distance fields with transforms,
//!   deformations and boolean (CSG) combinators, compiled once into closures
//! - **Surfaces**: `Material` variants and `Thing`, which binds a material to
//!   a shape and caches its compiled distance function
//! - **Scene**: `Camera`, `RenderSettings`, and the accumulating `Raster`
//! - **Parts**: ready-made ground slabs and a gear for building scenes
//!
//! Everything a render request carries is serde-serializable.
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::{Material, Scene, Sdf3, Thing};
//! use umbra_math::DVec3;
//!
//! let mut scene = Scene::default();
//! scene.things.push(Thing::new(
//!     Material::matt(DVec3::new(0.8, 0.2, 0.2)),
//!     Sdf3::sphere(500.0).translate(DVec3::new(0.0, 0.0, 500.0)),
//! ));
//! ```

pub mod camera;
pub mod color;
mod csg;
pub mod error;
pub mod material;
pub mod parts;
pub mod raster;
pub mod sampling;
pub mod scene;
pub mod sdf2;
pub mod sdf3;
pub mod thing;

// Re-export commonly used types
pub use camera::Camera;
pub use color::{brightness, hex, Color, BLACK, WHITE};
pub use error::{CoreError, CoreResult};
pub use material::{Material, ScatterResult, SurfaceHit};
pub use raster::{AlphaMode, Pixel, Raster};
pub use scene::{RenderSettings, Scene, ShadowSettings};
pub use sdf2::{DistanceFn2, Sdf2};
pub use sdf3::{DistanceFn3, Sdf3};
pub use thing::Thing;
