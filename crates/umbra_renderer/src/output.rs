//! Resolved image output.

use std::path::Path;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use umbra_core::{AlphaMode, Raster, Scene};

use crate::error::RenderResult;
use crate::orchestrator::{Orchestrator, Renderer};

/// Resolve every pixel of `raster` into an RGBA image.
pub fn to_image(raster: &Raster, mode: AlphaMode) -> RgbaImage {
    RgbaImage::from_fn(raster.width, raster.height, |x, y| {
        Rgba(raster.resolve(x, y, mode))
    })
}

/// Resolve `raster` and write it as a PNG.
pub fn save_png(raster: &Raster, mode: AlphaMode, path: impl AsRef<Path>) -> RenderResult<()> {
    to_image(raster, mode).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Render `scene` over `renderers`, rewriting the PNG at `path` after every
/// pass. Returns the final accumulated raster.
pub fn render_save(
    path: impl AsRef<Path>,
    scene: &Scene,
    renderers: Vec<Arc<dyn Renderer>>,
) -> RenderResult<Raster> {
    let path = path.as_ref();
    let mode = scene.settings.alpha_mode();
    let mut last = scene.blank_raster();

    for frame in Orchestrator::new(renderers).render(scene) {
        save_png(&frame.raster, mode, path)?;
        log::debug!("Wrote pass {} to {}", frame.pass, path.display());
        last = frame.raster;
    }

    Ok(last)
}
