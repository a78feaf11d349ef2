//! Scene description and render settings.
//!
//! A `Scene` is everything a render request carries: camera, things and
//! settings. The accumulated `Raster` lives alongside but never goes over
//! the wire.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::color::Color;
use crate::error::CoreResult;
use crate::raster::{AlphaMode, Raster};
use crate::thing::Thing;

/// Shadow-catcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Alpha upper limit on catcher surfaces (the dark center).
    pub high: f64,
    /// Alpha below this is dropped (penumbra cut-off).
    pub low: f64,
    /// Divides the brightness seen from a catcher before it lowers alpha.
    pub divisor: f64,
    /// Fraction of a light's bounding radius used to jitter shadow rays.
    pub radius: f64,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            high: 0.6,
            low: 0.05,
            divisor: 3.0,
            radius: 0.5,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of passes to accumulate (0 = until stopped)
    pub passes: u32,
    /// Jittered samples per pixel per pass
    pub samples: u32,
    /// Scatter events allowed after the primary hit
    pub bounces: u32,
    /// Max marching distance from a ray's origin
    pub horizon: f64,
    /// Distance below which a ray counts as hitting a surface
    pub threshold: f64,
    /// Color of rays that escape the scene
    pub ambient: Color,
    pub shadow: ShadowSettings,
    /// Row worker threads (0 = all cores)
    pub workers: usize,
    /// Opaque background for resolve; `None` keeps it transparent
    pub background: Option<Color>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            passes: 10,
            samples: 1,
            bounces: 4,
            horizon: 100_000.0,
            threshold: 0.0001,
            ambient: DVec3::splat(0.05),
            shadow: ShadowSettings::default(),
            workers: 0,
            background: None,
        }
    }
}

impl RenderSettings {
    /// How resolve should treat alpha for these settings.
    pub fn alpha_mode(&self) -> AlphaMode {
        match self.background {
            Some(color) => AlphaMode::Background(color),
            None => AlphaMode::Shadow {
                low: self.shadow.low,
                high: self.shadow.high,
            },
        }
    }

    /// What a primary ray that hits nothing adds to its pixel.
    ///
    /// Zero under a background, so resolve can tell misses apart and show
    /// the background there.
    pub fn miss_color(&self) -> Color {
        match self.background {
            Some(_) => DVec3::ZERO,
            None => self.ambient,
        }
    }
}

/// A complete render request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Root random seed (0 = derive from the clock)
    pub seed: u64,
    pub camera: Camera,
    pub things: Vec<Thing>,
    pub settings: RenderSettings,

    /// Accumulated samples; owned by whoever merges passes
    #[serde(skip)]
    pub raster: Raster,
}

impl Scene {
    pub fn new(camera: Camera, settings: RenderSettings) -> Self {
        Self {
            seed: 0,
            camera,
            things: Vec::new(),
            settings,
            raster: Raster::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn add(&mut self, thing: Thing) {
        self.things.push(thing);
    }

    /// The seed to render with, substituting the clock for 0.
    pub fn effective_seed(&self) -> u64 {
        if self.seed != 0 {
            return self.seed;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1);
        log::debug!("Seeding render from clock: {}", nanos);
        nanos.max(1)
    }

    /// Clone the things with their distance functions compiled.
    pub fn prepared_things(&self) -> Vec<Thing> {
        let mut things = self.things.clone();
        for thing in &mut things {
            if !thing.is_prepared() {
                thing.prepare();
            }
        }
        things
    }

    /// Empty raster sized for these settings.
    pub fn blank_raster(&self) -> Raster {
        Raster::new(self.settings.width, self.settings.height)
    }

    /// Add a pass into the scene's raster, sizing it first if empty.
    pub fn merge(&mut self, raster: &Raster) -> CoreResult<()> {
        if self.raster.pixels.is_empty() {
            self.raster = self.blank_raster();
        }
        self.raster.merge(raster)
    }

    /// Resolve one pixel of the accumulated raster.
    pub fn resolve(&self, x: u32, y: u32) -> [u8; 4] {
        self.raster.resolve(x, y, self.settings.alpha_mode())
    }
}
