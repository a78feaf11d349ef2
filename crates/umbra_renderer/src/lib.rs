//! umbra renderer - CPU SDF path tracing
//!
//! A Monte Carlo path tracer over signed distance fields:
//!
//! - `march` sphere-traces rays against prepared things
//! - `path_trace` recurses through scatter events, with shadow catchers
//! - `render_pass` renders one pass with row-level parallelism
//! - `Orchestrator` accumulates passes across local or remote `Renderer`s
//!   and retries failed passes

mod error;
mod march;
mod orchestrator;
mod output;
mod render;
mod trace;

pub use error::{RenderError, RenderResult};
pub use march::{march, Hit};
pub use orchestrator::{Frame, Frames, LocalRenderer, Orchestrator, Renderer, DEFAULT_RETRY_DELAY};
pub use output::{render_save, save_png, to_image};
pub use render::render_pass;
pub use trace::{direct_light, path_trace, Radiance};
