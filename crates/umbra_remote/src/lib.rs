//! umbra remote - render passes on other machines
//!
//! `RpcServer` exposes `RenderService` over TCP; `RemoteRenderer` is the
//! matching client and plugs into the orchestrator like any local backend.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use umbra_remote::{RemoteRenderer, RpcServer};
//! use umbra_renderer::{Orchestrator, Renderer};
//!
//! let server = RpcServer::bind("0.0.0.0:34242")?.with_render_service().start()?;
//!
//! let renderers: Vec<Arc<dyn Renderer>> = vec![
//!     Arc::new(RemoteRenderer::new("render-box:34242").with_compression(true)),
//! ];
//! for frame in Orchestrator::new(renderers).render(&scene) {
//!     // ...
//! }
//! server.stop();
//! ```

mod client;
mod error;
pub mod protocol;
mod server;

pub use client::RemoteRenderer;
pub use error::{RemoteError, RemoteResult};
pub use protocol::{RenderRequest, RENDER_METHOD};
pub use server::{RenderService, RpcServer, ServerHandle, Service};

/// Port the render server listens on by default.
pub const DEFAULT_PORT: u16 = 34242;
