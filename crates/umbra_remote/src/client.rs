//! Client side of the render service.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use umbra_core::{Raster, Scene};
use umbra_renderer::{RenderResult, Renderer};

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{
    decode_raster, encode_request, read_frame, write_frame, RenderRequest, Response,
    RENDER_METHOD,
};

/// Renders passes on a remote `RenderService`.
///
/// Each call opens its own connection, so one instance can serve several
/// orchestrator workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRenderer {
    addr: String,
    compress: bool,
}

impl RemoteRenderer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            compress: false,
        }
    }

    /// Ask the server for deflate-compressed rasters.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one render call and wait for its raster.
    pub fn call(&self, scene: &Scene) -> RemoteResult<Raster> {
        let request = RenderRequest {
            scene: scene.clone(),
            compress: self.compress,
        };
        let payload = serde_json::to_vec(&request)?;

        let stream = TcpStream::connect(&self.addr)?;
        let mut writer = BufWriter::new(stream.try_clone()?);
        let mut reader = BufReader::new(stream);

        write_frame(&mut writer, &encode_request(RENDER_METHOD, &payload)?)?;

        let body = read_frame(&mut reader)?
            .ok_or_else(|| RemoteError::Protocol("Server closed the connection".to_string()))?;

        match Response::decode(&body)? {
            Response::Ok(bytes) => decode_raster(&bytes),
            Response::Failure(message) => Err(RemoteError::Service(message)),
        }
    }
}

impl Renderer for RemoteRenderer {
    fn render(&self, scene: &Scene) -> RenderResult<Raster> {
        Ok(self.call(scene)?)
    }

    fn describe(&self) -> String {
        format!("remote {}", self.addr)
    }
}
