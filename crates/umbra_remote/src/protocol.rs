//! Wire format for remote calls.
//!
//! Every message is a frame: a little-endian `u32` length, then the body.
//!
//! - Request body: `u16` method name length, the name, then the payload
//! - Response body: status byte (`0` ok, `1` failure), then the payload or
//!   a UTF-8 error message
//!
//! Rasters travel as a tag byte (`0` plain, `1` deflate), width and height
//! as `u32`, then one 36-byte record per pixel.

use std::io::{self, Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use umbra_core::{Color, Pixel, Raster, Scene};

use crate::error::{RemoteError, RemoteResult};

/// Method name of the render service.
pub const RENDER_METHOD: &str = "Render.render";

/// Largest frame either side will accept.
pub const MAX_FRAME_LEN: usize = 1 << 30;

/// Bytes per encoded pixel: three `f64` channels, `u32` rays, `f64` alpha.
pub const PIXEL_RECORD_LEN: usize = 36;

const TAG_PLAIN: u8 = 0;
const TAG_DEFLATE: u8 = 1;
const RASTER_HEADER_LEN: usize = 9;

const STATUS_OK: u8 = 0;
const STATUS_FAILURE: u8 = 1;

/// Payload of a render call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub scene: Scene,
    /// Ask for a deflate-compressed raster.
    #[serde(default)]
    pub compress: bool,
}

/// Outcome of a call as sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok(Vec<u8>),
    Failure(String),
}

impl Response {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Response::Ok(payload) => {
                let mut body = Vec::with_capacity(payload.len() + 1);
                body.push(STATUS_OK);
                body.extend_from_slice(payload);
                body
            }
            Response::Failure(message) => {
                let mut body = Vec::with_capacity(message.len() + 1);
                body.push(STATUS_FAILURE);
                body.extend_from_slice(message.as_bytes());
                body
            }
        }
    }

    pub fn decode(body: &[u8]) -> RemoteResult<Self> {
        match body.split_first() {
            Some((&STATUS_OK, payload)) => Ok(Response::Ok(payload.to_vec())),
            Some((&STATUS_FAILURE, message)) => {
                Ok(Response::Failure(String::from_utf8_lossy(message).into_owned()))
            }
            Some((status, _)) => Err(RemoteError::Protocol(format!("Unknown status {}", status))),
            None => Err(RemoteError::Protocol("Empty response".to_string())),
        }
    }
}

/// Write one length-prefixed frame.
pub fn write_frame(writer: &mut impl Write, body: &[u8]) -> RemoteResult<()> {
    if body.len() > MAX_FRAME_LEN {
        return Err(RemoteError::Protocol(format!(
            "Frame of {} bytes exceeds limit",
            body.len()
        )));
    }
    writer.write_all(&(body.len() as u32).to_le_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame. Returns `None` when the peer closed the connection
/// between frames.
pub fn read_frame(reader: &mut impl Read) -> RemoteResult<Option<Vec<u8>>> {
    let mut len = [0u8; 4];
    match reader.read_exact(&mut len) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }

    let len = u32::from_le_bytes(len) as usize;
    if len > MAX_FRAME_LEN {
        return Err(RemoteError::Protocol(format!("Frame of {} bytes exceeds limit", len)));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Build a request body for `method`.
pub fn encode_request(method: &str, payload: &[u8]) -> RemoteResult<Vec<u8>> {
    let name_len = u16::try_from(method.len())
        .map_err(|_| RemoteError::Protocol(format!("Method name too long: {}", method.len())))?;

    let mut body = Vec::with_capacity(2 + method.len() + payload.len());
    body.extend_from_slice(&name_len.to_le_bytes());
    body.extend_from_slice(method.as_bytes());
    body.extend_from_slice(payload);
    Ok(body)
}

/// Split a request body into method name and payload.
pub fn decode_request(body: &[u8]) -> RemoteResult<(&str, &[u8])> {
    if body.len() < 2 {
        return Err(RemoteError::Protocol("Truncated request header".to_string()));
    }
    let name_len = u16::from_le_bytes([body[0], body[1]]) as usize;
    let rest = &body[2..];
    if rest.len() < name_len {
        return Err(RemoteError::Protocol("Truncated method name".to_string()));
    }

    let (name, payload) = rest.split_at(name_len);
    let name = std::str::from_utf8(name)
        .map_err(|err| RemoteError::Protocol(format!("Method name is not UTF-8: {}", err)))?;
    Ok((name, payload))
}

/// Encode a raster, optionally deflate-compressed.
pub fn encode_raster(raster: &Raster, compress: bool) -> RemoteResult<Vec<u8>> {
    let mut dump = Vec::with_capacity(raster.pixels.len() * PIXEL_RECORD_LEN);
    for pixel in &raster.pixels {
        dump.extend_from_slice(&pixel.color.x.to_le_bytes());
        dump.extend_from_slice(&pixel.color.y.to_le_bytes());
        dump.extend_from_slice(&pixel.color.z.to_le_bytes());
        dump.extend_from_slice(&pixel.rays.to_le_bytes());
        dump.extend_from_slice(&pixel.alpha.to_le_bytes());
    }

    let mut out = Vec::with_capacity(RASTER_HEADER_LEN + dump.len());
    out.push(if compress { TAG_DEFLATE } else { TAG_PLAIN });
    out.extend_from_slice(&raster.width.to_le_bytes());
    out.extend_from_slice(&raster.height.to_le_bytes());

    if compress {
        let mut encoder = DeflateEncoder::new(out, Compression::best());
        encoder.write_all(&dump)?;
        Ok(encoder.finish()?)
    } else {
        out.extend_from_slice(&dump);
        Ok(out)
    }
}

/// Decode a raster written by `encode_raster`.
pub fn decode_raster(bytes: &[u8]) -> RemoteResult<Raster> {
    if bytes.len() < RASTER_HEADER_LEN {
        return Err(RemoteError::Protocol("Truncated raster header".to_string()));
    }
    let tag = bytes[0];
    let width = read_u32(&bytes[1..5]);
    let height = read_u32(&bytes[5..9]);
    let data = &bytes[RASTER_HEADER_LEN..];

    let inflated;
    let dump = match tag {
        TAG_PLAIN => data,
        TAG_DEFLATE => {
            let mut buf = Vec::new();
            DeflateDecoder::new(data).read_to_end(&mut buf)?;
            inflated = buf;
            &inflated[..]
        }
        other => {
            return Err(RemoteError::Protocol(format!("Unknown raster tag {}", other)));
        }
    };

    let count = width as usize * height as usize;
    if dump.len() != count * PIXEL_RECORD_LEN {
        return Err(RemoteError::Protocol(format!(
            "Raster {}x{} needs {} bytes of pixels, got {}",
            width,
            height,
            count * PIXEL_RECORD_LEN,
            dump.len()
        )));
    }

    let pixels = dump.chunks_exact(PIXEL_RECORD_LEN).map(decode_pixel).collect();
    Raster::from_pixels(width, height, pixels)
        .map_err(|err| RemoteError::Protocol(err.to_string()))
}

fn decode_pixel(record: &[u8]) -> Pixel {
    Pixel {
        color: Color::new(
            read_f64(&record[0..8]),
            read_f64(&record[8..16]),
            read_f64(&record[16..24]),
        ),
        rays: read_u32(&record[24..28]),
        alpha: read_f64(&record[28..36]),
    }
}

// Callers always pass slices of the exact width.
fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_f64(bytes: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    f64::from_le_bytes(buf)
}
