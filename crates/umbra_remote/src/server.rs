//! Threaded request/response server.
//!
//! Services register under a method name. Each accepted connection gets a
//! thread that answers request frames until the client hangs up.

use std::any::Any;
use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use umbra_renderer::render_pass;

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{
    decode_request, encode_raster, read_frame, write_frame, RenderRequest, Response,
    RENDER_METHOD,
};

/// A callable remote method.
pub trait Service: Send + Sync {
    fn call(&self, payload: &[u8]) -> RemoteResult<Vec<u8>>;
}

/// Renders one pass of the requested scene on this machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderService;

impl Service for RenderService {
    fn call(&self, payload: &[u8]) -> RemoteResult<Vec<u8>> {
        let request: RenderRequest = serde_json::from_slice(payload)?;

        let start = Instant::now();
        let raster =
            render_pass(&request.scene).map_err(|err| RemoteError::Service(err.to_string()))?;
        log::info!(
            "Rendered {}x{} pass in {:.2?}",
            raster.width,
            raster.height,
            start.elapsed()
        );

        encode_raster(&raster, request.compress)
    }
}

type Services = HashMap<String, Arc<dyn Service>>;

/// A bound server that has not started accepting yet.
pub struct RpcServer {
    listener: TcpListener,
    services: Services,
}

impl RpcServer {
    /// Bind the listening socket. Port 0 picks a free port.
    pub fn bind(addr: impl ToSocketAddrs) -> RemoteResult<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            services: HashMap::new(),
        })
    }

    /// Register `service` under `name`, replacing any previous one.
    pub fn register(mut self, name: impl Into<String>, service: Arc<dyn Service>) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    /// Register `RenderService` under its method name.
    pub fn with_render_service(self) -> Self {
        self.register(RENDER_METHOD, Arc::new(RenderService))
    }

    pub fn local_addr(&self) -> RemoteResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start accepting connections on a background thread.
    pub fn start(self) -> RemoteResult<ServerHandle> {
        let addr = self.local_addr()?;
        let stopping = Arc::new(AtomicBool::new(false));
        let services = Arc::new(self.services);
        let listener = self.listener;

        let acceptor = {
            let stopping = Arc::clone(&stopping);
            thread::spawn(move || accept_loop(listener, services, &stopping))
        };

        log::info!("Render server ready on {}", addr);

        Ok(ServerHandle {
            addr,
            stopping,
            acceptor,
        })
    }
}

/// Controls a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    stopping: Arc<AtomicBool>,
    acceptor: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and wait for in-flight calls to finish.
    ///
    /// Connections still open by clients keep this waiting until those
    /// clients hang up.
    pub fn stop(self) {
        log::info!("Render server stopping");
        self.stopping.store(true, Ordering::SeqCst);

        // accept() only returns for a connection, so make one
        if let Err(err) = TcpStream::connect(wake_addr(self.addr)) {
            log::warn!("Could not wake acceptor: {}", err);
        }

        self.join();
    }

    /// Block until the server has stopped.
    pub fn join(self) {
        if self.acceptor.join().is_err() {
            log::error!("Acceptor thread panicked");
        }
        log::info!("Render server stopped");
    }
}

/// Address a local client can reach the listener on.
fn wake_addr(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}

fn accept_loop(listener: TcpListener, services: Arc<Services>, stopping: &AtomicBool) {
    let mut connections: Vec<JoinHandle<()>> = Vec::new();

    for stream in listener.incoming() {
        if stopping.load(Ordering::SeqCst) {
            break;
        }

        match stream {
            Ok(stream) => {
                connections.retain(|connection| !connection.is_finished());
                let services = Arc::clone(&services);
                connections.push(thread::spawn(move || serve_connection(stream, &services)));
            }
            Err(err) => log::warn!("Accept failed: {}", err),
        }
    }

    for connection in connections {
        if connection.join().is_err() {
            log::error!("Connection thread panicked");
        }
    }
}

fn serve_connection(stream: TcpStream, services: &Services) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());

    let mut reader = match stream.try_clone() {
        Ok(read_half) => BufReader::new(read_half),
        Err(err) => {
            log::warn!("Dropping connection from {}: {}", peer, err);
            return;
        }
    };
    let mut writer = BufWriter::new(stream);

    loop {
        let body = match read_frame(&mut reader) {
            Ok(Some(body)) => body,
            Ok(None) => break,
            Err(err) => {
                log::warn!("Bad request from {}: {}", peer, err);
                break;
            }
        };

        let response = handle_request(&body, services);
        if let Err(err) = write_frame(&mut writer, &response.encode()) {
            log::warn!("Could not answer {}: {}", peer, err);
            break;
        }
    }

    log::debug!("Connection from {} closed", peer);
}

/// Run one request and turn every outcome into a response.
fn handle_request(body: &[u8], services: &Services) -> Response {
    let (method, payload) = match decode_request(body) {
        Ok(parts) => parts,
        Err(err) => return Response::Failure(err.to_string()),
    };

    let Some(service) = services.get(method) else {
        return Response::Failure(RemoteError::UnknownMethod(method.to_string()).to_string());
    };

    match panic::catch_unwind(AssertUnwindSafe(|| service.call(payload))) {
        Ok(Ok(bytes)) => Response::Ok(bytes),
        Ok(Err(err)) => {
            log::warn!("{} failed: {}", method, err);
            Response::Failure(err.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            log::error!("{} panicked: {}", method, message);
            Response::Failure(format!("{} panicked: {}", method, message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
