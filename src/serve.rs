//! Development session with live reload.
//!
//! A small WebSocket server that browsers (or a bundler plugin) connect to.
//! After each successful rebuild the watcher invalidates the virtual pages
//! module and every connected client receives `{"type":"full-reload"}`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Accept Thread   │     │  Watcher Thread  │
//! │ (wait for exit) │     │   (WebSocket)    │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘     └────────┬─────────┘
//!          │                       │                        │
//!          ▼                       ▼                        ▼
//!    Ctrl+C / fatal          Register clients        Rebuild pages.json
//!    watcher error                  ▲                        │
//!                                   └──── ReloadServer ◀─────┘
//!                                         (DevSession)
//! ```

use crate::{
    log,
    logger::Logger,
    pipeline::Pipeline,
    watch::{DevSession, PAGES_MODULE_ID, WatchCoordinator},
};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::{
    net::{IpAddr, SocketAddr, TcpListener, TcpStream},
    sync::{Arc, mpsc},
    thread,
};
use tungstenite::{Message, WebSocket};

/// Payload broadcast to clients on a full reload.
const FULL_RELOAD: &str = r#"{"type":"full-reload"}"#;

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Module Graph
// ============================================================================

/// Versions of the virtual modules served to clients.
///
/// A module that was never invalidated is at version 0.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    versions: FxHashMap<String, u64>,
}

impl ModuleGraph {
    /// Bump the version of `id`, returning the new version.
    pub fn invalidate(&mut self, id: &str) -> u64 {
        let version = self.versions.entry(id.to_owned()).or_default();
        *version += 1;
        *version
    }

    pub fn version(&self, id: &str) -> u64 {
        self.versions.get(id).copied().unwrap_or_default()
    }
}

// ============================================================================
// Reload Server
// ============================================================================

/// Connected clients plus the module graph.
pub struct ReloadServer {
    clients: Mutex<Vec<WebSocket<TcpStream>>>,
    modules: Mutex<ModuleGraph>,
    logger: Logger,
}

impl ReloadServer {
    pub fn new(logger: Logger) -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
            modules: Mutex::new(ModuleGraph::default()),
            logger,
        }
    }

    /// Accept WebSocket clients until the listener fails.
    pub fn accept_loop(&self, listener: TcpListener) {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log!("serve"; "connection error: {err}");
                    continue;
                }
            };
            let peer = stream.peer_addr().ok();

            match tungstenite::accept(stream) {
                Ok(socket) => {
                    self.clients.lock().push(socket);
                    self.logger
                        .debug("hmr", format_args!("client connected: {peer:?}"));
                }
                Err(err) => self
                    .logger
                    .debug("hmr", format_args!("handshake failed ({peer:?}): {err}")),
            }
        }
    }

    /// Send `payload` to every client, dropping the ones that went away.
    ///
    /// Returns the number of clients reached.
    pub fn broadcast(&self, payload: &str) -> usize {
        let mut clients = self.clients.lock();
        clients.retain_mut(|socket| socket.send(Message::text(payload)).is_ok());
        clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn module_version(&self, id: &str) -> u64 {
        self.modules.lock().version(id)
    }

    /// Close every connection.
    pub fn shutdown(&self) {
        for mut socket in self.clients.lock().drain(..) {
            let _ = socket.close(None);
            let _ = socket.flush();
        }
    }
}

impl DevSession for ReloadServer {
    fn invalidate_module(&self, id: &str) {
        let version = self.modules.lock().invalidate(id);
        self.logger
            .debug("hmr", format_args!("{id} is now at version {version}"));
    }

    fn full_reload(&self) {
        let reached = self.broadcast(FULL_RELOAD);
        self.logger.debug(
            "hmr",
            format_args!(
                "full reload sent to {reached} client(s), {PAGES_MODULE_ID} at version {}",
                self.module_version(PAGES_MODULE_ID)
            ),
        );
    }
}

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the reload server and the watcher.
///
/// This function:
/// 1. Binds to the configured interface and port (with auto-retry on port conflict)
/// 2. Sets up Ctrl+C handler for graceful shutdown
/// 3. Spawns the accept loop and the file watcher
///
/// Blocks until Ctrl+C is received or the watcher stops with a fatal error.
pub fn serve_pages(pipeline: Pipeline) -> Result<()> {
    let options = Arc::clone(pipeline.options());
    let interface: IpAddr = options
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface: {}", options.serve.interface))?;

    let (listener, addr) = try_bind_port(interface, options.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(ReloadServer::new(pipeline.logger().clone()));

    let (tx, rx) = mpsc::channel::<Result<()>>();

    let tx_signal = tx.clone();
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        let _ = tx_signal.send(Ok(()));
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "ws://{}", addr);

    let accept_server = Arc::clone(&server);
    thread::spawn(move || accept_server.accept_loop(listener));

    let session: Arc<dyn DevSession> = server.clone();
    let coordinator = WatchCoordinator::new(pipeline).with_session(session);
    thread::spawn(move || {
        let _ = tx.send(coordinator.watch_blocking());
    });

    let result = rx.recv().unwrap_or(Ok(()));
    server.shutdown();
    result
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, SocketAddr)> {
    let mut last_err = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match TcpListener::bind(addr) {
            Ok(listener) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = listener.local_addr().unwrap_or(addr);
                return Ok((listener, addr));
            }
            Err(err) => last_err = Some(err),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_err.map_or_else(|| "no attempt made".to_owned(), |e| e.to_string())
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        net::Ipv4Addr,
        time::{Duration, Instant},
    };

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_module_graph_versions() {
        let mut graph = ModuleGraph::default();
        assert_eq!(graph.version(PAGES_MODULE_ID), 0);

        assert_eq!(graph.invalidate(PAGES_MODULE_ID), 1);
        assert_eq!(graph.invalidate(PAGES_MODULE_ID), 2);
        assert_eq!(graph.version(PAGES_MODULE_ID), 2);
        assert_eq!(graph.version("virtual:other"), 0);
    }

    #[test]
    fn test_invalidate_bumps_module() {
        let server = ReloadServer::new(Logger::default());
        server.invalidate_module(PAGES_MODULE_ID);
        assert_eq!(server.module_version(PAGES_MODULE_ID), 1);
    }

    #[test]
    fn test_full_reload_without_clients() {
        let server = ReloadServer::new(Logger::default());
        assert_eq!(server.broadcast(FULL_RELOAD), 0);
    }

    #[test]
    fn test_full_reload_reaches_client() {
        let (listener, addr) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        let server = Arc::new(ReloadServer::new(Logger::default()));
        let accept_server = Arc::clone(&server);
        thread::spawn(move || accept_server.accept_loop(listener));

        let (mut client, _) = tungstenite::connect(format!("ws://{addr}")).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while server.client_count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(server.client_count(), 1);

        server.full_reload();

        let message = client.read().unwrap();
        assert_eq!(message.into_text().unwrap().as_str(), FULL_RELOAD);
    }

    #[test]
    fn test_try_bind_port_skips_busy_port() {
        let busy = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let port = busy.local_addr().unwrap().port();

        match try_bind_port(LOCALHOST, port, 5) {
            Ok((_, addr)) => assert_ne!(addr.port(), port),
            Err(err) => assert!(err.to_string().contains("Failed to bind")),
        }
    }
}
