//! Server-side network lifecycle manager.
//!
//! [`NetServer`] owns the accept and worker pools and the listening
//! socket. It is an explicitly constructed object: create one per process
//! (or several in tests), no global state involved.
//!
//! ## State Machine
//! ```text
//! STOPPED -> STARTING -> RUNNING -> STOPPED
//! ```
//! All transitions go through one atomic compare-and-set, so concurrent
//! `start()` calls perform bootstrap exactly once and concurrent `stop()`
//! calls release the pools exactly once.
//!
//! ## Pipeline
//! Each accepted connection is pinned to one worker task:
//! `Framed(FrameCodec)` -> [`PacketClassifier`]. Processing per connection
//! is sequential FIFO; across connections it is fully parallel.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::watch;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use crate::config::NetworkConfig;
use crate::core::codec::FrameCodec;
use crate::error::{ProtocolError, Result};
use crate::protocol::classifier::{Dispatch, PacketClassifier};
use crate::protocol::connection::ConnectionMeta;
use crate::protocol::ping;
use crate::utils::metrics::global_metrics;

const STOPPED: u8 = 0;
const STARTING: u8 = 1;
const RUNNING: u8 = 2;

/// Network lifecycle manager: accept pool, worker pool, bound listener.
///
/// `start()` and `stop()` are synchronous and must be called from outside
/// an async runtime; pool shutdown blocks the calling thread.
pub struct NetServer {
    config: NetworkConfig,
    state: AtomicU8,
    accept_pool: Mutex<Option<Runtime>>,
    worker_pool: Mutex<Option<Runtime>>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl NetServer {
    /// Create a stopped server with the given configuration
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            state: AtomicU8::new(STOPPED),
            accept_pool: Mutex::new(None),
            worker_pool: Mutex::new(None),
            shutdown: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Start the network system.
    ///
    /// No-op if already starting or running; under concurrent calls
    /// exactly one caller performs the real bootstrap. On failure the
    /// state rolls back to stopped and any partially created pools are
    /// released, so a later `start()` can retry cleanly.
    pub fn start(&self) -> Result<()> {
        if self
            .state
            .compare_exchange(STOPPED, STARTING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        match self.bootstrap() {
            Ok(addr) => {
                self.state.store(RUNNING, Ordering::Release);
                info!(addr = %addr, "network server started");
                Ok(())
            }
            Err(e) => {
                self.release_pools();
                lock(&self.shutdown).take();
                lock(&self.local_addr).take();
                self.state.store(STOPPED, Ordering::Release);
                error!(error = %e, "network server failed to start");
                Err(e)
            }
        }
    }

    fn bootstrap(&self) -> Result<SocketAddr> {
        self.config.validate_strict()?;
        let server = &self.config.server;

        let accept_pool = build_pool("gamenet-accept", server.accept_threads)?;
        let worker_pool = build_pool("gamenet-worker", server.worker_threads)?;
        let worker_handle = worker_pool.handle().clone();

        let bind_addr = server.bind_addr();
        let listener = accept_pool.block_on(bind_listener(&bind_addr, server.backlog))?;
        let local_addr = listener.local_addr().map_err(ProtocolError::Io)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        accept_pool.spawn(accept_loop(listener, worker_handle, shutdown_rx));

        *lock(&self.accept_pool) = Some(accept_pool);
        *lock(&self.worker_pool) = Some(worker_pool);
        *lock(&self.shutdown) = Some(shutdown_tx);
        *lock(&self.local_addr) = Some(local_addr);

        Ok(local_addr)
    }

    /// Stop the network system.
    ///
    /// No-op if not running. Signals the accept loop, then releases the
    /// accept and worker pools; in-flight connection handling gets until
    /// the configured shutdown timeout to finish. Safe to call twice.
    pub fn stop(&self) {
        if self
            .state
            .compare_exchange(RUNNING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        if let Some(tx) = lock(&self.shutdown).take() {
            let _ = tx.send(true);
        }

        self.release_pools();
        lock(&self.local_addr).take();
        info!("network server stopped");
    }

    /// Whether the server has completed startup and not yet been stopped.
    ///
    /// Lock-free; safe from any thread at any time.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// Address the listener is bound to while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *lock(&self.local_addr)
    }

    /// Release both pools; each slot is independently emptied so a partial
    /// prior shutdown cannot double-release.
    fn release_pools(&self) {
        let grace = self.config.server.shutdown_timeout;

        if let Some(pool) = lock(&self.accept_pool).take() {
            pool.shutdown_timeout(grace);
        }

        if let Some(pool) = lock(&self.worker_pool).take() {
            pool.shutdown_timeout(grace);
        }
    }
}

impl Drop for NetServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_pool(name: &str, threads: usize) -> Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(threads)
        .thread_name(name)
        .enable_all()
        .build()
        .map_err(|e| ProtocolError::ConfigError(format!("failed to build {name} pool: {e}")))
}

async fn bind_listener(addr: &str, backlog: u32) -> Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ProtocolError::BindError(format!("invalid bind address '{addr}': {e}")))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|e| ProtocolError::BindError(e.to_string()))?;

    socket
        .set_reuseaddr(true)
        .map_err(|e| ProtocolError::BindError(e.to_string()))?;
    socket
        .bind(addr)
        .map_err(|e| ProtocolError::BindError(format!("{addr}: {e}")))?;

    socket
        .listen(backlog)
        .map_err(|e| ProtocolError::BindError(format!("{addr}: {e}")))
}

async fn accept_loop(listener: TcpListener, workers: Handle, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(peer = %peer, error = %e, "failed to set TCP_NODELAY");
                    }

                    global_metrics().connection_established();
                    workers.spawn(handle_connection(stream, peer, shutdown.clone()));
                }
                Err(e) => {
                    error!(error = %e, "error accepting connection");
                }
            }
        }
    }

    info!("network listener closed");
}

/// One connection's pipeline: framing -> classification, strictly in
/// arrival order. Per-packet failures are logged and the connection stays
/// open; framing failures close this connection only.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, mut shutdown: watch::Receiver<bool>) {
    debug!(peer = %peer, "connection established");

    let mut framed = Framed::new(stream, FrameCodec);
    let mut meta = ConnectionMeta::new();
    let classifier = PacketClassifier::new();

    // Announce our protocol version so the peer can version-gate us.
    match ping::server_ping() {
        Ok(frame) => {
            if let Err(e) = framed.send(frame).await {
                warn!(peer = %peer, error = %e, "failed to send version ping");
            }
        }
        Err(e) => error!(error = %e, "failed to encode version ping"),
    }

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            next = framed.next() => match next {
                Some(Ok(frame)) => {
                    global_metrics().frame_received(frame.encoded_len() as u64);

                    match classifier.classify(&frame, &mut meta) {
                        Ok(Dispatch::Ping) => global_metrics().ping_received(),
                        Ok(Dispatch::Command) => global_metrics().command_received(),
                        Ok(Dispatch::Unknown(_)) => global_metrics().unknown_packet(),
                        Err(e) => {
                            global_metrics().packet_error();
                            warn!(peer = %peer, error = %e, "dropping malformed packet");
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!(peer = %peer, error = %e, "framing error, closing connection");
                    break;
                }
                None => break,
            }
        }
    }

    global_metrics().connection_closed();
    debug!(peer = %peer, "connection closed");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
