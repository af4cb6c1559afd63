//! Blocking UDP receive loop.
//!
//! One thread per socket. Each datagram is decoded and routed on that thread
//! before the next receive. The socket's read timeout bounds how long a stop
//! request waits.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::config::ListenerConfig;
use crate::decoder::Decoder;
use crate::error::ListenerError;

/// Counters shared between a receive loop and its handle.
#[derive(Debug, Default)]
struct ListenerState {
    stop_flag: AtomicBool,
    datagrams: AtomicU64,
}

/// A bound socket waiting to be started.
pub struct UdpListener {
    socket: UdpSocket,
    decoder: Arc<Decoder>,
    receive_buffer: usize,
}

impl UdpListener {
    /// Bind the configured address.
    pub fn bind(config: &ListenerConfig, decoder: Arc<Decoder>) -> Result<Self, ListenerError> {
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(addr).map_err(|source| ListenerError::Bind { addr, source })?;
        socket.set_read_timeout(Some(config.read_timeout()))?;
        socket.set_broadcast(true)?;
        Ok(UdpListener {
            socket,
            decoder,
            receive_buffer: config.receive_buffer,
        })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Start the receive loop on its own thread.
    pub fn spawn(self) -> Result<ListenerHandle, ListenerError> {
        let local_addr = self.local_addr()?;
        let state = Arc::new(ListenerState::default());
        let loop_state = Arc::clone(&state);

        let thread_handle = thread::Builder::new()
            .name(format!("souliss-udp-{}", local_addr.port()))
            .spawn(move || self.run(&loop_state))?;

        debug!(%local_addr, "listener started");
        Ok(ListenerHandle {
            state,
            thread_handle: Some(thread_handle),
            local_addr,
        })
    }

    fn run(self, state: &ListenerState) {
        let mut buf = vec![0u8; self.receive_buffer];
        while !state.stop_flag.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, source)) => {
                    state.datagrams.fetch_add(1, Ordering::Relaxed);
                    trace!(%source, len, "datagram");
                    self.decoder.on_vnet_datagram(&buf[..len]);
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    warn!(error = %err, "receive failed, stopping listener");
                    break;
                }
            }
        }
    }
}

impl std::fmt::Debug for UdpListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpListener")
            .field("socket", &self.socket)
            .field("receive_buffer", &self.receive_buffer)
            .finish_non_exhaustive()
    }
}

/// Handle to a running receive loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct ListenerHandle {
    state: Arc<ListenerState>,
    thread_handle: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl ListenerHandle {
    /// The bound local address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Datagrams received so far.
    pub fn datagrams_received(&self) -> u64 {
        self.state.datagrams.load(Ordering::Relaxed)
    }

    /// Whether the loop thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signal the loop to stop and wait for it.
    ///
    /// Returns within one read timeout.
    pub fn stop(&mut self) {
        self.state.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!(local_addr = %self.local_addr, "listener thread panicked");
            }
            debug!(local_addr = %self.local_addr, "listener stopped");
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
