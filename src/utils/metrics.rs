//! Observability and Metrics
//!
//! This module provides metrics collection and observability features
//! for monitoring the network core's traffic and health.
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Global metrics collector for network-core operations
#[derive(Debug)]
pub struct Metrics {
    /// Total connections established
    pub connections_total: AtomicU64,
    /// Currently active connections
    pub connections_active: AtomicU64,
    /// Total frames received
    pub frames_received: AtomicU64,
    /// Total bytes received in frames
    pub bytes_received: AtomicU64,
    /// Ping packets processed
    pub pings_received: AtomicU64,
    /// Command packets routed downstream
    pub commands_received: AtomicU64,
    /// Frames discarded for an unrecognized type tag
    pub unknown_packets: AtomicU64,
    /// Per-packet processing failures
    pub packet_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            connections_total: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            pings_received: AtomicU64::new(0),
            commands_received: AtomicU64::new(0),
            unknown_packets: AtomicU64::new(0),
            packet_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a new connection
    pub fn connection_established(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection closed
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a frame received
    pub fn frame_received(&self, byte_count: u64) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a processed ping packet
    pub fn ping_received(&self) {
        self.pings_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a command packet routed downstream
    pub fn command_received(&self) {
        self.commands_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded unknown-type frame
    pub fn unknown_packet(&self) {
        self.unknown_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-packet processing failure
    pub fn packet_error(&self) {
        self.packet_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            pings_received: self.pings_received.load(Ordering::Relaxed),
            commands_received: self.commands_received.load(Ordering::Relaxed),
            unknown_packets: self.unknown_packets.load(Ordering::Relaxed),
            packet_errors: self.packet_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            connections_total = snapshot.connections_total,
            connections_active = snapshot.connections_active,
            frames_received = snapshot.frames_received,
            bytes_received = snapshot.bytes_received,
            pings_received = snapshot.pings_received,
            commands_received = snapshot.commands_received,
            unknown_packets = snapshot.unknown_packets,
            packet_errors = snapshot.packet_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Network metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub connections_total: u64,
    pub connections_active: u64,
    pub frames_received: u64,
    pub bytes_received: u64,
    pub pings_received: u64,
    pub commands_received: u64,
    pub unknown_packets: u64,
    pub packet_errors: u64,
    pub uptime_seconds: u64,
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
