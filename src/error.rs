//! # Error Types
//!
//! Comprehensive error handling for the game network core.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O errors to per-packet payload failures.
//!
//! ## Error Categories
//! - **Startup Errors**: configuration and socket-bind failures that abort
//!   `NetServer::start()` before the server reaches the running state
//! - **Framing Errors**: oversized or truncated frames on the wire
//! - **Payload Errors**: malformed payload trees, missing or mistyped keys
//! - **Transport Errors**: I/O failures and closed connections
//!
//! Startup errors are fatal; payload errors are local to one packet and
//! must never take down the worker that hit them.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

/// ProtocolError is the primary error type for all network-core operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to bind listener: {0}")]
    BindError(String),

    #[error("Payload decode error: {0}")]
    DecodeError(String),

    #[error("Payload encode error: {0}")]
    EncodeError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{key}' has kind {found}, expected {expected}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Frame shorter than the 4-byte type tag")]
    TruncatedFrame,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Timeout occurred")]
    Timeout,
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
