//! # Protocol Layer
//!
//! Frame classification and per-connection protocol state.
//!
//! This module sits between the framing codec and game-level handlers:
//! the [`classifier::PacketClassifier`] routes each decoded frame by its
//! type tag, publishing extracted fields into the connection's
//! [`connection::ConnectionMeta`] for later pipeline stages to read.

pub mod classifier;
pub mod connection;
pub mod ping;
