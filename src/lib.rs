//! # gamenet-protocol
//!
//! High-performance network core for multiplayer game servers and clients.
//!
//! This crate provides the network-facing core of a client/server game
//! platform: a binary, type-tagged wire protocol, a per-connection packet
//! classifier, and a server-side lifecycle manager owning the accept and
//! worker thread pools.
//!
//! ## Architecture
//! ```text
//! NetServer (lifecycle)
//!   └── accept pool ── TcpListener
//!         └── worker pool ── per-connection task
//!               └── Framed(FrameCodec) ── PacketClassifier ── ConnectionMeta
//! ```
//!
//! ## Wire Format
//! ```text
//! [Length(4)] [TypeTag(4)] [Payload(N)]
//! ```
//! Recognized type tags are cataloged in [`core::packet::PacketType`];
//! ping payloads carry a [payload tree](tree) with the sender's version.
//!
//! ## Concurrency
//! Each connection is pinned to one worker task: packets for a connection
//! are processed in arrival order, while different connections decode in
//! parallel. Payload-tree decoders are confined per worker thread and
//! reused across packets, so classification shares no mutable state.
//!
//! ## Example
//! ```no_run
//! use gamenet_protocol::config::NetworkConfig;
//! use gamenet_protocol::service::server::NetServer;
//!
//! fn main() -> gamenet_protocol::Result<()> {
//!     let config = NetworkConfig::from_file("gamenet.toml")?;
//!     gamenet_protocol::utils::logging::init_logging(&config.logging)?;
//!
//!     let server = NetServer::new(config);
//!     server.start()?;
//!     assert!(server.is_running());
//!
//!     // ... run the game ...
//!
//!     server.stop();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod tree;
pub mod utils;

pub use crate::config::NetworkConfig;
pub use crate::core::codec::FrameCodec;
pub use crate::core::packet::{Frame, PacketType};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::classifier::{Dispatch, PacketClassifier, META_SERVER_VERSION};
pub use crate::protocol::connection::ConnectionMeta;
pub use crate::service::client::ClientSession;
pub use crate::service::server::NetServer;
pub use crate::tree::{PayloadTree, TreeDecoder, TreeValue};
