//! Per-connection packet classifier.
//!
//! Terminal stage of the inbound pipeline: takes one length-stripped
//! [`Frame`], routes it by type tag, and records extracted fields as
//! connection metadata. The outer framing codec has already validated the
//! frame length, so no length checks happen here.
//!
//! The classifier itself is stateless. The stateful helper it needs, the
//! [`TreeDecoder`], is confined to the calling thread: one instance per
//! worker thread, created lazily on first use and reused for every later
//! packet on that thread. Connections on different threads therefore
//! decode fully in parallel without sharing any mutable state.

use std::cell::RefCell;

use tracing::debug;

use crate::core::packet::{Frame, PacketType};
use crate::error::Result;
use crate::protocol::connection::ConnectionMeta;
use crate::protocol::ping;
use crate::tree::TreeDecoder;

/// Metadata key under which the peer's version string is published after
/// a ping packet is processed
pub const META_SERVER_VERSION: &str = "gamenet.ping.server_version";

thread_local! {
    static TREE_DECODER: RefCell<TreeDecoder> = RefCell::new(TreeDecoder::new());
}

/// Where a frame was routed by classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Ping processed, peer version published to metadata
    Ping,
    /// Command traffic, left for later pipeline stages
    Command,
    /// Unrecognized tag, payload discarded
    Unknown(i32),
}

/// Frame classifier, invoked once at a time per connection.
///
/// Safe to invoke concurrently for different connections on different
/// threads; holds no instance state.
#[derive(Debug, Default, Clone, Copy)]
pub struct PacketClassifier;

impl PacketClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one frame and route it.
    ///
    /// - PING: decodes the payload tree, looks up the required version key
    ///   and stores its value in `meta` under [`META_SERVER_VERSION`].
    ///   Missing key or malformed payload fails this packet only; `meta`
    ///   is left untouched and the caller decides connection policy.
    /// - COMMAND: traced, no payload decoding at this layer.
    /// - Anything else: traced and discarded without error.
    pub fn classify(&self, frame: &Frame, meta: &mut ConnectionMeta) -> Result<Dispatch> {
        match frame.packet_type() {
            Some(PacketType::Ping) => {
                let tree = TREE_DECODER.with(|decoder| {
                    decoder.borrow_mut().decode(&mut frame.payload.as_slice())
                })?;

                let version = tree.get_str(ping::VERSION_KEY)?;
                debug!(version = %version, "received ping packet");
                meta.insert(META_SERVER_VERSION, version);

                Ok(Dispatch::Ping)
            }
            Some(PacketType::Command) => {
                debug!("received command type packet");
                Ok(Dispatch::Command)
            }
            None => {
                debug!(tag = frame.type_tag, "received unknown type packet");
                Ok(Dispatch::Unknown(frame.type_tag))
            }
        }
    }
}
