//! Type-tag catalog and the framed packet unit.
//!
//! A frame on the wire is a 4-byte big-endian signed type tag followed by
//! an opaque payload. The tag values are stable across protocol versions;
//! values outside the catalog are carried through as-is and handled by the
//! classifier as unknown traffic.

use bytes::Buf;

use crate::error::{ProtocolError, Result};

/// Catalog of recognized packet types.
///
/// Tag values are part of the wire protocol and must never be reused or
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PacketType {
    /// Version/liveness announcement carrying a payload tree
    Ping = 1,
    /// Command traffic, dispatched by later pipeline stages
    Command = 2,
}

impl PacketType {
    /// Wire tag for this packet type
    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Map a wire tag back to the catalog, `None` for unknown tags
    pub const fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(PacketType::Ping),
            2 => Some(PacketType::Command),
            _ => None,
        }
    }
}

/// One length-delimited unit of protocol data, after the outer length
/// prefix has been stripped.
///
/// The payload is an owned buffer: a `Frame` holds no references into the
/// network read buffer it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Leading type tag, not necessarily a cataloged value
    pub type_tag: i32,
    /// Opaque payload bytes (everything after the tag)
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame for a cataloged packet type
    pub fn new(packet_type: PacketType, payload: Vec<u8>) -> Self {
        Self {
            type_tag: packet_type.tag(),
            payload,
        }
    }

    /// Parse a length-stripped frame: 4-byte big-endian tag, remainder is
    /// the payload. All readable bytes after the tag belong to the payload.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        if bytes.remaining() < 4 {
            return Err(ProtocolError::TruncatedFrame);
        }

        let type_tag = bytes.get_i32();
        let payload = bytes.to_vec();

        Ok(Self { type_tag, payload })
    }

    /// Serialize tag + payload (without the outer length prefix)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.payload.len());
        out.extend_from_slice(&self.type_tag.to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Cataloged type for this frame, `None` if the tag is unknown
    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::from_tag(self.type_tag)
    }

    /// Encoded size on the wire, excluding the length prefix
    pub fn encoded_len(&self) -> usize {
        4 + self.payload.len()
    }
}
