//! # Core Protocol Components
//!
//! Low-level frame handling, codecs, and the type-tag catalog.
//!
//! This module provides the foundation for the protocol, handling frame
//! framing, encoding/decoding, and wire format.
//!
//! ## Components
//! - **Packet**: type-tag catalog and the owned `Frame` unit
//! - **Codec**: Tokio codec for length-delimited framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Length(4)] [TypeTag(4)] [Payload(N)]
//! ```
//! The length prefix covers tag + payload and is stripped by the codec
//! before classification.
//!
//! ## Security
//! - Maximum frame size: 16MB (prevents memory exhaustion)
//! - Length validation before allocation
//! - Unknown type tags never abort decoding

pub mod codec;
pub mod packet;
