//! Ping packet payload: build and field constants.
//!
//! The ping payload is a payload tree with one required key carrying the
//! sender's protocol version string. It is the only payload schema this
//! core defines; everything else rides through as opaque bytes.

use crate::config::PROTOCOL_VERSION;
use crate::core::packet::{Frame, PacketType};
use crate::error::Result;
use crate::tree::{PayloadTree, TreeValue};

/// Required payload-tree key holding the sender's version string
pub const VERSION_KEY: &str = "server_version";

/// Build a ping frame announcing `version`
pub fn ping_frame(version: &str) -> Result<Frame> {
    let mut tree = PayloadTree::new();
    tree.insert(VERSION_KEY, TreeValue::Str(version.to_string()));
    Ok(Frame::new(PacketType::Ping, tree.encode()?))
}

/// Ping frame announcing this crate's protocol version
pub fn server_ping() -> Result<Frame> {
    ping_frame(PROTOCOL_VERSION)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tree::TreeDecoder;

    #[test]
    fn ping_frame_carries_version() {
        let frame = ping_frame("1.2.3").unwrap();
        assert_eq!(frame.packet_type(), Some(PacketType::Ping));

        let tree = TreeDecoder::new()
            .decode(&mut frame.payload.as_slice())
            .unwrap();
        assert_eq!(tree.get_str(VERSION_KEY).unwrap(), "1.2.3");
    }
}
