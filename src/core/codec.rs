//! Length-delimited frame codec for tokio byte streams.
//!
//! Encodes and decodes the outer framing layer: a 4-byte big-endian `u32`
//! length prefix covering the type tag and payload. Downstream stages (the
//! packet classifier) receive complete frames and never see partial reads.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_FRAME_SIZE;
use crate::core::packet::Frame;
use crate::error::ProtocolError;

/// Tokio codec producing one [`Frame`] per length-delimited unit.
///
/// The length check runs before any payload allocation, so a hostile
/// length prefix cannot trigger memory exhaustion.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        if src.len() < 4 {
            return Ok(None);
        }

        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&src[..4]);
        let length = u32::from_be_bytes(length_bytes) as usize;

        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedFrame(length));
        }

        if src.len() < 4 + length {
            // Reserve for the rest of the frame and wait for more bytes.
            src.reserve(4 + length - src.len());
            return Ok(None);
        }

        src.advance(4);
        let frame_bytes = src.split_to(length);

        Frame::from_bytes(&frame_bytes).map(Some)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let length = frame.encoded_len();
        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedFrame(length));
        }

        dst.reserve(4 + length);
        dst.put_u32(length as u32);
        dst.put_i32(frame.type_tag);
        dst.put_slice(&frame.payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::core::packet::PacketType;

    #[test]
    fn encode_decode_roundtrip() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();

        let frame = Frame::new(PacketType::Ping, vec![1, 2, 3, 4]);
        codec.encode(frame.clone(), &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_input_yields_none() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();

        codec
            .encode(Frame::new(PacketType::Command, vec![9; 32]), &mut buf)
            .unwrap();
        let full = buf.split();

        let mut partial = BytesMut::from(&full[..7]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&full[7..]);
        assert!(codec.decode(&mut partial).unwrap().is_some());
    }

    #[test]
    fn oversized_length_is_rejected_before_allocation() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();
        buf.put_u32((MAX_FRAME_SIZE + 1) as u32);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::OversizedFrame(_))
        ));
    }

    #[test]
    fn back_to_back_frames_decode_in_order() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();

        codec
            .encode(Frame::new(PacketType::Ping, vec![1]), &mut buf)
            .unwrap();
        codec
            .encode(Frame::new(PacketType::Command, vec![2]), &mut buf)
            .unwrap();

        let first = codec.decode(&mut buf).unwrap().unwrap();
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.packet_type(), Some(PacketType::Ping));
        assert_eq!(second.packet_type(), Some(PacketType::Command));
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }
}
