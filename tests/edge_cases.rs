//! Edge-case tests for framing and payload trees

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use gamenet_protocol::config::MAX_FRAME_SIZE;
use gamenet_protocol::{
    Frame, FrameCodec, PacketType, PayloadTree, ProtocolError, TreeDecoder, TreeValue,
};

#[test]
fn zero_length_frame_is_truncated() {
    let mut codec = FrameCodec;
    let mut buf = BytesMut::new();
    buf.put_u32(0);

    assert!(matches!(
        codec.decode(&mut buf),
        Err(ProtocolError::TruncatedFrame)
    ));
}

#[test]
fn frame_shorter_than_tag_is_truncated() {
    let mut codec = FrameCodec;
    let mut buf = BytesMut::new();
    buf.put_u32(2);
    buf.put_slice(&[0x01, 0x02]);

    assert!(matches!(
        codec.decode(&mut buf),
        Err(ProtocolError::TruncatedFrame)
    ));
}

#[test]
fn hostile_length_prefix_is_rejected() {
    let mut codec = FrameCodec;
    let mut buf = BytesMut::new();
    buf.put_u32(u32::MAX);

    assert!(matches!(
        codec.decode(&mut buf),
        Err(ProtocolError::OversizedFrame(_))
    ));
}

#[test]
fn oversized_frame_is_rejected_on_encode() {
    let mut codec = FrameCodec;
    let mut buf = BytesMut::new();

    let frame = Frame::new(PacketType::Command, vec![0u8; MAX_FRAME_SIZE]);
    assert!(matches!(
        codec.encode(frame, &mut buf),
        Err(ProtocolError::OversizedFrame(_))
    ));
}

#[test]
fn tag_only_frame_roundtrips() {
    let mut codec = FrameCodec;
    let mut buf = BytesMut::new();

    codec
        .encode(Frame::new(PacketType::Ping, Vec::new()), &mut buf)
        .unwrap();
    let decoded = codec.decode(&mut buf).unwrap().unwrap();

    assert_eq!(decoded.packet_type(), Some(PacketType::Ping));
    assert!(decoded.payload.is_empty());
}

#[test]
fn wide_flat_tree_roundtrips() {
    let mut tree = PayloadTree::new();
    for i in 0..1000 {
        tree.insert(format!("key_{i}"), TreeValue::I32(i));
    }

    let decoded = TreeDecoder::new()
        .decode(&mut tree.encode().unwrap().as_slice())
        .unwrap();
    assert_eq!(decoded.len(), 1000);
    assert_eq!(decoded.get_i32("key_567").unwrap(), 567);
}

#[test]
fn empty_string_values_are_preserved() {
    let mut tree = PayloadTree::new();
    tree.insert("empty", TreeValue::Str(String::new()));

    let decoded = TreeDecoder::new()
        .decode(&mut tree.encode().unwrap().as_slice())
        .unwrap();
    assert_eq!(decoded.get_str("empty").unwrap(), "");
}

#[test]
fn unicode_keys_and_values_roundtrip() {
    let mut tree = PayloadTree::new();
    tree.insert("侍の名前", TreeValue::Str("северный ветер".to_string()));

    let decoded = TreeDecoder::new()
        .decode(&mut tree.encode().unwrap().as_slice())
        .unwrap();
    assert_eq!(decoded.get_str("侍の名前").unwrap(), "северный ветер");
}

#[test]
fn trailing_bytes_after_root_tree_are_ignored() {
    let mut tree = PayloadTree::new();
    tree.insert("v", TreeValue::Bool(true));

    let mut encoded = tree.encode().unwrap();
    encoded.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

    let decoded = TreeDecoder::new().decode(&mut encoded.as_slice()).unwrap();
    assert_eq!(decoded.get("v"), Some(&TreeValue::Bool(true)));
}

#[test]
fn string_too_long_for_length_prefix_fails_encode() {
    let mut tree = PayloadTree::new();
    tree.insert(
        "blob",
        TreeValue::Str("x".repeat(u16::MAX as usize + 1)),
    );

    assert!(matches!(
        tree.encode(),
        Err(ProtocolError::EncodeError(_))
    ));
}
