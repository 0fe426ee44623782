//! # Payload Tree
//!
//! Self-describing key/value binary structure carried inside packet
//! payloads.
//!
//! A payload tree is a string-keyed map of typed leaves (bool, integers,
//! float, string) and nested subtrees. Each decode produces an immutable,
//! queryable [`PayloadTree`] that lives no longer than the packet being
//! handled.
//!
//! ## Wire Format
//! ```text
//! tree  := [count: u16] count * ([key: str] [value])
//! value := [kind: u8] [data]
//! str   := [len: u16] [utf-8 bytes]
//! ```
//!
//! ## Decoder Reuse
//! [`TreeDecoder`] keeps a scratch buffer between calls, so handlers that
//! decode many packets on the same thread skip per-packet allocations.
//! A decoder instance must stay confined to one thread; the classifier
//! obtains one lazily per worker thread.
//!
//! ## Security
//! - Every length is checked against the remaining input before reading
//! - Nesting depth is capped to keep recursion bounded

use bytes::{Buf, BufMut, BytesMut};
use std::collections::BTreeMap;

use crate::error::{ProtocolError, Result};

/// Maximum nesting depth accepted by the decoder
pub const MAX_TREE_DEPTH: usize = 32;

const KIND_BOOL: u8 = 0x01;
const KIND_I32: u8 = 0x02;
const KIND_I64: u8 = 0x03;
const KIND_F64: u8 = 0x04;
const KIND_STR: u8 = 0x05;
const KIND_TREE: u8 = 0x06;

/// A typed leaf or subtree inside a payload tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
    Tree(BTreeMap<String, TreeValue>),
}

impl TreeValue {
    /// Human-readable kind name, used in kind-mismatch diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            TreeValue::Bool(_) => "bool",
            TreeValue::I32(_) => "i32",
            TreeValue::I64(_) => "i64",
            TreeValue::F64(_) => "f64",
            TreeValue::Str(_) => "string",
            TreeValue::Tree(_) => "tree",
        }
    }

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        match self {
            TreeValue::Bool(v) => {
                out.put_u8(KIND_BOOL);
                out.put_u8(u8::from(*v));
            }
            TreeValue::I32(v) => {
                out.put_u8(KIND_I32);
                out.put_i32(*v);
            }
            TreeValue::I64(v) => {
                out.put_u8(KIND_I64);
                out.put_i64(*v);
            }
            TreeValue::F64(v) => {
                out.put_u8(KIND_F64);
                out.put_f64(*v);
            }
            TreeValue::Str(v) => {
                out.put_u8(KIND_STR);
                put_string(v, out)?;
            }
            TreeValue::Tree(entries) => {
                out.put_u8(KIND_TREE);
                encode_entries(entries, out)?;
            }
        }
        Ok(())
    }
}

/// Immutable, queryable key/value tree produced by one payload decode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadTree {
    entries: BTreeMap<String, TreeValue>,
}

impl PayloadTree {
    /// Empty tree, ready for `insert` on the encoding side
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key`, replacing any previous entry
    pub fn insert(&mut self, key: impl Into<String>, value: TreeValue) {
        self.entries.insert(key.into(), value);
    }

    /// Raw lookup
    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        self.entries.get(key)
    }

    /// String value for `key`; fails with `MissingField` if absent or
    /// `KindMismatch` if present with a different leaf kind
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.entries.get(key) {
            None => Err(ProtocolError::MissingField(key.to_string())),
            Some(TreeValue::Str(v)) => Ok(v),
            Some(other) => Err(ProtocolError::KindMismatch {
                key: key.to_string(),
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }

    /// i32 value for `key`, with the same failure contract as `get_str`
    pub fn get_i32(&self, key: &str) -> Result<i32> {
        match self.entries.get(key) {
            None => Err(ProtocolError::MissingField(key.to_string())),
            Some(TreeValue::I32(v)) => Ok(*v),
            Some(other) => Err(ProtocolError::KindMismatch {
                key: key.to_string(),
                expected: "i32",
                found: other.kind_name(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the tree to its wire encoding
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = BytesMut::new();
        encode_entries(&self.entries, &mut out)?;
        Ok(out.to_vec())
    }
}

fn encode_entries(entries: &BTreeMap<String, TreeValue>, out: &mut BytesMut) -> Result<()> {
    if entries.len() > u16::MAX as usize {
        return Err(ProtocolError::EncodeError(format!(
            "tree has {} entries, limit is {}",
            entries.len(),
            u16::MAX
        )));
    }

    out.put_u16(entries.len() as u16);
    for (key, value) in entries {
        put_string(key, out)?;
        value.encode(out)?;
    }
    Ok(())
}

fn put_string(value: &str, out: &mut BytesMut) -> Result<()> {
    if value.len() > u16::MAX as usize {
        return Err(ProtocolError::EncodeError(format!(
            "string of {} bytes exceeds the u16 length prefix",
            value.len()
        )));
    }

    out.put_u16(value.len() as u16);
    out.put_slice(value.as_bytes());
    Ok(())
}

/// Stateful payload-tree decoder.
///
/// Holds a scratch buffer that is reused across sequential decodes, so a
/// worker thread that classifies packet after packet allocates once.
/// Not shareable between threads while in use; obtain one per thread.
#[derive(Debug, Default)]
pub struct TreeDecoder {
    scratch: Vec<u8>,
}

impl TreeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one payload tree from `buf`; fails with `DecodeError` on
    /// malformed input. Bytes past the root tree are left unread.
    pub fn decode<B: Buf>(&mut self, buf: &mut B) -> Result<PayloadTree> {
        let entries = self.read_entries(buf, 0)?;
        Ok(PayloadTree { entries })
    }

    fn read_entries<B: Buf>(
        &mut self,
        buf: &mut B,
        depth: usize,
    ) -> Result<BTreeMap<String, TreeValue>> {
        if depth > MAX_TREE_DEPTH {
            return Err(ProtocolError::DecodeError(format!(
                "tree nesting exceeds {MAX_TREE_DEPTH} levels"
            )));
        }

        need(buf, 2)?;
        let count = buf.get_u16();

        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = self.read_string(buf)?;
            let value = self.read_value(buf, depth)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    fn read_value<B: Buf>(&mut self, buf: &mut B, depth: usize) -> Result<TreeValue> {
        need(buf, 1)?;
        match buf.get_u8() {
            KIND_BOOL => {
                need(buf, 1)?;
                Ok(TreeValue::Bool(buf.get_u8() != 0))
            }
            KIND_I32 => {
                need(buf, 4)?;
                Ok(TreeValue::I32(buf.get_i32()))
            }
            KIND_I64 => {
                need(buf, 8)?;
                Ok(TreeValue::I64(buf.get_i64()))
            }
            KIND_F64 => {
                need(buf, 8)?;
                Ok(TreeValue::F64(buf.get_f64()))
            }
            KIND_STR => Ok(TreeValue::Str(self.read_string(buf)?)),
            KIND_TREE => Ok(TreeValue::Tree(self.read_entries(buf, depth + 1)?)),
            other => Err(ProtocolError::DecodeError(format!(
                "unknown leaf kind byte 0x{other:02X}"
            ))),
        }
    }

    fn read_string<B: Buf>(&mut self, buf: &mut B) -> Result<String> {
        need(buf, 2)?;
        let len = buf.get_u16() as usize;
        need(buf, len)?;

        self.scratch.clear();
        self.scratch.resize(len, 0);
        buf.copy_to_slice(&mut self.scratch);

        std::str::from_utf8(&self.scratch)
            .map(str::to_owned)
            .map_err(|e| ProtocolError::DecodeError(format!("invalid utf-8 in string: {e}")))
    }
}

fn need<B: Buf>(buf: &B, bytes: usize) -> Result<()> {
    if buf.remaining() < bytes {
        Err(ProtocolError::DecodeError(format!(
            "truncated input: needed {bytes} more bytes, had {}",
            buf.remaining()
        )))
    } else {
        Ok(())
    }
}
