use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::varint::{read_nonneg, write_v32};

/// Shared framing every shard-level broadcast response carries: the name of
/// the index the shard belongs to and the shard's number. The percolate
/// response owns one and runs its codec first on both directions, keeping the
/// layout explicit instead of hiding it in a base type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShardEnvelope {
    index: String,
    shard: i32,
}

// Envelope wire layout:
//  1. Index name length as a 32-bit varint
//  2. The index name, raw UTF-8
//  3. Shard id as a 4-byte little-endian i32

impl ShardEnvelope {
    pub fn new(index: impl Into<String>, shard: i32) -> Self {
        Self {
            index: index.into(),
            shard,
        }
    }

    /// Name of the index this shard belongs to.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Shard number within the index.
    pub fn shard(&self) -> i32 {
        self.shard
    }

    pub fn encode_vec(&self, buf: &mut Vec<u8>) {
        write_v32(buf, self.index.len() as u32);
        buf.extend_from_slice(self.index.as_bytes());
        buf.extend_from_slice(&self.shard.to_le_bytes());
    }

    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        let len = read_nonneg(buf, "index name length")? as usize;
        if buf.len() < len {
            return Err(Error::TruncatedStream {
                step: "index name",
                actual: buf.len(),
                expected: len,
            });
        }
        let (data, rem) = buf.split_at(len);
        *buf = rem;
        let index = std::str::from_utf8(data)
            .map_err(|_| Error::BadText { step: "index name" })?
            .to_string();

        if buf.len() < 4 {
            return Err(Error::TruncatedStream {
                step: "shard id",
                actual: buf.len(),
                expected: 4,
            });
        }
        let shard = buf.read_i32::<LittleEndian>().unwrap(); // Checked above

        Ok(Self { index, shard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let env = ShardEnvelope::new("documents-2026", 7);
        let mut buf = Vec::new();
        env.encode_vec(&mut buf);
        let mut slice = &buf[..];
        let out = ShardEnvelope::decode(&mut slice).unwrap();
        assert_eq!(out, env);
        assert!(slice.is_empty());
    }

    #[test]
    fn roundtrip_empty_index_and_negative_shard() {
        let env = ShardEnvelope::new("", -1);
        let mut buf = Vec::new();
        env.encode_vec(&mut buf);
        let out = ShardEnvelope::decode(&mut &buf[..]).unwrap();
        assert_eq!(out.index(), "");
        assert_eq!(out.shard(), -1);
    }

    #[test]
    fn truncated_index_bytes() {
        let env = ShardEnvelope::new("documents", 0);
        let mut buf = Vec::new();
        env.encode_vec(&mut buf);
        let cut = &buf[..4]; // length prefix plus three bytes of the name
        assert!(matches!(
            ShardEnvelope::decode(&mut &cut[..]),
            Err(Error::TruncatedStream { .. })
        ));
    }

    #[test]
    fn missing_shard_id() {
        let env = ShardEnvelope::new("idx", 12);
        let mut buf = Vec::new();
        env.encode_vec(&mut buf);
        let cut = &buf[..buf.len() - 2];
        assert!(matches!(
            ShardEnvelope::decode(&mut &cut[..]),
            Err(Error::TruncatedStream { step: "shard id", .. })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let buf = [2u8, 0xFF, 0xFE, 0, 0, 0, 0];
        assert!(matches!(
            ShardEnvelope::decode(&mut &buf[..]),
            Err(Error::BadText { step: "index name" })
        ));
    }

    #[test]
    fn rejects_negative_index_length() {
        // Varint for 0x8000_0000, whose i32 reinterpretation is negative.
        let buf = [0x80u8, 0x80, 0x80, 0x80, 0x08];
        assert!(matches!(
            ShardEnvelope::decode(&mut &buf[..]),
            Err(Error::NegativeLength { .. })
        ));
    }
}
