//! The per-shard percolate result and its wire codec.
//!
//! A shard evaluates the stored queries it holds against one incoming
//! document and reports back through a [`PercolateShardResponse`]: which
//! queries matched, how many matched in total, and optionally a relevance
//! score per match. The coordinator decodes one response per shard and merges
//! them into the final answer. This module covers building, serializing, and
//! reconstructing that value; how matches are computed and how the
//! coordinator merges them live elsewhere.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, trace};

use crate::envelope::ShardEnvelope;
use crate::error::{Error, Result};
use crate::varint::{read_nonneg, read_v64, write_v32, write_v64};

/// Request-derived flags a shard copies verbatim into every response it
/// builds for one percolate request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PercolateContext {
    /// The request restricted how many matches may be returned.
    pub limit: bool,
    /// Maximum requested match count. Meaningful only when `limit` is set.
    pub size: u32,
    /// Matches should be treated as sorted by score when merged.
    pub sort: bool,
    /// The shard was asked to compute per-match scores.
    pub score: bool,
}

/// One shard's percolate result, immutable once built.
///
/// `matches` holds the identifiers of the stored queries that matched, in
/// discovery order. `scores` is either empty or exactly parallel to
/// `matches`. `count` is the total number of matching queries on the shard,
/// which can exceed `matches.len()` when the request limited the returned
/// identifiers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PercolateShardResponse {
    envelope: ShardEnvelope,
    count: u64,
    matches: Vec<Vec<u8>>,
    scores: Vec<f32>,
    limit: bool,
    requested_size: u32,
    sort: bool,
    score: bool,
}

// Wire layout, after the envelope:
//  1. count as a 64-bit varint
//  2. match list length as a 32-bit varint
//  3. each match: 32-bit varint byte length, then the raw bytes
//  4. score list length as a 32-bit varint
//  5. each score as a little-endian f32
//  6. limit flag byte
//  7. requested size as a 32-bit varint
//  8. sort flag byte
// The `score` flag is not transmitted.

impl PercolateShardResponse {
    /// Full-detail response: match identifiers with a parallel score array.
    ///
    /// `matches` and `scores` must already be equal length. The evaluation
    /// step that produced them guarantees it; the constructor does not
    /// re-check.
    pub fn with_scores(
        envelope: ShardEnvelope,
        matches: Vec<Vec<u8>>,
        scores: Vec<f32>,
        count: u64,
        ctx: &PercolateContext,
    ) -> Self {
        Self {
            envelope,
            count,
            matches,
            scores,
            limit: ctx.limit,
            requested_size: ctx.size,
            sort: ctx.sort,
            score: ctx.score,
        }
    }

    /// Match identifiers without scores, for requests that disabled score
    /// computation.
    pub fn with_matches(
        envelope: ShardEnvelope,
        matches: Vec<Vec<u8>>,
        count: u64,
        ctx: &PercolateContext,
    ) -> Self {
        Self::with_scores(envelope, matches, Vec::new(), count, ctx)
    }

    /// Count-only response, for requests that never need the identifiers.
    pub fn count_only(envelope: ShardEnvelope, count: u64, ctx: &PercolateContext) -> Self {
        Self::with_scores(envelope, Vec::new(), Vec::new(), count, ctx)
    }

    /// Response from a context that produced nothing; the count is zero.
    pub fn empty(envelope: ShardEnvelope, ctx: &PercolateContext) -> Self {
        Self::count_only(envelope, 0, ctx)
    }

    pub fn envelope(&self) -> &ShardEnvelope {
        &self.envelope
    }

    /// Name of the index this response's shard belongs to.
    pub fn index(&self) -> &str {
        self.envelope.index()
    }

    /// Shard number within the index.
    pub fn shard(&self) -> i32 {
        self.envelope.shard()
    }

    /// Total number of stored queries that matched on this shard. Can exceed
    /// `matches().len()` when the request limited the returned identifiers.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Identifiers of the matched stored queries, in discovery order.
    pub fn matches(&self) -> &[Vec<u8>] {
        &self.matches
    }

    /// Per-match relevance scores: empty, or exactly parallel to `matches()`.
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Whether the request restricted how many matches may be returned.
    pub fn limit(&self) -> bool {
        self.limit
    }

    /// Maximum requested match count. Meaningful only when `limit()` is true.
    pub fn requested_size(&self) -> u32 {
        self.requested_size
    }

    /// Whether matches should be treated as sorted by score when merged.
    pub fn sort(&self) -> bool {
        self.sort
    }

    /// Whether this shard was asked to compute scores. Local to the
    /// constructing side: the flag is not part of the wire format, so a
    /// decoded response always reports `false`.
    pub fn score(&self) -> bool {
        self.score
    }

    /// Serialize onto `buf`: the envelope first, then this response's fields
    /// in wire order. Writing to a vector cannot fail.
    pub fn encode_vec(&self, buf: &mut Vec<u8>) {
        self.envelope.encode_vec(buf);
        write_v64(buf, self.count);
        write_v32(buf, self.matches.len() as u32);
        for m in &self.matches {
            write_v32(buf, m.len() as u32);
            buf.extend_from_slice(m);
        }
        // Score and size counts use the 32-bit varint form in both directions.
        write_v32(buf, self.scores.len() as u32);
        for s in &self.scores {
            buf.extend_from_slice(&s.to_le_bytes());
        }
        buf.push(self.limit as u8);
        write_v32(buf, self.requested_size);
        buf.push(self.sort as u8);
    }

    /// Serialize into a fresh byte vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_vec(&mut buf);
        buf
    }

    /// Write the encoded response to an arbitrary sink. The encoding itself
    /// cannot fail; only the sink's write errors propagate.
    pub fn encode<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_vec())?;
        Ok(())
    }

    /// Reconstruct a response from the front of `buf`, advancing it past the
    /// consumed bytes. Every declared length is checked against the bytes
    /// actually remaining before anything is allocated for it, so corrupt or
    /// hostile input fails with an error rather than an oversized allocation.
    /// A failure invalidates only this one shard's answer.
    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        match Self::decode_fields(buf) {
            Ok(resp) => {
                trace!(
                    index = resp.envelope.index(),
                    shard = resp.envelope.shard(),
                    count = resp.count,
                    matches = resp.matches.len(),
                    scored = !resp.scores.is_empty(),
                    "decoded percolate shard response"
                );
                Ok(resp)
            }
            Err(err) => {
                debug!(
                    %err,
                    remaining = buf.len(),
                    "percolate shard response decode failed"
                );
                Err(err)
            }
        }
    }

    fn decode_fields(buf: &mut &[u8]) -> Result<Self> {
        let envelope = ShardEnvelope::decode(buf)?;
        let count = read_v64(buf, "match count")?;

        let n_matches = read_nonneg(buf, "match list length")? as usize;
        // Each identifier occupies at least its one-byte length prefix, so a
        // declared list longer than the remaining bytes can never be real.
        if n_matches > buf.len() {
            return Err(Error::TruncatedStream {
                step: "match list",
                actual: buf.len(),
                expected: n_matches,
            });
        }
        let mut matches = Vec::with_capacity(n_matches);
        for _ in 0..n_matches {
            let len = read_nonneg(buf, "match identifier length")? as usize;
            if len > buf.len() {
                return Err(Error::TruncatedStream {
                    step: "match identifier",
                    actual: buf.len(),
                    expected: len,
                });
            }
            let (data, rem) = buf.split_at(len);
            *buf = rem;
            matches.push(data.to_vec());
        }

        let n_scores = read_nonneg(buf, "score list length")? as usize;
        if n_scores != 0 && n_scores != matches.len() {
            return Err(Error::InconsistentArrayLengths {
                matches: matches.len(),
                scores: n_scores,
            });
        }
        let score_bytes = n_scores * 4;
        if score_bytes > buf.len() {
            return Err(Error::TruncatedStream {
                step: "score list",
                actual: buf.len(),
                expected: score_bytes,
            });
        }
        let mut scores = Vec::with_capacity(n_scores);
        for _ in 0..n_scores {
            scores.push(buf.read_f32::<LittleEndian>().unwrap()); // Checked above
        }

        let limit = read_flag(buf, "limit flag")?;
        let requested_size = read_nonneg(buf, "requested size")?;
        let sort = read_flag(buf, "sort flag")?;

        Ok(Self {
            envelope,
            count,
            matches,
            scores,
            limit,
            requested_size,
            sort,
            // Not transmitted; only the constructing side ever sees it set.
            score: false,
        })
    }
}

fn read_flag(buf: &mut &[u8], step: &'static str) -> Result<bool> {
    let (&byte, rest) = buf.split_first().ok_or(Error::TruncatedStream {
        step,
        actual: 0,
        expected: 1,
    })?;
    *buf = rest;
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(Error::BadFlag { step, value }),
    }
}
