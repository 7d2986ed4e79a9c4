//! Wire codec for the shard half of a distributed percolate operation.
//!
//! Percolation inverts normal search: a document is evaluated against a set
//! of previously stored queries, and the result names the queries that
//! matched it. Each shard holds a slice of the stored queries, evaluates the
//! document independently, and sends one [`PercolateShardResponse`] back to
//! the coordinator, which merges the per-shard answers into the final result.
//!
//! This crate covers only that response value and its binary encoding: the
//! shared broadcast envelope (index name and shard id), the total match
//! count, the matched query identifiers in discovery order, an optional
//! parallel score array, and the echoed request flags. Counts and lengths
//! travel as varints; scores are fixed-width little-endian `f32`. Decoding
//! checks every declared length against the bytes actually present before
//! allocating for it, so corrupt or hostile input fails with an [`Error`]
//! instead of an oversized allocation, and one bad shard answer never takes
//! down the rest of the broadcast.
//!
//! ```
//! use percolate_wire::{PercolateContext, PercolateShardResponse, ShardEnvelope};
//!
//! let ctx = PercolateContext { score: true, ..Default::default() };
//! let resp = PercolateShardResponse::with_scores(
//!     ShardEnvelope::new("docs", 2),
//!     vec![b"q1".to_vec(), b"q2".to_vec()],
//!     vec![0.8, 0.4],
//!     2,
//!     &ctx,
//! );
//! let bytes = resp.to_vec();
//!
//! let mut stream = &bytes[..];
//! let echoed = PercolateShardResponse::decode(&mut stream).unwrap();
//! assert_eq!(echoed.matches(), resp.matches());
//! assert!(!echoed.score()); // the score flag stays local to the sender
//! assert!(stream.is_empty());
//! ```

mod envelope;
mod error;
mod response;
mod varint;

pub use self::envelope::ShardEnvelope;
pub use self::error::{Error, Result};
pub use self::response::{PercolateContext, PercolateShardResponse};
