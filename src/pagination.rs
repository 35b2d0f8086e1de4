//! # Event Paginator
//!
//! Fetches `PairCreated` logs over a block range in bounded chunks.
//!
//! Public RPC endpoints cap `eth_getLogs` by block span or result count. The
//! paginator walks the range sequentially; when a chunk is rejected for being
//! too wide, the chunk size is halved and the same sub-range is retried. The
//! smaller size is kept for the rest of the walk.
//!
//! Any other failure is handled according to [`ChunkFailurePolicy`]. With
//! `Skip`, the failed sub-range is recorded in [`PaginatedLogs::failed_ranges`]
//! so callers can tell an incomplete result from a complete one.

use ethers::types::Address;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::chain::{ChainError, ChainReader, PairCreatedLog};

/// Default chunk width for factory scans.
pub const DEFAULT_CHUNK_SIZE: u64 = 10_000;

/// What to do when a chunk fails for a reason other than the range limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkFailurePolicy {
    /// Record the failed range and continue with the next chunk.
    #[default]
    Skip,
    /// Abort the whole pagination.
    Fail,
}

/// Inclusive block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Window of `lookback` blocks ending at `latest`, clipped at genesis.
    pub fn lookback(latest: u64, lookback: u64) -> Self {
        Self {
            from: latest.saturating_sub(lookback),
            to: latest,
        }
    }

    pub fn len(&self) -> u64 {
        if self.from > self.to {
            0
        } else {
            self.to - self.from + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// A chunk that could not be fetched under [`ChunkFailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRange {
    pub range: BlockRange,
    pub reason: ChainError,
}

#[derive(Debug, Clone, Default)]
pub struct PaginatedLogs {
    /// Matching logs in block order.
    pub logs: Vec<PairCreatedLog>,
    pub failed_ranges: Vec<FailedRange>,
    /// Chunk size in effect when the walk finished (after any halving).
    pub final_chunk_size: u64,
    /// Number of `eth_getLogs` requests issued, including rejected ones.
    pub requests: usize,
}

impl PaginatedLogs {
    /// True when every block of the requested range was fetched.
    pub fn is_complete(&self) -> bool {
        self.failed_ranges.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    #[error("Chunk size must be at least 1")]
    ZeroChunkSize,
    #[error("Fetching logs for blocks {range} failed: {source}")]
    ChunkFailed {
        range: BlockRange,
        #[source]
        source: ChainError,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct LogPaginator {
    chunk_size: u64,
    policy: ChunkFailurePolicy,
}

impl Default for LogPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, ChunkFailurePolicy::Skip)
    }
}

impl LogPaginator {
    pub fn new(chunk_size: u64, policy: ChunkFailurePolicy) -> Self {
        Self { chunk_size, policy }
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn policy(&self) -> ChunkFailurePolicy {
        self.policy
    }

    /// Collects every `PairCreated` log emitted by `factory` within `range`.
    pub async fn fetch_pair_created(
        &self,
        chain: &dyn ChainReader,
        factory: Address,
        range: BlockRange,
    ) -> Result<PaginatedLogs, PaginationError> {
        if self.chunk_size == 0 {
            return Err(PaginationError::ZeroChunkSize);
        }

        let mut out = PaginatedLogs {
            final_chunk_size: self.chunk_size,
            ..Default::default()
        };
        let mut chunk = self.chunk_size;
        let mut cursor = range.from;

        while cursor <= range.to {
            let end = cursor.saturating_add(chunk - 1).min(range.to);
            let current = BlockRange::new(cursor, end);
            debug!("Querying PairCreated logs for blocks {}", current);
            out.requests += 1;

            match chain.pair_created_logs(factory, cursor, end).await {
                Ok(mut batch) => {
                    debug!(
                        "Found {} events in blocks {}, total so far {}",
                        batch.len(),
                        current,
                        out.logs.len() + batch.len()
                    );
                    out.logs.append(&mut batch);
                }
                Err(e) if e.is_block_range_limit() && chunk > 1 => {
                    chunk /= 2;
                    info!(
                        "Range limit hit for blocks {} ({}), reducing chunk size to {}",
                        current, e, chunk
                    );
                    continue;
                }
                Err(e) => match self.policy {
                    ChunkFailurePolicy::Skip => {
                        warn!("Skipping blocks {} after error: {}", current, e);
                        out.failed_ranges.push(FailedRange {
                            range: current,
                            reason: e,
                        });
                    }
                    ChunkFailurePolicy::Fail => {
                        return Err(PaginationError::ChunkFailed {
                            range: current,
                            source: e,
                        });
                    }
                },
            }

            match end.checked_add(1) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        out.final_chunk_size = chunk;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_window_clips_at_genesis() {
        assert_eq!(BlockRange::lookback(1_000, 50_000), BlockRange::new(0, 1_000));
        assert_eq!(
            BlockRange::lookback(2_000_000, 1_000_000),
            BlockRange::new(1_000_000, 2_000_000)
        );
    }

    #[test]
    fn test_block_range_len() {
        assert_eq!(BlockRange::new(5, 5).len(), 1);
        assert_eq!(BlockRange::new(0, 9_999).len(), 10_000);
        assert!(BlockRange::new(10, 9).is_empty());
    }

    #[test]
    fn test_policy_defaults_to_skip() {
        assert_eq!(ChunkFailurePolicy::default(), ChunkFailurePolicy::Skip);
        assert_eq!(LogPaginator::default().chunk_size(), DEFAULT_CHUNK_SIZE);
    }
}
