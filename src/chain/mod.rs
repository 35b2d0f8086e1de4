//! # Chain Client
//!
//! Every on-chain read the crate performs goes through the [`ChainReader`] trait.
//! The production implementation is [`EthersChainClient`], a thin adapter over
//! `ethers` abigen bindings; tests substitute an in-memory chain.
//!
//! Calls are plain request/response reads. There is no retry logic here: the
//! only retry in the crate is the block-range halving in [`crate::pagination`].

mod ethers_client;

pub use ethers_client::{connect_with_fallback, EthersChainClient};

use async_trait::async_trait;
use ethers::types::{Address, U256};

/// Raw `getReserves()` output, in each token's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawReserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u64,
}

/// A decoded `PairCreated(token0, token1, pair, allPairsLength)` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCreatedLog {
    pub block_number: u64,
    pub log_index: u64,
    pub token0: Address,
    pub token1: Address,
    pub pair: Address,
}

/// Errors surfaced by chain reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// Connection refused, timeout, rate limit or any other provider failure.
    #[error("RPC transport error: {0}")]
    Transport(String),
    /// The call reached the contract and reverted (e.g. a token without `symbol()`).
    #[error("Contract call reverted: {0}")]
    Revert(String),
    /// The node answered but the payload could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ChainError {
    /// Whether the provider rejected a log query because the block range (or the
    /// number of results it implies) exceeds its limit.
    ///
    /// Providers word this differently: "block range is too wide",
    /// "exceed maximum block range: 50000", "eth_getLogs is limited to a 10,000
    /// range", "query returned more than 10000 results", "Log response size
    /// exceeded".
    pub fn is_block_range_limit(&self) -> bool {
        let message = match self {
            ChainError::Transport(m) => m.to_lowercase(),
            ChainError::Revert(_) | ChainError::Decode(_) => return false,
        };
        message.contains("range")
            || message.contains("more than 10000 results")
            || message.contains("response size exceeded")
    }
}

/// Read-only view of an EVM chain, covering exactly the calls liquidity discovery
/// needs.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Uniswap V2 style `factory.getPair(tokenA, tokenB)`. Zero address when absent.
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, ChainError>;

    /// Aerodrome style `factory.getPool(tokenA, tokenB, stable)`. Zero address when absent.
    async fn get_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        stable: bool,
    ) -> Result<Address, ChainError>;

    /// `(token0(), token1())` as ordered by the pair contract itself.
    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address), ChainError>;

    async fn get_reserves(&self, pair: Address) -> Result<RawReserves, ChainError>;

    async fn token_name(&self, token: Address) -> Result<String, ChainError>;

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError>;

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError>;

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError>;

    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError>;

    /// `PairCreated` logs emitted by `factory` in the inclusive range
    /// `[from_block, to_block]`, ordered by block then log index.
    ///
    /// Implementations issue a single query; splitting large ranges is the
    /// paginator's job.
    async fn pair_created_logs(
        &self,
        factory: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<PairCreatedLog>, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_range_limit_detection() {
        let cases = [
            "block range is too wide",
            "exceed maximum block range: 50000",
            "eth_getLogs is limited to a 10,000 range",
            "query returned more than 10000 results",
            "Log response size exceeded. You can make eth_getLogs requests with up to a 2K block range",
        ];
        for msg in cases {
            assert!(
                ChainError::Transport(msg.to_string()).is_block_range_limit(),
                "{msg}"
            );
        }
    }

    #[test]
    fn test_other_errors_are_not_range_limits() {
        assert!(!ChainError::Transport("connection refused".into()).is_block_range_limit());
        assert!(!ChainError::Transport("429 Too Many Requests".into()).is_block_range_limit());
        assert!(!ChainError::Revert("execution reverted: range".into()).is_block_range_limit());
        assert!(!ChainError::Decode("invalid data".into()).is_block_range_limit());
    }
}
