// src/pools.rs

use ethers::types::{Address, U256};

use crate::chain::{ChainError, ChainReader};

/// True for the all-zero address factories return when no pair exists.
pub fn is_zero_address(address: Address) -> bool {
    address == Address::zero()
}

/// On-chain state of a constant-product pair or pool.
///
/// `token0`/`token1` follow the contract's own ordering, which is not the order the
/// caller asked about. Use [`PairRecord::orient`] to find the reserve that belongs
/// to a given token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRecord {
    pub pair_address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u64,
}

/// Reserves of a pair seen from one of its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedReserves {
    pub target: Address,
    pub counter: Address,
    pub target_reserve: U256,
    pub counter_reserve: U256,
    /// Whether the target is the contract's `token0`.
    pub target_is_token0: bool,
}

impl PairRecord {
    /// Reads `token0()`, `token1()` and `getReserves()` of a pair.
    pub async fn fetch(chain: &dyn ChainReader, pair: Address) -> Result<Self, ChainError> {
        let (tokens, reserves) = tokio::join!(chain.pair_tokens(pair), chain.get_reserves(pair));
        let (token0, token1) = tokens?;
        let reserves = reserves?;
        Ok(Self {
            pair_address: pair,
            token0,
            token1,
            reserve0: reserves.reserve0,
            reserve1: reserves.reserve1,
            block_timestamp_last: reserves.block_timestamp_last,
        })
    }

    pub fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// Attributes the reserves to `target` and the other token. `None` when the
    /// target is not part of this pair.
    pub fn orient(&self, target: Address) -> Option<OrientedReserves> {
        if self.token0 == target {
            Some(OrientedReserves {
                target,
                counter: self.token1,
                target_reserve: self.reserve0,
                counter_reserve: self.reserve1,
                target_is_token0: true,
            })
        } else if self.token1 == target {
            Some(OrientedReserves {
                target,
                counter: self.token0,
                target_reserve: self.reserve1,
                counter_reserve: self.reserve0,
                target_is_token0: false,
            })
        } else {
            None
        }
    }

    pub fn has_zero_reserves(&self) -> bool {
        self.reserve0.is_zero() && self.reserve1.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PairRecord {
        PairRecord {
            pair_address: Address::repeat_byte(0xaa),
            token0: Address::repeat_byte(0x01),
            token1: Address::repeat_byte(0x02),
            reserve0: U256::from(100u64),
            reserve1: U256::from(7u64),
            block_timestamp_last: 1_700_000_000,
        }
    }

    #[test]
    fn test_orient_is_symmetric() {
        let pair = record();
        let a = pair.orient(Address::repeat_byte(0x01)).unwrap();
        let b = pair.orient(Address::repeat_byte(0x02)).unwrap();
        assert_eq!(a.target_reserve, b.counter_reserve);
        assert_eq!(a.counter_reserve, b.target_reserve);
        assert_eq!(a.counter, b.target);
        assert!(a.target_is_token0);
        assert!(!b.target_is_token0);
    }

    #[test]
    fn test_orient_unknown_token() {
        assert!(record().orient(Address::repeat_byte(0x03)).is_none());
    }

    #[test]
    fn test_zero_address() {
        assert!(is_zero_address(Address::zero()));
        assert!(!is_zero_address(Address::repeat_byte(0x01)));
    }
}
