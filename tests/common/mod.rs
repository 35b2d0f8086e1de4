//! In-memory chain used by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use ethers::types::{Address, U256};
use liquidity_scout::chain::{ChainError, ChainReader, PairCreatedLog, RawReserves};

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// `units * 10^decimals`.
pub fn raw(units: u64, decimals: usize) -> U256 {
    U256::from(units) * U256::exp10(decimals)
}

struct Token {
    name: String,
    symbol: String,
    decimals: u8,
    supply: U256,
}

struct PairState {
    token0: Address,
    token1: Address,
    reserves: RawReserves,
}

#[derive(Default)]
pub struct FakeChain {
    latest_block: u64,
    pairs: HashMap<(Address, Address, Address), Address>,
    pools: HashMap<(Address, Address, Address, bool), Address>,
    pair_state: HashMap<Address, PairState>,
    tokens: HashMap<Address, Token>,
    balances: HashMap<(Address, Address), U256>,
    reverting_symbol: HashSet<Address>,
    failing_reserves: HashSet<Address>,
    failing_lookups: HashSet<Address>,
    logs: Vec<(Address, PairCreatedLog)>,
    max_range: Option<u64>,
    failing_blocks: HashSet<u64>,
    /// Pairs whose reserves were requested, in call order.
    pub reserve_calls: Mutex<Vec<Address>>,
    /// Every `eth_getLogs` range requested, including rejected ones.
    pub log_queries: Mutex<Vec<(u64, u64)>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_block(mut self, latest: u64) -> Self {
        self.latest_block = latest;
        self
    }

    pub fn with_token(mut self, address: Address, symbol: &str, decimals: u8) -> Self {
        self.tokens.insert(
            address,
            Token {
                name: format!("{symbol} Token"),
                symbol: symbol.to_string(),
                decimals,
                supply: U256::zero(),
            },
        );
        self
    }

    pub fn with_supply(mut self, address: Address, supply: U256) -> Self {
        if let Some(token) = self.tokens.get_mut(&address) {
            token.supply = supply;
        }
        self
    }

    pub fn with_balance(mut self, token: Address, holder: Address, amount: U256) -> Self {
        self.balances.insert((token, holder), amount);
        self
    }

    /// Registers a `getPair` answer (in both argument orders) and the pair's state.
    pub fn with_pair(
        mut self,
        factory: Address,
        pair: Address,
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
    ) -> Self {
        self.pairs.insert((factory, token0, token1), pair);
        self.pairs.insert((factory, token1, token0), pair);
        self.insert_state(pair, token0, token1, reserve0, reserve1);
        self
    }

    /// Registers a `getPool` answer for one stability flag.
    #[allow(clippy::too_many_arguments)]
    pub fn with_pool(
        mut self,
        factory: Address,
        pool: Address,
        token0: Address,
        token1: Address,
        stable: bool,
        reserve0: U256,
        reserve1: U256,
    ) -> Self {
        self.pools.insert((factory, token0, token1, stable), pool);
        self.pools.insert((factory, token1, token0, stable), pool);
        self.insert_state(pool, token0, token1, reserve0, reserve1);
        self
    }

    /// Adds a `PairCreated` log and the pair's state, without a `getPair` entry.
    pub fn with_created_pair(
        mut self,
        factory: Address,
        block: u64,
        pair: Address,
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
    ) -> Self {
        self.insert_state(pair, token0, token1, reserve0, reserve1);
        self.with_log(factory, block, pair, token0, token1)
    }

    pub fn with_log(
        mut self,
        factory: Address,
        block: u64,
        pair: Address,
        token0: Address,
        token1: Address,
    ) -> Self {
        let log_index = self.logs.iter().filter(|(_, l)| l.block_number == block).count() as u64;
        self.logs.push((
            factory,
            PairCreatedLog {
                block_number: block,
                log_index,
                token0,
                token1,
                pair,
            },
        ));
        self
    }

    pub fn with_reverting_symbol(mut self, token: Address) -> Self {
        self.reverting_symbol.insert(token);
        self
    }

    pub fn with_failing_reserves(mut self, pair: Address) -> Self {
        self.failing_reserves.insert(pair);
        self
    }

    /// Lookups involving `token` fail with a transport error.
    pub fn with_failing_lookup(mut self, token: Address) -> Self {
        self.failing_lookups.insert(token);
        self
    }

    /// Rejects log queries spanning more than `width` blocks.
    pub fn with_max_range(mut self, width: u64) -> Self {
        self.max_range = Some(width);
        self
    }

    /// Log queries covering `block` fail with a non-range transport error.
    pub fn with_failing_block(mut self, block: u64) -> Self {
        self.failing_blocks.insert(block);
        self
    }

    pub fn reserve_call_count(&self) -> usize {
        self.reserve_calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(u64, u64)> {
        self.log_queries.lock().unwrap().clone()
    }

    /// Logs of `factory` in block order.
    pub fn expected_logs(&self, factory: Address) -> Vec<PairCreatedLog> {
        let mut logs: Vec<PairCreatedLog> = self
            .logs
            .iter()
            .filter(|(f, _)| *f == factory)
            .map(|(_, l)| l.clone())
            .collect();
        logs.sort_by_key(|l| (l.block_number, l.log_index));
        logs
    }

    fn insert_state(
        &mut self,
        pair: Address,
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
    ) {
        self.pair_state.insert(
            pair,
            PairState {
                token0,
                token1,
                reserves: RawReserves {
                    reserve0,
                    reserve1,
                    block_timestamp_last: 1_700_000_000,
                },
            },
        );
    }

    fn token(&self, token: Address) -> Result<&Token, ChainError> {
        self.tokens
            .get(&token)
            .ok_or_else(|| ChainError::Revert("execution reverted".into()))
    }

    fn check_lookup(&self, a: Address, b: Address) -> Result<(), ChainError> {
        if self.failing_lookups.contains(&a) || self.failing_lookups.contains(&b) {
            return Err(ChainError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.latest_block)
    }

    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, ChainError> {
        self.check_lookup(token_a, token_b)?;
        Ok(self
            .pairs
            .get(&(factory, token_a, token_b))
            .copied()
            .unwrap_or_else(Address::zero))
    }

    async fn get_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        stable: bool,
    ) -> Result<Address, ChainError> {
        self.check_lookup(token_a, token_b)?;
        Ok(self
            .pools
            .get(&(factory, token_a, token_b, stable))
            .copied()
            .unwrap_or_else(Address::zero))
    }

    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address), ChainError> {
        self.pair_state
            .get(&pair)
            .map(|s| (s.token0, s.token1))
            .ok_or_else(|| ChainError::Revert("execution reverted".into()))
    }

    async fn get_reserves(&self, pair: Address) -> Result<RawReserves, ChainError> {
        self.reserve_calls.lock().unwrap().push(pair);
        if self.failing_reserves.contains(&pair) {
            return Err(ChainError::Transport("request timed out".into()));
        }
        self.pair_state
            .get(&pair)
            .map(|s| s.reserves)
            .ok_or_else(|| ChainError::Revert("execution reverted".into()))
    }

    async fn token_name(&self, token: Address) -> Result<String, ChainError> {
        Ok(self.token(token)?.name.clone())
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        if self.reverting_symbol.contains(&token) {
            return Err(ChainError::Revert("execution reverted".into()));
        }
        Ok(self.token(token)?.symbol.clone())
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        Ok(self.token(token)?.decimals)
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        Ok(self.token(token)?.supply)
    }

    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError> {
        Ok(self
            .balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default())
    }

    async fn pair_created_logs(
        &self,
        factory: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<PairCreatedLog>, ChainError> {
        self.log_queries.lock().unwrap().push((from_block, to_block));
        if let Some(width) = self.max_range {
            if to_block - from_block + 1 > width {
                return Err(ChainError::Transport(format!(
                    "block range is too wide (max {width})"
                )));
            }
        }
        if self
            .failing_blocks
            .iter()
            .any(|b| (from_block..=to_block).contains(b))
        {
            return Err(ChainError::Transport("connection reset by peer".into()));
        }
        Ok(self
            .expected_logs(factory)
            .into_iter()
            .filter(|l| (from_block..=to_block).contains(&l.block_number))
            .collect())
    }
}
