use async_trait::async_trait;
use ethers::prelude::*;

use crate::chain::{ChainError, ChainReader};
use crate::dex_adapter::{DexAdapter, PoolVariant};

/// Uniswap V2 and its forks (SushiSwap, BaseSwap, ...): one pair per token pair,
/// found with `getPair` and announced by `PairCreated`.
#[derive(Debug, Clone)]
pub struct UniswapV2Adapter {
    name: String,
    factory_address: Address,
    fallback: bool,
}

impl UniswapV2Adapter {
    pub fn new(name: &str, factory_address: Address, fallback: bool) -> Self {
        Self {
            name: name.to_string(),
            factory_address,
            fallback,
        }
    }
}

#[async_trait]
impl DexAdapter for UniswapV2Adapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn factory(&self) -> Address {
        self.factory_address
    }

    fn variants(&self) -> &'static [PoolVariant] {
        &[PoolVariant::Standard]
    }

    fn supports_event_scan(&self) -> bool {
        true
    }

    fn is_fallback(&self) -> bool {
        self.fallback
    }

    async fn query_pair_address(
        &self,
        chain: &dyn ChainReader,
        token_a: Address,
        token_b: Address,
        _variant: PoolVariant,
    ) -> Result<Address, ChainError> {
        chain.get_pair(self.factory_address, token_a, token_b).await
    }
}
