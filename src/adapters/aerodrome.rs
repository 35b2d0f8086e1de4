use async_trait::async_trait;
use ethers::prelude::*;

use crate::chain::{ChainError, ChainReader};
use crate::dex_adapter::{DexAdapter, PoolVariant};

/// Aerodrome keeps a volatile and a stable pool per token pair and has no
/// `PairCreated` event, so it is only reachable by direct lookup.
#[derive(Debug, Clone)]
pub struct AerodromeAdapter {
    name: String,
    factory_address: Address,
    fallback: bool,
}

impl AerodromeAdapter {
    pub fn new(name: &str, factory_address: Address, fallback: bool) -> Self {
        Self {
            name: name.to_string(),
            factory_address,
            fallback,
        }
    }
}

#[async_trait]
impl DexAdapter for AerodromeAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn factory(&self) -> Address {
        self.factory_address
    }

    fn variants(&self) -> &'static [PoolVariant] {
        &[PoolVariant::Volatile, PoolVariant::Stable]
    }

    fn supports_event_scan(&self) -> bool {
        false
    }

    fn is_fallback(&self) -> bool {
        self.fallback
    }

    async fn query_pair_address(
        &self,
        chain: &dyn ChainReader,
        token_a: Address,
        token_b: Address,
        variant: PoolVariant,
    ) -> Result<Address, ChainError> {
        let stable = matches!(variant, PoolVariant::Stable);
        chain
            .get_pool(self.factory_address, token_a, token_b, stable)
            .await
    }
}
