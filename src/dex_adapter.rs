//! # DEX Adapter Trait
//!
//! Factories differ in how they answer "which pair holds tokens A and B":
//! Uniswap V2 forks expose `getPair(a, b)`, Aerodrome exposes
//! `getPool(a, b, stable)` and keys each token pair twice. The `DexAdapter`
//! trait hides that difference from the discovery engine.
//!
//! ## Adding a New DEX
//!
//! 1. Implement `DexAdapter` in `src/adapters/`
//! 2. Add a `DexKind` variant in `settings.rs`
//! 3. Map it in `adapters::adapter_for`

use async_trait::async_trait;
use ethers::types::Address;

use crate::chain::{ChainError, ChainReader};
use crate::pools::is_zero_address;

/// Pool flavour a factory can hold for the same token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolVariant {
    /// The single pair of a Uniswap V2 style factory.
    Standard,
    /// Aerodrome `stable = false` pool (constant product).
    Volatile,
    /// Aerodrome `stable = true` pool (x3y + y3x curve).
    Stable,
}

impl PoolVariant {
    pub fn label(&self) -> &'static str {
        match self {
            PoolVariant::Standard => "Standard",
            PoolVariant::Volatile => "Volatile",
            PoolVariant::Stable => "Stable",
        }
    }
}

impl std::fmt::Display for PoolVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Protocol-specific access to one factory.
///
/// # Thread Safety
///
/// Adapters are `Send + Sync` so a set of them can be held behind `Box<dyn DexAdapter>`.
#[async_trait]
pub trait DexAdapter: Send + Sync {
    /// Label used in logs and reports (e.g. "Uniswap V2", "Aerodrome").
    fn name(&self) -> &str;

    fn factory(&self) -> Address;

    /// Variants to query for every token pair, in query order.
    fn variants(&self) -> &'static [PoolVariant];

    /// Whether the factory emits `PairCreated` and can be scanned by event log.
    fn supports_event_scan(&self) -> bool;

    /// Fallback factories are only consulted when earlier ones found no liquid pair.
    fn is_fallback(&self) -> bool;

    /// Raw factory call for one variant. Returns the zero address when no pair exists.
    async fn query_pair_address(
        &self,
        chain: &dyn ChainReader,
        token_a: Address,
        token_b: Address,
        variant: PoolVariant,
    ) -> Result<Address, ChainError>;

    /// Pair address for `(token_a, token_b, variant)`, or `None` when the factory
    /// has no such pair.
    async fn lookup(
        &self,
        chain: &dyn ChainReader,
        token_a: Address,
        token_b: Address,
        variant: PoolVariant,
    ) -> Result<Option<Address>, ChainError> {
        let address = self
            .query_pair_address(chain, token_a, token_b, variant)
            .await?;
        Ok((!is_zero_address(address)).then_some(address))
    }
}
