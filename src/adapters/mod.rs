// DEX Adapters Module
// One adapter per factory flavour; `adapter_for` maps configuration onto them.

pub mod aerodrome;
pub mod uniswap_v2;

pub use crate::dex_adapter::DexAdapter;
pub use aerodrome::AerodromeAdapter;
pub use uniswap_v2::UniswapV2Adapter;

use crate::settings::{DexKind, DexProfile};

/// Builds the adapter matching a configured DEX.
pub fn adapter_for(dex: &DexProfile) -> Box<dyn DexAdapter> {
    match dex.kind {
        DexKind::UniswapV2 => Box::new(UniswapV2Adapter::new(&dex.name, dex.factory, dex.fallback)),
        DexKind::Aerodrome => Box::new(AerodromeAdapter::new(&dex.name, dex.factory, dex.fallback)),
    }
}

/// Adapters for every DEX of a network, in configuration order.
pub fn adapters_for(dexes: &[DexProfile]) -> Vec<Box<dyn DexAdapter>> {
    dexes.iter().map(adapter_for).collect()
}
