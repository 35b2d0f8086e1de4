use crate::chain::{ChainError, ChainReader};
use ethers::types::{Address, U256};
use log::{debug, warn};
use std::collections::HashMap;

pub const FALLBACK_SYMBOL: &str = "UNKNOWN";
pub const FALLBACK_NAME: &str = "Unknown Token";
pub const FALLBACK_DECIMALS: u8 = 18;

/// Where a token's metadata came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// `name()`, `symbol()` and `decimals()` all answered.
    OnChain,
    /// At least one call failed; every field holds its fallback value.
    Fallback { reason: ChainError },
}

/// ERC20 metadata for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub source: MetadataSource,
}

impl TokenInfo {
    pub fn fallback(address: Address, reason: ChainError) -> Self {
        Self {
            address,
            symbol: FALLBACK_SYMBOL.to_string(),
            name: FALLBACK_NAME.to_string(),
            decimals: FALLBACK_DECIMALS,
            source: MetadataSource::Fallback { reason },
        }
    }

    /// Distinguishes "really has 18 decimals" from "decimals unknown, assumed 18".
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, MetadataSource::Fallback { .. })
    }
}

/// Fetch name, symbol and decimals together. Never fails: any error yields the
/// fallback record carrying the first error seen.
pub async fn fetch_token_info(chain: &dyn ChainReader, address: Address) -> TokenInfo {
    let (name, symbol, decimals) = tokio::join!(
        chain.token_name(address),
        chain.token_symbol(address),
        chain.token_decimals(address),
    );
    match (name, symbol, decimals) {
        (Ok(name), Ok(symbol), Ok(decimals)) => TokenInfo {
            address,
            symbol,
            name,
            decimals,
            source: MetadataSource::OnChain,
        },
        (name, symbol, decimals) => {
            let reason = [name.err(), symbol.err(), decimals.err()]
                .into_iter()
                .flatten()
                .next()
                .unwrap_or_else(|| ChainError::Decode("missing metadata".to_string()));
            warn!(
                "Error getting token info for {:?}: {}; using {} / {} decimals",
                address, reason, FALLBACK_SYMBOL, FALLBACK_DECIMALS
            );
            TokenInfo::fallback(address, reason)
        }
    }
}

/// `totalSupply()`, or `None` when the token does not answer.
pub async fn fetch_total_supply(chain: &dyn ChainReader, address: Address) -> Option<U256> {
    match chain.total_supply(address).await {
        Ok(supply) => Some(supply),
        Err(e) => {
            warn!("totalSupply() failed for {:?}: {}", address, e);
            None
        }
    }
}

/// Per-run metadata cache. Lives as long as one discovery run and is never shared
/// between runs.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: HashMap<Address, TokenInfo>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata, fetching it on first use. Fallback records are cached too,
    /// so a token without metadata is queried once per run.
    pub async fn get_or_fetch(&mut self, chain: &dyn ChainReader, address: Address) -> TokenInfo {
        if let Some(info) = self.entries.get(&address) {
            return info.clone();
        }
        let info = fetch_token_info(chain, address).await;
        debug!(
            "TokenCache: {:?} -> {} ({} decimals)",
            address, info.symbol, info.decimals
        );
        self.entries.insert(address, info.clone());
        info
    }

    pub fn get(&self, address: &Address) -> Option<&TokenInfo> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
