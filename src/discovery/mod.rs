//! # Pair Discovery Engine
//!
//! Finds the pairs a target token trades in and turns their raw reserves into
//! normalized, priced [`LiquidityEntry`] values.
//!
//! Two strategies are available:
//!
//! - **Direct lookup** ([`LiquidityScanner::check_direct`]): ask each factory for
//!   the pair of `(target, counter_asset)` per pool variant. A zero address is a
//!   valid "no pair" answer, never an error.
//! - **Factory scan** ([`LiquidityScanner::scan_factory`]): page through the
//!   factory's `PairCreated` history over a bounded block window and keep the
//!   pairs matching a [`ScanFilter`].
//!
//! Every call returns its own report. Failures of one pair, one token or one
//! chunk are recorded in that report and never abort the rest of the run.

pub mod ranking;

use std::collections::HashSet;

use ethers::types::Address;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::chain::{ChainError, ChainReader, PairCreatedLog};
use crate::dex_adapter::{DexAdapter, PoolVariant};
use crate::normalization::{normalize_amount, price_in_counter};
use crate::pagination::{BlockRange, FailedRange, LogPaginator, PaginationError};
use crate::pools::PairRecord;
use crate::settings::Discovery;
use crate::token_enricher::{TokenCache, TokenInfo};
use crate::types::ConversionError;

/// Why a single pair could not be turned into a [`LiquidityEntry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("Reserve out of range: {0}")]
    Conversion(#[from] ConversionError),
    #[error("Pair {pair:?} does not contain token {token:?}")]
    TokenNotInPair { pair: Address, token: Address },
}

/// Errors that stop a whole factory scan.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("{0} does not emit PairCreated events and cannot be scanned")]
    EventScanUnsupported(String),
    #[error("Failed to read the latest block: {0}")]
    LatestBlock(#[source] ChainError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// A pair seen from the target token, with reserves scaled by each token's own
/// decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityEntry {
    pub dex: String,
    pub variant: PoolVariant,
    pub pair: PairRecord,
    pub target: TokenInfo,
    pub counter: TokenInfo,
    pub target_reserve: Decimal,
    pub counter_reserve: Decimal,
    /// Counter-asset units per target token. `None` when the target reserve is zero.
    pub price: Option<Decimal>,
    /// Either reserve is strictly above the configured minimum.
    pub is_liquid: bool,
}

impl LiquidityEntry {
    pub fn involves(&self, token: Address) -> bool {
        self.pair.contains(token)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The factory returned the zero address; no reserves were read.
    NoPair,
    Found(LiquidityEntry),
    Failed(EntryError),
}

/// One `(dex, counter_asset, variant)` combination of a direct lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub dex: String,
    pub variant: PoolVariant,
    pub counter: Address,
    pub outcome: LookupOutcome,
}

impl LookupResult {
    pub fn entry(&self) -> Option<&LiquidityEntry> {
        match &self.outcome {
            LookupOutcome::Found(entry) => Some(entry),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectLookupReport {
    pub target: TokenInfo,
    pub lookups: Vec<LookupResult>,
}

impl DirectLookupReport {
    pub fn entries(&self) -> impl Iterator<Item = &LiquidityEntry> {
        self.lookups.iter().filter_map(LookupResult::entry)
    }

    pub fn liquid_entries(&self) -> impl Iterator<Item = &LiquidityEntry> {
        self.entries().filter(|e| e.is_liquid)
    }

    pub fn has_liquidity(&self) -> bool {
        self.liquid_entries().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LookupResult> {
        self.lookups
            .iter()
            .filter(|l| matches!(l.outcome, LookupOutcome::Failed(_)))
    }
}

/// Which `PairCreated` events a factory scan keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFilter {
    /// Pairs containing this token, which becomes the target.
    Involving(Address),
    /// Pairs containing this counter-asset; the other token is the target.
    PairedWith(Address),
    /// Every pair. The target is the side that is not the primary counter-asset,
    /// or `token0` when the primary counter-asset is absent.
    Any,
}

impl ScanFilter {
    /// Target token of a matching event, `None` when the event is filtered out.
    pub fn target_for(&self, log: &PairCreatedLog, primary_counter: Address) -> Option<Address> {
        match *self {
            ScanFilter::Involving(token) => {
                (log.token0 == token || log.token1 == token).then_some(token)
            }
            ScanFilter::PairedWith(counter) => {
                if log.token0 == counter {
                    Some(log.token1)
                } else if log.token1 == counter {
                    Some(log.token0)
                } else {
                    None
                }
            }
            ScanFilter::Any => {
                if log.token0 == primary_counter {
                    Some(log.token1)
                } else {
                    Some(log.token0)
                }
            }
        }
    }
}

/// A candidate pair dropped from a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub pair: Address,
    pub reason: EntryError,
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub dex: String,
    pub window: BlockRange,
    pub events_scanned: usize,
    /// Events that matched the filter.
    pub candidates: usize,
    pub entries: Vec<LiquidityEntry>,
    pub skipped: Vec<SkippedPair>,
    pub failed_ranges: Vec<FailedRange>,
    /// The scan stopped early after collecting `max_liquid_pairs` liquid pairs.
    pub capped: bool,
}

impl ScanReport {
    /// False when some block chunks could not be fetched, meaning pairs may be missing.
    pub fn is_complete(&self) -> bool {
        self.failed_ranges.is_empty()
    }

    pub fn liquid_entries(&self) -> impl Iterator<Item = &LiquidityEntry> {
        self.entries.iter().filter(|e| e.is_liquid)
    }
}

/// Runs discovery against one chain. Owns the token metadata cache of the run.
pub struct LiquidityScanner<'a> {
    chain: &'a dyn ChainReader,
    settings: Discovery,
    primary_counter: Address,
    tokens: TokenCache,
}

impl<'a> LiquidityScanner<'a> {
    /// `primary_counter` is usually the network's wrapped native asset.
    pub fn new(chain: &'a dyn ChainReader, settings: Discovery, primary_counter: Address) -> Self {
        Self {
            chain,
            settings,
            primary_counter,
            tokens: TokenCache::new(),
        }
    }

    pub fn settings(&self) -> &Discovery {
        &self.settings
    }

    pub fn primary_counter(&self) -> Address {
        self.primary_counter
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Metadata for `address`, served from the run cache after the first call.
    pub async fn token_info(&mut self, address: Address) -> TokenInfo {
        self.tokens.get_or_fetch(self.chain, address).await
    }

    /// Strategy A: direct factory lookups of `target` against each counter-asset.
    ///
    /// Adapters are consulted in order. Adapters marked as fallback are skipped
    /// once an earlier adapter produced a liquid entry.
    pub async fn check_direct(
        &mut self,
        target: Address,
        counter_assets: &[Address],
        adapters: &[Box<dyn DexAdapter>],
    ) -> DirectLookupReport {
        let target_info = self.token_info(target).await;
        let mut lookups: Vec<LookupResult> = Vec::new();

        for adapter in adapters {
            let found_liquid = lookups
                .iter()
                .filter_map(LookupResult::entry)
                .any(|e| e.is_liquid);
            if adapter.is_fallback() && found_liquid {
                debug!("Skipping fallback DEX {}: liquidity already found", adapter.name());
                continue;
            }

            for &counter in counter_assets {
                if counter == target {
                    continue;
                }
                for &variant in adapter.variants() {
                    let outcome = self
                        .lookup_one(adapter.as_ref(), target, counter, variant)
                        .await;
                    lookups.push(LookupResult {
                        dex: adapter.name().to_string(),
                        variant,
                        counter,
                        outcome,
                    });
                }
            }
        }

        DirectLookupReport {
            target: target_info,
            lookups,
        }
    }

    /// Strategy A for an explicit pair: `token_a` is the target, `token_b` the
    /// counter-asset. One result per pool variant of the adapter.
    pub async fn check_pair(
        &mut self,
        token_a: Address,
        token_b: Address,
        adapter: &dyn DexAdapter,
    ) -> Vec<LookupResult> {
        let mut results = Vec::with_capacity(adapter.variants().len());
        for &variant in adapter.variants() {
            let outcome = self.lookup_one(adapter, token_a, token_b, variant).await;
            results.push(LookupResult {
                dex: adapter.name().to_string(),
                variant,
                counter: token_b,
                outcome,
            });
        }
        results
    }

    async fn lookup_one(
        &mut self,
        adapter: &dyn DexAdapter,
        target: Address,
        counter: Address,
        variant: PoolVariant,
    ) -> LookupOutcome {
        match adapter.lookup(self.chain, target, counter, variant).await {
            Ok(None) => {
                debug!(
                    "No {} {} pair for {:?}/{:?}",
                    adapter.name(),
                    variant,
                    target,
                    counter
                );
                LookupOutcome::NoPair
            }
            Ok(Some(pair)) => match self.build_entry(adapter.name(), variant, pair, target).await {
                Ok(entry) => LookupOutcome::Found(entry),
                Err(e) => {
                    warn!("Failed to read {} pair {:?}: {}", adapter.name(), pair, e);
                    LookupOutcome::Failed(e)
                }
            },
            Err(e) => {
                warn!(
                    "{} lookup failed for {:?}/{:?} ({}): {}",
                    adapter.name(),
                    target,
                    counter,
                    variant,
                    e
                );
                LookupOutcome::Failed(e.into())
            }
        }
    }

    /// Strategy B over the configured lookback window ending at the latest block.
    pub async fn scan_factory(
        &mut self,
        adapter: &dyn DexAdapter,
        filter: ScanFilter,
    ) -> Result<ScanReport, DiscoveryError> {
        if !adapter.supports_event_scan() {
            return Err(DiscoveryError::EventScanUnsupported(adapter.name().to_string()));
        }
        let latest = self
            .chain
            .block_number()
            .await
            .map_err(DiscoveryError::LatestBlock)?;
        let window = BlockRange::lookback(latest, self.settings.lookback_blocks);
        self.scan_factory_window(adapter, filter, window).await
    }

    /// Strategy B over an explicit block window.
    pub async fn scan_factory_window(
        &mut self,
        adapter: &dyn DexAdapter,
        filter: ScanFilter,
        window: BlockRange,
    ) -> Result<ScanReport, DiscoveryError> {
        if !adapter.supports_event_scan() {
            return Err(DiscoveryError::EventScanUnsupported(adapter.name().to_string()));
        }
        info!(
            "Scanning {} PairCreated events in blocks {} ({} blocks)",
            adapter.name(),
            window,
            window.len()
        );

        let paginator =
            LogPaginator::new(self.settings.chunk_size, self.settings.chunk_failure_policy);
        let logs = paginator
            .fetch_pair_created(self.chain, adapter.factory(), window)
            .await?;
        if !logs.is_complete() {
            warn!(
                "⚠️ {} block ranges could not be fetched; the scan is incomplete",
                logs.failed_ranges.len()
            );
        }

        let mut report = ScanReport {
            dex: adapter.name().to_string(),
            window,
            events_scanned: logs.logs.len(),
            candidates: 0,
            entries: Vec::new(),
            skipped: Vec::new(),
            failed_ranges: logs.failed_ranges,
            capped: false,
        };

        let mut seen = HashSet::new();
        let mut liquid = 0usize;
        let cap = self.settings.max_liquid_pairs;

        for log in &logs.logs {
            let Some(target) = filter.target_for(log, self.primary_counter) else {
                continue;
            };
            if !seen.insert(log.pair) {
                continue;
            }
            report.candidates += 1;

            let entry = match self
                .build_entry(adapter.name(), PoolVariant::Standard, log.pair, target)
                .await
            {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping pair {:?}: {}", log.pair, e);
                    report.skipped.push(SkippedPair {
                        pair: log.pair,
                        reason: e,
                    });
                    continue;
                }
            };

            if entry.is_liquid {
                liquid += 1;
                report.entries.push(entry);
                if cap > 0 && liquid >= cap {
                    info!("Collected {} liquid pairs, stopping scan", liquid);
                    report.capped = true;
                    break;
                }
            } else if self.settings.include_illiquid {
                report.entries.push(entry);
            }
        }

        info!(
            "{}: {} events, {} candidates, {} entries, {} skipped",
            report.dex,
            report.events_scanned,
            report.candidates,
            report.entries.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Reads a pair, attributes its reserves to `target` and prices it.
    async fn build_entry(
        &mut self,
        dex: &str,
        variant: PoolVariant,
        pair: Address,
        target: Address,
    ) -> Result<LiquidityEntry, EntryError> {
        let record = PairRecord::fetch(self.chain, pair).await?;
        let oriented = record
            .orient(target)
            .ok_or(EntryError::TokenNotInPair { pair, token: target })?;

        let target_info = self.token_info(oriented.target).await;
        let counter_info = self.token_info(oriented.counter).await;

        let target_reserve = normalize_amount(oriented.target_reserve, target_info.decimals)?;
        let counter_reserve = normalize_amount(oriented.counter_reserve, counter_info.decimals)?;
        let min = self.settings.min_liquidity;

        Ok(LiquidityEntry {
            dex: dex.to_string(),
            variant,
            price: price_in_counter(target_reserve, counter_reserve),
            is_liquid: target_reserve > min || counter_reserve > min,
            target: target_info,
            counter: counter_info,
            target_reserve,
            counter_reserve,
            pair: record,
        })
    }
}

/// Unique token addresses across `entries`, in first-seen order.
pub fn distinct_tokens(entries: &[LiquidityEntry]) -> Vec<Address> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .flat_map(|e| [e.pair.token0, e.pair.token1])
        .filter(|t| seen.insert(*t))
        .collect()
}
