//! # Liquidity Scout
//!
//! A read-only liquidity discovery library for EVM networks (Ethereum, Sepolia,
//! Base, Base Sepolia). Given a target token it finds the DEX pairs the token
//! trades in, reads their reserves, normalizes them by each token's own decimals
//! and prices the token in counter-asset units.
//!
//! ## Architecture
//!
//! ### Chain Layer
//! Every on-chain read goes through the [`chain::ChainReader`] trait. The
//! production client wraps `ethers` abigen bindings; tests use an in-memory chain.
//!
//! ### Discovery Layer
//! Direct factory lookups (`getPair` / `getPool`) and full `PairCreated` scans,
//! the latter paged through [`pagination::LogPaginator`] which halves its chunk
//! size when a provider rejects a block range.
//!
//! ### Normalization Layer
//! Fixed-point reserve scaling and reserve-ratio prices with `rust_decimal`.

// Core Types
/// Pair records and reserve attribution
pub mod pools;
/// Trait for DEX-specific adapters
pub mod dex_adapter;
/// Address parsing and conversion errors
pub mod types;

// DEX Adapters
/// Factory adapters (Uniswap V2 forks, Aerodrome)
pub mod adapters;

// Chain Access
/// `ChainReader` trait and the ethers-backed client
pub mod chain;
/// Smart contract ABIs (read-only)
pub mod contracts;

// Discovery Layer
/// Chunked `PairCreated` log fetching
pub mod pagination;
/// Direct lookups, factory scans and ranking
pub mod discovery;
/// Token metadata with explicit fallbacks
pub mod token_enricher;

// Normalization Layer
/// Reserve normalization and prices
pub mod normalization;

// Settings & Configuration
/// Configuration management
pub mod settings;

// Re-exports for convenience
pub use chain::{ChainError, ChainReader, EthersChainClient};
pub use dex_adapter::{DexAdapter, PoolVariant};
pub use discovery::{LiquidityEntry, LiquidityScanner, ScanFilter, ScanReport};
pub use pagination::{BlockRange, ChunkFailurePolicy, LogPaginator};
pub use pools::PairRecord;
pub use settings::Settings;
pub use token_enricher::TokenInfo;
