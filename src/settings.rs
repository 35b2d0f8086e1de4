use config::{Config, ConfigError, File, FileFormat};
use ethers::types::Address;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

use crate::pagination::{ChunkFailurePolicy, DEFAULT_CHUNK_SIZE};
use crate::types::{string_to_address, ConversionError};

/// Defaults shipped with the crate; user files are layered on top.
const DEFAULT_CONFIG: &str = include_str!("../Config.toml");

/// Names a TOML file whose keys override the bundled defaults.
pub const CONFIG_PATH_ENV: &str = "LIQUIDITY_SCOUT_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct Discovery {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: Decimal,
    #[serde(default = "default_max_liquid_pairs")]
    pub max_liquid_pairs: usize,
    #[serde(default)]
    pub include_illiquid: bool,
    #[serde(default)]
    pub chunk_failure_policy: ChunkFailurePolicy,
    #[serde(default)]
    pub native_usd_estimate: Option<Decimal>,
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}
fn default_lookback_blocks() -> u64 {
    100_000
}
fn default_min_liquidity() -> Decimal {
    Decimal::new(1, 1) // 0.1
}
fn default_max_liquid_pairs() -> usize {
    20
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            lookback_blocks: default_lookback_blocks(),
            min_liquidity: default_min_liquidity(),
            max_liquid_pairs: default_max_liquid_pairs(),
            include_illiquid: false,
            chunk_failure_policy: ChunkFailurePolicy::Skip,
            native_usd_estimate: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DexKind {
    /// `getPair(a, b)` factories emitting `PairCreated`.
    UniswapV2,
    /// `getPool(a, b, stable)` factories.
    Aerodrome,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DexConfig {
    pub name: String,
    pub kind: DexKind,
    pub factory: String,
    #[serde(default)]
    pub router: Option<String>,
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchlistToken {
    pub ticker: String,
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub chain_id: u64,
    /// Environment variable holding the preferred RPC URL for this network.
    pub rpc_env: String,
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    pub wrapped_native: String,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    /// Extra counter-assets checked after the wrapped native token.
    #[serde(default)]
    pub counter_assets: Vec<String>,
    #[serde(default)]
    pub default_token: Option<String>,
    #[serde(default)]
    pub dexes: Vec<DexConfig>,
    #[serde(default)]
    pub watchlist: Vec<WatchlistToken>,
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub default_network: String,
    #[serde(default)]
    pub discovery: Discovery,
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
    /// `TOKEN_ADDRESS`: target token replacing the network default.
    #[serde(skip)]
    pub token_override: Option<String>,
    /// `TOKEN0` + `TOKEN1`: explicit pair to check.
    #[serde(skip)]
    pub pair_override: Option<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),
    #[error("Invalid address in {field}: {source}")]
    InvalidAddress {
        field: String,
        #[source]
        source: ConversionError,
    },
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },
    #[error("No RPC URL configured for network '{0}'")]
    NoRpcUrl(String),
}

/// A validated DEX entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexProfile {
    pub name: String,
    pub kind: DexKind,
    pub factory: Address,
    pub router: Option<Address>,
    pub fallback: bool,
}

/// A network with every address parsed and every RPC URL validated.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: u64,
    pub rpc_urls: Vec<String>,
    pub wrapped_native: Address,
    pub native_symbol: String,
    /// Wrapped native first, then configured extras, without duplicates.
    pub counter_assets: Vec<Address>,
    pub default_token: Option<Address>,
    pub dexes: Vec<DexProfile>,
    pub watchlist: Vec<(String, Address)>,
}

impl Settings {
    /// Bundled defaults, the file named by `LIQUIDITY_SCOUT_CONFIG` if any, then
    /// environment overrides.
    pub fn new() -> Result<Self, SettingsError> {
        let user_file = env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
        let mut settings = Self::from_sources(user_file.as_deref())?;
        settings.apply_env_overrides(|key| env::var(key).ok());
        Ok(settings)
    }

    /// Bundled defaults layered with an optional TOML file. No environment lookups.
    pub fn from_sources(user_file: Option<&str>) -> Result<Self, SettingsError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(path) = user_file {
            builder = builder.add_source(File::with_name(path));
        }
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Applies per-network RPC variables, `LIQUIDITY_NETWORK`, `TOKEN_ADDRESS` and
    /// `TOKEN0`/`TOKEN1`. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        for network in self.networks.values_mut() {
            if let Some(url) = get(&network.rpc_env) {
                network.rpc_urls.retain(|u| u != &url);
                network.rpc_urls.insert(0, url);
            }
        }
        if let Some(name) = get("LIQUIDITY_NETWORK") {
            self.default_network = name;
        }
        if let Some(token) = get("TOKEN_ADDRESS") {
            self.token_override = Some(token);
        }
        if let (Some(a), Some(b)) = (get("TOKEN0"), get("TOKEN1")) {
            self.pair_override = Some((a, b));
        }
    }

    pub fn network_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.networks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves `name` (or the default network) into a validated profile.
    pub fn network(&self, name: Option<&str>) -> Result<NetworkProfile, SettingsError> {
        let name = name.unwrap_or(&self.default_network).to_lowercase();
        let cfg = self
            .networks
            .get(&name)
            .ok_or_else(|| SettingsError::UnknownNetwork(name.clone()))?;

        if cfg.rpc_urls.is_empty() {
            return Err(SettingsError::NoRpcUrl(name));
        }
        for url in &cfg.rpc_urls {
            url::Url::parse(url).map_err(|e| SettingsError::InvalidRpcUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }

        let wrapped_native = parse_field(&cfg.wrapped_native, &format!("{name}.wrapped_native"))?;
        let mut counter_assets = vec![wrapped_native];
        for (i, raw) in cfg.counter_assets.iter().enumerate() {
            let addr = parse_field(raw, &format!("{name}.counter_assets[{i}]"))?;
            if !counter_assets.contains(&addr) {
                counter_assets.push(addr);
            }
        }

        let default_token = cfg
            .default_token
            .as_deref()
            .map(|raw| parse_field(raw, &format!("{name}.default_token")))
            .transpose()?;

        let dexes = cfg
            .dexes
            .iter()
            .map(|dex| {
                Ok(DexProfile {
                    name: dex.name.clone(),
                    kind: dex.kind,
                    factory: parse_field(&dex.factory, &format!("{name}.dexes.{}.factory", dex.name))?,
                    router: dex
                        .router
                        .as_deref()
                        .map(|r| parse_field(r, &format!("{name}.dexes.{}.router", dex.name)))
                        .transpose()?,
                    fallback: dex.fallback,
                })
            })
            .collect::<Result<Vec<_>, SettingsError>>()?;

        let watchlist = cfg
            .watchlist
            .iter()
            .map(|t| {
                parse_field(&t.address, &format!("{name}.watchlist.{}", t.ticker))
                    .map(|addr| (t.ticker.clone(), addr))
            })
            .collect::<Result<Vec<_>, SettingsError>>()?;

        Ok(NetworkProfile {
            name,
            chain_id: cfg.chain_id,
            rpc_urls: cfg.rpc_urls.clone(),
            wrapped_native,
            native_symbol: cfg.native_symbol.clone(),
            counter_assets,
            default_token,
            dexes,
            watchlist,
        })
    }

    /// Target token: `TOKEN_ADDRESS` if set, else the network's default token.
    pub fn target_token(&self, network: &NetworkProfile) -> Result<Option<Address>, SettingsError> {
        match &self.token_override {
            Some(raw) => parse_field(raw, "TOKEN_ADDRESS").map(Some),
            None => Ok(network.default_token),
        }
    }

    /// Explicit pair from `TOKEN0`/`TOKEN1`.
    pub fn pair_tokens(&self) -> Result<Option<(Address, Address)>, SettingsError> {
        match &self.pair_override {
            Some((a, b)) => Ok(Some((parse_field(a, "TOKEN0")?, parse_field(b, "TOKEN1")?))),
            None => Ok(None),
        }
    }
}

fn parse_field(raw: &str, field: &str) -> Result<Address, SettingsError> {
    string_to_address(raw).map_err(|source| SettingsError::InvalidAddress {
        field: field.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Settings {
        Settings::from_sources(None).expect("bundled config must parse")
    }

    #[test]
    fn test_bundled_networks() {
        let settings = defaults();
        assert_eq!(
            settings.network_names(),
            vec!["base", "base_sepolia", "ethereum", "sepolia"]
        );
        assert_eq!(settings.default_network, "base_sepolia");
        assert_eq!(settings.discovery.max_liquid_pairs, 20);
        assert_eq!(settings.discovery.min_liquidity, Decimal::new(1, 1));
        assert_eq!(settings.discovery.chunk_failure_policy, ChunkFailurePolicy::Skip);
    }

    #[test]
    fn test_base_mainnet_profile() {
        let base = defaults().network(Some("base")).unwrap();
        assert_eq!(base.chain_id, 8453);
        assert_eq!(base.dexes.len(), 2);
        assert_eq!(base.dexes[0].kind, DexKind::Aerodrome);
        assert!(!base.dexes[0].fallback);
        assert_eq!(base.dexes[1].kind, DexKind::UniswapV2);
        assert!(base.dexes[1].fallback);
        assert_eq!(base.counter_assets, vec![base.wrapped_native]);
        assert_eq!(base.watchlist.len(), 13);
    }

    #[test]
    fn test_unknown_network() {
        assert!(matches!(
            defaults().network(Some("polygon")),
            Err(SettingsError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = defaults();
        settings.apply_env_overrides(|key| match key {
            "SEPOLIA_RPC_URL" => Some("https://rpc.example.org".to_string()),
            "LIQUIDITY_NETWORK" => Some("sepolia".to_string()),
            "TOKEN_ADDRESS" => Some("0x8f4e4345a81b02303ca7ccc8400c4cb8f2969fb5".to_string()),
            "TOKEN0" => Some("0x4200000000000000000000000000000000000006".to_string()),
            "TOKEN1" => Some("  ".to_string()),
            _ => None,
        });

        let sepolia = settings.network(None).unwrap();
        assert_eq!(sepolia.name, "sepolia");
        assert_eq!(sepolia.rpc_urls[0], "https://rpc.example.org");
        assert_eq!(
            settings.target_token(&sepolia).unwrap(),
            sepolia.default_token
        );
        // TOKEN1 is blank, so no pair override
        assert!(settings.pair_tokens().unwrap().is_none());
    }

    #[test]
    fn test_invalid_token_override() {
        let mut settings = defaults();
        settings.token_override = Some("0xnot-an-address".to_string());
        let net = settings.network(None).unwrap();
        assert!(matches!(
            settings.target_token(&net),
            Err(SettingsError::InvalidAddress { .. })
        ));
    }
}
