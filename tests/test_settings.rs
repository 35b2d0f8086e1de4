//! Integration tests for the bundled configuration
//!
//! Every shipped network must resolve into a usable profile with adapters.

use liquidity_scout::{
    adapters::adapters_for,
    pagination::ChunkFailurePolicy,
    settings::Settings,
    PoolVariant,
};
use rust_decimal::Decimal;

/// Discovery defaults match the documented values
#[test]
fn test_discovery_defaults() {
    let settings = Settings::from_sources(None).expect("Failed to load settings");

    assert_eq!(settings.discovery.chunk_size, 10_000);
    assert_eq!(settings.discovery.max_liquid_pairs, 20);
    assert_eq!(settings.discovery.min_liquidity, Decimal::new(1, 1));
    assert!(!settings.discovery.include_illiquid);
    assert_eq!(
        settings.discovery.chunk_failure_policy,
        ChunkFailurePolicy::Skip
    );
}

/// Each bundled network has a wrapped native asset and at least one DEX
#[test]
fn test_every_network_builds_adapters() {
    let settings = Settings::from_sources(None).expect("Failed to load settings");
    let names = settings.network_names();
    assert_eq!(names, vec!["base", "base_sepolia", "ethereum", "sepolia"]);

    for name in &names {
        let network = settings
            .network(Some(name.as_str()))
            .unwrap_or_else(|e| panic!("network {name} should resolve: {e}"));
        assert_eq!(network.counter_assets[0], network.wrapped_native);

        let adapters = adapters_for(&network.dexes);
        assert_eq!(adapters.len(), network.dexes.len());
        assert!(adapters.iter().all(|a| !a.variants().is_empty()));
    }
}

/// Base mainnet consults Aerodrome first and keeps BaseSwap as fallback
#[test]
fn test_base_dex_order() {
    let settings = Settings::from_sources(None).expect("Failed to load settings");
    let base = settings.network(Some("base")).unwrap();
    let adapters = adapters_for(&base.dexes);

    assert_eq!(adapters[0].name(), "Aerodrome");
    assert_eq!(
        adapters[0].variants(),
        &[PoolVariant::Volatile, PoolVariant::Stable]
    );
    assert!(!adapters[0].supports_event_scan());
    assert_eq!(adapters[1].name(), "BaseSwap");
    assert!(adapters[1].is_fallback());
    assert!(adapters[1].supports_event_scan());
}
