//! # Liquidity Scout CLI
//!
//! Command-line front end for token liquidity discovery.
//!
//! ## Usage
//!
//! ```bash
//! liquidity-scout --network base check-token --token 0x...
//! liquidity-scout --network sepolia token-pairs --from-blocks-back 500000
//! liquidity-scout --network base_sepolia scan-pairs --paired-with-native --export tokens.json
//! liquidity-scout --network ethereum watchlist
//! ```
//!
//! RPC URLs, `TOKEN_ADDRESS` and `TOKEN0`/`TOKEN1` can be set in a `.env` file.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ethers::types::Address;
use rust_decimal::Decimal;

use liquidity_scout::{
    adapters::adapters_for,
    chain::{connect_with_fallback, ChainReader},
    discovery::{
        distinct_tokens, ranking, DirectLookupReport, LiquidityEntry, LiquidityScanner,
        LookupOutcome, LookupResult, ScanFilter, ScanReport,
    },
    normalization::{
        display_price, estimate_usd_value, format_units, normalize_amount, pool_value_in_counter,
    },
    pagination::ChunkFailurePolicy,
    settings::{NetworkProfile, Settings},
    token_enricher::{fetch_total_supply, TokenInfo},
    types::{address_to_string, string_to_address},
};

#[derive(Parser, Debug)]
#[command(name = "liquidity-scout", version, about = "Find and price DEX liquidity for ERC20 tokens")]
struct Cli {
    /// Network from the configuration (ethereum, sepolia, base, base_sepolia).
    #[arg(long, global = true)]
    network: Option<String>,

    /// Blocks to look back for PairCreated scans.
    #[arg(long, global = true)]
    from_blocks_back: Option<u64>,

    /// Initial block chunk size for log queries.
    #[arg(long, global = true)]
    chunk_size: Option<u64>,

    /// Abort a scan when a block chunk cannot be fetched instead of skipping it.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up the token's pairs against the wrapped native asset on every DEX.
    CheckToken {
        #[arg(long)]
        token: Option<String>,
    },
    /// Check one explicit pair (defaults to TOKEN0/TOKEN1).
    CheckPair {
        #[arg(long)]
        token_a: Option<String>,
        #[arg(long)]
        token_b: Option<String>,
    },
    /// Scan PairCreated events for every pair containing the token.
    TokenPairs {
        #[arg(long)]
        token: Option<String>,
    },
    /// Scan PairCreated events and list liquid pairs.
    ScanPairs {
        /// Only pairs with the wrapped native asset.
        #[arg(long)]
        paired_with_native: bool,
        /// Write the addresses of tokens with liquidity to this JSON file.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Check every token of the network's watchlist.
    Watchlist,
    /// LP token balance of a holder.
    LpBalance {
        #[arg(long)]
        pair: String,
        #[arg(long)]
        holder: String,
    },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "❌ Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::new().context("failed to load settings")?;
    if let Some(blocks) = cli.from_blocks_back {
        settings.discovery.lookback_blocks = blocks;
    }
    if let Some(size) = cli.chunk_size {
        settings.discovery.chunk_size = size;
    }
    if cli.strict {
        settings.discovery.chunk_failure_policy = ChunkFailurePolicy::Fail;
    }

    let network = settings.network(cli.network.as_deref())?;
    println!(
        "🔍 {} (chain id {})",
        network.name.bold(),
        network.chain_id
    );
    println!("═══════════════════════════════════════════════════════════════════");

    let (client, url) = connect_with_fallback(&network.rpc_urls)
        .await
        .with_context(|| format!("could not connect to {}", network.name))?;
    println!("✅ Connected to {}", url);

    match cli.command {
        Command::CheckToken { token } => {
            let token = resolve_token(token, &settings, &network)?;
            check_token(&client, &settings, &network, token).await
        }
        Command::CheckPair { token_a, token_b } => {
            let (a, b) = match (token_a, token_b) {
                (Some(a), Some(b)) => (string_to_address(&a)?, string_to_address(&b)?),
                (None, None) => settings
                    .pair_tokens()?
                    .ok_or_else(|| anyhow!("pass --token-a/--token-b or set TOKEN0 and TOKEN1"))?,
                _ => bail!("--token-a and --token-b must be given together"),
            };
            check_pair(&client, &settings, &network, a, b).await
        }
        Command::TokenPairs { token } => {
            let token = resolve_token(token, &settings, &network)?;
            let mut discovery = settings.discovery.clone();
            discovery.include_illiquid = true;
            let mut scanner = LiquidityScanner::new(&client, discovery, network.wrapped_native);
            let reports = scan_all(&mut scanner, &network, ScanFilter::Involving(token)).await?;
            for report in &reports {
                print_scan_report(report, &settings, &network);
            }
            Ok(())
        }
        Command::ScanPairs {
            paired_with_native,
            export,
        } => {
            let filter = if paired_with_native {
                ScanFilter::PairedWith(network.wrapped_native)
            } else {
                ScanFilter::Any
            };
            let mut scanner =
                LiquidityScanner::new(&client, settings.discovery.clone(), network.wrapped_native);
            let reports = scan_all(&mut scanner, &network, filter).await?;
            for report in &reports {
                print_scan_report(report, &settings, &network);
            }
            if let Some(path) = export {
                let entries: Vec<LiquidityEntry> = reports
                    .iter()
                    .flat_map(|r| r.liquid_entries().cloned())
                    .collect();
                export_tokens(&path, &entries)?;
            }
            Ok(())
        }
        Command::Watchlist => watchlist(&client, &settings, &network).await,
        Command::LpBalance { pair, holder } => {
            lp_balance(&client, string_to_address(&pair)?, string_to_address(&holder)?).await
        }
    }
}

fn resolve_token(arg: Option<String>, settings: &Settings, network: &NetworkProfile) -> Result<Address> {
    match arg {
        Some(raw) => Ok(string_to_address(&raw)?),
        None => settings
            .target_token(network)?
            .ok_or_else(|| anyhow!("no target token: pass --token or set TOKEN_ADDRESS")),
    }
}

async fn check_token(
    chain: &dyn ChainReader,
    settings: &Settings,
    network: &NetworkProfile,
    token: Address,
) -> Result<()> {
    let adapters = adapters_for(&network.dexes);
    let mut scanner = LiquidityScanner::new(chain, settings.discovery.clone(), network.wrapped_native);
    let report = scanner
        .check_direct(token, &network.counter_assets, &adapters)
        .await;

    print_token(&report.target);
    if let Some(supply) = fetch_total_supply(chain, token).await {
        println!(
            "   Total supply: {}",
            format_units(supply, report.target.decimals)?
        );
    }
    println!();

    print_direct_report(&report, settings, network);
    Ok(())
}

async fn check_pair(
    chain: &dyn ChainReader,
    settings: &Settings,
    network: &NetworkProfile,
    token_a: Address,
    token_b: Address,
) -> Result<()> {
    let adapters = adapters_for(&network.dexes);
    let mut scanner = LiquidityScanner::new(chain, settings.discovery.clone(), network.wrapped_native);

    print_token(&scanner.token_info(token_a).await);
    print_token(&scanner.token_info(token_b).await);
    println!();

    for adapter in &adapters {
        for result in scanner.check_pair(token_a, token_b, adapter.as_ref()).await {
            print_lookup(&result, settings, network);
        }
    }
    Ok(())
}

async fn scan_all(
    scanner: &mut LiquidityScanner<'_>,
    network: &NetworkProfile,
    filter: ScanFilter,
) -> Result<Vec<ScanReport>> {
    let adapters = adapters_for(&network.dexes);
    let mut reports = Vec::new();
    for adapter in adapters.iter().filter(|a| a.supports_event_scan()) {
        println!("📡 Scanning {} factory {:?}", adapter.name(), adapter.factory());
        let report = scanner
            .scan_factory(adapter.as_ref(), filter)
            .await
            .with_context(|| format!("{} scan failed", adapter.name()))?;
        reports.push(report);
    }
    if reports.is_empty() {
        println!(
            "{}",
            "⚠️  No configured DEX on this network emits PairCreated events".yellow()
        );
    }
    Ok(reports)
}

async fn watchlist(chain: &dyn ChainReader, settings: &Settings, network: &NetworkProfile) -> Result<()> {
    if network.watchlist.is_empty() {
        bail!("network {} has no watchlist configured", network.name);
    }
    let adapters = adapters_for(&network.dexes);
    let mut scanner = LiquidityScanner::new(chain, settings.discovery.clone(), network.wrapped_native);
    let mut with_liquidity = 0usize;

    for (ticker, token) in &network.watchlist {
        let report = scanner
            .check_direct(*token, &network.counter_assets, &adapters)
            .await;
        let best = ranking::ranked(report.liquid_entries(), network.wrapped_native)
            .into_iter()
            .next();
        match best {
            Some(entry) => {
                with_liquidity += 1;
                println!(
                    "{} {:<10} {} on {} ({}), price {} {}",
                    "✅".green(),
                    ticker,
                    address_to_string(*token),
                    entry.dex,
                    entry.variant,
                    display_price(entry.price),
                    entry.counter.symbol
                );
            }
            None => {
                let failures = report.failures().count();
                if failures > 0 && failures == report.lookups.len() {
                    println!(
                        "{} {:<10} {} every lookup failed",
                        "❌".red(),
                        ticker,
                        address_to_string(*token)
                    );
                } else {
                    println!(
                        "{} {:<10} {} no liquid pair",
                        "➖".dimmed(),
                        ticker,
                        address_to_string(*token)
                    );
                }
            }
        }
    }

    println!(
        "\n📊 {}/{} watchlist tokens have liquidity",
        with_liquidity,
        network.watchlist.len()
    );
    Ok(())
}

async fn lp_balance(chain: &dyn ChainReader, pair: Address, holder: Address) -> Result<()> {
    let balance = chain.balance_of(pair, holder).await?;
    let supply = chain.total_supply(pair).await?;
    let decimals = chain.token_decimals(pair).await.unwrap_or(18);

    println!("💧 LP token {}", address_to_string(pair));
    println!("   Holder:       {}", address_to_string(holder));
    println!("   Balance:      {}", format_units(balance, decimals)?);
    println!("   Total supply: {}", format_units(supply, decimals)?);

    let balance = normalize_amount(balance, decimals)?;
    let supply = normalize_amount(supply, decimals)?;
    if !supply.is_zero() {
        if let Some(share) = balance
            .checked_div(supply)
            .and_then(|s| s.checked_mul(Decimal::ONE_HUNDRED))
        {
            println!("   Share:        {}%", share.round_dp(4).normalize());
        }
    }
    Ok(())
}

fn export_tokens(path: &Path, entries: &[LiquidityEntry]) -> Result<()> {
    let tokens: Vec<String> = distinct_tokens(entries)
        .into_iter()
        .map(address_to_string)
        .collect();
    let json = serde_json::to_string_pretty(&tokens)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    println!("💾 Saved {} token addresses to {}", tokens.len(), path.display());
    Ok(())
}

fn print_token(info: &TokenInfo) {
    let label = format!("{} ({})", info.name, info.symbol);
    if info.is_fallback() {
        println!(
            "🪙 {} {} {} decimals {}",
            label.yellow(),
            address_to_string(info.address),
            info.decimals,
            "[metadata unavailable, defaults used]".yellow()
        );
    } else {
        println!(
            "🪙 {} {} {} decimals",
            label.bold(),
            address_to_string(info.address),
            info.decimals
        );
    }
}

fn print_direct_report(report: &DirectLookupReport, settings: &Settings, network: &NetworkProfile) {
    for lookup in &report.lookups {
        if !matches!(lookup.outcome, LookupOutcome::Found(_)) {
            print_lookup(lookup, settings, network);
        }
    }
    let ranked = ranking::ranked(report.entries(), network.wrapped_native);
    for entry in &ranked {
        print_entry(entry, settings, network);
    }
    if report.has_liquidity() {
        println!("\n{}", "✅ Liquidity found".green().bold());
    } else {
        println!("\n{}", "❌ No liquid pair found".red().bold());
    }
}

fn print_lookup(lookup: &LookupResult, settings: &Settings, network: &NetworkProfile) {
    match &lookup.outcome {
        LookupOutcome::NoPair => println!(
            "➖ {} {}: no pair with {}",
            lookup.dex,
            lookup.variant,
            address_to_string(lookup.counter)
        ),
        LookupOutcome::Failed(reason) => println!(
            "{} {} {}: {}",
            "⚠️ ".yellow(),
            lookup.dex,
            lookup.variant,
            reason
        ),
        LookupOutcome::Found(entry) => print_entry(entry, settings, network),
    }
}

fn print_entry(entry: &LiquidityEntry, settings: &Settings, network: &NetworkProfile) {
    let status = if entry.is_liquid {
        "LIQUID".green().bold()
    } else {
        "ILLIQUID".red()
    };
    println!(
        "🔗 {} [{} {}] {}",
        address_to_string(entry.pair.pair_address),
        entry.dex,
        entry.variant,
        status
    );
    println!(
        "   {} reserve: {}",
        entry.target.symbol,
        entry.target_reserve.normalize()
    );
    println!(
        "   {} reserve: {}",
        entry.counter.symbol,
        entry.counter_reserve.normalize()
    );
    println!(
        "   Price: {} {} per {}",
        display_price(entry.price),
        entry.counter.symbol,
        entry.target.symbol
    );
    if let Some(total) = pool_value_in_counter(entry.counter_reserve) {
        print!("   Liquidity: {} {}", total.normalize(), entry.counter.symbol);
        let usd = settings
            .discovery
            .native_usd_estimate
            .filter(|_| entry.counter.address == network.wrapped_native)
            .and_then(|price| estimate_usd_value(entry.counter_reserve, price));
        match usd {
            Some(usd) => println!(" (~${})", usd.round_dp(2)),
            None => println!(),
        }
    }
}

fn print_scan_report(report: &ScanReport, settings: &Settings, network: &NetworkProfile) {
    println!(
        "\n📦 {}: blocks {}, {} events, {} candidate pairs",
        report.dex.bold(),
        report.window,
        report.events_scanned,
        report.candidates
    );
    if !report.is_complete() {
        println!(
            "{}",
            format!(
                "⚠️  Incomplete scan: {} block ranges failed",
                report.failed_ranges.len()
            )
            .yellow()
        );
        for failed in &report.failed_ranges {
            println!("   blocks {}: {}", failed.range, failed.reason);
        }
    }
    for entry in ranking::ranked(&report.entries, network.wrapped_native) {
        print_entry(entry, settings, network);
    }
    for skipped in &report.skipped {
        println!(
            "{} skipped {}: {}",
            "⚠️ ".yellow(),
            address_to_string(skipped.pair),
            skipped.reason
        );
    }
    if report.capped {
        println!(
            "ℹ️  Stopped after {} liquid pairs",
            settings.discovery.max_liquid_pairs
        );
    }
    println!(
        "📊 {} liquid of {} listed pairs",
        report.liquid_entries().count(),
        report.entries.len()
    );
}
