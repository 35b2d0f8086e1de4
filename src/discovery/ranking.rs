//! Ordering of discovered pairs for display.
//!
//! Every report sorts with the same comparator:
//!
//! 1. pairs involving the primary counter-asset (normally the wrapped native
//!    token) come first, whatever their size;
//! 2. then by normalized target reserve, largest first;
//! 3. then by pair address, so equal entries always print in the same order.

use std::cmp::Ordering;

use ethers::types::Address;

use super::LiquidityEntry;

pub fn compare(a: &LiquidityEntry, b: &LiquidityEntry, primary_counter: Address) -> Ordering {
    let a_primary = a.involves(primary_counter);
    let b_primary = b.involves(primary_counter);
    b_primary
        .cmp(&a_primary)
        .then_with(|| b.target_reserve.cmp(&a.target_reserve))
        .then_with(|| a.pair.pair_address.cmp(&b.pair.pair_address))
}

/// Sorts `entries` in place, best first.
pub fn rank(entries: &mut [LiquidityEntry], primary_counter: Address) {
    entries.sort_by(|a, b| compare(a, b, primary_counter));
}

/// Ranked copy of the entries, for reports that only borrow their data.
pub fn ranked<'e, I>(entries: I, primary_counter: Address) -> Vec<&'e LiquidityEntry>
where
    I: IntoIterator<Item = &'e LiquidityEntry>,
{
    let mut out: Vec<&LiquidityEntry> = entries.into_iter().collect();
    out.sort_by(|a, b| compare(a, b, primary_counter));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex_adapter::PoolVariant;
    use crate::pools::PairRecord;
    use crate::token_enricher::{MetadataSource, TokenInfo};
    use ethers::types::U256;
    use rust_decimal::Decimal;

    fn token(byte: u8) -> TokenInfo {
        TokenInfo {
            address: Address::repeat_byte(byte),
            symbol: format!("T{byte}"),
            name: format!("Token {byte}"),
            decimals: 18,
            source: MetadataSource::OnChain,
        }
    }

    fn entry(pair: u8, counter: u8, target_reserve: i64) -> LiquidityEntry {
        let target = token(0x01);
        let counter = token(counter);
        LiquidityEntry {
            dex: "Uniswap V2".into(),
            variant: PoolVariant::Standard,
            pair: PairRecord {
                pair_address: Address::repeat_byte(pair),
                token0: target.address,
                token1: counter.address,
                reserve0: U256::zero(),
                reserve1: U256::zero(),
                block_timestamp_last: 0,
            },
            target,
            counter,
            target_reserve: Decimal::from(target_reserve),
            counter_reserve: Decimal::ONE,
            price: None,
            is_liquid: true,
        }
    }

    #[test]
    fn test_primary_counter_first_then_reserve() {
        let weth = Address::repeat_byte(0x09);
        let mut entries = vec![
            entry(0xa1, 0x05, 1_000),
            entry(0xa2, 0x09, 2),
            entry(0xa3, 0x06, 50),
            entry(0xa4, 0x09, 30),
        ];
        rank(&mut entries, weth);
        let order: Vec<u8> = entries
            .iter()
            .map(|e| e.pair.pair_address.as_bytes()[0])
            .collect();
        assert_eq!(order, vec![0xa4, 0xa2, 0xa1, 0xa3]);
    }

    #[test]
    fn test_ties_break_on_pair_address() {
        let weth = Address::repeat_byte(0x09);
        let a = entry(0xb2, 0x05, 7);
        let b = entry(0xb1, 0x06, 7);
        assert_eq!(compare(&a, &b, weth), Ordering::Greater);
        let order = ranked([&a, &b], weth);
        assert_eq!(order[0].pair.pair_address, Address::repeat_byte(0xb1));
    }
}
