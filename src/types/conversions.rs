use ethers::types::Address;
use std::str::FromStr;

// Addresses are parsed from hex without checksum enforcement, so
// "0xabc..." and "0xABC..." resolve to the same 20 bytes.
pub fn string_to_address(s: &str) -> Result<Address, ConversionError> {
    Address::from_str(s.trim()).map_err(|e| ConversionError::InvalidAddress(format!("{s}: {e}")))
}

/// Lowercase hex with `0x` prefix, used as the canonical display/cache key.
pub fn address_to_string(addr: Address) -> String {
    format!("{:?}", addr).to_lowercase()
}

/// Compares two addresses given as strings, ignoring hex case.
pub fn same_address(a: &str, b: &str) -> bool {
    match (string_to_address(a), string_to_address(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),
    #[error("Overflow in conversion")]
    Overflow,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Unsupported token decimals: {0}")]
    UnsupportedDecimals(u8),
}
