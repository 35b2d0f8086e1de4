pub mod conversions;

pub use conversions::{address_to_string, same_address, string_to_address, ConversionError};
