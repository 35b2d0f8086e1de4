// Contracts Module - read-only ABIs for factories, pairs and ERC20 tokens

pub mod erc20;
pub mod i_aerodrome_factory;
pub mod i_pair_reserves;
pub mod i_uniswap_v2_factory;

// Public exports
pub use erc20::Erc20;
pub use i_aerodrome_factory::IAerodromeFactory;
pub use i_pair_reserves::IPairReserves;
pub use i_uniswap_v2_factory::IUniswapV2Factory;

use ethers::types::H256;
use ethers::utils::keccak256;

/// Signature of `PairCreated(address,address,address,uint256)`, topic0 of every
/// Uniswap V2 style pair creation log.
pub fn pair_created_topic() -> H256 {
    H256::from(keccak256("PairCreated(address,address,address,uint256)"))
}
