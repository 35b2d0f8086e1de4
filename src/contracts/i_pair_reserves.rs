use ethers::prelude::*;

// Uniswap V2 pairs return (uint112, uint112, uint32) and Aerodrome pools return
// (uint256, uint256, uint256). Both are three 32-byte words, so a single uint256
// binding decodes either.
abigen!(
    IPairReserves,
    r#"[
        function getReserves() external view returns (uint256 reserve0, uint256 reserve1, uint256 blockTimestampLast)
        function token0() external view returns (address)
        function token1() external view returns (address)
    ]"#
);
