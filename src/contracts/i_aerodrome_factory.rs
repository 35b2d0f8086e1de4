use ethers::prelude::*;

// Aerodrome (Velodrome V2 fork) keys pools by (tokenA, tokenB, stable) instead of
// exposing getPair.
abigen!(
    IAerodromeFactory,
    r#"[
        function getPool(address tokenA, address tokenB, bool stable) external view returns (address pool)
    ]"#
);
