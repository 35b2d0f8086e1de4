use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::ContractError;
use ethers::prelude::{Http, Middleware, Provider};
use ethers::types::{Address, Filter, U256};
use tracing::{debug, info, warn};

use super::{ChainError, ChainReader, PairCreatedLog, RawReserves};
use crate::contracts::{pair_created_topic, Erc20, IAerodromeFactory, IPairReserves, IUniswapV2Factory};

/// [`ChainReader`] over any ethers middleware stack.
#[derive(Debug, Clone)]
pub struct EthersChainClient<M> {
    provider: Arc<M>,
}

impl<M: Middleware + 'static> EthersChainClient<M> {
    pub fn new(provider: Arc<M>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Arc<M> {
        Arc::clone(&self.provider)
    }
}

fn map_contract_error<M: Middleware>(err: ContractError<M>) -> ChainError {
    match err {
        ContractError::Revert(data) => ChainError::Revert(data.to_string()),
        ContractError::DecodingError(e) => ChainError::Decode(e.to_string()),
        ContractError::AbiError(e) => ChainError::Decode(e.to_string()),
        ContractError::DetokenizationError(e) => ChainError::Decode(e.to_string()),
        other => {
            let message = other.to_string();
            if message.to_lowercase().contains("revert") {
                ChainError::Revert(message)
            } else {
                ChainError::Transport(message)
            }
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ChainReader for EthersChainClient<M> {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map(|b| b.as_u64())
            .map_err(|e| ChainError::Transport(e.to_string()))
    }

    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, ChainError> {
        let factory = IUniswapV2Factory::new(factory, self.provider());
        factory
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn get_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        stable: bool,
    ) -> Result<Address, ChainError> {
        let factory = IAerodromeFactory::new(factory, self.provider());
        factory
            .get_pool(token_a, token_b, stable)
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address), ChainError> {
        let contract = IPairReserves::new(pair, self.provider());
        let token0_call = contract.token_0();
        let token1_call = contract.token_1();
        let (token0, token1) = tokio::join!(token0_call.call(), token1_call.call());
        Ok((
            token0.map_err(map_contract_error)?,
            token1.map_err(map_contract_error)?,
        ))
    }

    async fn get_reserves(&self, pair: Address) -> Result<RawReserves, ChainError> {
        let contract = IPairReserves::new(pair, self.provider());
        let (reserve0, reserve1, timestamp) = contract
            .get_reserves()
            .call()
            .await
            .map_err(map_contract_error)?;
        debug!(?pair, %reserve0, %reserve1, "getReserves");
        Ok(RawReserves {
            reserve0,
            reserve1,
            block_timestamp_last: timestamp.low_u64(),
        })
    }

    async fn token_name(&self, token: Address) -> Result<String, ChainError> {
        Erc20::new(token, self.provider())
            .name()
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        Erc20::new(token, self.provider())
            .symbol()
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        Erc20::new(token, self.provider())
            .decimals()
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        Erc20::new(token, self.provider())
            .total_supply()
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError> {
        Erc20::new(token, self.provider())
            .balance_of(holder)
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn pair_created_logs(
        &self,
        factory: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<PairCreatedLog>, ChainError> {
        let filter = Filter::new()
            .address(factory)
            .from_block(from_block)
            .to_block(to_block)
            .topic0(pair_created_topic());

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let mut decoded = Vec::with_capacity(logs.len());
        for log in logs {
            // topics[1] = token0, topics[2] = token1, data[12..32] = pair
            if log.topics.len() < 3 || log.data.len() < 32 {
                warn!(tx = ?log.transaction_hash, "skipping malformed PairCreated log");
                continue;
            }
            decoded.push(PairCreatedLog {
                block_number: log.block_number.map(|b| b.as_u64()).unwrap_or(from_block),
                log_index: log.log_index.map(|i| i.as_u64()).unwrap_or_default(),
                token0: Address::from_slice(&log.topics[1].as_bytes()[12..]),
                token1: Address::from_slice(&log.topics[2].as_bytes()[12..]),
                pair: Address::from_slice(&log.data.as_ref()[12..32]),
            });
        }
        decoded.sort_by_key(|l| (l.block_number, l.log_index));
        Ok(decoded)
    }
}

/// Connects to the first RPC endpoint that answers `eth_blockNumber`.
///
/// Returns the client together with the URL that was used.
pub async fn connect_with_fallback(
    urls: &[String],
) -> Result<(EthersChainClient<Provider<Http>>, String), ChainError> {
    for url in urls {
        let provider = match Provider::<Http>::try_from(url.as_str()) {
            Ok(p) => p,
            Err(e) => {
                warn!(%url, "invalid RPC URL: {}", e);
                continue;
            }
        };
        match provider.get_block_number().await {
            Ok(block) => {
                info!(%url, %block, "connected to RPC endpoint");
                return Ok((EthersChainClient::new(Arc::new(provider)), url.clone()));
            }
            Err(e) => warn!(%url, "RPC endpoint did not answer: {}", e),
        }
    }
    Err(ChainError::Transport(format!(
        "no RPC endpoint answered ({} tried)",
        urls.len()
    )))
}
