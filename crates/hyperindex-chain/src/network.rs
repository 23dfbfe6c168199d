use alloy_primitives::{Address, U256};
use hyperindex_core::{DiagConfig, DiagError, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::provider::{with_timeout, ProviderManager};

/// Snapshot of the RPC endpoint and deployed contracts
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price: u128,
    pub deployer_balance: Option<U256>,
    pub factory_code_size: usize,
    pub router_code_size: Option<usize>,
}

impl NetworkStatus {
    pub fn chain_id_matches(&self, configured: u64) -> bool {
        self.chain_id == configured
    }
}

/// Basic reachability and deployment checks, run before pair verification
pub struct NetworkProbe {
    config: DiagConfig,
    provider: Arc<ProviderManager>,
}

impl NetworkProbe {
    pub fn new(config: DiagConfig, provider: Arc<ProviderManager>) -> Self {
        Self { config, provider }
    }

    /// Read network state, then check the factory (and router) have code.
    pub async fn run(&self) -> Result<NetworkStatus> {
        let http = self.provider.http();
        let timeout = self.provider.timeout();

        let chain_id = with_timeout(timeout, "eth_chainId", async {
            http.get_chain_id().await
        })
        .await?;
        let block_number = with_timeout(timeout, "eth_blockNumber", async {
            http.get_block_number().await
        })
        .await?;
        let gas_price = with_timeout(timeout, "eth_gasPrice", async {
            http.get_gas_price().await
        })
        .await?;

        let deployer_balance = match self.config.deployer {
            Some(deployer) => Some(
                with_timeout(timeout, "eth_getBalance", async {
                    http.get_balance(deployer).await
                })
                .await?,
            ),
            None => None,
        };

        let factory_code_size = self.code_size(self.config.factory, "factory").await?;
        let router_code_size = match self.config.router {
            Some(router) => Some(self.code_size(router, "router").await?),
            None => None,
        };

        let status = NetworkStatus {
            chain_id,
            block_number,
            gas_price,
            deployer_balance,
            factory_code_size,
            router_code_size,
        };

        if !status.chain_id_matches(self.config.chain_id) {
            warn!(
                configured = self.config.chain_id,
                rpc = chain_id,
                "RPC chain id differs from CHAIN_ID"
            );
        }

        info!(
            chain_id = status.chain_id,
            block = status.block_number,
            gas_price_wei = status.gas_price,
            deployer_balance = ?status.deployer_balance,
            factory = %self.config.factory,
            factory_code_bytes = status.factory_code_size,
            router_code_bytes = ?status.router_code_size,
            "Network status"
        );

        Ok(status)
    }

    async fn code_size(&self, address: Address, name: &str) -> Result<usize> {
        let http = self.provider.http();
        let code = with_timeout(self.provider.timeout(), "eth_getCode", async {
            http.get_code_at(address).await
        })
        .await?;

        if code.is_empty() {
            return Err(DiagError::Unavailable(format!(
                "no contract code at {} address {}",
                name, address
            )));
        }
        Ok(code.len())
    }
}
