//! Read-only factory and token calls
//!
//! Every read is a single `eth_call` wrapped in the configured timeout. No
//! caching and no retries: a failed read is reported as `Unavailable` and the
//! caller decides whether to abort.

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use hyperindex_core::contracts::{IERC20Metadata, IHyperIndexFactory};
use hyperindex_core::{CodeHashAccessor, DiagError, Result};
use std::sync::Arc;
use tracing::debug;

use crate::provider::{with_timeout, ProviderManager};

/// Source of the authoritative pair init-code hash
#[async_trait]
pub trait CodeHashSource: Send + Sync {
    async fn read_code_hash(&self, factory: Address) -> Result<B256>;
}

/// Factory pair registry lookups
#[async_trait]
pub trait PairLookup: Send + Sync {
    /// `None` when the factory has not created the pair
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Address>>;

    async fn all_pairs_length(&self, factory: Address) -> Result<U256>;
}

/// `eth_call` backed implementation of [`CodeHashSource`] and [`PairLookup`]
pub struct RpcHashSource {
    provider: Arc<ProviderManager>,
    accessor: CodeHashAccessor,
}

impl RpcHashSource {
    pub fn new(provider: Arc<ProviderManager>, accessor: CodeHashAccessor) -> Self {
        Self { provider, accessor }
    }

    async fn eth_call<C: SolCall>(&self, to: Address, call: C, what: &str) -> Result<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());

        let http = self.provider.http();
        let output = with_timeout(self.provider.timeout(), what, async {
            http.call(tx).await
        })
        .await?;

        // Calls to an address without code succeed with empty return data
        if output.is_empty() {
            return Err(DiagError::Unavailable(format!(
                "{}: empty return data from {} (contract absent or accessor missing)",
                what, to
            )));
        }

        C::abi_decode_returns(&output)
            .map_err(|e| DiagError::Unavailable(format!("{}: undecodable return: {}", what, e)))
    }

    /// ERC-20 symbol, used only to label output
    pub async fn token_symbol(&self, token: Address) -> Result<String> {
        self.eth_call(token, IERC20Metadata::symbolCall {}, "symbol()")
            .await
    }
}

#[async_trait]
impl CodeHashSource for RpcHashSource {
    async fn read_code_hash(&self, factory: Address) -> Result<B256> {
        let what = self.accessor.signature();
        let hash = match self.accessor {
            CodeHashAccessor::PairCodeHash => {
                self.eth_call(factory, IHyperIndexFactory::pairCodeHashCall {}, what)
                    .await?
            }
            CodeHashAccessor::InitCodePairHash => {
                self.eth_call(factory, IHyperIndexFactory::INIT_CODE_PAIR_HASHCall {}, what)
                    .await?
            }
        };
        debug!(factory = %factory, accessor = what, hash = %hash, "Read pair code hash");
        Ok(hash)
    }
}

#[async_trait]
impl PairLookup for RpcHashSource {
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Address>> {
        let pair = self
            .eth_call(
                factory,
                IHyperIndexFactory::getPairCall {
                    tokenA: token_a,
                    tokenB: token_b,
                },
                "getPair(address,address)",
            )
            .await?;
        Ok((pair != Address::ZERO).then_some(pair))
    }

    async fn all_pairs_length(&self, factory: Address) -> Result<U256> {
        self.eth_call(
            factory,
            IHyperIndexFactory::allPairsLengthCall {},
            "allPairsLength()",
        )
        .await
    }
}
