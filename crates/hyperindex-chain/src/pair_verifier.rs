//! Pair verifier - checks derived pair addresses against the chain
//!
//! Reads the live init-code hash from the factory, derives every configured
//! pair address from it and compares the result with what the factory
//! actually deployed and with any address recorded in the deployment file.
//! When the deployment file records the hash the router's pair library was
//! compiled with, the addresses the router would compute are checked too.

use alloy_primitives::{Address, B256};
use hyperindex_core::derive::{derive_for_pair, pair_salt};
use hyperindex_core::{
    compare, Comparison, DiagConfig, MismatchWarning, PairSpec, Result, TokenPair, Verdict,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::hash_source::{CodeHashSource, PairLookup};
use crate::telegram::TelegramNotifier;

/// What the factory's `getPair` returned for a pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnChainPair {
    Found(Address),
    NotCreated,
    Unavailable(String),
}

/// Router library hash versus the live factory hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterHashCheck {
    pub library_hash: B256,
    pub live_hash: B256,
}

impl RouterHashCheck {
    pub fn matches(&self) -> bool {
        self.library_hash == self.live_hash
    }
}

#[derive(Debug, Clone)]
pub struct PairReport {
    pub label: String,
    pub pair: TokenPair,
    pub derived: Address,
    pub on_chain: OnChainPair,
    /// Derived vs. `getPair`
    pub on_chain_check: Option<Comparison>,
    /// Derived vs. address recorded in the deployment file
    pub expected_check: Option<Comparison>,
    /// Derived vs. what the router library computes
    pub router_check: Option<Comparison>,
}

impl PairReport {
    pub fn warnings(&self) -> Vec<MismatchWarning> {
        [self.on_chain_check, self.expected_check, self.router_check]
            .into_iter()
            .flatten()
            .filter_map(|c| match c.verdict() {
                Verdict::Mismatch(w) => Some(w),
                Verdict::Match => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub factory: Address,
    pub code_hash: B256,
    pub router_hash: Option<RouterHashCheck>,
    pub pairs: Vec<PairReport>,
    pub duration_ms: u64,
}

impl VerificationReport {
    pub fn warnings(&self) -> Vec<MismatchWarning> {
        self.pairs.iter().flat_map(PairReport::warnings).collect()
    }

    pub fn mismatch_count(&self) -> usize {
        self.warnings().len()
    }

    pub fn unavailable_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| matches!(p.on_chain, OnChainPair::Unavailable(_)))
            .count()
    }

    /// One line per problem: a differing router hash, then every address mismatch
    pub fn findings(&self) -> Vec<String> {
        let router = self
            .router_hash
            .filter(|check| !check.matches())
            .map(|check| {
                format!(
                    "router library init code hash {} differs from factory hash {}; redeploy the router",
                    check.library_hash, check.live_hash
                )
            });
        let pairs = self.pairs.iter().flat_map(|pair| {
            pair.warnings()
                .into_iter()
                .map(move |warning| format!("{}: {}", pair.label, warning))
        });
        router.into_iter().chain(pairs).collect()
    }

    /// No address mismatches and the router hash (if known) agrees
    pub fn is_healthy(&self) -> bool {
        self.mismatch_count() == 0 && self.router_hash.map_or(true, |c| c.matches())
    }
}

pub struct PairVerifier {
    config: DiagConfig,
    hash_source: Arc<dyn CodeHashSource>,
    lookup: Arc<dyn PairLookup>,
    /// Optional Telegram notifier for alerting on mismatches
    telegram_notifier: Option<TelegramNotifier>,
}

impl PairVerifier {
    pub fn new(
        config: DiagConfig,
        hash_source: Arc<dyn CodeHashSource>,
        lookup: Arc<dyn PairLookup>,
    ) -> Self {
        let telegram_notifier = match (&config.telegram.bot_token, &config.telegram.chat_id) {
            (Some(bot_token), Some(chat_id)) if config.telegram.enabled => {
                info!("Telegram notifications enabled for mismatches");
                Some(TelegramNotifier::new(bot_token.clone(), chat_id.clone()))
            }
            _ => None,
        };

        Self {
            config,
            hash_source,
            lookup,
            telegram_notifier,
        }
    }

    /// Run the full diagnostic. Fails only when the code hash cannot be read.
    pub async fn run(&self) -> Result<VerificationReport> {
        let started = Instant::now();
        let factory = self.config.factory;

        let code_hash = match self.hash_source.read_code_hash(factory).await {
            Ok(hash) => hash,
            Err(e) => {
                error!(
                    error = %e,
                    factory = %factory,
                    accessor = %self.config.accessor,
                    "Failed to read pair code hash from factory"
                );
                return Err(e);
            }
        };
        info!(factory = %factory, code_hash = %code_hash, "Factory pair code hash");

        let router_hash = self.config.router_init_code_hash.map(|library_hash| {
            let check = RouterHashCheck {
                library_hash,
                live_hash: code_hash,
            };
            if check.matches() {
                info!(hash = %library_hash, "Router library init code hash matches factory");
            } else {
                warn!(
                    library_hash = %library_hash,
                    factory_hash = %code_hash,
                    router = ?self.config.router,
                    "Router library init code hash differs from factory; redeploy the router"
                );
            }
            check
        });

        let mut pairs = Vec::with_capacity(self.config.pairs.len());
        for spec in &self.config.pairs {
            pairs.push(self.verify_pair(spec, code_hash).await);
        }

        let report = VerificationReport {
            factory,
            code_hash,
            router_hash,
            pairs,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            pairs = report.pairs.len(),
            mismatches = report.mismatch_count(),
            unavailable = report.unavailable_count(),
            duration_ms = report.duration_ms,
            "Pair verification complete"
        );

        if !report.is_healthy() {
            self.send_telegram_alert(&report).await;
        }

        Ok(report)
    }

    async fn verify_pair(&self, spec: &PairSpec, code_hash: B256) -> PairReport {
        let factory = self.config.factory;
        let derived = derive_for_pair(&spec.pair, factory, code_hash);

        let on_chain = match self
            .lookup
            .get_pair(factory, spec.pair.token0(), spec.pair.token1())
            .await
        {
            Ok(Some(address)) => OnChainPair::Found(address),
            Ok(None) => OnChainPair::NotCreated,
            Err(e) => {
                warn!(pair = %spec.label, error = %e, "getPair lookup failed");
                OnChainPair::Unavailable(e.to_string())
            }
        };

        let on_chain_check = match &on_chain {
            OnChainPair::Found(address) => Some(compare(derived, *address)),
            _ => None,
        };
        let expected_check = spec.expected.map(|expected| compare(derived, expected));
        let router_check = self
            .config
            .router_init_code_hash
            .filter(|library_hash| *library_hash != code_hash)
            .map(|library_hash| compare(derived, derive_for_pair(&spec.pair, factory, library_hash)));

        let report = PairReport {
            label: spec.label.clone(),
            pair: spec.pair,
            derived,
            on_chain,
            on_chain_check,
            expected_check,
            router_check,
        };
        self.log_pair(&report);
        report
    }

    fn log_pair(&self, report: &PairReport) {
        info!(
            pair = %report.label,
            token0 = %report.pair.token0(),
            token0_label = self.config.token_label(report.pair.token0()).unwrap_or("-"),
            token1 = %report.pair.token1(),
            token1_label = self.config.token_label(report.pair.token1()).unwrap_or("-"),
            salt = %pair_salt(&report.pair),
            derived = %report.derived,
            on_chain = ?report.on_chain,
            "Derived pair address"
        );

        if matches!(report.on_chain, OnChainPair::NotCreated) {
            info!(pair = %report.label, "Pair not created by factory yet");
        }

        for (source, check) in [
            ("getPair", report.on_chain_check),
            ("deployment file", report.expected_check),
            ("router library", report.router_check),
        ] {
            let Some(check) = check else { continue };
            match check.verdict() {
                Verdict::Match => info!(pair = %report.label, source, "{}", check),
                Verdict::Mismatch(warning) => warn!(
                    pair = %report.label,
                    source,
                    derived = %warning.derived,
                    expected = %warning.expected,
                    "{}",
                    warning
                ),
            }
        }
    }

    /// Send a Telegram alert summarizing mismatches
    async fn send_telegram_alert(&self, report: &VerificationReport) {
        if let Some(ref notifier) = self.telegram_notifier {
            let router_line = match report.router_hash {
                Some(check) if !check.matches() => format!(
                    "\nRouter hash: {} (factory {})",
                    check.library_hash, check.live_hash
                ),
                _ => String::new(),
            };
            let message = format!(
                "🚨 <b>Pair Address Mismatch</b>\n\n\
                 Chain: {}\n\
                 Factory: {}\n\
                 Pairs checked: {}\n\
                 Mismatches: {}{}",
                self.config.chain_id,
                report.factory,
                report.pairs.len(),
                report.mismatch_count(),
                router_line,
            );

            notifier.send_message(&message).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, U256};
    use async_trait::async_trait;
    use hyperindex_core::{CodeHashAccessor, DiagError, TelegramConfig};
    use std::collections::HashMap;
    use std::time::Duration;

    const FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
    const INIT_CODE_HASH: B256 =
        b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");
    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
    const USDC_WETH_PAIR: Address = address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");

    struct FakeChain {
        code_hash: Option<B256>,
        pairs: HashMap<TokenPair, Address>,
        lookup_fails: bool,
    }

    #[async_trait]
    impl CodeHashSource for FakeChain {
        async fn read_code_hash(&self, _factory: Address) -> Result<B256> {
            self.code_hash
                .ok_or_else(|| DiagError::Unavailable("pairCodeHash(): reverted".to_string()))
        }
    }

    #[async_trait]
    impl PairLookup for FakeChain {
        async fn get_pair(
            &self,
            _factory: Address,
            token_a: Address,
            token_b: Address,
        ) -> Result<Option<Address>> {
            if self.lookup_fails {
                return Err(DiagError::Unavailable("getPair: timed out".to_string()));
            }
            let pair = TokenPair::new(token_a, token_b)?;
            Ok(self.pairs.get(&pair).copied())
        }

        async fn all_pairs_length(&self, _factory: Address) -> Result<U256> {
            Ok(U256::from(self.pairs.len()))
        }
    }

    fn chain(code_hash: Option<B256>) -> FakeChain {
        let mut pairs = HashMap::new();
        pairs.insert(TokenPair::new(USDC, WETH).unwrap(), USDC_WETH_PAIR);
        FakeChain {
            code_hash,
            pairs,
            lookup_fails: false,
        }
    }

    fn config(pairs: Vec<PairSpec>, router_init_code_hash: Option<B256>) -> DiagConfig {
        DiagConfig {
            chain_id: 1,
            rpc_url: "http://localhost:8545".to_string(),
            factory: FACTORY,
            router: None,
            tokens: HashMap::new(),
            pairs,
            router_init_code_hash,
            accessor: CodeHashAccessor::PairCodeHash,
            rpc_timeout: Duration::from_secs(10),
            deployer: None,
            telegram: TelegramConfig::disabled(),
        }
    }

    fn spec(label: &str, a: Address, b: Address, expected: Option<Address>) -> PairSpec {
        PairSpec {
            label: label.to_string(),
            pair: TokenPair::new(a, b).unwrap(),
            expected,
        }
    }

    fn verifier(config: DiagConfig, chain: FakeChain) -> PairVerifier {
        let chain = Arc::new(chain);
        PairVerifier::new(config, chain.clone(), chain)
    }

    #[tokio::test]
    async fn test_matching_pair() {
        let config = config(
            vec![spec("USDC/WETH", USDC, WETH, Some(USDC_WETH_PAIR))],
            Some(INIT_CODE_HASH),
        );
        let report = verifier(config, chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();

        assert_eq!(report.code_hash, INIT_CODE_HASH);
        assert_eq!(report.pairs.len(), 1);
        let pair = &report.pairs[0];
        assert_eq!(pair.derived, USDC_WETH_PAIR);
        assert_eq!(pair.on_chain, OnChainPair::Found(USDC_WETH_PAIR));
        assert!(pair.on_chain_check.unwrap().matches);
        assert!(pair.expected_check.unwrap().matches);
        assert!(pair.router_check.is_none());
        assert!(report.is_healthy());
    }

    #[tokio::test]
    async fn test_swapped_input_order_same_address() {
        let config = config(
            vec![
                spec("USDC/WETH", USDC, WETH, None),
                spec("WETH/USDC", WETH, USDC, None),
            ],
            None,
        );
        let report = verifier(config, chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();
        assert_eq!(report.pairs[0].derived, report.pairs[1].derived);
    }

    #[tokio::test]
    async fn test_wrong_expected_address_is_mismatch() {
        let recorded = address!("5706084a00000000000000000000000000000001");
        let config = config(vec![spec("USDC/WETH", USDC, WETH, Some(recorded))], None);
        let report = verifier(config, chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();

        let warnings = report.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].derived, USDC_WETH_PAIR);
        assert_eq!(warnings[0].expected, recorded);
        assert!(!report.is_healthy());
    }

    #[tokio::test]
    async fn test_stale_router_hash_reported() {
        let stale = B256::repeat_byte(0x42);
        let config = config(vec![spec("USDC/WETH", USDC, WETH, None)], Some(stale));
        let report = verifier(config, chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();

        let router = report.router_hash.unwrap();
        assert!(!router.matches());
        assert_eq!(router.live_hash, INIT_CODE_HASH);

        let check = report.pairs[0].router_check.unwrap();
        assert!(!check.matches);
        assert_eq!(check.derived, USDC_WETH_PAIR);
        assert_eq!(report.mismatch_count(), 1);
        assert!(!report.is_healthy());
    }

    #[tokio::test]
    async fn test_stale_router_hash_without_pairs() {
        let stale = B256::repeat_byte(0x42);
        let report = verifier(config(Vec::new(), Some(stale)), chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();

        assert_eq!(report.mismatch_count(), 0);
        assert!(!report.is_healthy());
        let findings = report.findings();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("redeploy the router"));
        assert!(findings[0].contains(&stale.to_string()));
    }

    #[tokio::test]
    async fn test_findings_label_pair_mismatches() {
        let recorded = address!("5706084a00000000000000000000000000000001");
        let config = config(vec![spec("USDC/WETH", USDC, WETH, Some(recorded))], None);
        let report = verifier(config, chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();

        let findings = report.findings();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].starts_with("USDC/WETH: "));
    }

    #[tokio::test]
    async fn test_pair_not_created() {
        let config = config(vec![spec("USDC/DAI", USDC, DAI, None)], None);
        let report = verifier(config, chain(Some(INIT_CODE_HASH)))
            .run()
            .await
            .unwrap();

        let pair = &report.pairs[0];
        assert_eq!(pair.on_chain, OnChainPair::NotCreated);
        assert!(pair.on_chain_check.is_none());
        assert!(report.is_healthy());
    }

    #[tokio::test]
    async fn test_lookup_failure_continues() {
        let mut fake = chain(Some(INIT_CODE_HASH));
        fake.lookup_fails = true;
        let config = config(
            vec![
                spec("USDC/WETH", USDC, WETH, None),
                spec("USDC/DAI", USDC, DAI, None),
            ],
            None,
        );
        let report = verifier(config, fake).run().await.unwrap();

        assert_eq!(report.pairs.len(), 2);
        assert_eq!(report.unavailable_count(), 2);
        assert_eq!(report.pairs[0].derived, USDC_WETH_PAIR);
    }

    #[tokio::test]
    async fn test_code_hash_unavailable_aborts() {
        let config = config(vec![spec("USDC/WETH", USDC, WETH, None)], None);
        let err = verifier(config, chain(None)).run().await.unwrap_err();
        assert!(matches!(err, DiagError::Unavailable(_)));
    }
}
