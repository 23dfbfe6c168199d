use hyperindex_chain::{NetworkProbe, PairLookup, PairVerifier, ProviderManager, RpcHashSource};
use hyperindex_core::DiagConfig;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("hyperindex_chain=info".parse()?),
        )
        .init();

    info!("HyperIndex pair diagnostics starting");

    let config = match DiagConfig::load() {
        Ok(config) => {
            info!(
                chain_id = config.chain_id,
                factory = %config.factory,
                router = ?config.router,
                pairs = config.pairs.len(),
                accessor = %config.accessor,
                timeout_secs = config.rpc_timeout.as_secs(),
                "Configuration loaded from deployment"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let provider = match ProviderManager::new(&config.rpc_url, config.rpc_timeout) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!(error = %e, "Failed to create RPC provider");
            std::process::exit(1);
        }
    };

    if let Err(e) = NetworkProbe::new(config.clone(), provider.clone()).run().await {
        error!(error = %e, "Network check failed");
        std::process::exit(1);
    }

    let source = Arc::new(RpcHashSource::new(provider.clone(), config.accessor));

    match source.all_pairs_length(config.factory).await {
        Ok(count) => info!(pairs = %count, "Factory pair count"),
        Err(e) => warn!(error = %e, "Failed to read factory pair count"),
    }

    let mut tokens: Vec<_> = config.tokens.iter().collect();
    tokens.sort();
    for (label, token) in tokens {
        match source.token_symbol(*token).await {
            Ok(symbol) if symbol == *label => info!(label = %label, token = %token, "Token"),
            Ok(symbol) => warn!(
                label = %label,
                symbol = %symbol,
                token = %token,
                "Token symbol differs from deployment label"
            ),
            Err(e) => warn!(label = %label, token = %token, error = %e, "Failed to read token symbol"),
        }
    }

    let verifier = PairVerifier::new(config, source.clone(), source);
    let report = match verifier.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Pair verification failed");
            std::process::exit(1);
        }
    };

    if !report.is_healthy() {
        for finding in report.findings() {
            warn!(%finding, "Mismatch");
        }
        warn!(
            mismatches = report.mismatch_count(),
            router_hash = ?report.router_hash,
            "Deployment is inconsistent; see warnings above"
        );
        std::process::exit(2);
    }

    info!("All pair addresses match");
    Ok(())
}
