use crate::error::{DiagError, Result};
use crate::types::TokenPair;
use alloy_primitives::{Address, B256};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Deployment configuration loaded from JSON file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub factory: Address,
    #[serde(default)]
    pub router: Option<Address>,
    #[serde(default)]
    pub tokens: HashMap<String, Address>,
    #[serde(default)]
    pub pairs: Vec<PairEntry>,
    /// Init-code hash the router's pair library was compiled with
    #[serde(default)]
    pub router_init_code_hash: Option<B256>,
}

/// Pair as written in the deployment file. Tokens are labels from `tokens`
/// or literal addresses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairEntry {
    pub token_a: String,
    pub token_b: String,
    #[serde(default)]
    pub expected: Option<Address>,
}

/// Runtime configuration from environment variables
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub deployments_dir: PathBuf,
    pub accessor: CodeHashAccessor,
    pub rpc_timeout: Duration,
    pub deployer: Option<Address>,
}

/// Factory accessor that returns the pair init-code hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeHashAccessor {
    #[default]
    PairCodeHash,
    InitCodePairHash,
}

impl CodeHashAccessor {
    pub fn signature(&self) -> &'static str {
        match self {
            CodeHashAccessor::PairCodeHash => "pairCodeHash()",
            CodeHashAccessor::InitCodePairHash => "INIT_CODE_PAIR_HASH()",
        }
    }
}

impl FromStr for CodeHashAccessor {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_end_matches("()") {
            "pairCodeHash" => Ok(CodeHashAccessor::PairCodeHash),
            "INIT_CODE_PAIR_HASH" => Ok(CodeHashAccessor::InitCodePairHash),
            other => Err(DiagError::InvalidConfig(format!(
                "unknown code hash accessor: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for CodeHashAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature())
    }
}

/// A pair to verify, resolved against the token table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSpec {
    /// Human-readable name, e.g. `USDC/HYPERINDEX`
    pub label: String,
    pub pair: TokenPair,
    /// Address recorded in deployment notes, if any
    pub expected: Option<Address>,
}

/// Telegram notification configuration for alerting on mismatches
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Enable Telegram notifications (default: true if bot_token and chat_id are set)
    pub enabled: bool,
    /// Telegram bot token from @BotFather
    pub bot_token: Option<String>,
    /// Chat ID or channel ID to send messages to
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").ok();
        let chat_id = env::var("TELEGRAM_CHAT_ID").ok();
        let enabled = env::var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(bot_token.is_some() && chat_id.is_some());

        Self {
            enabled,
            bot_token,
            chat_id,
        }
    }

    /// Check if Telegram is fully configured and enabled
    pub fn is_configured(&self) -> bool {
        self.enabled && self.bot_token.is_some() && self.chat_id.is_some()
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            bot_token: None,
            chat_id: None,
        }
    }
}

/// Complete diagnostic configuration, passed explicitly to every component
#[derive(Debug, Clone)]
pub struct DiagConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub factory: Address,
    pub router: Option<Address>,
    pub tokens: HashMap<String, Address>,
    pub pairs: Vec<PairSpec>,
    pub router_init_code_hash: Option<B256>,
    pub accessor: CodeHashAccessor,
    pub rpc_timeout: Duration,
    pub deployer: Option<Address>,
    pub telegram: TelegramConfig,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        let chain_id = env::var("CHAIN_ID")
            .map_err(|_| DiagError::MissingEnvVar("CHAIN_ID".to_string()))?
            .parse::<u64>()
            .map_err(|_| DiagError::MissingEnvVar("CHAIN_ID (invalid format)".to_string()))?;

        let rpc_url = sanitize(
            &env::var("RPC_URL").map_err(|_| DiagError::MissingEnvVar("RPC_URL".to_string()))?,
        );

        let deployments_dir = env::var("DEPLOYMENTS_DIR")
            .map(|s| PathBuf::from(sanitize(&s)))
            .unwrap_or_else(|_| PathBuf::from("deployments"));

        let accessor = match env::var("CODE_HASH_ACCESSOR") {
            Ok(name) => name.parse()?,
            Err(_) => CodeHashAccessor::default(),
        };

        let rpc_timeout = parse_timeout(env::var("RPC_TIMEOUT_SECS").ok().as_deref())?;

        let deployer = match env::var("DEPLOYER_ADDRESS") {
            Ok(raw) => Some(sanitize(&raw).parse::<Address>().map_err(|e| {
                DiagError::InvalidConfig(format!("DEPLOYER_ADDRESS: {}", e))
            })?),
            Err(_) => None,
        };

        debug!(rpc_url = %rpc_url, "RPC endpoint");

        Ok(Self {
            chain_id,
            rpc_url,
            deployments_dir,
            accessor,
            rpc_timeout,
            deployer,
        })
    }
}

/// `RPC_TIMEOUT_SECS`: whole seconds, at least 1. Defaults to 10 when unset.
fn parse_timeout(raw: Option<&str>) -> Result<Duration> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(10));
    };
    match sanitize(raw).parse::<u64>() {
        Ok(0) => Err(DiagError::InvalidConfig(
            "RPC_TIMEOUT_SECS must be at least 1".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(DiagError::InvalidConfig(format!(
            "RPC_TIMEOUT_SECS: {}",
            e
        ))),
    }
}

/// Strip surrounding quotes and whitespace
fn sanitize(value: &str) -> String {
    let trimmed = value.trim();
    let without_quotes = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    without_quotes.to_string()
}

impl DeploymentConfig {
    /// Load `<dir>/<chain_id>.json`
    pub fn load(dir: &Path, chain_id: u64) -> Result<Self> {
        let path = dir.join(format!("{}.json", chain_id));
        let content = fs::read_to_string(&path)
            .map_err(|_| DiagError::DeploymentFileNotFound(path.display().to_string()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| DiagError::DeploymentParseError(e.to_string()))
    }

    fn resolve_token(&self, token: &str) -> Result<Address> {
        if let Some(address) = self.tokens.get(token) {
            return Ok(*address);
        }
        token
            .trim()
            .parse::<Address>()
            .map_err(|_| DiagError::InvalidConfig(format!("unknown token: {}", token)))
    }

    /// Resolve pair entries into canonical pairs
    pub fn resolve_pairs(&self) -> Result<Vec<PairSpec>> {
        self.pairs
            .iter()
            .map(|entry| {
                let token_a = self.resolve_token(&entry.token_a)?;
                let token_b = self.resolve_token(&entry.token_b)?;
                let pair = TokenPair::new(token_a, token_b).map_err(|_| {
                    DiagError::InvalidConfig(format!(
                        "pair {}/{} uses the same token twice",
                        entry.token_a, entry.token_b
                    ))
                })?;
                Ok(PairSpec {
                    label: format!("{}/{}", entry.token_a, entry.token_b),
                    pair,
                    expected: entry.expected,
                })
            })
            .collect()
    }
}

impl DiagConfig {
    /// Load complete configuration from environment and deployment file
    pub fn load() -> Result<Self> {
        let env_config = EnvConfig::load()?;
        let deployment =
            DeploymentConfig::load(&env_config.deployments_dir, env_config.chain_id)?;
        let telegram = TelegramConfig::from_env();
        if telegram.is_configured() {
            info!("Telegram notifications enabled");
        }
        Self::resolve(env_config, deployment, telegram)
    }

    pub fn resolve(
        env_config: EnvConfig,
        deployment: DeploymentConfig,
        telegram: TelegramConfig,
    ) -> Result<Self> {
        let pairs = deployment.resolve_pairs()?;

        Ok(Self {
            chain_id: env_config.chain_id,
            rpc_url: env_config.rpc_url,
            factory: deployment.factory,
            router: deployment.router,
            tokens: deployment.tokens,
            pairs,
            router_init_code_hash: deployment.router_init_code_hash,
            accessor: env_config.accessor,
            rpc_timeout: env_config.rpc_timeout,
            deployer: env_config.deployer,
            telegram,
        })
    }

    /// Label of a token address from the deployment token table
    pub fn token_label(&self, token: Address) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(_, address)| **address == token)
            .map(|(label, _)| label.as_str())
    }
}
