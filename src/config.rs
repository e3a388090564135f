use alloy::primitives::{utils::parse_ether, U256};
use eyre::WrapErr;
use serde::Deserialize;
use std::path::Path;

use crate::constants::{
    DEFAULT_COMPUTE_UNITS_PER_SECOND, DEFAULT_GAS_LIMIT_BUFFER_PERCENT,
    DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_RATE_LIMIT_RETRIES, DEFAULT_MINT_PRICE,
    DEFAULT_WALLET_DELAY_MS,
};

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    pub wallet_delay_ms: u64,
    pub gas_limit_buffer_percent: u64,
    /// Price of a single token in ether, e.g. "0.005".
    pub mint_price: String,
    pub mint_quantity: Option<u64>,
    pub max_rate_limit_retries: u32,
    pub initial_backoff_ms: u64,
    pub compute_units_per_second: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_delay_ms: DEFAULT_WALLET_DELAY_MS,
            gas_limit_buffer_percent: DEFAULT_GAS_LIMIT_BUFFER_PERCENT,
            mint_price: DEFAULT_MINT_PRICE.to_string(),
            mint_quantity: None,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            compute_units_per_second: DEFAULT_COMPUTE_UNITS_PER_SECOND,
        }
    }
}

impl Config {
    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&cfg_str)?)
    }

    /// A missing file yields the defaults, a malformed one is an error.
    pub async fn read_or_default(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::read_from_file(path)
            .await
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }

    pub fn mint_price_wei(&self) -> eyre::Result<U256> {
        parse_ether(self.mint_price.trim())
            .wrap_err_with(|| format!("Invalid MINT_PRICE: {}", self.mint_price))
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RpcConfig {
    pub rpc_url: String,
    pub network_name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub block_explorer: String,
}

impl RpcConfig {
    pub async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let rpc_str = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&rpc_str)
            .wrap_err_with(|| format!("Invalid RPC config {}", path.display()))
    }
}
