use std::{
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use alloy::{
    dyn_abi::JsonAbiExt,
    json_abi::Function,
    network::{Ethereum, EthereumWallet, NetworkWallet, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::{
        client::ClientBuilder,
        types::{TransactionReceipt, TransactionRequest},
    },
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, layers::RetryBackoffLayer, Transport},
};
use alloy_chains::Chain;
use eyre::WrapErr;

use crate::{
    abi::{
        decode_max_mint, find_max_mint_function, find_mint_function, max_mint_call_args,
        mint_call_args,
    },
    config::{Config, RpcConfig},
    constants::DEFAULT_MINT_QUANTITY,
    utils::explorer_tx_url,
};

/// Everything a single wallet needs to build its mint transaction.
#[derive(Debug, Clone)]
pub struct MintJob<'a> {
    pub contract: Address,
    pub mint_function: &'a Function,
    pub max_mint_function: Option<&'a Function>,
    pub price_per_token: U256,
    pub quantity_override: Option<u64>,
    pub gas_limit_buffer_percent: u64,
    pub chain_id: u64,
    pub block_explorer: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletOutcome {
    Minted,
    Reverted,
    Skipped,
    Failed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub minted: usize,
    pub reverted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: WalletOutcome) {
        match outcome {
            WalletOutcome::Minted => self.minted += 1,
            WalletOutcome::Reverted => self.reverted += 1,
            WalletOutcome::Skipped => self.skipped += 1,
            WalletOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.minted + self.reverted + self.skipped + self.failed
    }
}

/// Saturates at `u64::MAX` instead of overflowing on huge estimates or buffers.
pub fn apply_gas_buffer<G>(estimate: G, buffer_percent: u64) -> G
where
    G: Copy + Into<u128> + TryFrom<u128>,
{
    let buffered = estimate
        .into()
        .saturating_mul(100u128.saturating_add(buffer_percent.into()))
        / 100;

    G::try_from(buffered.min(u128::from(u64::MAX))).unwrap_or(estimate)
}

/// A failed read keeps the last cap read from an earlier wallet.
pub fn current_max_mint(read: Option<U256>, last_read: Option<U256>) -> Option<U256> {
    read.or(last_read)
}

/// An explicit quantity wins over the contract's cap. Never less than one.
pub fn resolve_quantity(quantity_override: Option<u64>, max_mint: Option<U256>) -> U256 {
    quantity_override
        .map(U256::from)
        .or(max_mint)
        .unwrap_or(U256::ZERO)
        .max(U256::from(DEFAULT_MINT_QUANTITY))
}

/// `None` for lines that are not `0x`-prefixed: those wallets are skipped.
pub fn parse_wallet_key(key: &str) -> Option<eyre::Result<PrivateKeySigner>> {
    let key = key.trim();

    if !key.starts_with("0x") {
        return None;
    }

    Some(PrivateKeySigner::from_str(key).wrap_err("Invalid private key"))
}

pub async fn send_transaction<P, T, W>(
    provider: Arc<P>,
    wallet: Arc<W>,
    to: Address,
    input: Option<Bytes>,
    value: U256,
    chain_id: u64,
    gas_limit_buffer_percent: u64,
) -> eyre::Result<TransactionReceipt>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
    W: NetworkWallet<Ethereum>,
{
    let eip1559_fees = provider.estimate_eip1559_fees(None).await?;
    let from = wallet.default_signer_address();

    let nonce = provider.get_transaction_count(from).await?;

    let mut tx_request = TransactionRequest::default()
        .with_max_fee_per_gas(eip1559_fees.max_fee_per_gas)
        .with_max_priority_fee_per_gas(eip1559_fees.max_priority_fee_per_gas)
        .with_to(to)
        .with_value(value)
        .with_nonce(nonce)
        .with_chain_id(chain_id)
        .with_from(from);

    if let Some(data) = input {
        tx_request.set_input(data);
    }

    let gas_estimate = provider.estimate_gas(&tx_request).await?;
    tx_request.set_gas_limit(apply_gas_buffer(gas_estimate, gas_limit_buffer_percent));

    let signed_transaction = tx_request.build(&wallet).await?;
    let pending_tx = provider.send_tx_envelope(signed_transaction).await?;

    tracing::info!("Transaction sent! Tx hash: {}", pending_tx.tx_hash());
    tracing::info!("Waiting for confirmation...");

    let receipt = pending_tx.get_receipt().await?;

    Ok(receipt)
}

pub async fn read_max_mint<P, T>(
    provider: Arc<P>,
    contract: Address,
    function: &Function,
    wallet: Address,
) -> eyre::Result<U256>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let args = max_mint_call_args(function, wallet)?;
    let input = function.abi_encode_input(&args)?;

    let tx_request = TransactionRequest::default()
        .with_from(wallet)
        .with_to(contract)
        .with_input(input);

    let output = provider.call(&tx_request).await?;

    decode_max_mint(function, &output)
}

pub async fn mint<P, T, W>(
    provider: Arc<P>,
    wallet: Arc<W>,
    job: &MintJob<'_>,
    wallet_index: usize,
    last_max_mint: &mut Option<U256>,
) -> eyre::Result<WalletOutcome>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
    W: NetworkWallet<Ethereum>,
{
    let address = wallet.default_signer_address();
    tracing::info!("Processing wallet {wallet_index} ({address})");

    let max_mint = match (job.quantity_override, job.max_mint_function) {
        (None, Some(function)) => {
            let read = match read_max_mint(provider.clone(), job.contract, function, address).await
            {
                Ok(max_mint) => {
                    tracing::info!("Max mint per wallet: {max_mint}");
                    Some(max_mint)
                }
                Err(e) => {
                    tracing::warn!("Failed to read max mint: {e}");
                    None
                }
            };

            *last_max_mint = current_max_mint(read, *last_max_mint);
            *last_max_mint
        }
        _ => None,
    };

    let quantity = resolve_quantity(job.quantity_override, max_mint);
    let value = job.price_per_token.saturating_mul(quantity);

    tracing::info!("Attempting to mint {quantity} NFT(s)...");

    let args = mint_call_args(job.mint_function, quantity, address)?;
    let input = job.mint_function.abi_encode_input(&args)?;

    let receipt = send_transaction(
        provider,
        wallet,
        job.contract,
        Some(input.into()),
        value,
        job.chain_id,
        job.gas_limit_buffer_percent,
    )
    .await?;

    let url = explorer_tx_url(job.block_explorer, receipt.transaction_hash);
    let block = receipt
        .block_number
        .map_or_else(|| "pending".to_string(), |number| number.to_string());

    if receipt.status() {
        tracing::info!("Mint successful for wallet {wallet_index}!");
        tracing::info!("Block: {block} | Tx: {url}");
        Ok(WalletOutcome::Minted)
    } else {
        tracing::error!("Mint transaction reverted for wallet {wallet_index}: {url}");
        Ok(WalletOutcome::Reverted)
    }
}

pub async fn mint_for_all<P, T>(
    provider: Arc<P>,
    private_keys: &[String],
    job: &MintJob<'_>,
    wallet_delay: Duration,
) -> RunSummary
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let mut summary = RunSummary::default();
    let mut last_max_mint = None;

    for (index, key) in private_keys.iter().enumerate() {
        let wallet_index = index + 1;

        let Some(signer) = parse_wallet_key(key) else {
            tracing::warn!("Wallet {wallet_index}: invalid private key, skipped");
            summary.record(WalletOutcome::Skipped);
            continue;
        };

        let outcome = match signer {
            Ok(signer) => {
                let wallet = Arc::new(EthereumWallet::new(signer));
                mint(provider.clone(), wallet, job, wallet_index, &mut last_max_mint).await
            }
            Err(e) => Err(e),
        };

        let outcome = outcome.unwrap_or_else(|e| {
            tracing::error!("Mint failed for wallet {wallet_index}: {e:#}");
            WalletOutcome::Failed
        });
        summary.record(outcome);

        tokio::time::sleep(wallet_delay).await;
    }

    summary
}

pub async fn run(
    config: Config,
    rpc: RpcConfig,
    contract: Address,
    functions: Vec<Function>,
    private_keys: Vec<String>,
) -> eyre::Result<RunSummary> {
    let retry_layer = RetryBackoffLayer::new(
        config.max_rate_limit_retries,
        config.initial_backoff_ms,
        config.compute_units_per_second,
    );
    let rpc_url = rpc
        .rpc_url
        .parse::<Url>()
        .wrap_err_with(|| format!("Invalid RPC url: {}", rpc.rpc_url))?;

    let client = ClientBuilder::default().layer(retry_layer).http(rpc_url);

    let provider = Arc::new(
        ProviderBuilder::new()
            .with_recommended_fillers()
            .on_provider(RootProvider::new(client)),
    );

    tracing::info!(
        "Connected to {} (Chain ID: {})",
        rpc.network_name,
        rpc.chain_id
    );

    match provider.get_chain_id().await {
        Ok(remote) if remote != rpc.chain_id => tracing::warn!(
            "RPC reports chain {} but {} was configured",
            Chain::from_id(remote),
            Chain::from_id(rpc.chain_id)
        ),
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not query chain id: {e}"),
    }

    let mint_function = find_mint_function(&functions)?;
    tracing::info!("Mint function found: {}", mint_function.name);

    let max_mint_function = find_max_mint_function(&functions);
    if let Some(function) = max_mint_function {
        tracing::info!("Max mint function found: {}", function.name);
    }

    let job = MintJob {
        contract,
        mint_function,
        max_mint_function,
        price_per_token: config.mint_price_wei()?,
        quantity_override: config.mint_quantity,
        gas_limit_buffer_percent: config.gas_limit_buffer_percent,
        chain_id: rpc.chain_id,
        block_explorer: &rpc.block_explorer,
    };

    let summary = mint_for_all(
        provider,
        &private_keys,
        &job,
        Duration::from_millis(config.wallet_delay_ms),
    )
    .await;

    Ok(summary)
}
