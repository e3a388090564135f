use clap::Parser;

use abi::load_abi;
use cli::Cli;
use config::{Config, RpcConfig};
use logger::init_logger;
use minter::run;
use utils::{parse_contract_address, prompt_line, read_private_keys};

mod abi;
mod cli;
mod config;
mod constants;
mod logger;
mod minter;
mod utils;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(&cli.log_dir)?;

    tracing::info!("=== NFT auto-mint bot ===");

    let contract = match cli.contract {
        Some(contract) => contract,
        None => prompt_line("Enter the NFT contract address: ").await?,
    };
    let contract = parse_contract_address(&contract)?;

    let config = Config::read_or_default(&cli.config).await?;
    let rpc = RpcConfig::read_from_file(&cli.rpc).await?;
    let private_keys = read_private_keys(&cli.keys).await?;
    let functions = load_abi(&cli.abi).await?;

    let summary = run(config, rpc, contract, functions, private_keys).await?;

    tracing::info!("=== Mint process finished ===");
    tracing::info!(
        "{} wallet(s): {} minted, {} reverted, {} failed, {} skipped",
        summary.total(),
        summary.minted,
        summary.reverted,
        summary.failed,
        summary.skipped
    );

    Ok(())
}
