use std::path::PathBuf;

use clap::Parser;

use crate::constants::{
    ABI_FILE_PATH, CONFIG_FILE_PATH, LOG_DIR, PRIVATE_KEYS_FILE_PATH, RPC_CONFIG_FILE_PATH,
};

#[derive(Parser, Debug)]
#[command(name = "nft-minter", about = "Mint an NFT drop from every wallet in a key list", version)]
pub struct Cli {
    /// NFT contract address. Prompted for on stdin when omitted.
    #[arg(long, short = 'c', env = "MINT_CONTRACT", value_name = "ADDRESS")]
    pub contract: Option<String>,

    /// RPC settings (rpcUrl, networkName, chainId, blockExplorer).
    #[arg(long, default_value = RPC_CONFIG_FILE_PATH, value_name = "PATH")]
    pub rpc: PathBuf,

    /// Newline-delimited private keys.
    #[arg(long, default_value = PRIVATE_KEYS_FILE_PATH, value_name = "PATH")]
    pub keys: PathBuf,

    #[arg(long, default_value = ABI_FILE_PATH, value_name = "PATH")]
    pub abi: PathBuf,

    /// Optional tool settings; defaults apply when the file is absent.
    #[arg(long, default_value = CONFIG_FILE_PATH, value_name = "PATH")]
    pub config: PathBuf,

    #[arg(long, default_value = LOG_DIR, value_name = "DIR")]
    pub log_dir: PathBuf,
}
