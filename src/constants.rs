// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const RPC_CONFIG_FILE_PATH: &str = "data/rpc.json";
pub const PRIVATE_KEYS_FILE_PATH: &str = "data/private_keys.txt";
pub const ABI_FILE_PATH: &str = "data/abi.json";
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "nft-minter.log";

// DEFAULTS
pub const DEFAULT_WALLET_DELAY_MS: u64 = 1000;
pub const DEFAULT_GAS_LIMIT_BUFFER_PERCENT: u64 = 20;
pub const DEFAULT_MINT_PRICE: &str = "0";
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 10;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_COMPUTE_UNITS_PER_SECOND: u64 = 100;

/// Used when the contract exposes no max-mint accessor or it cannot be read.
pub const DEFAULT_MINT_QUANTITY: u64 = 1;
