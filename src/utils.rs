use std::{fmt::Display, path::Path, str::FromStr};

use alloy::primitives::Address;
use eyre::WrapErr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub async fn read_file_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let file = tokio::fs::read(path).await?;
    let mut lines = file.as_slice().lines();

    let mut contents = vec![];
    while let Some(line) = lines.next_line().await? {
        contents.push(line);
    }

    Ok(contents)
}

/// Trimmed keys, blank lines dropped. Keys are validated one by one while
/// minting so that a bad line only costs its own wallet.
pub async fn read_private_keys(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let path = path.as_ref();

    let keys = read_file_lines(path)
        .await
        .wrap_err_with(|| format!("Failed to read private keys from {}", path.display()))?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    Ok(keys)
}

/// Accepts lowercase or uppercase hex as-is; mixed case must be a valid
/// EIP-55 checksum.
pub fn parse_contract_address(input: &str) -> eyre::Result<Address> {
    let input = input.trim();
    let digits = input.strip_prefix("0x").unwrap_or(input);

    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        eyre::bail!("Invalid contract address: {input}");
    }

    let address = Address::from_str(digits)?;

    let mixed_case = digits.chars().any(|c| c.is_ascii_lowercase())
        && digits.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case && address.to_checksum(None)[2..] != *digits {
        eyre::bail!("Invalid contract address checksum: {input}");
    }

    Ok(address)
}

pub fn explorer_tx_url(explorer: &str, tx_hash: impl Display) -> String {
    let explorer = explorer.trim().trim_end_matches('/');

    if explorer.is_empty() {
        return tx_hash.to_string();
    }

    format!("{explorer}/tx/{tx_hash}")
}

pub async fn prompt_line(prompt: &str) -> eyre::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    Ok(line.trim().to_string())
}
