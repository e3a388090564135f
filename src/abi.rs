use std::path::Path;

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, FunctionExt},
    json_abi::{Function, Param, StateMutability},
    primitives::{Address, U256},
};
use eyre::WrapErr;
use serde::Deserialize;
use serde_json::Value;

/// A `function` entry as it appears in an ABI file. Older compilers emit
/// `constant`/`payable` flags instead of `stateMutability`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FunctionEntry {
    name: String,
    #[serde(default)]
    inputs: Vec<Param>,
    #[serde(default)]
    outputs: Vec<Param>,
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    payable: bool,
}

impl From<FunctionEntry> for Function {
    fn from(entry: FunctionEntry) -> Self {
        let state_mutability = match entry.state_mutability {
            Some(state_mutability) => state_mutability,
            None if entry.payable => StateMutability::Payable,
            None if entry.constant => StateMutability::View,
            None => StateMutability::NonPayable,
        };

        Function {
            name: entry.name,
            inputs: entry.inputs,
            outputs: entry.outputs,
            state_mutability,
        }
    }
}

pub async fn load_abi(path: impl AsRef<Path>) -> eyre::Result<Vec<Function>> {
    let path = path.as_ref();
    let abi_str = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    parse_abi(&abi_str).wrap_err_with(|| format!("Invalid ABI file {}", path.display()))
}

/// Returns the ABI's functions in file order. Accepts either a bare ABI array
/// or a build artifact carrying it under `abi`.
pub fn parse_abi(abi_str: &str) -> eyre::Result<Vec<Function>> {
    let document: Value = serde_json::from_str(abi_str).wrap_err("ABI is not valid JSON")?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut artifact) => match artifact.remove("abi") {
            Some(Value::Array(items)) => items,
            _ => eyre::bail!("ABI object has no `abi` array"),
        },
        _ => eyre::bail!("ABI must be a JSON array"),
    };

    let mut functions = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        // Solidity treats a missing `type` as "function".
        let kind = item.get("type").and_then(Value::as_str).unwrap_or("function");
        if kind != "function" {
            continue;
        }

        let entry: FunctionEntry = serde_json::from_value(item)
            .wrap_err_with(|| format!("Malformed function entry at index {index}"))?;
        functions.push(entry.into());
    }

    Ok(functions)
}

/// First payable function whose name mentions `mint` or `claim`.
pub fn find_mint_function(functions: &[Function]) -> eyre::Result<&Function> {
    functions
        .iter()
        .find(|function| {
            let name = function.name.to_lowercase();
            function.state_mutability == StateMutability::Payable
                && (name.contains("mint") || name.contains("claim"))
        })
        .ok_or_else(|| eyre::eyre!("No mint function found in the ABI"))
}

/// First view function named like `maxMint...` returning a `uint256`.
pub fn find_max_mint_function(functions: &[Function]) -> Option<&Function> {
    functions.iter().find(|function| {
        function.state_mutability == StateMutability::View
            && function.name.to_lowercase().contains("maxmint")
            && function
                .outputs
                .first()
                .is_some_and(|output| output.ty == "uint256")
    })
}

/// Fills the mint function's parameters: the first integer parameter takes
/// the quantity, address parameters take the minting wallet.
pub fn mint_call_args(
    function: &Function,
    quantity: U256,
    minter: Address,
) -> eyre::Result<Vec<DynSolValue>> {
    let mut quantity = Some(quantity);
    let mut args = Vec::with_capacity(function.inputs.len());

    for param in &function.inputs {
        let value = match DynSolType::parse(&param.ty)? {
            DynSolType::Uint(bits) => match quantity.take() {
                Some(quantity) => DynSolValue::Uint(quantity, bits),
                None => eyre::bail!(
                    "{} takes more than one integer parameter ({})",
                    function.name,
                    param.name
                ),
            },
            DynSolType::Address => DynSolValue::Address(minter),
            _ => eyre::bail!(
                "Unsupported parameter `{} {}` in {}",
                param.ty,
                param.name,
                function.name
            ),
        };
        args.push(value);
    }

    Ok(args)
}

/// The accessor is either parameterless or keyed by the wallet address.
pub fn max_mint_call_args(function: &Function, wallet: Address) -> eyre::Result<Vec<DynSolValue>> {
    match function.inputs.as_slice() {
        [] => Ok(vec![]),
        [param] if param.ty == "address" => Ok(vec![DynSolValue::Address(wallet)]),
        _ => eyre::bail!("Unsupported parameters for {}", function.signature()),
    }
}

pub fn decode_max_mint(function: &Function, data: &[u8]) -> eyre::Result<U256> {
    let outputs = function.abi_decode_output(data, true)?;

    outputs
        .first()
        .and_then(DynSolValue::as_uint)
        .map(|(value, _)| value)
        .ok_or_else(|| eyre::eyre!("{} returned no uint256", function.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{dyn_abi::JsonAbiExt, primitives::address};

    const WALLET: Address = address!("00000000000000000000000000000000000000aa");

    const DROP_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"_name","type":"string"}],"stateMutability":"nonpayable"},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"tokenId","type":"uint256","indexed":true}]},
        {"type":"function","name":"ownerMint","inputs":[{"name":"to","type":"address"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"publicMint","inputs":[{"name":"quantity","type":"uint256"}],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"claim","inputs":[{"name":"receiver","type":"address"},{"name":"quantity","type":"uint256"}],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"maxMintPerWallet","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"}
    ]"#;

    #[test]
    fn picks_first_payable_mint_in_file_order() {
        let functions = parse_abi(DROP_ABI).unwrap();
        let mint = find_mint_function(&functions).unwrap();

        assert_eq!(mint.name, "publicMint");
    }

    #[test]
    fn claim_counts_as_mint() {
        let abi = r#"[
            {"type":"function","name":"setClaimRoot","inputs":[{"name":"root","type":"bytes32"}],"outputs":[],"stateMutability":"nonpayable"},
            {"type":"function","name":"ClaimTo","inputs":[{"name":"to","type":"address"}],"outputs":[],"stateMutability":"payable"}
        ]"#;
        let functions = parse_abi(abi).unwrap();

        assert_eq!(find_mint_function(&functions).unwrap().name, "ClaimTo");
    }

    #[test]
    fn no_payable_mint_is_an_error() {
        let abi = r#"[
            {"type":"function","name":"mint","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
            {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"}
        ]"#;
        let functions = parse_abi(abi).unwrap();

        assert!(find_mint_function(&functions).is_err());
    }

    #[test]
    fn malformed_abi_is_rejected() {
        assert!(parse_abi("[{\"type\":\"function\",").is_err());
        assert!(parse_abi("{\"contractName\":\"Drop\"}").is_err());
        assert!(parse_abi("42").is_err());
        // function entries must carry a name
        assert!(parse_abi(r#"[{"type":"function","inputs":[],"stateMutability":"payable"}]"#).is_err());
    }

    #[test]
    fn artifact_abi_is_unwrapped() {
        let artifact = format!(r#"{{"contractName":"Drop","abi":{DROP_ABI},"bytecode":"0x"}}"#);
        let functions = parse_abi(&artifact).unwrap();

        assert_eq!(functions.len(), 4);
    }

    #[test]
    fn legacy_flags_define_mutability() {
        let abi = r#"[
            {"name":"mint","inputs":[],"outputs":[],"constant":false,"payable":true},
            {"type":"function","name":"maxMint","inputs":[],"outputs":[{"name":"","type":"uint256"}],"constant":true,"payable":false}
        ]"#;
        let functions = parse_abi(abi).unwrap();

        assert_eq!(functions[0].state_mutability, StateMutability::Payable);
        assert_eq!(functions[1].state_mutability, StateMutability::View);
        assert_eq!(find_max_mint_function(&functions).unwrap().name, "maxMint");
    }

    #[test]
    fn max_mint_detection() {
        let functions = parse_abi(DROP_ABI).unwrap();
        assert_eq!(
            find_max_mint_function(&functions).unwrap().name,
            "maxMintPerWallet"
        );

        let abi = r#"[
            {"type":"function","name":"maxMintPerWallet","inputs":[],"outputs":[{"name":"","type":"uint8"}],"stateMutability":"view"},
            {"type":"function","name":"MAXMINTAMOUNT","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"pure"},
            {"type":"function","name":"maxMints","inputs":[],"outputs":[],"stateMutability":"view"}
        ]"#;
        let functions = parse_abi(abi).unwrap();
        assert!(find_max_mint_function(&functions).is_none());
    }

    #[test]
    fn mint_args_follow_parameter_types() {
        let functions = parse_abi(DROP_ABI).unwrap();
        let claim = functions.iter().find(|f| f.name == "claim").unwrap();

        let args = mint_call_args(claim, U256::from(3), WALLET).unwrap();
        assert_eq!(
            args,
            vec![
                DynSolValue::Address(WALLET),
                DynSolValue::Uint(U256::from(3), 256)
            ]
        );

        let calldata = claim.abi_encode_input(&args).unwrap();
        assert_eq!(calldata[..4], claim.selector()[..]);
        assert_eq!(calldata.len(), 4 + 2 * 32);
    }

    #[test]
    fn unsupported_mint_parameters_are_rejected() {
        let abi = r#"[
            {"type":"function","name":"mintWithProof","inputs":[{"name":"proof","type":"bytes32[]"}],"outputs":[],"stateMutability":"payable"},
            {"type":"function","name":"mintBatch","inputs":[{"name":"a","type":"uint256"},{"name":"b","type":"uint256"}],"outputs":[],"stateMutability":"payable"}
        ]"#;
        let functions = parse_abi(abi).unwrap();

        assert!(mint_call_args(&functions[0], U256::from(1), WALLET).is_err());
        assert!(mint_call_args(&functions[1], U256::from(1), WALLET).is_err());
    }

    #[test]
    fn max_mint_args_and_decoding() {
        let abi = r#"[
            {"type":"function","name":"maxMintPerWallet","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
            {"type":"function","name":"maxMintFor","inputs":[{"name":"wallet","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
            {"type":"function","name":"maxMintIn","inputs":[{"name":"phase","type":"uint8"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"}
        ]"#;
        let functions = parse_abi(abi).unwrap();

        assert!(max_mint_call_args(&functions[0], WALLET).unwrap().is_empty());
        assert_eq!(
            max_mint_call_args(&functions[1], WALLET).unwrap(),
            vec![DynSolValue::Address(WALLET)]
        );
        assert!(max_mint_call_args(&functions[2], WALLET).is_err());

        let returned = U256::from(5).to_be_bytes::<32>();
        assert_eq!(
            decode_max_mint(&functions[0], &returned).unwrap(),
            U256::from(5)
        );
        assert!(decode_max_mint(&functions[0], &[]).is_err());
    }
}
