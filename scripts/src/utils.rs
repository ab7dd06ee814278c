//! Utilities for the deploy scripts.

use alloy::{
    dyn_abi::DynSolValue,
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use itertools::Itertools;
use tracing::info;

use crate::errors::ScriptError;

/// Sets up a provider for the given RPC URL that signs transactions with the given signer
pub fn setup_client(signer: PrivateKeySigner, rpc_url: &str) -> Result<DynProvider, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok(DynProvider::new(provider))
}

/// Checks that the node serves the expected chain, if one is configured
pub async fn check_chain_id(
    provider: &DynProvider,
    expected: Option<u64>,
) -> Result<u64, ScriptError> {
    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    if let Some(expected) = expected {
        if chain_id != expected {
            return Err(ScriptError::ClientInitialization(format!(
                "node serves chain {}, expected {}",
                chain_id, expected
            )));
        }
    }

    info!("connected to chain {}", chain_id);
    Ok(chain_id)
}

/// Render a constructor argument for the deployments file
pub fn format_arg(arg: &DynSolValue) -> String {
    match arg {
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::Uint(value, _) => value.to_string(),
        DynSolValue::Int(value, _) => value.to_string(),
        DynSolValue::Bool(value) => value.to_string(),
        DynSolValue::String(value) => value.clone(),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            format!("[{}]", values.iter().map(format_arg).join(", "))
        }
        other => format!("{:?}", other),
    }
}
