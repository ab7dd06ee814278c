//! Resolution of named accounts to signing keys

use std::str::FromStr;

use alloy::{
    primitives::Address,
    signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
};
use tracing::debug;

use crate::{
    config::{AccountRef, AccountsConfig, DeployConfig},
    constants::DEPLOYER_ACCOUNT_NAME,
    errors::ScriptError,
};

/// Resolve a named account on the given network to a signer
pub fn resolve_named_account(
    config: &DeployConfig,
    network: &str,
    name: &str,
) -> Result<PrivateKeySigner, ScriptError> {
    let network_config = config.network(network)?;
    let account = config.named_account(name, network)?;
    let signer = resolve_account(network, network_config.accounts.as_ref(), account)?;

    debug!("resolved named account `{}` to {:#x}", name, signer.address());
    Ok(signer)
}

/// Resolve the deployer, preferring an explicitly supplied private key over the
/// named-account table
pub fn resolve_deployer(
    config: &DeployConfig,
    network: &str,
    account_name: &str,
    priv_key: Option<&str>,
) -> Result<PrivateKeySigner, ScriptError> {
    match priv_key {
        Some(key) => parse_private_key(key),
        None => resolve_named_account(config, network, account_name),
    }
}

/// Resolve every named account on the given network to its address, with the
/// deployer taken from `deployer_key` when one is supplied
pub fn named_account_addresses(
    config: &DeployConfig,
    network: &str,
    deployer_key: Option<&str>,
) -> Result<Vec<(String, Address)>, ScriptError> {
    config
        .named_accounts
        .keys()
        .map(|name| {
            let signer = if name == DEPLOYER_ACCOUNT_NAME {
                resolve_deployer(config, network, name, deployer_key)?
            } else {
                resolve_named_account(config, network, name)?
            };
            Ok((name.clone(), signer.address()))
        })
        .collect()
}

/// Resolve an account reference against a network's accounts
pub fn resolve_account(
    network: &str,
    accounts: Option<&AccountsConfig>,
    account: &AccountRef,
) -> Result<PrivateKeySigner, ScriptError> {
    match account {
        AccountRef::Key(key) => parse_private_key(key),
        AccountRef::Index(index) => {
            let accounts = accounts.ok_or_else(|| {
                ScriptError::Config(format!(
                    "no accounts configured for network `{}`, supply a private key",
                    network
                ))
            })?;
            account_at(accounts, *index)
        }
    }
}

/// Get the account at the given index of a network's accounts
fn account_at(accounts: &AccountsConfig, index: u32) -> Result<PrivateKeySigner, ScriptError> {
    match accounts {
        AccountsConfig::Keys(keys) => {
            let key = keys.get(index as usize).ok_or_else(|| {
                ScriptError::Config(format!(
                    "account index {} out of range, {} keys configured",
                    index,
                    keys.len()
                ))
            })?;
            parse_private_key(key)
        }
        AccountsConfig::Mnemonic(mnemonic) => {
            if index >= mnemonic.count {
                return Err(ScriptError::Config(format!(
                    "account index {} out of range, {} accounts derived from mnemonic",
                    index, mnemonic.count
                )));
            }

            MnemonicBuilder::<English>::default()
                .phrase(mnemonic.mnemonic.as_str())
                .derivation_path(format!("{}{}", mnemonic.path, index))
                .map_err(|e| ScriptError::Config(e.to_string()))?
                .build()
                .map_err(|e| ScriptError::Config(e.to_string()))
        }
    }
}

/// Parse a hex-encoded private key
fn parse_private_key(key: &str) -> Result<PrivateKeySigner, ScriptError> {
    // Keys are secrets, keep them out of the error message
    PrivateKeySigner::from_str(key)
        .map_err(|_| ScriptError::Config("malformed private key".to_string()))
}
