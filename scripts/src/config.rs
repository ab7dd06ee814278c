//! Network and named-account configuration for the deploy scripts
//!
//! The configuration is read from a JSON file of the form:
//!
//! ```json
//! {
//!     "networks": {
//!         "sepolia": { "url": "https://...", "chainId": 11155111, "accounts": ["0x..."] }
//!     },
//!     "namedAccounts": { "deployer": { "default": 0, "sepolia": 0 } }
//! }
//! ```
//!
//! When no file is given, a single local `hardhat` network seeded from the
//! development mnemonic is used, with `deployer` mapped to the first account.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{
        DEFAULT_ACCOUNT_COUNT, DEFAULT_DEPLOY_CONFIRMATIONS, DEFAULT_DERIVATION_PATH,
        DEFAULT_DEV_MNEMONIC, DEFAULT_NETWORK, DEFAULT_RPC_URL, DEPLOYER_ACCOUNT_NAME,
    },
    errors::ScriptError,
};

/// The key selecting the fallback entry of a per-network named account
pub const DEFAULT_NAMED_ACCOUNT_KEY: &str = "default";

/// The full deploy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// The networks that can be deployed to, keyed by name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Aliases for accounts, resolved per network
    #[serde(default)]
    pub named_accounts: BTreeMap<String, NamedAccount>,
}

/// The configuration of a single network
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// The RPC URL of the network
    pub url: String,
    /// The expected chain ID, checked against the node when set
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// The accounts available on the network. Networks without accounts can only
    /// be deployed to with an explicitly supplied private key
    #[serde(default)]
    pub accounts: Option<AccountsConfig>,
    /// The number of confirmations to await for each deployment
    #[serde(default)]
    pub confirmations: Option<u64>,
}

/// The signing accounts available on a network
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountsConfig {
    /// An explicit list of hex-encoded private keys
    Keys(Vec<String>),
    /// Accounts derived from a BIP-39 mnemonic
    Mnemonic(MnemonicConfig),
}

impl AccountsConfig {
    /// The accounts local development nodes are seeded with. Their keys are public
    pub fn dev_mnemonic() -> Self {
        AccountsConfig::Mnemonic(MnemonicConfig {
            mnemonic: DEFAULT_DEV_MNEMONIC.to_string(),
            path: default_derivation_path(),
            count: default_account_count(),
        })
    }
}

/// Mnemonic-derived accounts
#[derive(Debug, Clone, Deserialize)]
pub struct MnemonicConfig {
    /// The BIP-39 phrase
    pub mnemonic: String,
    /// The derivation path prefix, to which the account index is appended
    #[serde(default = "default_derivation_path")]
    pub path: String,
    /// The number of accounts derivable from the phrase
    #[serde(default = "default_account_count")]
    pub count: u32,
}

/// A reference to a single account on a network
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    /// An index into the network's accounts
    Index(u32),
    /// A hex-encoded private key
    Key(String),
}

/// A named account, either fixed across networks or overridden per network
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NamedAccount {
    /// The same account on every network
    Global(AccountRef),
    /// Per-network entries, with an optional `default` fallback
    PerNetwork(BTreeMap<String, AccountRef>),
}

impl NamedAccount {
    /// Select the account reference that applies to the given network
    pub fn for_network(&self, network: &str) -> Option<&AccountRef> {
        match self {
            NamedAccount::Global(account) => Some(account),
            NamedAccount::PerNetwork(entries) => entries
                .get(network)
                .or_else(|| entries.get(DEFAULT_NAMED_ACCOUNT_KEY)),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        let local = NetworkConfig {
            url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            accounts: Some(AccountsConfig::dev_mnemonic()),
            confirmations: None,
        };

        Self {
            networks: BTreeMap::from([(DEFAULT_NETWORK.to_string(), local)]),
            named_accounts: BTreeMap::from([(
                DEPLOYER_ACCOUNT_NAME.to_string(),
                NamedAccount::Global(AccountRef::Index(0)),
            )]),
        }
    }
}

impl DeployConfig {
    /// Load the configuration from the given file, or fall back to the local defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ScriptError> {
        let Some(path) = path else {
            debug!("no config file given, using local development defaults");
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Parse the configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(contents).map_err(|e| ScriptError::Config(e.to_string()))
    }

    /// Get the configuration of the given network
    pub fn network(&self, name: &str) -> Result<&NetworkConfig, ScriptError> {
        self.networks
            .get(name)
            .ok_or_else(|| ScriptError::Config(format!("unknown network `{}`", name)))
    }

    /// Get the account reference bound to a named account on the given network
    pub fn named_account(&self, name: &str, network: &str) -> Result<&AccountRef, ScriptError> {
        self.named_accounts
            .get(name)
            .and_then(|account| account.for_network(network))
            .ok_or_else(|| {
                ScriptError::Config(format!(
                    "named account `{}` is not configured for network `{}`",
                    name, network
                ))
            })
    }
}

impl NetworkConfig {
    /// Apply command-line overrides to the network configuration
    pub fn with_rpc_url(mut self, rpc_url: Option<String>) -> Self {
        if let Some(url) = rpc_url {
            self.url = url;
        }
        self
    }

    /// The number of confirmations to await for each deployment
    pub fn confirmations(&self) -> u64 {
        self.confirmations.unwrap_or(DEFAULT_DEPLOY_CONFIRMATIONS)
    }
}

/// Serde default for [`MnemonicConfig::path`]
fn default_derivation_path() -> String {
    DEFAULT_DERIVATION_PATH.to_string()
}

/// Serde default for [`MnemonicConfig::count`]
fn default_account_count() -> u32 {
    DEFAULT_ACCOUNT_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A config exercising every account shape
    const CONFIG: &str = r#"{
        "networks": {
            "hardhat": {
                "url": "http://127.0.0.1:8545",
                "accounts": { "mnemonic": "test test test test test test test test test test test junk" }
            },
            "mainnet": { "url": "https://eth.example", "chainId": 1 },
            "sepolia": {
                "url": "https://sepolia.example",
                "chainId": 11155111,
                "accounts": ["0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"],
                "confirmations": 3
            },
            "custom": {
                "url": "http://10.0.0.1:8545",
                "accounts": { "mnemonic": "test test test test test test test test test test test junk", "count": 2 }
            }
        },
        "namedAccounts": {
            "deployer": 0,
            "treasury": { "default": 1, "sepolia": "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d" }
        }
    }"#;

    #[test]
    fn test_default_config() {
        let config = DeployConfig::default();
        let network = config.network(DEFAULT_NETWORK).unwrap();

        assert_eq!(network.url, DEFAULT_RPC_URL);
        assert_eq!(network.confirmations(), DEFAULT_DEPLOY_CONFIRMATIONS);
        assert!(matches!(network.accounts, Some(AccountsConfig::Mnemonic(_))));
        assert_eq!(
            config.named_account(DEPLOYER_ACCOUNT_NAME, "anything").unwrap(),
            &AccountRef::Index(0)
        );
    }

    #[test]
    fn test_parse_networks() {
        let config = DeployConfig::from_json(CONFIG).unwrap();

        let hardhat = config.network("hardhat").unwrap();
        assert!(matches!(hardhat.accounts, Some(AccountsConfig::Mnemonic(_))));

        // Omitted accounts stay omitted rather than falling back to the dev mnemonic
        let mainnet = config.network("mainnet").unwrap();
        assert!(mainnet.accounts.is_none());

        let sepolia = config.network("sepolia").unwrap();
        assert_eq!(sepolia.chain_id, Some(11155111));
        assert_eq!(sepolia.confirmations(), 3);
        assert!(matches!(&sepolia.accounts, Some(AccountsConfig::Keys(keys)) if keys.len() == 1));

        let custom = config.network("custom").unwrap();
        match &custom.accounts {
            Some(AccountsConfig::Mnemonic(m)) => {
                assert_eq!(m.count, 2);
                assert_eq!(m.path, DEFAULT_DERIVATION_PATH);
            }
            other => panic!("unexpected accounts: {other:?}"),
        }
    }

    #[test]
    fn test_named_account_overrides() {
        let config = DeployConfig::from_json(CONFIG).unwrap();

        assert_eq!(
            config.named_account("treasury", "hardhat").unwrap(),
            &AccountRef::Index(1)
        );
        assert!(matches!(
            config.named_account("treasury", "sepolia").unwrap(),
            AccountRef::Key(_)
        ));
        assert!(config.named_account("missing", "hardhat").is_err());
    }

    #[test]
    fn test_unknown_network() {
        let config = DeployConfig::default();
        assert!(matches!(config.network("mainnet"), Err(ScriptError::Config(_))));
    }

    #[test]
    fn test_rpc_url_override() {
        let config = DeployConfig::default();
        let network = config
            .network(DEFAULT_NETWORK)
            .unwrap()
            .clone()
            .with_rpc_url(Some("http://localhost:9545".to_string()));
        assert_eq!(network.url, "http://localhost:9545");
    }
}
