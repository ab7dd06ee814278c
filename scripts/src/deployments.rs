//! Persistence of deployed contract addresses, keyed by network and contract name

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

/// The recorded outcome of deploying a single contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The address of the deployed contract
    pub address: Address,
    /// The hash of the creation transaction
    pub transaction_hash: B256,
    /// The keccak256 hash of the bytecode and encoded constructor arguments
    pub init_code_hash: B256,
    /// The account that sent the creation transaction
    pub deployer: Address,
    /// Human-readable constructor arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// The gas used by the creation transaction
    pub gas_used: u64,
    /// The block in which the contract was created
    #[serde(default)]
    pub block_number: Option<u64>,
}

/// The contents of a deployments file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments {
    /// Records keyed by network name, then by contract name
    networks: BTreeMap<String, BTreeMap<String, DeploymentRecord>>,
}

impl Deployments {
    /// Read the deployments file, treating a missing file as empty
    pub fn read(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))
    }

    /// Write the deployments file, creating parent directories as needed
    pub fn write(&self, path: &Path) -> Result<(), ScriptError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }

    /// Get the record for a contract on a network
    pub fn get(&self, network: &str, contract_name: &str) -> Option<&DeploymentRecord> {
        self.networks.get(network)?.get(contract_name)
    }

    /// Get every record on a network
    pub fn network(&self, network: &str) -> Option<&BTreeMap<String, DeploymentRecord>> {
        self.networks.get(network)
    }

    /// Insert or replace the record for a contract on a network
    pub fn insert(&mut self, network: &str, contract_name: &str, record: DeploymentRecord) {
        self.networks
            .entry(network.to_string())
            .or_default()
            .insert(contract_name.to_string(), record);
    }
}

/// A deployments file bound to a single network
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    /// The path of the deployments file
    path: PathBuf,
    /// The network whose records are read and written
    network: String,
}

impl DeploymentStore {
    /// Create a store for the given file and network
    pub fn new(path: impl Into<PathBuf>, network: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            network: network.into(),
        }
    }

    /// The network this store writes to
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Read the record for a contract
    pub fn get(&self, contract_name: &str) -> Result<Option<DeploymentRecord>, ScriptError> {
        let deployments = Deployments::read(&self.path)?;
        Ok(deployments.get(&self.network, contract_name).cloned())
    }

    /// Read every record on this network
    pub fn all(&self) -> Result<BTreeMap<String, DeploymentRecord>, ScriptError> {
        let deployments = Deployments::read(&self.path)?;
        Ok(deployments.network(&self.network).cloned().unwrap_or_default())
    }

    /// Persist the record for a contract, leaving other records untouched
    pub fn save(&self, contract_name: &str, record: DeploymentRecord) -> Result<(), ScriptError> {
        let mut deployments = Deployments::read(&self.path)?;
        deployments.insert(&self.network, contract_name, record);
        deployments.write(&self.path)
    }
}
