//! Fixtures and an in-memory chain for the unit tests

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use alloy::primitives::{address, keccak256, Address, Bytes, B256};
use serde_json::{json, Value};

use crate::{
    backend::{DeployBackend, DeployReceipt},
    deployments::DeploymentRecord,
    errors::ScriptError,
};

/// A constructor taking a single `uint256`
pub const UINT_CTOR: &str = r#"[{"type":"constructor","inputs":[{"name":"initialSupply","type":"uint256","internalType":"uint256"}],"stateMutability":"nonpayable"}]"#;

/// A constructor taking a single `address`
pub const ADDRESS_CTOR: &str = r#"[{"type":"constructor","inputs":[{"name":"_token","type":"address","internalType":"address"}],"stateMutability":"nonpayable"}]"#;

/// A constructor taking two `address`es
pub const TWO_ADDRESS_CTOR: &str = r#"[{"type":"constructor","inputs":[{"name":"_token0","type":"address","internalType":"address"},{"name":"_token1","type":"address","internalType":"address"}],"stateMutability":"nonpayable"}]"#;

/// The account the mock chain deploys from
pub const MOCK_DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Distinguishes temp dirs created within one test process
static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Create a fresh, empty temporary directory
pub fn temp_dir(label: &str) -> PathBuf {
    let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "deploy-scripts-{}-{}-{}",
        label,
        std::process::id(),
        id
    ));

    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a file, creating its parent directories
pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Write an artifact in the Hardhat layout
pub fn write_artifact(artifacts_dir: &Path, contract_name: &str, json: &str) {
    let path = artifacts_dir
        .join("contracts")
        .join(format!("{contract_name}.sol"))
        .join(format!("{contract_name}.json"));
    write_file(&path, json);
}

/// Render a Hardhat artifact with the given constructor ABI and bytecode
pub fn hardhat_artifact_json(contract_name: &str, abi: &str, bytecode: &str) -> String {
    let abi: Value = serde_json::from_str(abi).unwrap();
    json!({
        "_format": "hh-sol-artifact-1",
        "contractName": contract_name,
        "sourceName": format!("contracts/{contract_name}.sol"),
        "abi": abi,
        "bytecode": bytecode,
        "deployedBytecode": "0x",
        "linkReferences": {},
        "deployedLinkReferences": {}
    })
    .to_string()
}

/// A deployment record distinguished by `seed`
pub fn sample_record(seed: u8) -> DeploymentRecord {
    DeploymentRecord {
        address: Address::repeat_byte(seed),
        transaction_hash: B256::repeat_byte(seed),
        init_code_hash: B256::repeat_byte(seed.wrapping_add(1)),
        deployer: MOCK_DEPLOYER,
        args: vec![format!("{seed}")],
        gas_used: 21_000 + seed as u64,
        block_number: Some(seed as u64),
    }
}

/// The mutable state of the mock chain
#[derive(Default)]
struct MockChain {
    /// The deployer's next nonce
    nonce: u64,
    /// Runtime code by address
    code: HashMap<Address, Bytes>,
    /// Receipts by transaction hash
    receipts: HashMap<B256, DeployReceipt>,
    /// Every init code sent, in order
    sent: Vec<Bytes>,
    /// Whether the next creation transaction reverts
    revert_next: bool,
}

/// An in-memory [`DeployBackend`] that mines each transaction immediately
pub struct MockBackend {
    /// The deploying account
    deployer: Address,
    /// The chain state
    chain: Mutex<MockChain>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            deployer: MOCK_DEPLOYER,
            chain: Mutex::new(MockChain::default()),
        }
    }
}

impl MockBackend {
    /// The init codes sent so far
    pub fn sent_init_codes(&self) -> Vec<Bytes> {
        self.chain.lock().unwrap().sent.clone()
    }

    /// Remove the code at an address, as if the chain had been reset
    pub fn clear_code(&self, address: Address) {
        self.chain.lock().unwrap().code.remove(&address);
    }

    /// Make the next creation transaction revert
    pub fn revert_next(&self) {
        self.chain.lock().unwrap().revert_next = true;
    }
}

impl DeployBackend for MockBackend {
    fn deployer(&self) -> Address {
        self.deployer
    }

    fn confirmations(&self) -> u64 {
        1
    }

    async fn nonce(&self) -> Result<u64, ScriptError> {
        Ok(self.chain.lock().unwrap().nonce)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        Ok(self
            .chain
            .lock()
            .unwrap()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_deployment(&self, init_code: Bytes) -> Result<B256, ScriptError> {
        let mut chain = self.chain.lock().unwrap();
        let nonce = chain.nonce;
        chain.nonce += 1;

        let tx_hash = keccak256([&nonce.to_be_bytes()[..], &init_code[..]].concat());
        let reverted = std::mem::take(&mut chain.revert_next);
        let contract_address = (!reverted).then(|| self.deployer.create(nonce));
        if let Some(address) = contract_address {
            chain.code.insert(address, Bytes::from_static(&[0xfe]));
        }

        chain.receipts.insert(
            tx_hash,
            DeployReceipt {
                transaction_hash: tx_hash,
                contract_address,
                gas_used: 100_000 + init_code.len() as u64,
                block_number: Some(nonce + 1),
                success: !reverted,
            },
        );
        chain.sent.push(init_code);

        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<DeployReceipt, ScriptError> {
        self.chain
            .lock()
            .unwrap()
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| ScriptError::ContractDeployment(format!("unknown tx {tx_hash:#x}")))
    }
}
