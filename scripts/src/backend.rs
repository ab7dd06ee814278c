//! The chain access used by the deployer, and its JSON-RPC implementation

use std::{future::Future, time::Duration};

use alloy::{
    network::TransactionBuilder,
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
};
use alloy_primitives::{Address, Bytes, B256};
use tracing::debug;

use crate::{
    constants::{CONFIRMATION_POLL_ATTEMPTS, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL_MS},
    errors::ScriptError,
};

/// The parts of a creation transaction's receipt that deployment inspects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReceipt {
    /// The hash of the creation transaction
    pub transaction_hash: B256,
    /// The address of the created contract, if any
    pub contract_address: Option<Address>,
    /// The gas used by the transaction
    pub gas_used: u64,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
    /// Whether the transaction executed successfully
    pub success: bool,
}

/// The chain operations needed to deploy contracts from a single account
#[allow(async_fn_in_trait)]
pub trait DeployBackend {
    /// The account that signs creation transactions
    fn deployer(&self) -> Address;

    /// The number of confirmations awaited for each deployment
    fn confirmations(&self) -> u64;

    /// The next nonce of the deploying account
    async fn nonce(&self) -> Result<u64, ScriptError>;

    /// The runtime code at the given address, empty if there is no contract
    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError>;

    /// Broadcast a creation transaction, returning its hash
    async fn send_deployment(&self, init_code: Bytes) -> Result<B256, ScriptError>;

    /// Wait for the creation transaction to be included and confirmed
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<DeployReceipt, ScriptError>;
}

/// A [`DeployBackend`] talking to a node over JSON-RPC
#[derive(Clone)]
pub struct RpcBackend {
    /// A provider with the deployer's wallet attached
    provider: DynProvider,
    /// The deploying account
    deployer: Address,
    /// The number of confirmations to await
    confirmations: u64,
}

impl RpcBackend {
    /// Create a backend signing as `deployer` through `provider`
    pub fn new(provider: DynProvider, deployer: Address, confirmations: u64) -> Self {
        Self {
            provider,
            deployer,
            confirmations,
        }
    }

    /// Wait until the chain head is `confirmations - 1` blocks past `block_number`
    async fn wait_for_confirmations(&self, block_number: u64) -> Result<(), ScriptError> {
        let target = confirmation_target(block_number, self.confirmations);
        let provider = &self.provider;

        let head = poll_until(CONFIRMATION_POLL_ATTEMPTS, poll_interval(), || async move {
            let head = provider
                .get_block_number()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

            debug!("waiting for confirmations: head {}, target {}", head, target);
            Ok((head >= target).then_some(head))
        })
        .await?;

        head.map(|_| ()).ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "block {} not confirmed after {} polls, chain head never reached {}",
                block_number, CONFIRMATION_POLL_ATTEMPTS, target
            ))
        })
    }
}

/// The block the chain head must reach for a transaction mined in `block_number`
/// to have `confirmations` confirmations
pub fn confirmation_target(block_number: u64, confirmations: u64) -> u64 {
    block_number + confirmations.saturating_sub(1)
}

/// The interval between chain polls
fn poll_interval() -> Duration {
    Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)
}

/// Run `check` up to `attempts` times, sleeping `interval` between attempts, until it
/// yields a value. Returns `None` if every attempt came back empty
pub async fn poll_until<T, F, Fut>(
    attempts: usize,
    interval: Duration,
    mut check: F,
) -> Result<Option<T>, ScriptError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ScriptError>>,
{
    for attempt in 0..attempts {
        if let Some(value) = check().await? {
            return Ok(Some(value));
        }

        if attempt + 1 < attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Ok(None)
}

impl DeployBackend for RpcBackend {
    fn deployer(&self) -> Address {
        self.deployer
    }

    fn confirmations(&self) -> u64 {
        self.confirmations
    }

    async fn nonce(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_transaction_count(self.deployer)
            .await
            .map_err(|e| ScriptError::NonceFetching(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn send_deployment(&self, init_code: Bytes) -> Result<B256, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(init_code);

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        Ok(*pending_tx.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<DeployReceipt, ScriptError> {
        // Watching the pending transaction can miss receipts on instant-mining nodes,
        // so poll for the receipt directly
        let provider = &self.provider;
        let maybe_receipt = poll_until(RECEIPT_POLL_ATTEMPTS, poll_interval(), || async move {
            provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ScriptError::ContractDeployment(e.to_string()))
        })
        .await?;

        if let Some(receipt) = maybe_receipt {
            if let Some(block_number) = receipt.block_number {
                self.wait_for_confirmations(block_number).await?;
            }

            return Ok(DeployReceipt {
                transaction_hash: receipt.transaction_hash,
                contract_address: receipt.contract_address,
                gas_used: receipt.gas_used,
                block_number: receipt.block_number,
                success: receipt.status(),
            });
        }

        Err(ScriptError::ContractDeployment(format!(
            "no receipt for {:#x} after {} attempts",
            tx_hash, RECEIPT_POLL_ATTEMPTS
        )))
    }
}
