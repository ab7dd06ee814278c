//! Deployment of a single named contract, with reuse of unchanged deployments

use std::path::PathBuf;

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use tracing::{debug, info, warn};

use crate::{
    artifacts::{init_code_hash, Artifact},
    backend::DeployBackend,
    deployments::{DeploymentRecord, DeploymentStore},
    errors::ScriptError,
    utils::format_arg,
};

/// Options for a single deployment
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// The account sending the creation transaction
    pub from: Address,
    /// The constructor arguments
    pub args: Vec<DynSolValue>,
    /// Whether to log the deployment
    pub log: bool,
}

/// The result of deploying a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// The name of the deployed contract
    pub contract_name: String,
    /// The address of the contract
    pub address: Address,
    /// Whether a creation transaction was sent, as opposed to reusing a
    /// previous deployment with identical init code
    pub newly_deployed: bool,
    /// The persisted record of the deployment
    pub record: DeploymentRecord,
}

/// Deploys contracts from compiled artifacts through a [`DeployBackend`],
/// recording each deployment
pub struct Deployer<B> {
    /// The chain access
    backend: B,
    /// The directory containing the compiled artifacts
    artifacts_dir: PathBuf,
    /// The deployment records of the target network
    store: DeploymentStore,
}

impl<B: DeployBackend> Deployer<B> {
    /// Create a deployer
    pub fn new(backend: B, artifacts_dir: impl Into<PathBuf>, store: DeploymentStore) -> Self {
        Self {
            backend,
            artifacts_dir: artifacts_dir.into(),
            store,
        }
    }

    /// The chain access used by this deployer
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Deploy the named contract, or reuse an existing deployment of identical init code
    pub async fn deploy(
        &self,
        contract_name: &str,
        options: DeployOptions,
    ) -> Result<Deployment, ScriptError> {
        if options.from != self.backend.deployer() {
            return Err(ScriptError::ContractDeployment(format!(
                "cannot deploy `{}` from {:#x}, the backend signs as {:#x}",
                contract_name,
                options.from,
                self.backend.deployer()
            )));
        }

        let artifact = Artifact::load(&self.artifacts_dir, contract_name)?;
        let init_code = artifact.init_code(&options.args)?;
        let code_hash = init_code_hash(&init_code);

        if let Some(existing) = self.reusable_deployment(contract_name, code_hash).await? {
            if options.log {
                info!("reusing \"{}\" at {:#x}", contract_name, existing.address);
            }

            return Ok(Deployment {
                contract_name: contract_name.to_string(),
                address: existing.address,
                newly_deployed: false,
                record: existing,
            });
        }

        // Predict the CREATE address from the deployer's nonce
        let nonce = self.backend.nonce().await?;
        let expected_address = options.from.create(nonce);
        debug!(
            "deploying `{}` from {:#x} with nonce {}, expecting {:#x}",
            contract_name, options.from, nonce, expected_address
        );

        let tx_hash = self.backend.send_deployment(init_code).await?;
        debug!(
            "sent `{}` (tx: {:#x}), awaiting {} confirmation(s)",
            contract_name,
            tx_hash,
            self.backend.confirmations()
        );
        let receipt = self.backend.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(ScriptError::ContractDeployment(format!(
                "creation of `{}` reverted (tx: {:#x})",
                contract_name, tx_hash
            )));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "receipt for `{}` (tx: {:#x}) has no contract address",
                contract_name, tx_hash
            ))
        })?;

        if address != expected_address {
            warn!(
                "`{}` deployed at {:#x}, expected {:#x}",
                contract_name, address, expected_address
            );
        }

        if options.log {
            info!(
                "deploying \"{}\" (tx: {:#x})...: deployed at {:#x} with {} gas",
                contract_name, tx_hash, address, receipt.gas_used
            );
        }

        let record = DeploymentRecord {
            address,
            transaction_hash: receipt.transaction_hash,
            init_code_hash: code_hash,
            deployer: options.from,
            args: options.args.iter().map(format_arg).collect(),
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
        };
        self.store.save(contract_name, record.clone())?;

        Ok(Deployment {
            contract_name: contract_name.to_string(),
            address,
            newly_deployed: true,
            record,
        })
    }

    /// Find a recorded deployment with the same init code that is still live on chain
    async fn reusable_deployment(
        &self,
        contract_name: &str,
        code_hash: B256,
    ) -> Result<Option<DeploymentRecord>, ScriptError> {
        let Some(existing) = self.store.get(contract_name)? else {
            return Ok(None);
        };

        if existing.init_code_hash != code_hash {
            info!(
                "\"{}\" changed since its deployment at {:#x}, redeploying",
                contract_name, existing.address
            );
            return Ok(None);
        }

        let code = self.backend.code_at(existing.address).await?;
        if code.is_empty() {
            info!(
                "no code for \"{}\" at {:#x} on `{}`, redeploying",
                contract_name,
                existing.address,
                self.store.network()
            );
            return Ok(None);
        }

        Ok(Some(existing))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;
    use crate::test_utils::{
        hardhat_artifact_json, temp_dir, write_artifact, MockBackend, ADDRESS_CTOR, UINT_CTOR,
    };

    /// Set up a deployer over a mock chain, with a token and vesting artifact
    fn setup(label: &str) -> Deployer<MockBackend> {
        let dir = temp_dir(label);
        write_artifact(&dir, "MyToken", &hardhat_artifact_json("MyToken", UINT_CTOR, "0x6080"));
        write_artifact(
            &dir,
            "TokenVesting",
            &hardhat_artifact_json("TokenVesting", ADDRESS_CTOR, "0x6090"),
        );

        let store = DeploymentStore::new(dir.join("deployments.json"), "hardhat");
        Deployer::new(MockBackend::default(), &dir, store)
    }

    /// Deploy options for the token with the given supply
    fn token_options(deployer: &Deployer<MockBackend>, supply: u64) -> DeployOptions {
        DeployOptions {
            from: deployer.backend().deployer(),
            args: vec![DynSolValue::Uint(U256::from(supply), 256)],
            log: true,
        }
    }

    #[tokio::test]
    async fn test_fresh_deployment_is_recorded() {
        let deployer = setup("deployer-fresh");
        let options = token_options(&deployer, 1_000_000);

        let deployment = deployer.deploy("MyToken", options).await.unwrap();

        let backend = deployer.backend();
        assert!(deployment.newly_deployed);
        assert_eq!(deployment.address, backend.deployer().create(0));
        assert_eq!(backend.sent_init_codes().len(), 1);
        assert_eq!(deployment.record.args, vec!["1000000".to_string()]);
        assert_eq!(
            deployer.store.get("MyToken").unwrap(),
            Some(deployment.record.clone())
        );
    }

    #[tokio::test]
    async fn test_unchanged_deployment_is_reused() {
        let deployer = setup("deployer-reuse");

        let first = deployer
            .deploy("MyToken", token_options(&deployer, 1_000_000))
            .await
            .unwrap();
        let second = deployer
            .deploy("MyToken", token_options(&deployer, 1_000_000))
            .await
            .unwrap();

        assert!(!second.newly_deployed);
        assert_eq!(second.address, first.address);
        assert_eq!(deployer.backend().sent_init_codes().len(), 1);
    }

    #[tokio::test]
    async fn test_changed_args_redeploy() {
        let deployer = setup("deployer-changed");

        let first = deployer
            .deploy("MyToken", token_options(&deployer, 1_000_000))
            .await
            .unwrap();
        let second = deployer
            .deploy("MyToken", token_options(&deployer, 5))
            .await
            .unwrap();

        assert!(second.newly_deployed);
        assert_ne!(second.address, first.address);
        assert_eq!(deployer.store.get("MyToken").unwrap().unwrap().address, second.address);
    }

    #[tokio::test]
    async fn test_missing_code_redeploys() {
        let deployer = setup("deployer-missing-code");

        let first = deployer
            .deploy("MyToken", token_options(&deployer, 1_000_000))
            .await
            .unwrap();
        deployer.backend().clear_code(first.address);

        let second = deployer
            .deploy("MyToken", token_options(&deployer, 1_000_000))
            .await
            .unwrap();
        assert!(second.newly_deployed);
    }

    #[tokio::test]
    async fn test_reverted_deployment_fails() {
        let deployer = setup("deployer-revert");
        deployer.backend().revert_next();

        let res = deployer
            .deploy("MyToken", token_options(&deployer, 1_000_000))
            .await;
        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
        assert_eq!(deployer.store.get("MyToken").unwrap(), None);
    }

    #[tokio::test]
    async fn test_wrong_sender_rejected() {
        let deployer = setup("deployer-sender");
        let options = DeployOptions {
            from: Address::repeat_byte(0x42),
            ..token_options(&deployer, 1)
        };

        let res = deployer.deploy("MyToken", options).await;
        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
        assert!(deployer.backend().sent_init_codes().is_empty());
    }

    #[tokio::test]
    async fn test_bad_args_send_nothing() {
        let deployer = setup("deployer-bad-args");
        let options = DeployOptions {
            from: deployer.backend().deployer(),
            args: vec![],
            log: true,
        };

        let res = deployer.deploy("TokenVesting", options).await;
        assert!(matches!(res, Err(ScriptError::CalldataConstruction(_))));
        assert!(deployer.backend().sent_init_codes().is_empty());
    }
}
