//! Implementations of the deploy script commands

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use tracing::info;

use crate::{
    accounts::{named_account_addresses, resolve_deployer},
    backend::{DeployBackend, RpcBackend},
    cli::{DeployArgs, NetworkArgs},
    config::DeployConfig,
    constants::{
        AMM_CONTRACT_NAME, DEPLOYER_ACCOUNT_NAME, STAKING_CONTRACT_NAME, TOKEN_CONTRACT_NAME,
        VESTING_CONTRACT_NAME,
    },
    deployer::{DeployOptions, Deployer},
    deployments::DeploymentStore,
    errors::ScriptError,
    types::SuiteAddresses,
    utils::{check_chain_id, setup_client},
};

/// Deploy the token, AMM, staking and vesting contracts to the selected network
pub async fn deploy(
    args: DeployArgs,
    network_args: &NetworkArgs,
    config: &DeployConfig,
) -> Result<(), ScriptError> {
    let network = network_args.network.as_str();
    let network_config = config
        .network(network)?
        .clone()
        .with_rpc_url(network_args.rpc_url.clone());

    let signer = resolve_deployer(
        config,
        network,
        DEPLOYER_ACCOUNT_NAME,
        network_args.priv_key.as_deref(),
    )?;
    let from = signer.address();
    info!("deploying to `{}` ({}) from {:#x}", network, network_config.url, from);

    let provider = setup_client(signer, &network_config.url)?;
    check_chain_id(&provider, network_config.chain_id).await?;

    let backend = RpcBackend::new(provider, from, network_config.confirmations());
    let store = DeploymentStore::new(&network_args.deployments_path, network);
    let deployer = Deployer::new(backend, &network_args.artifacts, store);

    let addresses = deploy_suite(&deployer, from, args.initial_supply).await?;
    println!("{}", addresses);

    Ok(())
}

/// Deploy the contract suite in order, binding every contract to the token
pub async fn deploy_suite<B: DeployBackend>(
    deployer: &Deployer<B>,
    from: Address,
    initial_supply: U256,
) -> Result<SuiteAddresses, ScriptError> {
    let token = deployer
        .deploy(
            TOKEN_CONTRACT_NAME,
            DeployOptions {
                from,
                args: vec![DynSolValue::Uint(initial_supply, 256)],
                log: true,
            },
        )
        .await?;
    let token_arg = DynSolValue::Address(token.address);

    // The AMM pairs the token with itself
    let amm = deployer
        .deploy(
            AMM_CONTRACT_NAME,
            DeployOptions {
                from,
                args: vec![token_arg.clone(), token_arg.clone()],
                log: true,
            },
        )
        .await?;

    // Staking token, then reward token
    let staking = deployer
        .deploy(
            STAKING_CONTRACT_NAME,
            DeployOptions {
                from,
                args: vec![token_arg.clone(), token_arg.clone()],
                log: true,
            },
        )
        .await?;

    let vesting = deployer
        .deploy(
            VESTING_CONTRACT_NAME,
            DeployOptions {
                from,
                args: vec![token_arg],
                log: true,
            },
        )
        .await?;

    Ok(SuiteAddresses {
        token: token.address,
        amm: amm.address,
        staking: staking.address,
        vesting: vesting.address,
    })
}

/// Print the deployments recorded for the selected network
pub fn list_deployments(network_args: &NetworkArgs) -> Result<(), ScriptError> {
    let store = DeploymentStore::new(&network_args.deployments_path, &network_args.network);
    println!("{}", deployment_lines(&store)?.join("\n"));
    Ok(())
}

/// Render one line per deployment recorded in the store
fn deployment_lines(store: &DeploymentStore) -> Result<Vec<String>, ScriptError> {
    let records = store.all()?;
    if records.is_empty() {
        return Ok(vec![format!("no deployments recorded on `{}`", store.network())]);
    }

    Ok(records
        .iter()
        .map(|(name, record)| {
            format!(
                "{}: {} (tx: {:#x})",
                name, record.address, record.transaction_hash
            )
        })
        .collect())
}

/// Print the named accounts of the selected network
pub fn list_accounts(network_args: &NetworkArgs, config: &DeployConfig) -> Result<(), ScriptError> {
    let lines = account_lines(
        config,
        &network_args.network,
        network_args.priv_key.as_deref(),
    )?;
    println!("{}", lines.join("\n"));
    Ok(())
}

/// Render one line per named account on the network
fn account_lines(
    config: &DeployConfig,
    network: &str,
    deployer_key: Option<&str>,
) -> Result<Vec<String>, ScriptError> {
    let accounts = named_account_addresses(config, network, deployer_key)?;
    Ok(accounts
        .into_iter()
        .map(|(name, address)| {
            if name == DEPLOYER_ACCOUNT_NAME && deployer_key.is_some() {
                format!("{}: {} (from supplied private key)", name, address)
            } else {
                format!("{}: {}", name, address)
            }
        })
        .collect())
}
