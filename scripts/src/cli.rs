//! Definitions of CLI arguments and commands for deploy scripts

use std::{path::PathBuf, str::FromStr};

use alloy_primitives::U256;
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy, list_accounts, list_deployments},
    config::DeployConfig,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_INITIAL_SUPPLY, DEFAULT_NETWORK,
    },
    errors::ScriptError,
};

/// Deploy the token, AMM, staking and vesting contracts to an EVM network
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the network and named-account configuration file.
    /// Defaults to a local development network
    #[arg(short, long, env = "DEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// The target network
    #[command(flatten)]
    pub network_args: NetworkArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Arguments selecting the target network and where deployments are read from and written to
#[derive(Args, Clone, Debug)]
pub struct NetworkArgs {
    /// The network to deploy to, as named in the configuration
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Network RPC URL, overriding the configured one
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Private key of the deployer, overriding the `deployer` named account
    #[arg(long = "pkey", env = "PKEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Path to the file in which deployed addresses are recorded
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the contract suite
    Deploy(DeployArgs),
    /// List the deployments recorded for the network
    Deployments,
    /// List the named accounts of the network
    Accounts,
}

impl Command {
    /// Run the command against the selected network
    pub async fn run(
        self,
        network_args: &NetworkArgs,
        config: &DeployConfig,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, network_args, config).await,
            Command::Deployments => list_deployments(network_args),
            Command::Accounts => list_accounts(network_args, config),
        }
    }
}

/// Deploy the token, then the AMM, staking and vesting contracts bound to it
#[derive(Args)]
pub struct DeployArgs {
    /// The initial supply minted by the token constructor, in base units.
    /// Accepts any `uint256`, in decimal or `0x`-prefixed hex
    #[arg(long, default_value_t = U256::from(DEFAULT_INITIAL_SUPPLY), value_parser = parse_u256)]
    pub initial_supply: U256,
}

/// Parse a `uint256` command-line value
fn parse_u256(value: &str) -> Result<U256, String> {
    U256::from_str(value).map_err(|e| format!("invalid uint256 `{}`: {}", value, e))
}
