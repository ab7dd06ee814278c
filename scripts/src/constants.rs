//! Constants used in the deploy scripts

/// The name of the token contract artifact
pub const TOKEN_CONTRACT_NAME: &str = "MyToken";

/// The name of the AMM contract artifact
pub const AMM_CONTRACT_NAME: &str = "AMM";

/// The name of the staking contract artifact
pub const STAKING_CONTRACT_NAME: &str = "Staking";

/// The name of the vesting contract artifact
pub const VESTING_CONTRACT_NAME: &str = "TokenVesting";

/// The initial supply passed to the token constructor.
///
/// This is a raw `uint256`, no decimal scaling is applied.
pub const DEFAULT_INITIAL_SUPPLY: u128 = 1_000_000;

/// The named account used to sign deployments
pub const DEPLOYER_ACCOUNT_NAME: &str = "deployer";

/// The name of the local development network
pub const DEFAULT_NETWORK: &str = "hardhat";

/// The RPC URL of the local development network
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The mnemonic that local development nodes (Hardhat, Anvil) seed their accounts from
pub const DEFAULT_DEV_MNEMONIC: &str =
    "test test test test test test test test test test test junk";

/// The BIP-44 derivation path prefix for Ethereum accounts, the account index is appended
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/";

/// The number of accounts derived from a mnemonic when no count is configured
pub const DEFAULT_ACCOUNT_COUNT: u32 = 10;

/// The number of confirmations to wait for a deployment transaction
pub const DEFAULT_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The default directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The directory in which Hardhat and Foundry store raw compiler output
pub const BUILD_INFO_DIR: &str = "build-info";

/// The marker opening an unlinked library placeholder in creation bytecode
pub const LIBRARY_PLACEHOLDER_MARKER: &str = "__$";

/// The number of times to poll for a transaction receipt before giving up
pub const RECEIPT_POLL_ATTEMPTS: usize = 600;

/// The interval between receipt polls, in milliseconds
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 200;

/// The number of times to poll the chain head while awaiting confirmations
pub const CONFIRMATION_POLL_ATTEMPTS: usize = 600;
