//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy_primitives::Address;

/// The addresses of a fully deployed contract suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteAddresses {
    /// The ERC20 token, which every other contract is bound to
    pub token: Address,
    /// The automated market maker
    pub amm: Address,
    /// The staking contract
    pub staking: Address,
    /// The vesting contract
    pub vesting: Address,
}

impl Display for SuiteAddresses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "All contracts deployed successfully!")?;
        writeln!(f, "Token: {}", self.token)?;
        writeln!(f, "AMM: {}", self.amm)?;
        writeln!(f, "Staking: {}", self.staking)?;
        write!(f, "Vesting: {}", self.vesting)
    }
}
