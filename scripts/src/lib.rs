//! Scripts for deploying the token, AMM, staking and vesting contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod accounts;
pub mod artifacts;
pub mod backend;
pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod deployments;
pub mod errors;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;
