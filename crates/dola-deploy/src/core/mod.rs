//! Core components of the deployment tool
//!
//! Configuration, compiled artifacts, the alloy-backed chain client, the
//! deployer and explorer collaborators, and logging helpers.

pub mod artifacts;
pub mod blockchain;
pub mod config;
pub mod deployer;
pub mod explorer;
pub mod logging;

pub use artifacts::{ArtifactStore, BuildInfo, ContractArtifact};
pub use blockchain::{Provider, TxBuilder};
pub use config::Config;
pub use deployer::{ContractDeployer, EvmDeployer};
pub use explorer::{ContractVerifier, EtherscanVerifier};
pub use logging::init_logging;

#[cfg(any(test, feature = "testing"))]
pub use deployer::MockContractDeployer;
#[cfg(any(test, feature = "testing"))]
pub use explorer::MockContractVerifier;
