//! Deploys `BDOLAToken` and `DolaToken` to an EVM network and verifies both
//! on an Etherscan-compatible block explorer.
//!
//! The deployment is a fixed five-step sequence (see [`types::Step`]) driven
//! by [`operations::DeploymentOrchestrator`]. Chain access and verification go
//! through the [`core::ContractDeployer`] and [`core::ContractVerifier`]
//! traits so that either side can be replaced in tests.

pub mod cli;
pub mod constants;
pub mod core;
pub mod operations;
pub mod types;

use crate::core::{ArtifactStore, Config, EtherscanVerifier, EvmDeployer, Provider};
use std::sync::Arc;

pub use operations::{DeploymentOrchestrator, DeploymentPlan};
pub use types::{DeployedContract, DeploymentReport, Error, Result, Step, StepOutcome};

/// Builds the production orchestrator from a loaded configuration
///
/// Connects to the configured RPC endpoint (checking its chain id) and
/// prepares the explorer client. Nothing is sent on chain here.
pub async fn orchestrator_from_config(config: &Config) -> Result<DeploymentOrchestrator> {
	let signer = config.network.signer()?;
	let chain = config.network.chain_id;
	let artifacts = ArtifactStore::new(config.deployment.artifacts_dir.clone());

	let provider = Provider::new(chain, &config.network.rpc_url, signer).await?;
	tracing::info!(
		chain = %chain,
		deployer = %provider.sender(),
		artifacts_dir = %artifacts.root().display(),
		"Connected to network"
	);

	let deployer = EvmDeployer::new(
		provider,
		artifacts.clone(),
		config.network.confirmation_timeout(),
		config.network.receipt_poll_interval(),
	);
	let verifier = EtherscanVerifier::new(&config.explorer, chain, artifacts)?;

	Ok(DeploymentOrchestrator::new(
		Arc::new(deployer),
		Arc::new(verifier),
		DeploymentPlan::from_config(config),
	))
}
