//! Contract deployment
//!
//! [`ContractDeployer`] is the seam the orchestrator deploys through. The
//! production implementation, [`EvmDeployer`], loads the compiled artifact,
//! appends the encoded constructor arguments, sends the creation transaction
//! and waits for the receipt.

use crate::core::artifacts::ArtifactStore;
use crate::core::blockchain::{Provider, TxBuilder};
use crate::types::DeploymentError;
use alloy_dyn_abi::DynSolValue;
use alloy_network::TransactionBuilder;
use alloy_primitives::Address;
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Creates contracts on chain.
///
/// Implementations block until the creation transaction is confirmed and
/// return the address of the new contract.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ContractDeployer: Send + Sync {
	/// Deploys `contract_name` with `constructor_args` in declaration order.
	async fn deploy(
		&self,
		contract_name: &str,
		constructor_args: Vec<DynSolValue>,
	) -> Result<Address, DeploymentError>;
}

/// Deploys compiled artifacts through an alloy provider
#[derive(Debug, Clone)]
pub struct EvmDeployer {
	artifacts: ArtifactStore,
	tx_builder: TxBuilder,
}

impl EvmDeployer {
	pub fn new(
		provider: Provider,
		artifacts: ArtifactStore,
		confirmation_timeout: Duration,
		poll_interval: Duration,
	) -> Self {
		Self {
			artifacts,
			tx_builder: TxBuilder::new(provider, confirmation_timeout, poll_interval),
		}
	}
}

#[async_trait]
impl ContractDeployer for EvmDeployer {
	async fn deploy(
		&self,
		contract_name: &str,
		constructor_args: Vec<DynSolValue>,
	) -> Result<Address, DeploymentError> {
		let artifact = self.artifacts.load(contract_name)?;
		let data = artifact.deployment_data(&constructor_args)?;
		debug!(
			contract_name = contract_name,
			bytecode_len = artifact.bytecode.len(),
			arg_count = constructor_args.len(),
			"Prepared creation transaction"
		);

		let tx = TransactionRequest::default().with_deploy_code(data);
		let receipt = self.tx_builder.send_and_wait(tx).await?;

		if !receipt.status() {
			return Err(DeploymentError::Reverted {
				contract: contract_name.to_string(),
				tx_hash: receipt.transaction_hash,
			});
		}

		let address = deployed_address(contract_name, receipt.contract_address)?;
		info!(
			contract_name = contract_name,
			address = %address,
			tx_hash = %receipt.transaction_hash,
			gas_used = receipt.gas_used,
			"Contract deployed"
		);
		Ok(address)
	}
}

/// Accepts a receipt's contract address only if it is present and non-zero
pub(crate) fn deployed_address(
	contract_name: &str,
	address: Option<Address>,
) -> Result<Address, DeploymentError> {
	match address {
		Some(address) if !address.is_zero() => Ok(address),
		_ => Err(DeploymentError::MissingAddress(contract_name.to_string())),
	}
}
