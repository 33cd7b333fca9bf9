//! Blockchain provider and transaction management
//!
//! Wraps an alloy HTTP provider with the deployer's wallet attached. Nonce,
//! gas and chain id are filled by the provider; `TxBuilder` submits a
//! transaction and polls for its receipt until the confirmation timeout.

use crate::types::{ChainId, DeploymentError};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256};
use alloy_provider::{DynProvider, Provider as AlloyProvider, ProviderBuilder};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use std::time::Duration;
use tracing::debug;

/// Blockchain provider bound to one chain and one signing account
#[derive(Clone)]
pub struct Provider {
	inner: DynProvider,
	chain: ChainId,
	sender: Address,
}

impl std::fmt::Debug for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("chain", &self.chain)
			.field("sender", &self.sender)
			.field("inner", &"<DynProvider>")
			.finish()
	}
}

impl Provider {
	/// Connects to `rpc_url` and checks that it serves `chain`
	///
	/// # Errors
	/// Returns `DeploymentError::Rpc` if the URL is invalid, the endpoint is
	/// unreachable, or it reports a different chain id
	pub async fn new(
		chain: ChainId,
		rpc_url: &str,
		signer: PrivateKeySigner,
	) -> Result<Self, DeploymentError> {
		let url = rpc_url
			.parse()
			.map_err(|e| DeploymentError::Rpc(format!("Invalid RPC URL: {}", e)))?;

		let sender = signer.address();
		let wallet = EthereumWallet::from(signer.with_chain_id(Some(chain.id())));
		let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

		let remote_chain = provider.get_chain_id().await.map_err(|e| {
			DeploymentError::Rpc(format!("Failed to connect to {}: {}", rpc_url, e))
		})?;
		if remote_chain != chain.id() {
			return Err(DeploymentError::Rpc(format!(
				"RPC endpoint serves chain {} but configuration expects {}",
				remote_chain, chain
			)));
		}

		Ok(Self {
			inner: provider.erased(),
			chain,
			sender,
		})
	}

	/// Address that signs and pays for transactions
	pub fn sender(&self) -> Address {
		self.sender
	}
}

/// Transaction submission with receipt polling
#[derive(Debug, Clone)]
pub struct TxBuilder {
	provider: Provider,
	confirmation_timeout: Duration,
	poll_interval: Duration,
}

impl TxBuilder {
	pub fn new(provider: Provider, confirmation_timeout: Duration, poll_interval: Duration) -> Self {
		Self {
			provider,
			confirmation_timeout,
			poll_interval,
		}
	}

	/// Submits a transaction and returns its hash
	///
	/// # Errors
	/// Returns `DeploymentError::Rpc` if filling or submission fails
	pub async fn send(&self, tx: TransactionRequest) -> Result<B256, DeploymentError> {
		let pending = self
			.provider
			.inner
			.send_transaction(tx)
			.await
			.map_err(|e| DeploymentError::Rpc(format!("Failed to send transaction: {}", e)))?;

		Ok(*pending.tx_hash())
	}

	/// Polls for the receipt of `hash` until it is mined
	///
	/// # Errors
	/// Returns `DeploymentError::ConfirmationTimeout` if no receipt shows up
	/// within the confirmation timeout
	pub async fn wait(&self, hash: B256) -> Result<TransactionReceipt, DeploymentError> {
		let deadline = tokio::time::Instant::now() + self.confirmation_timeout;

		loop {
			if let Some(receipt) = self
				.provider
				.inner
				.get_transaction_receipt(hash)
				.await
				.map_err(|e| DeploymentError::Rpc(format!("Failed to get receipt: {}", e)))?
			{
				return Ok(receipt);
			}

			if tokio::time::Instant::now() >= deadline {
				return Err(DeploymentError::ConfirmationTimeout {
					tx_hash: hash,
					timeout: self.confirmation_timeout,
				});
			}

			debug!(tx_hash = %hash, "Receipt not available yet");
			tokio::time::sleep(self.poll_interval).await;
		}
	}

	/// Submits a transaction and waits for its receipt
	pub async fn send_and_wait(
		&self,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt, DeploymentError> {
		let hash = self.send(tx).await?;
		debug!(tx_hash = %hash, "Transaction submitted");
		self.wait(hash).await
	}
}
