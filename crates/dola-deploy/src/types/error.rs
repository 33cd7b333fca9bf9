//! Error types and result handling for the deployment tool
//!
//! Each collaborator has its own error enum so that callers (and tests) can
//! tell a rejected deployment apart from a failed verification. The
//! crate-level [`Error`] wraps them and records which step of the
//! deployment sequence failed.

use crate::types::contract::{Step, StepOutcome};
use alloy_primitives::{Address, B256};
use std::path::PathBuf;
use std::time::Duration;

/// Convenience Result type alias using the crate Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while creating a contract on chain.
#[derive(thiserror::Error, Debug)]
pub enum DeploymentError {
	/// The compiled artifact could not be found or parsed.
	#[error("Artifact error for {contract}: {reason}")]
	Artifact { contract: String, reason: String },

	/// Constructor arguments do not fit the artifact's constructor.
	#[error("Constructor arguments for {contract} do not match its ABI: {reason}")]
	ConstructorMismatch { contract: String, reason: String },

	/// The JSON-RPC endpoint rejected a request.
	#[error("RPC error: {0}")]
	Rpc(String),

	/// The creation transaction was mined but reverted.
	#[error("Deployment of {contract} reverted in transaction {tx_hash}")]
	Reverted { contract: String, tx_hash: B256 },

	/// The receipt carried no usable contract address.
	#[error("No contract address returned for {0}")]
	MissingAddress(String),

	/// No receipt appeared within the confirmation window.
	#[error("Transaction {tx_hash} not confirmed after {timeout:?}")]
	ConfirmationTimeout { tx_hash: B256, timeout: Duration },
}

/// Errors raised while verifying source code on a block explorer.
#[derive(thiserror::Error, Debug)]
pub enum VerificationError {
	/// The explorer has not indexed the contract yet.
	#[error("Explorer has not indexed contract at {0} yet")]
	NotIndexed(Address),

	/// The explorer refused the verification request.
	#[error("Verification request rejected: {0}")]
	Rejected(String),

	/// The explorer processed the request but could not match the bytecode.
	#[error("Verification failed: {0}")]
	Failed(String),

	/// Verification was still pending after the last status poll.
	#[error("Verification still pending after {attempts} status checks (guid {guid})")]
	Timeout { guid: String, attempts: u32 },

	/// Transport or decoding failure talking to the explorer.
	#[error("Explorer request failed: {0}")]
	Network(String),

	/// Compiler input for the contract is not available locally.
	#[error("Missing build info for {contract}: {reason}")]
	MissingBuildInfo { contract: String, reason: String },
}

impl From<reqwest::Error> for VerificationError {
	fn from(err: reqwest::Error) -> Self {
		VerificationError::Network(err.to_string())
	}
}

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	/// The configuration file could not be read.
	#[error("Failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep only the message, not the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level error type for the deployment tool
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Deployment(#[from] DeploymentError),

	#[error(transparent)]
	Verification(#[from] VerificationError),

	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A step of the deployment sequence failed; later steps were skipped.
	#[error("Step '{step}' failed: {source}")]
	StepFailed {
		step: Step,
		#[source]
		source: Box<Error>,
		/// Steps that finished before the failure, in execution order
		completed: Vec<(Step, StepOutcome)>,
	},
}

impl Error {
	/// Tags this error with the step that produced it and what ran before
	pub fn at_step(self, step: Step, completed: Vec<(Step, StepOutcome)>) -> Self {
		Error::StepFailed {
			step,
			source: Box::new(self),
			completed,
		}
	}

	/// Outcomes of the steps that succeeded before the failing one
	pub fn completed_steps(&self) -> &[(Step, StepOutcome)] {
		match self {
			Error::StepFailed { completed, .. } => completed,
			_ => &[],
		}
	}

	/// Step that failed, if the error came out of the deployment sequence
	pub fn failed_step(&self) -> Option<Step> {
		match self {
			Error::StepFailed { step, .. } => Some(*step),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_step_tagging_keeps_source_message() {
		let err = Error::from(DeploymentError::MissingAddress("BDOLAToken".to_string()))
			.at_step(Step::DeployToken, Vec::new());

		assert_eq!(err.failed_step(), Some(Step::DeployToken));
		let message = err.to_string();
		assert!(message.contains("deploy BDOLAToken"));
		assert!(message.contains("No contract address returned for BDOLAToken"));
	}

	#[test]
	fn test_untagged_error_has_no_step() {
		let err = Error::from(ConfigError::Validation("bad".to_string()));
		assert_eq!(err.failed_step(), None);
		assert!(err.completed_steps().is_empty());
	}
}
