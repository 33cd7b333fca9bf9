//! Deployed contract records and the deployment step sequence

use crate::constants::contracts;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;
use std::fmt;
use std::time::Duration;

/// A contract instance created by this run.
///
/// Built from the address a deployer returned together with the exact
/// constructor arguments that were sent, so the verifier can replay them.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployedContract {
	name: String,
	address: Address,
	constructor_args: Vec<DynSolValue>,
}

impl DeployedContract {
	pub fn new(name: impl Into<String>, address: Address, constructor_args: Vec<DynSolValue>) -> Self {
		Self {
			name: name.into(),
			address,
			constructor_args,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn constructor_args(&self) -> &[DynSolValue] {
		&self.constructor_args
	}

	/// ABI-encoded constructor arguments as explorers expect them
	///
	/// Returns an empty vector when the contract takes no arguments.
	pub fn encoded_constructor_args(&self) -> Vec<u8> {
		if self.constructor_args.is_empty() {
			return Vec::new();
		}
		DynSolValue::Tuple(self.constructor_args.clone()).abi_encode_params()
	}
}

/// One step of the deployment sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
	DeployToken,
	DeployDolaToken,
	WaitForIndexing,
	VerifyToken,
	VerifyDolaToken,
}

impl Step {
	/// All steps in the order they run
	pub const SEQUENCE: [Step; 5] = [
		Step::DeployToken,
		Step::DeployDolaToken,
		Step::WaitForIndexing,
		Step::VerifyToken,
		Step::VerifyDolaToken,
	];

	/// 1-based position in the sequence
	pub fn position(&self) -> usize {
		Self::SEQUENCE
			.iter()
			.position(|s| s == self)
			.map(|i| i + 1)
			.unwrap_or_default()
	}
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Step::DeployToken => write!(f, "deploy {}", contracts::BDOLA_TOKEN),
			Step::DeployDolaToken => write!(f, "deploy {}", contracts::DOLA_TOKEN),
			Step::WaitForIndexing => write!(f, "wait for explorer indexing"),
			Step::VerifyToken => write!(f, "verify {}", contracts::BDOLA_TOKEN),
			Step::VerifyDolaToken => write!(f, "verify {}", contracts::DOLA_TOKEN),
		}
	}
}

/// What a completed step produced
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
	Deployed(DeployedContract),
	Waited(Duration),
	Verified(Address),
}

impl fmt::Display for StepOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StepOutcome::Deployed(contract) => write!(
				f,
				"{} Contract Deployed at :  {}",
				contract.name(),
				contract.address()
			),
			StepOutcome::Waited(delay) => {
				write!(f, "Waited {}s for explorer indexing", delay.as_secs())
			},
			StepOutcome::Verified(address) => write!(f, "Verified contract at {}", address),
		}
	}
}

/// Outcome of a fully successful run
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentReport {
	pub token: DeployedContract,
	pub dola_token: DeployedContract,
	/// Every step with its outcome, in execution order
	pub outcomes: Vec<(Step, StepOutcome)>,
}

impl DeploymentReport {
	pub fn completed(&self) -> Vec<Step> {
		self.outcomes.iter().map(|(step, _)| *step).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_encoded_args_empty_without_arguments() {
		let contract = DeployedContract::new("BDOLAToken", Address::repeat_byte(0x11), vec![]);
		assert!(contract.encoded_constructor_args().is_empty());
	}

	#[test]
	fn test_encoded_args_are_padded_words_in_order() {
		let first = address!("14866185B1962B63C3Ea9E03Bc1da838bab34C19");
		let second = Address::repeat_byte(0x22);
		let contract = DeployedContract::new(
			"DolaToken",
			Address::repeat_byte(0x33),
			vec![first.into(), second.into()],
		);

		let encoded = contract.encoded_constructor_args();
		assert_eq!(encoded.len(), 64);
		assert_eq!(&encoded[12..32], first.as_slice());
		assert_eq!(&encoded[44..64], second.as_slice());
	}

	#[test]
	fn test_step_positions_follow_sequence() {
		assert_eq!(Step::DeployToken.position(), 1);
		assert_eq!(Step::WaitForIndexing.position(), 3);
		assert_eq!(Step::VerifyDolaToken.position(), 5);
		assert_eq!(Step::DeployDolaToken.to_string(), "deploy DolaToken");
	}

	#[test]
	fn test_deployed_outcome_announces_address() {
		let address = address!("14866185B1962B63C3Ea9E03Bc1da838bab34C19");
		let outcome = StepOutcome::Deployed(DeployedContract::new("BDOLAToken", address, vec![]));
		assert_eq!(
			outcome.to_string(),
			"BDOLAToken Contract Deployed at :  0x14866185B1962B63C3Ea9E03Bc1da838bab34C19"
		);
	}
}
