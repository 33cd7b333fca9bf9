//! Chain identifiers for the networks a deployment can target

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an EVM network
///
/// Known public networks get a display name; anything else is carried as a
/// plain numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum ChainId {
	Mainnet,
	Custom { id: u64 },
}

impl ChainId {
	/// Create ChainId from numeric identifier
	pub fn from_u64(id: u64) -> Self {
		match id {
			1 => Self::Mainnet,
			id => Self::Custom { id },
		}
	}

	/// Numeric chain identifier as used in transactions and explorer queries
	pub fn id(&self) -> u64 {
		match self {
			Self::Mainnet => 1,
			Self::Custom { id } => *id,
		}
	}

	/// Human-readable network name
	pub fn name(&self) -> &str {
		match self.id() {
			1 => "Ethereum Mainnet",
			10 => "Optimism",
			56 => "BNB Smart Chain",
			97 => "BNB Smart Chain Testnet",
			137 => "Polygon",
			8453 => "Base",
			42161 => "Arbitrum One",
			84532 => "Base Sepolia",
			11155111 => "Sepolia",
			31337 => "Local Devnet",
			_ => "Custom Chain",
		}
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.id(), self.name())
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		Self::from_u64(id)
	}
}

impl From<ChainId> for u64 {
	fn from(chain: ChainId) -> Self {
		chain.id()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_id_conversion() {
		assert_eq!(ChainId::from_u64(1), ChainId::Mainnet);
		assert_eq!(ChainId::from_u64(42), ChainId::Custom { id: 42 });
		assert_eq!(u64::from(ChainId::Custom { id: 97 }), 97);
	}

	#[test]
	fn test_chain_display() {
		assert_eq!(ChainId::from_u64(11155111).to_string(), "11155111 (Sepolia)");
		assert_eq!(ChainId::Mainnet.to_string(), "1 (Ethereum Mainnet)");
	}

	#[test]
	fn test_chain_id_deserializes_from_integer() {
		#[derive(Deserialize)]
		struct Wrapper {
			chain_id: ChainId,
		}
		let parsed: Wrapper = toml::from_str("chain_id = 137").unwrap();
		assert_eq!(parsed.chain_id, ChainId::Custom { id: 137 });
	}
}
