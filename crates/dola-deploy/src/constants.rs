//! Constants and defaults used throughout the deployment tool
//!
//! Contract names, the fixed constructor address, timing defaults and the
//! environment variable names the configuration understands.

/// Names of the compiled contracts this tool deploys
pub mod contracts {
	/// Deployed first, takes no constructor arguments
	pub const BDOLA_TOKEN: &str = "BDOLAToken";

	/// Deployed second with `(EXTERNAL_ADDRESS, address(BDOLAToken))`
	pub const DOLA_TOKEN: &str = "DolaToken";
}

/// Address passed as the first `DolaToken` constructor argument.
///
/// Its role inside the contract is not interpreted here.
pub const EXTERNAL_ADDRESS: &str = "0x14866185B1962B63C3Ea9E03Bc1da838bab34C19";

/// Default pause between the last deployment and the first verification
pub const DEFAULT_INDEXING_DELAY_SECS: u64 = 30;

/// Default time to wait for a creation transaction receipt
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Default interval between receipt polls
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1_000;

/// Default interval between verification status checks
pub const DEFAULT_STATUS_POLL_INTERVAL_SECS: u64 = 5;

/// Default number of verification status checks before giving up
pub const DEFAULT_STATUS_POLL_ATTEMPTS: u32 = 12;

/// Etherscan multichain API endpoint
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "deploy.toml";

/// Environment variable names
pub mod env_vars {
	pub const CONFIG_PATH: &str = "DOLA_DEPLOY_CONFIG";
}
