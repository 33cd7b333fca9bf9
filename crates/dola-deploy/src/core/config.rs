//! Configuration loading and validation
//!
//! The deployment reads a single TOML file with `[network]`, `[explorer]` and
//! an optional `[deployment]` section. `${VAR}` and `${VAR:-default}`
//! placeholders are resolved from the environment (after loading `.env`)
//! before the file is parsed, so keys never have to be written to disk.

use crate::{
	constants,
	types::{ChainId, ConfigError, SecretString},
};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Fully loaded deployment configuration
#[derive(Debug, Clone)]
pub struct Config {
	pub path: PathBuf,
	pub network: NetworkConfig,
	pub explorer: ExplorerConfig,
	pub deployment: DeploymentConfig,
}

/// On-disk layout of the configuration file
#[derive(Debug, Deserialize)]
struct ConfigFile {
	network: NetworkConfig,
	explorer: ExplorerConfig,
	#[serde(default)]
	deployment: DeploymentConfig,
}

/// JSON-RPC endpoint and deployer key
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	pub chain_id: ChainId,
	pub rpc_url: String,
	pub private_key: SecretString,
	#[serde(default = "default_confirmation_timeout_seconds")]
	pub confirmation_timeout_seconds: u64,
	#[serde(default = "default_receipt_poll_interval_ms")]
	pub receipt_poll_interval_ms: u64,
}

/// Block explorer API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
	#[serde(default = "default_explorer_api_url")]
	pub api_url: String,
	pub api_key: SecretString,
	#[serde(default = "default_indexing_delay_seconds")]
	pub indexing_delay_seconds: u64,
	#[serde(default = "default_status_poll_interval_seconds")]
	pub status_poll_interval_seconds: u64,
	#[serde(default = "default_status_poll_attempts")]
	pub status_poll_attempts: u32,
}

/// Artifact location and the fixed constructor address
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
	#[serde(default = "default_artifacts_dir")]
	pub artifacts_dir: PathBuf,
	#[serde(default = "default_external_address")]
	pub external_address: Address,
}

impl Default for DeploymentConfig {
	fn default() -> Self {
		Self {
			artifacts_dir: default_artifacts_dir(),
			external_address: default_external_address(),
		}
	}
}

fn default_confirmation_timeout_seconds() -> u64 {
	constants::DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

fn default_receipt_poll_interval_ms() -> u64 {
	constants::DEFAULT_RECEIPT_POLL_INTERVAL_MS
}

fn default_explorer_api_url() -> String {
	constants::DEFAULT_EXPLORER_API_URL.to_string()
}

fn default_indexing_delay_seconds() -> u64 {
	constants::DEFAULT_INDEXING_DELAY_SECS
}

fn default_status_poll_interval_seconds() -> u64 {
	constants::DEFAULT_STATUS_POLL_INTERVAL_SECS
}

fn default_status_poll_attempts() -> u32 {
	constants::DEFAULT_STATUS_POLL_ATTEMPTS
}

fn default_artifacts_dir() -> PathBuf {
	PathBuf::from(constants::DEFAULT_ARTIFACTS_DIR)
}

fn default_external_address() -> Address {
	// The literal is a checked constant
	Address::from_str(constants::EXTERNAL_ADDRESS).unwrap_or_default()
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}. Lines whose first
/// non-blank character is `#` are TOML comments and are left untouched.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut result = String::with_capacity(input.len());
	for line in input.split_inclusive('\n') {
		if line.trim_start().starts_with('#') {
			result.push_str(line);
			continue;
		}

		let mut last = 0;
		for cap in re.captures_iter(line) {
			let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
				continue;
			};
			let var_name = var_name.as_str();

			let value = match std::env::var(var_name) {
				Ok(v) => v,
				Err(_) => match cap.get(2) {
					Some(default) => default.as_str().to_string(),
					None => {
						return Err(ConfigError::Validation(format!(
							"Environment variable '{var_name}' not found"
						)))
					},
				},
			};

			result.push_str(&line[last..full_match.start()]);
			result.push_str(&value);
			last = full_match.end();
		}
		result.push_str(&line[last..]);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables are loaded from a `.env` file in the current
	/// working directory when one exists.
	pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let _ = dotenvy::dotenv();

		let content = tokio::fs::read_to_string(path)
			.await
			.map_err(|source| ConfigError::Io {
				path: path.to_path_buf(),
				source,
			})?;

		Self::parse(&content, path)
	}

	/// Parses and validates configuration text
	pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
		let resolved = resolve_env_vars(content)?;
		let file: ConfigFile = toml::from_str(&resolved)?;

		let config = Self {
			path: path.to_path_buf(),
			network: file.network,
			explorer: file.explorer,
			deployment: file.deployment,
		};
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.chain_id.id() == 0 {
			return Err(ConfigError::Validation("chain_id must be positive".into()));
		}
		if self.network.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("rpc_url cannot be empty".into()));
		}
		if self.network.confirmation_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"confirmation_timeout_seconds must be positive".into(),
			));
		}
		self.network.signer()?;

		if self.explorer.api_url.trim().is_empty() {
			return Err(ConfigError::Validation("explorer api_url cannot be empty".into()));
		}
		if self.explorer.api_key.is_empty() {
			return Err(ConfigError::Validation("explorer api_key cannot be empty".into()));
		}
		if self.explorer.status_poll_attempts == 0 {
			return Err(ConfigError::Validation(
				"status_poll_attempts must be at least 1".into(),
			));
		}

		if self.deployment.external_address.is_zero() {
			return Err(ConfigError::Validation(
				"external_address cannot be the zero address".into(),
			));
		}

		Ok(())
	}
}

impl NetworkConfig {
	/// Builds the deployer's signer from the configured private key
	pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
		let key = self.private_key.expose().trim();
		let key = key.strip_prefix("0x").unwrap_or(key);
		PrivateKeySigner::from_str(key)
			.map_err(|e| ConfigError::Validation(format!("Invalid private key: {e}")))
	}

	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_seconds)
	}

	pub fn receipt_poll_interval(&self) -> Duration {
		Duration::from_millis(self.receipt_poll_interval_ms)
	}
}

impl ExplorerConfig {
	pub fn indexing_delay(&self) -> Duration {
		Duration::from_secs(self.indexing_delay_seconds)
	}

	pub fn status_poll_interval(&self) -> Duration {
		Duration::from_secs(self.status_poll_interval_seconds)
	}
}
