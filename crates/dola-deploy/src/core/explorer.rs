//! Source verification on Etherscan-compatible block explorers
//!
//! [`ContractVerifier`] is the seam the orchestrator verifies through.
//! [`EtherscanVerifier`] talks to the `module=contract` API: it skips
//! contracts whose source is already published, submits the standard-JSON
//! compiler input with the encoded constructor arguments, then polls the
//! returned GUID until the explorer reports a result.

use crate::core::artifacts::ArtifactStore;
use crate::core::config::ExplorerConfig;
use crate::types::{ChainId, DeployedContract, SecretString, VerificationError};
use alloy_primitives::{hex, Address};
use async_trait::async_trait;
use reqwest::{
	header::{HeaderMap, HeaderValue, ACCEPT},
	Client,
};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const CODE_FORMAT: &str = "solidity-standard-json-input";

/// Submits deployed contracts for source verification.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ContractVerifier: Send + Sync {
	/// Verifies `contract` at its address with its recorded constructor arguments.
	async fn verify(&self, contract: &DeployedContract) -> Result<(), VerificationError>;
}

/// Envelope shared by every Etherscan API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
	status: String,
	#[serde(default)]
	message: String,
	result: Value,
}

impl ApiResponse {
	fn is_ok(&self) -> bool {
		self.status == "1"
	}

	fn result_text(&self) -> String {
		match &self.result {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		}
	}
}

/// Outcome of a `verifysourcecode` submission
#[derive(Debug, PartialEq)]
enum Submission {
	Queued(String),
	AlreadyVerified,
}

/// Outcome of a single `checkverifystatus` poll
#[derive(Debug, PartialEq)]
enum Status {
	Pending,
	Verified,
}

/// Etherscan API client for one chain
#[derive(Debug, Clone)]
pub struct EtherscanVerifier {
	client: Client,
	api_url: String,
	api_key: SecretString,
	chain: ChainId,
	artifacts: ArtifactStore,
	poll_interval: Duration,
	max_attempts: u32,
}

impl EtherscanVerifier {
	/// Creates a verifier from the explorer configuration
	///
	/// # Errors
	/// Returns `VerificationError::Network` if the HTTP client cannot be built
	pub fn new(
		config: &ExplorerConfig,
		chain: ChainId,
		artifacts: ArtifactStore,
	) -> Result<Self, VerificationError> {
		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

		let client = Client::builder()
			.default_headers(headers)
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| {
				VerificationError::Network(format!("Failed to create HTTP client: {}", e))
			})?;

		debug!(
			api_url = %config.api_url,
			chain = %chain,
			poll_attempts = config.status_poll_attempts,
			"Explorer verifier initialized"
		);

		Ok(Self {
			client,
			api_url: config.api_url.trim_end_matches('/').to_string(),
			api_key: config.api_key.clone(),
			chain,
			artifacts,
			poll_interval: config.status_poll_interval(),
			max_attempts: config.status_poll_attempts,
		})
	}

	/// Whether the explorer already shows source code for `address`
	async fn is_verified(&self, address: Address) -> Result<bool, VerificationError> {
		let address = address.to_string();
		let response = self
			.get(&[
				("module", "contract"),
				("action", "getsourcecode"),
				("address", address.as_str()),
			])
			.await?;

		if !response.is_ok() {
			return Err(VerificationError::Rejected(format!(
				"{}: {}",
				response.message,
				response.result_text()
			)));
		}

		let source = response
			.result
			.get(0)
			.and_then(|entry| entry.get("SourceCode"))
			.and_then(|s| s.as_str())
			.unwrap_or_default();
		Ok(!source.is_empty())
	}

	async fn submit(&self, contract: &DeployedContract) -> Result<Submission, VerificationError> {
		let artifact = self.artifacts.load(contract.name()).map_err(|e| {
			VerificationError::MissingBuildInfo {
				contract: contract.name().to_string(),
				reason: e.to_string(),
			}
		})?;
		let build_info = self.artifacts.build_info(&artifact)?;

		let source_code = serde_json::to_string(&build_info.input)
			.map_err(|e| VerificationError::Rejected(format!("Unencodable compiler input: {}", e)))?;
		let address = contract.address().to_string();
		let contract_name = artifact.fully_qualified_name();
		let compiler_version = format!("v{}", build_info.solc_long_version);
		let constructor_args = hex::encode(contract.encoded_constructor_args());

		let form = [
			("apikey", self.api_key.expose()),
			("module", "contract"),
			("action", "verifysourcecode"),
			("contractaddress", address.as_str()),
			("sourceCode", source_code.as_str()),
			("codeformat", CODE_FORMAT),
			("contractname", contract_name.as_str()),
			("compilerversion", compiler_version.as_str()),
			// Misspelling is part of the Etherscan API
			("constructorArguements", constructor_args.as_str()),
		];

		let chain_id = self.chain.id().to_string();
		let response = self
			.client
			.post(&self.api_url)
			.query(&[("chainid", chain_id.as_str())])
			.form(&form)
			.send()
			.await?;
		let response = parse_response(response).await?;

		interpret_submission(&response, contract.address())
	}

	async fn check_status(&self, guid: &str) -> Result<Status, VerificationError> {
		let response = self
			.get(&[
				("module", "contract"),
				("action", "checkverifystatus"),
				("guid", guid),
			])
			.await?;
		interpret_status(&response)
	}

	async fn get(&self, params: &[(&str, &str)]) -> Result<ApiResponse, VerificationError> {
		let chain_id = self.chain.id().to_string();
		let response = self
			.client
			.get(&self.api_url)
			.query(&[("chainid", chain_id.as_str()), ("apikey", self.api_key.expose())])
			.query(params)
			.send()
			.await?;
		parse_response(response).await
	}
}

async fn parse_response(response: reqwest::Response) -> Result<ApiResponse, VerificationError> {
	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();
		return Err(VerificationError::Network(format!(
			"Explorer returned error status {}: {}",
			status, body
		)));
	}

	response
		.json::<ApiResponse>()
		.await
		.map_err(|e| VerificationError::Network(format!("Failed to parse response: {}", e)))
}

fn interpret_submission(
	response: &ApiResponse,
	address: Address,
) -> Result<Submission, VerificationError> {
	let text = response.result_text();
	if response.is_ok() {
		return Ok(Submission::Queued(text));
	}

	let lowered = text.to_lowercase();
	if lowered.contains("already verified") {
		Ok(Submission::AlreadyVerified)
	} else if lowered.contains("unable to locate contractcode") {
		Err(VerificationError::NotIndexed(address))
	} else {
		Err(VerificationError::Rejected(text))
	}
}

fn interpret_status(response: &ApiResponse) -> Result<Status, VerificationError> {
	let text = response.result_text();
	let lowered = text.to_lowercase();

	if lowered.contains("pending in queue") {
		Ok(Status::Pending)
	} else if lowered.contains("pass - verified") || lowered.contains("already verified") {
		Ok(Status::Verified)
	} else {
		Err(VerificationError::Failed(text))
	}
}

#[async_trait]
impl ContractVerifier for EtherscanVerifier {
	async fn verify(&self, contract: &DeployedContract) -> Result<(), VerificationError> {
		if self.is_verified(contract.address()).await? {
			info!(
				contract_name = contract.name(),
				address = %contract.address(),
				"Source already verified"
			);
			return Ok(());
		}

		let guid = match self.submit(contract).await? {
			Submission::AlreadyVerified => {
				info!(contract_name = contract.name(), "Explorer reports source already verified");
				return Ok(());
			},
			Submission::Queued(guid) => guid,
		};
		debug!(contract_name = contract.name(), guid = %guid, "Verification submitted");

		for attempt in 1..=self.max_attempts {
			tokio::time::sleep(self.poll_interval).await;

			match self.check_status(&guid).await? {
				Status::Verified => {
					info!(
						contract_name = contract.name(),
						address = %contract.address(),
						attempt = attempt,
						"Source verified"
					);
					return Ok(());
				},
				Status::Pending => {
					debug!(guid = %guid, attempt = attempt, "Verification pending");
				},
			}
		}

		Err(VerificationError::Timeout {
			guid,
			attempts: self.max_attempts,
		})
	}
}
