//! Compiled contract artifacts
//!
//! Reads the JSON artifacts produced by the Solidity toolchain: creation
//! bytecode and ABI for deployments, plus the build info (compiler version
//! and standard-JSON input) that explorers need for source verification.
//! Both the Hardhat layout (`contracts/<Name>.sol/<Name>.json`, string
//! bytecode, `.dbg.json` pointing at `build-info/`) and the Foundry layout
//! (`<Name>.sol/<Name>.json`, `bytecode.object`) are understood. Foundry has
//! no debug file, so its build info is found by scanning `build-info/` for
//! the input that compiled the artifact's source.

use crate::types::{DeploymentError, VerificationError};
use alloy_dyn_abi::{DynSolValue, Specifier};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Creation bytecode and ABI of one compiled contract
#[derive(Debug, Clone)]
pub struct ContractArtifact {
	pub contract_name: String,
	/// Source path as the compiler saw it, e.g. `contracts/DolaToken.sol`
	pub source_name: Option<String>,
	pub abi: JsonAbi,
	pub bytecode: Bytes,
	path: PathBuf,
}

/// Compiler version and input recorded for an artifact
#[derive(Debug, Clone, Deserialize)]
pub struct BuildInfo {
	#[serde(rename = "solcLongVersion")]
	pub solc_long_version: String,
	pub input: Value,
}

#[derive(Deserialize)]
struct DebugFile {
	#[serde(rename = "buildInfo")]
	build_info: String,
}

/// Lookup of artifacts under a compiler output directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
	root: PathBuf,
}

impl ArtifactStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Loads the artifact for `contract_name`
	///
	/// # Errors
	/// Returns `DeploymentError::Artifact` if no artifact exists or it is malformed
	pub fn load(&self, contract_name: &str) -> Result<ContractArtifact, DeploymentError> {
		let path = self.find(contract_name).ok_or_else(|| DeploymentError::Artifact {
			contract: contract_name.to_string(),
			reason: format!("not found in {}", self.root.display()),
		})?;

		let artifact_err = |reason: String| DeploymentError::Artifact {
			contract: contract_name.to_string(),
			reason,
		};

		let content = std::fs::read_to_string(&path)
			.map_err(|e| artifact_err(format!("failed to read {}: {}", path.display(), e)))?;
		let json: Value = serde_json::from_str(&content)
			.map_err(|e| artifact_err(format!("invalid JSON in {}: {}", path.display(), e)))?;

		let abi_value = json
			.get("abi")
			.cloned()
			.ok_or_else(|| artifact_err("no ABI in artifact".to_string()))?;
		let abi: JsonAbi = serde_json::from_value(abi_value)
			.map_err(|e| artifact_err(format!("invalid ABI: {}", e)))?;

		// Hardhat stores a string, Foundry an object with the hex under "object"
		let bytecode_hex = match json.get("bytecode") {
			Some(Value::String(s)) => s.as_str(),
			Some(obj) => obj
				.get("object")
				.and_then(|o| o.as_str())
				.ok_or_else(|| artifact_err("no bytecode object in artifact".to_string()))?,
			None => return Err(artifact_err("no bytecode in artifact".to_string())),
		};
		let bytecode = decode_bytecode(bytecode_hex).map_err(artifact_err)?;

		let source_name = json
			.get("sourceName")
			.and_then(|s| s.as_str())
			.map(str::to_string)
			.or_else(|| foundry_source_name(&json, contract_name));

		Ok(ContractArtifact {
			contract_name: contract_name.to_string(),
			source_name,
			abi,
			bytecode,
			path,
		})
	}

	/// Resolves the compiler version and input an artifact was built from
	///
	/// Follows the Hardhat `.dbg.json` pointer when one sits next to the
	/// artifact, otherwise picks the newest `build-info/*.json` whose input
	/// contains the artifact's source file.
	///
	/// # Errors
	/// Returns `VerificationError::MissingBuildInfo` when no readable build
	/// info covers the artifact
	pub fn build_info(&self, artifact: &ContractArtifact) -> Result<BuildInfo, VerificationError> {
		let dbg_path = artifact
			.path
			.with_file_name(format!("{}.dbg.json", artifact.contract_name));
		if dbg_path.is_file() {
			return self.build_info_from_debug_file(artifact, &dbg_path);
		}
		self.scan_build_info(artifact)
	}

	fn build_info_from_debug_file(
		&self,
		artifact: &ContractArtifact,
		dbg_path: &Path,
	) -> Result<BuildInfo, VerificationError> {
		let missing = |reason: String| missing_build_info(artifact, reason);

		let dbg_content = std::fs::read_to_string(dbg_path)
			.map_err(|e| missing(format!("failed to read {}: {}", dbg_path.display(), e)))?;
		let dbg: DebugFile = serde_json::from_str(&dbg_content)
			.map_err(|e| missing(format!("invalid {}: {}", dbg_path.display(), e)))?;

		let dir = dbg_path
			.parent()
			.ok_or_else(|| missing("artifact has no parent directory".to_string()))?;
		let build_info_path = dir.join(&dbg.build_info);
		let content = std::fs::read_to_string(&build_info_path).map_err(|e| {
			missing(format!("failed to read {}: {}", build_info_path.display(), e))
		})?;

		serde_json::from_str(&content)
			.map_err(|e| missing(format!("invalid {}: {}", build_info_path.display(), e)))
	}

	fn scan_build_info(&self, artifact: &ContractArtifact) -> Result<BuildInfo, VerificationError> {
		let missing = |reason: String| missing_build_info(artifact, reason);

		let source = artifact
			.source_name
			.as_deref()
			.ok_or_else(|| missing("artifact does not name its source file".to_string()))?;
		let dir = self.root.join("build-info");
		let entries = std::fs::read_dir(&dir)
			.map_err(|e| missing(format!("failed to read {}: {}", dir.display(), e)))?;

		let mut newest: Option<(SystemTime, BuildInfo)> = None;
		for path in entries
			.flatten()
			.map(|e| e.path())
			.filter(|p| p.extension().is_some_and(|ext| ext == "json"))
		{
			let Ok(content) = std::fs::read_to_string(&path) else {
				continue;
			};
			// Foundry also writes build info without compiler input
			let Ok(info) = serde_json::from_str::<BuildInfo>(&content) else {
				continue;
			};
			if info.input.pointer("/sources").and_then(|s| s.get(source)).is_none() {
				continue;
			}

			let modified = std::fs::metadata(&path)
				.and_then(|m| m.modified())
				.unwrap_or(SystemTime::UNIX_EPOCH);
			if newest.as_ref().map_or(true, |(at, _)| modified > *at) {
				newest = Some((modified, info));
			}
		}

		newest.map(|(_, info)| info).ok_or_else(|| {
			missing(format!("no build info in {} compiles {}", dir.display(), source))
		})
	}

	fn find(&self, contract_name: &str) -> Option<PathBuf> {
		let sol_dir = format!("{}.sol", contract_name);
		let file = format!("{}.json", contract_name);

		let candidates = [
			self.root.join("contracts").join(&sol_dir).join(&file),
			self.root.join(&sol_dir).join(&file),
		];
		if let Some(path) = candidates.into_iter().find(|p| p.is_file()) {
			return Some(path);
		}

		search_dir(&self.root, &sol_dir, &file)
	}
}

/// Depth-first search for `<sol_dir>/<file>`, skipping build info
fn search_dir(dir: &Path, sol_dir: &str, file: &str) -> Option<PathBuf> {
	let entries = std::fs::read_dir(dir).ok()?;
	let mut subdirs: Vec<PathBuf> = entries
		.flatten()
		.map(|e| e.path())
		.filter(|p| p.is_dir())
		.filter(|p| p.file_name().is_some_and(|n| n != "build-info"))
		.collect();
	subdirs.sort();

	for sub in subdirs {
		if sub.file_name().is_some_and(|n| n == sol_dir) {
			let candidate = sub.join(file);
			if candidate.is_file() {
				return Some(candidate);
			}
		}
		if let Some(found) = search_dir(&sub, sol_dir, file) {
			return Some(found);
		}
	}
	None
}

fn missing_build_info(artifact: &ContractArtifact, reason: String) -> VerificationError {
	VerificationError::MissingBuildInfo {
		contract: artifact.contract_name.clone(),
		reason,
	}
}

fn decode_bytecode(bytecode_hex: &str) -> Result<Bytes, String> {
	let hex_str = bytecode_hex.strip_prefix("0x").unwrap_or(bytecode_hex);
	if hex_str.is_empty() {
		return Err("empty bytecode (abstract contract or interface?)".to_string());
	}
	if hex_str.contains("__") {
		return Err("bytecode has unlinked library placeholders".to_string());
	}
	hex::decode(hex_str)
		.map(Bytes::from)
		.map_err(|e| format!("invalid bytecode hex: {}", e))
}

fn foundry_source_name(json: &Value, contract_name: &str) -> Option<String> {
	json.pointer("/metadata/settings/compilationTarget")
		.and_then(|t| t.as_object())
		.and_then(|targets| {
			targets
				.iter()
				.find(|(_, name)| name.as_str() == Some(contract_name))
				.map(|(source, _)| source.clone())
		})
}

impl ContractArtifact {
	/// `<source path>:<contract name>` as explorers expect it
	pub fn fully_qualified_name(&self) -> String {
		match &self.source_name {
			Some(source) => format!("{}:{}", source, self.contract_name),
			None => self.contract_name.clone(),
		}
	}

	/// Checks `args` against the ABI constructor, arity first, then types
	pub fn check_constructor_args(&self, args: &[DynSolValue]) -> Result<(), DeploymentError> {
		let mismatch = |reason: String| DeploymentError::ConstructorMismatch {
			contract: self.contract_name.clone(),
			reason,
		};

		let inputs = self
			.abi
			.constructor()
			.map(|c| c.inputs.as_slice())
			.unwrap_or_default();

		if inputs.len() != args.len() {
			return Err(mismatch(format!(
				"expected {} arguments, got {}",
				inputs.len(),
				args.len()
			)));
		}

		for (i, (param, value)) in inputs.iter().zip(args).enumerate() {
			let ty = param
				.resolve()
				.map_err(|e| mismatch(format!("cannot resolve type of argument {}: {}", i, e)))?;
			if !ty.matches(value) {
				return Err(mismatch(format!(
					"argument {} ({}) expects {}",
					i, param.name, param.ty
				)));
			}
		}

		Ok(())
	}

	/// Creation bytecode followed by the ABI-encoded constructor arguments
	pub fn deployment_data(&self, args: &[DynSolValue]) -> Result<Bytes, DeploymentError> {
		self.check_constructor_args(args)?;

		let mut data = self.bytecode.to_vec();
		if !args.is_empty() {
			data.extend_from_slice(&DynSolValue::Tuple(args.to_vec()).abi_encode_params());
		}
		Ok(Bytes::from(data))
	}
}
