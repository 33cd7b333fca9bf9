//! Command-line interface definitions and parsing

pub mod output;

use crate::constants::{env_vars, DEFAULT_CONFIG_PATH};
use clap::Parser;
use std::path::PathBuf;

/// Deploys BDOLAToken and DolaToken, then verifies both on the block explorer
#[derive(Parser, Debug)]
#[command(name = "dola-deploy")]
#[command(about = "Deploy BDOLAToken and DolaToken and verify their sources")]
#[command(version)]
pub struct Cli {
	/// Path to the deployment configuration file
	#[arg(short, long, env = env_vars::CONFIG_PATH, default_value = DEFAULT_CONFIG_PATH)]
	pub config: PathBuf,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_config_path() {
		std::env::remove_var(env_vars::CONFIG_PATH);
		let cli = Cli::try_parse_from(["dola-deploy"]).unwrap();
		assert_eq!(cli.config, PathBuf::from("deploy.toml"));
	}

	#[test]
	fn test_config_flag() {
		let cli = Cli::try_parse_from(["dola-deploy", "--config", "sepolia.toml"]).unwrap();
		assert_eq!(cli.config, PathBuf::from("sepolia.toml"));
	}

	#[test]
	fn test_unknown_flag_rejected() {
		assert!(Cli::try_parse_from(["dola-deploy", "--retry"]).is_err());
	}
}
