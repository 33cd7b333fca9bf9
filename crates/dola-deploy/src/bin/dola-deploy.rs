//! Entry point for the dola-deploy CLI
//!
//! Loads the configuration, runs the deployment sequence and maps the outcome
//! to the process exit code: 0 when every step succeeded, 1 otherwise.

use anyhow::{Context, Result};
use clap::Parser;
use dola_deploy::{
	cli::{output::Display, Cli},
	core::{
		config::Config,
		init_logging,
		logging::{operation_error, operation_success},
	},
	orchestrator_from_config, DeploymentReport,
};
use std::process::ExitCode;
use tracing::instrument;

#[tokio::main]
async fn main() -> ExitCode {
	init_logging();

	let cli = Cli::parse();

	match run(cli).await {
		Ok(report) => {
			operation_success(
				"Deployment",
				&format!(
					"token={} dola_token={}",
					report.token.address(),
					report.dola_token.address()
				),
			);
			ExitCode::SUCCESS
		},
		Err(err) => {
			operation_error("Deployment", &format!("{err:#}"));
			if let Some(failed) = err.downcast_ref::<dola_deploy::Error>() {
				for (step, outcome) in failed.completed_steps() {
					Display::kv(&format!("Completed '{step}'"), &outcome.to_string());
				}
			}
			ExitCode::FAILURE
		},
	}
}

#[instrument(skip(cli), fields(config = %cli.config.display()))]
async fn run(cli: Cli) -> Result<DeploymentReport> {
	let config = Config::from_file(&cli.config)
		.await
		.with_context(|| format!("loading {}", cli.config.display()))?;

	Display::header("Deploying DOLA contracts");
	Display::kv("Network", &config.network.chain_id.to_string());
	Display::kv("External address", &config.deployment.external_address.to_string());

	let orchestrator = orchestrator_from_config(&config).await?;
	let report = orchestrator.run().await?;
	Ok(report)
}
