//! Deployment sequence
//!
//! Runs the five steps in [`Step::SEQUENCE`] order: deploy `BDOLAToken`,
//! deploy `DolaToken` with `(external address, BDOLAToken address)`, wait for
//! the explorer to index, then verify both contracts. The first failing step
//! aborts the run; the returned error names that step. Nothing is retried and
//! nothing deployed is undone.

use crate::{
	constants::contracts,
	core::{
		config::Config,
		deployer::ContractDeployer,
		explorer::ContractVerifier,
		logging::{operation_complete, operation_progress, operation_start},
	},
	cli::output::Display,
	types::{
		DeployedContract, DeploymentError, DeploymentReport, Error, Result, Step, StepOutcome,
	},
};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const OPERATION: &str = "deployment";

/// Inputs of a run that do not come from the collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentPlan {
	/// First `DolaToken` constructor argument
	pub external_address: Address,
	/// Pause between the `DolaToken` confirmation and the first verification
	pub indexing_delay: Duration,
}

impl DeploymentPlan {
	pub fn from_config(config: &Config) -> Self {
		Self {
			external_address: config.deployment.external_address,
			indexing_delay: config.explorer.indexing_delay(),
		}
	}
}

/// Drives the deployment sequence against a deployer and a verifier
pub struct DeploymentOrchestrator {
	deployer: Arc<dyn ContractDeployer>,
	verifier: Arc<dyn ContractVerifier>,
	plan: DeploymentPlan,
}

impl DeploymentOrchestrator {
	pub fn new(
		deployer: Arc<dyn ContractDeployer>,
		verifier: Arc<dyn ContractVerifier>,
		plan: DeploymentPlan,
	) -> Self {
		Self {
			deployer,
			verifier,
			plan,
		}
	}

	/// Runs every step in order and stops at the first failure
	///
	/// # Errors
	/// Returns `Error::StepFailed` naming the step that failed together with
	/// the outcomes of the steps before it; no later step has been started
	pub async fn run(&self) -> Result<DeploymentReport> {
		let started = tokio::time::Instant::now();
		operation_start(
			OPERATION,
			&format!("external_address={}", self.plan.external_address),
		);

		let mut outcomes = Vec::with_capacity(Step::SEQUENCE.len());

		let token = self
			.step(
				Step::DeployToken,
				self.deploy_contract(contracts::BDOLA_TOKEN, vec![]),
				&outcomes,
			)
			.await?;
		record(&mut outcomes, Step::DeployToken, StepOutcome::Deployed(token.clone()));

		let dola_args = vec![
			DynSolValue::from(self.plan.external_address),
			DynSolValue::from(token.address()),
		];
		let dola_token = self
			.step(
				Step::DeployDolaToken,
				self.deploy_contract(contracts::DOLA_TOKEN, dola_args),
				&outcomes,
			)
			.await?;
		record(
			&mut outcomes,
			Step::DeployDolaToken,
			StepOutcome::Deployed(dola_token.clone()),
		);

		let waited = self
			.step(
				Step::WaitForIndexing,
				self.delay(self.plan.indexing_delay),
				&outcomes,
			)
			.await?;
		record(&mut outcomes, Step::WaitForIndexing, StepOutcome::Waited(waited));

		let verified = self
			.step(Step::VerifyToken, self.verify_contract(&token), &outcomes)
			.await?;
		record(&mut outcomes, Step::VerifyToken, StepOutcome::Verified(verified));

		let verified = self
			.step(Step::VerifyDolaToken, self.verify_contract(&dola_token), &outcomes)
			.await?;
		record(&mut outcomes, Step::VerifyDolaToken, StepOutcome::Verified(verified));

		operation_complete(OPERATION, started.elapsed().as_millis() as u64);

		Ok(DeploymentReport {
			token,
			dola_token,
			outcomes,
		})
	}

	/// Deploys one contract and records the arguments it was created with
	pub async fn deploy_contract(
		&self,
		name: &str,
		constructor_args: Vec<DynSolValue>,
	) -> Result<DeployedContract> {
		let address = self.deployer.deploy(name, constructor_args.clone()).await?;
		if address.is_zero() {
			return Err(DeploymentError::MissingAddress(name.to_string()).into());
		}
		Ok(DeployedContract::new(name, address, constructor_args))
	}

	/// Suspends for `duration` without doing any work
	pub async fn delay(&self, duration: Duration) -> Result<Duration> {
		info!(delay_secs = duration.as_secs(), "Waiting for explorer indexing");
		tokio::time::sleep(duration).await;
		Ok(duration)
	}

	/// Submits one deployed contract for verification
	pub async fn verify_contract(&self, contract: &DeployedContract) -> Result<Address> {
		self.verifier.verify(contract).await?;
		Ok(contract.address())
	}

	async fn step<T, F>(&self, step: Step, fut: F, completed: &[(Step, StepOutcome)]) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		operation_progress(
			OPERATION,
			&step.to_string(),
			step.position() as u64,
			Step::SEQUENCE.len() as u64,
		);

		fut.await.map_err(|e: Error| {
			error!(step = %step, error = %e, "Step failed, skipping remaining steps");
			e.at_step(step, completed.to_vec())
		})
	}
}

fn record(outcomes: &mut Vec<(Step, StepOutcome)>, step: Step, outcome: StepOutcome) {
	Display::outcome(&outcome);
	outcomes.push((step, outcome));
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::deployer::MockContractDeployer;
	use crate::core::explorer::MockContractVerifier;
	use crate::types::VerificationError;
	use mockall::Sequence;
	use std::sync::atomic::{AtomicU8, Ordering};
	use std::sync::Mutex;
	use tokio::time::Instant;

	const TOKEN_ADDR: Address = Address::new([0xb0; 20]);
	const DOLA_ADDR: Address = Address::new([0xd0; 20]);
	const EXTERNAL: Address = Address::new([0x14; 20]);

	fn plan() -> DeploymentPlan {
		DeploymentPlan {
			external_address: EXTERNAL,
			indexing_delay: Duration::from_secs(30),
		}
	}

	fn dola_args() -> Vec<DynSolValue> {
		vec![EXTERNAL.into(), TOKEN_ADDR.into()]
	}

	fn orchestrator(
		deployer: MockContractDeployer,
		verifier: MockContractVerifier,
	) -> DeploymentOrchestrator {
		DeploymentOrchestrator::new(Arc::new(deployer), Arc::new(verifier), plan())
	}

	/// Deployer that succeeds for both contracts with the expected arguments
	fn happy_deployer(seq: &mut Sequence) -> MockContractDeployer {
		let mut deployer = MockContractDeployer::new();
		deployer
			.expect_deploy()
			.withf(|name, args| name == "BDOLAToken" && args.is_empty())
			.times(1)
			.in_sequence(seq)
			.returning(|_, _| Box::pin(async move { Ok(TOKEN_ADDR) }));
		deployer
			.expect_deploy()
			.withf(|name, args| name == "DolaToken" && *args == dola_args())
			.times(1)
			.in_sequence(seq)
			.returning(|_, _| Box::pin(async move { Ok(DOLA_ADDR) }));
		deployer
	}

	#[tokio::test(start_paused = true)]
	async fn test_full_sequence_in_order() {
		let mut seq = Sequence::new();
		let deployer = happy_deployer(&mut seq);

		let mut verifier = MockContractVerifier::new();
		verifier
			.expect_verify()
			.withf(|c| {
				c.name() == "BDOLAToken"
					&& c.address() == TOKEN_ADDR
					&& c.constructor_args().is_empty()
			})
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_| Box::pin(async move { Ok(()) }));
		verifier
			.expect_verify()
			.withf(|c| {
				c.name() == "DolaToken"
					&& c.address() == DOLA_ADDR
					&& c.constructor_args() == dola_args().as_slice()
			})
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_| Box::pin(async move { Ok(()) }));

		let report = orchestrator(deployer, verifier).run().await.unwrap();

		assert_eq!(report.completed(), Step::SEQUENCE.to_vec());
		assert_eq!(report.token.address(), TOKEN_ADDR);
		assert_eq!(report.dola_token.address(), DOLA_ADDR);
		assert_eq!(report.dola_token.constructor_args(), dola_args().as_slice());

		assert_eq!(
			report.outcomes[2],
			(Step::WaitForIndexing, StepOutcome::Waited(Duration::from_secs(30)))
		);
		assert_eq!(
			report.outcomes[4],
			(Step::VerifyDolaToken, StepOutcome::Verified(DOLA_ADDR))
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_token_deploy_failure_skips_remaining_steps() {
		let mut deployer = MockContractDeployer::new();
		deployer
			.expect_deploy()
			.withf(|name, _| name == "BDOLAToken")
			.times(1)
			.returning(|_, _| {
				Box::pin(async move { Err(DeploymentError::Rpc("insufficient funds".into())) })
			});
		deployer
			.expect_deploy()
			.withf(|name, _| name == "DolaToken")
			.times(0);

		let mut verifier = MockContractVerifier::new();
		verifier.expect_verify().times(0);

		let started = Instant::now();
		let err = orchestrator(deployer, verifier).run().await.unwrap_err();

		assert_eq!(err.failed_step(), Some(Step::DeployToken));
		assert!(err.to_string().contains("insufficient funds"));
		assert!(err.completed_steps().is_empty());
		// Never reached the delay
		assert!(started.elapsed() < Duration::from_secs(30));
	}

	#[tokio::test(start_paused = true)]
	async fn test_zero_address_stops_before_second_deploy() {
		let mut deployer = MockContractDeployer::new();
		deployer
			.expect_deploy()
			.withf(|name, _| name == "BDOLAToken")
			.times(1)
			.returning(|_, _| Box::pin(async move { Ok(Address::ZERO) }));
		deployer
			.expect_deploy()
			.withf(|name, _| name == "DolaToken")
			.times(0);

		let mut verifier = MockContractVerifier::new();
		verifier.expect_verify().times(0);

		let err = orchestrator(deployer, verifier).run().await.unwrap_err();
		assert_eq!(err.failed_step(), Some(Step::DeployToken));
		assert!(matches!(
			err,
			Error::StepFailed { ref source, .. }
				if matches!(**source, Error::Deployment(DeploymentError::MissingAddress(_)))
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_dola_deploy_failure_skips_verification() {
		let mut deployer = MockContractDeployer::new();
		deployer
			.expect_deploy()
			.withf(|name, _| name == "BDOLAToken")
			.returning(|_, _| Box::pin(async move { Ok(TOKEN_ADDR) }));
		deployer
			.expect_deploy()
			.withf(|name, _| name == "DolaToken")
			.returning(|_, _| {
				Box::pin(async move {
					Err(DeploymentError::Reverted {
						contract: "DolaToken".into(),
						tx_hash: Default::default(),
					})
				})
			});

		let mut verifier = MockContractVerifier::new();
		verifier.expect_verify().times(0);

		let err = orchestrator(deployer, verifier).run().await.unwrap_err();
		assert_eq!(err.failed_step(), Some(Step::DeployDolaToken));
	}

	#[tokio::test(start_paused = true)]
	async fn test_verification_failure_after_both_deployed() {
		let mut seq = Sequence::new();
		let deployer = happy_deployer(&mut seq);

		let mut verifier = MockContractVerifier::new();
		verifier
			.expect_verify()
			.withf(|c| c.name() == "BDOLAToken")
			.times(1)
			.returning(|c| {
				let address = c.address();
				Box::pin(async move { Err(VerificationError::NotIndexed(address)) })
			});
		verifier
			.expect_verify()
			.withf(|c| c.name() == "DolaToken")
			.times(0);

		let err = orchestrator(deployer, verifier).run().await.unwrap_err();

		assert_eq!(err.failed_step(), Some(Step::VerifyToken));
		assert!(err.to_string().contains("not indexed"));

		// Both addresses were announced before verification failed
		let announced: Vec<String> = err
			.completed_steps()
			.iter()
			.filter(|(_, outcome)| matches!(outcome, StepOutcome::Deployed(_)))
			.map(|(_, outcome)| outcome.to_string())
			.collect();
		assert_eq!(
			announced,
			vec![
				format!("BDOLAToken Contract Deployed at :  {TOKEN_ADDR}"),
				format!("DolaToken Contract Deployed at :  {DOLA_ADDR}"),
			]
		);
		let steps: Vec<Step> = err.completed_steps().iter().map(|(step, _)| *step).collect();
		assert_eq!(steps, Step::SEQUENCE[..3].to_vec());
	}

	#[tokio::test(start_paused = true)]
	async fn test_second_verification_failure_reported() {
		let mut seq = Sequence::new();
		let deployer = happy_deployer(&mut seq);

		let mut verifier = MockContractVerifier::new();
		verifier
			.expect_verify()
			.withf(|c| c.name() == "BDOLAToken")
			.returning(|_| Box::pin(async move { Ok(()) }));
		verifier
			.expect_verify()
			.withf(|c| c.name() == "DolaToken")
			.returning(|_| {
				Box::pin(async move { Err(VerificationError::Failed("Fail - Unable to verify".into())) })
			});

		let err = orchestrator(deployer, verifier).run().await.unwrap_err();
		assert_eq!(err.failed_step(), Some(Step::VerifyDolaToken));
	}

	#[tokio::test(start_paused = true)]
	async fn test_verification_waits_for_indexing_delay() {
		let confirmed_at: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
		let verified_at: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

		let mut deployer = MockContractDeployer::new();
		deployer
			.expect_deploy()
			.withf(|name, _| name == "BDOLAToken")
			.returning(|_, _| Box::pin(async move { Ok(TOKEN_ADDR) }));
		let confirmed = confirmed_at.clone();
		deployer
			.expect_deploy()
			.withf(|name, _| name == "DolaToken")
			.returning(move |_, _| {
				let confirmed = confirmed.clone();
				Box::pin(async move {
					*confirmed.lock().unwrap() = Some(Instant::now());
					Ok(DOLA_ADDR)
				})
			});

		let mut verifier = MockContractVerifier::new();
		let verified = verified_at.clone();
		verifier.expect_verify().times(2).returning(move |_| {
			verified.lock().unwrap().push(Instant::now());
			Box::pin(async move { Ok(()) })
		});

		orchestrator(deployer, verifier).run().await.unwrap();

		let confirmed = confirmed_at.lock().unwrap().expect("DolaToken confirmed");
		let verified = verified_at.lock().unwrap();
		assert_eq!(verified.len(), 2);
		for at in verified.iter() {
			assert!(at.duration_since(confirmed) >= Duration::from_secs(30));
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_rerun_deploys_new_instances() {
		let counter = Arc::new(AtomicU8::new(1));

		let mut deployer = MockContractDeployer::new();
		let next = counter.clone();
		deployer.expect_deploy().times(4).returning(move |_, _| {
			let byte = next.fetch_add(1, Ordering::SeqCst);
			Box::pin(async move { Ok(Address::repeat_byte(byte)) })
		});

		let mut verifier = MockContractVerifier::new();
		verifier
			.expect_verify()
			.times(4)
			.returning(|_| Box::pin(async move { Ok(()) }));

		let orchestrator = orchestrator(deployer, verifier);
		let first = orchestrator.run().await.unwrap();
		let second = orchestrator.run().await.unwrap();

		assert_ne!(first.token.address(), second.token.address());
		assert_ne!(first.dola_token.address(), second.dola_token.address());
		// DolaToken always references the token from its own run
		assert_eq!(
			second.dola_token.constructor_args()[1],
			DynSolValue::from(second.token.address())
		);
	}
}
