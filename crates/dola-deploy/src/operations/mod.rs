//! Operations built on top of the core collaborators

pub mod deploy;

pub use deploy::{DeploymentOrchestrator, DeploymentPlan};
