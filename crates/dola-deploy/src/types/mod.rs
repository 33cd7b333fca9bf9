//! Type definitions shared across the deployment tool
//!
//! Chain identifiers, deployed-contract records, the step sequence, secrets
//! loaded from configuration and the error taxonomy.

pub mod chain;
pub mod contract;
pub mod error;
pub mod secret;

pub use chain::ChainId;
pub use contract::{DeployedContract, DeploymentReport, Step, StepOutcome};
pub use error::{ConfigError, DeploymentError, Error, Result, VerificationError};
pub use secret::SecretString;
