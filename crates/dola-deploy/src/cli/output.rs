//! Terminal output utilities
//!
//! Colored status lines and key/value listings for the deployment run.

use crate::types::StepOutcome;
use colored::Colorize;

/// Terminal display utilities for formatted CLI output
pub struct Display;

impl Display {
	/// Displays a formatted section header with underline
	pub fn header(text: &str) {
		println!("\n{}", text.bold().cyan());
		println!("{}", "─".repeat(text.chars().count()).cyan());
	}

	/// Displays a success message with green checkmark
	pub fn success(message: &str) {
		println!("{} {}", "✓".green().bold(), message);
	}

	/// Displays an error message with red X symbol to stderr
	pub fn error(message: &str) {
		eprintln!("{} {}", "✗".red().bold(), message.red());
	}

	/// Displays a key-value pair with formatted labels
	pub fn kv(key: &str, value: &str) {
		println!("  {} {}", format!("{}:", key).bold(), value);
	}

	/// Prints the result of a finished step
	///
	/// Deployments are announced as `<Name> Contract Deployed at :  <address>`.
	pub fn outcome(outcome: &StepOutcome) {
		match outcome {
			StepOutcome::Deployed(_) => println!("{}", outcome.to_string().bold()),
			_ => Self::success(&outcome.to_string()),
		}
	}
}
