//! Logging helpers pairing terminal output with structured tracing
//!
//! Terminal lines stay short and readable while the tracing events carry the
//! operation name and context fields for debugging a failed deployment.

use crate::cli::output::Display;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize structured logging
///
/// Logs are controlled via RUST_LOG; by default this crate logs at info and
/// everything else at warn. Calling it twice is harmless.
pub fn init_logging() {
	use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("dola_deploy=info,warn"));

	let _ = tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_target(true)
				.with_thread_ids(false)
				.with_file(false)
				.with_line_number(false)
				.compact(),
		)
		.with(env_filter)
		.try_init();
}

/// Log operation start with structured context
pub fn operation_start(operation: &str, context: &str) {
	info!(
		operation = operation,
		context = context,
		"Operation started"
	);
}

/// Operation success with both user and developer logging
pub fn operation_success(operation: &str, details: &str) {
	Display::success(&format!("{} completed", operation));
	info!(
		operation = operation,
		details = details,
		"Operation completed successfully"
	);
}

/// Operation error with both user and developer logging
///
/// # Arguments
/// * `operation` - Name of the operation that failed
/// * `error` - Error (or rendered error chain) that caused the failure
pub fn operation_error(operation: &str, error: &dyn std::fmt::Display) {
	Display::error(&format!("{} failed: {}", operation, error));
	error!(
		operation = operation,
		error = %error,
		"Operation failed"
	);
}

/// Progress through a fixed sequence, without terminal output
pub fn operation_progress(operation: &str, step: &str, current: u64, total: u64) {
	info!(
		operation = operation,
		step = step,
		current = current,
		total = total,
		"Operation progress"
	);
}

/// Log operation completion with timing information
pub fn operation_complete(operation: &str, duration_ms: u64) {
	info!(
		operation = operation,
		duration_ms = duration_ms,
		"Operation completed"
	);
}
