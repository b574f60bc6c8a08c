// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Checks applied to the merged configuration.

use tracing::warn;

use crate::runtime::{AutogitConfig, MESSAGE_STYLES};
use crate::ConfigError;

pub fn validate_config(config: &AutogitConfig) -> Result<(), ConfigError> {
	validate_workflow(config)?;
	validate_generator(config)?;
	Ok(())
}

fn validate_workflow(config: &AutogitConfig) -> Result<(), ConfigError> {
	let workflow = &config.workflow;

	if workflow.preferred_remote.is_empty() {
		return Err(ConfigError::invalid_value(
			"workflow.preferred_remote",
			"cannot be empty",
		));
	}
	if workflow.preferred_remote.chars().any(char::is_whitespace) {
		return Err(ConfigError::invalid_value(
			"workflow.preferred_remote",
			"cannot contain whitespace",
		));
	}

	if !MESSAGE_STYLES.contains(&workflow.message_style.as_str()) {
		return Err(ConfigError::invalid_value(
			"workflow.message_style",
			format!(
				"'{}' is not one of {}",
				workflow.message_style,
				MESSAGE_STYLES.join(", ")
			),
		));
	}

	Ok(())
}

fn validate_generator(config: &AutogitConfig) -> Result<(), ConfigError> {
	let generator = &config.generator;

	if generator.max_diff_bytes == 0 {
		return Err(ConfigError::invalid_value(
			"generator.max_diff_bytes",
			"must be greater than zero",
		));
	}
	if generator.timeout_secs == 0 {
		return Err(ConfigError::invalid_value(
			"generator.timeout_secs",
			"must be greater than zero",
		));
	}

	if !generator.is_configured() && !generator.args.is_empty() {
		warn!(
			args = ?generator.args,
			"generator.args set without generator.command, ignoring"
		);
	}

	Ok(())
}
