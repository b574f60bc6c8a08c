// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Layered configuration for autogit.
//!
//! Sources, lowest precedence first: built-in defaults, the user file
//! (`$XDG_CONFIG_HOME/autogit/config.toml`), the workspace file
//! (`<workspace>/.autogit/config.toml`), `AUTOGIT_*` environment variables,
//! and command-line flags.

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

use std::path::Path;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{
	AutogitConfig, GeneratorConfig, LogFormat, LogLevel, LoggingConfig, WorkflowConfig,
	MESSAGE_STYLES,
};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from every source.
///
/// `cli.config_file` replaces the XDG user file. The workspace file is only
/// consulted when `workspace` is given.
pub fn load_config(
	workspace: Option<&Path>,
	cli: CliOverrides,
) -> Result<AutogitConfig, ConfigError> {
	let mut paths = match &cli.config_file {
		Some(file) => PathsConfig {
			user_config_file: file.clone(),
			workspace_config_file: None,
		},
		None => paths::resolve_xdg_paths()?,
	};
	if let Some(workspace) = workspace {
		paths = paths.with_workspace(workspace);
	}

	let mut registry = registry_for(&paths);
	registry.register(Box::new(sources::EnvSource::new()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}

/// Registry holding the defaults and the file sources named by `paths`.
pub fn registry_for(paths: &PathsConfig) -> ConfigRegistry {
	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::user(paths)));
	if let Some(file) = &paths.workspace_config_file {
		registry.register(Box::new(sources::FileSource::custom(
			file.clone(),
			Precedence::WorkspaceFile,
			"workspace-config",
		)));
	}
	registry
}

#[cfg(test)]
mod tests {
	use super::*;
	use sources::EnvSource;

	fn write(path: &Path, content: &str) {
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, content).unwrap();
	}

	#[test]
	fn files_env_and_cli_stack_in_order() {
		let home = tempfile::tempdir().unwrap();
		let repo = tempfile::tempdir().unwrap();
		let user_file = home.path().join("autogit/config.toml");
		write(
			&user_file,
			"[workflow]\npreferred_remote = \"user\"\nauto_stage = false\n\n[generator]\ncommand = \"llm\"\n",
		);
		write(
			&paths::workspace_config_path(repo.path()),
			"[workflow]\npreferred_remote = \"ws\"\nmessage_style = \"simple\"\n",
		);

		let paths = PathsConfig {
			user_config_file: user_file,
			workspace_config_file: None,
		}
		.with_workspace(repo.path());

		let mut registry = registry_for(&paths);
		registry.register(Box::new(EnvSource::from_vars([(
			"AUTOGIT_MESSAGE_STYLE",
			"detailed",
		)])));
		registry.register(Box::new(sources::CliSource::new(CliOverrides {
			log_level: Some("debug".into()),
			..Default::default()
		})));

		let config = registry.load(paths).unwrap();
		assert_eq!(config.workflow.preferred_remote, "ws");
		assert!(!config.workflow.auto_stage);
		assert_eq!(config.workflow.message_style, "detailed");
		assert_eq!(config.generator.command.as_deref(), Some("llm"));
		assert_eq!(config.logging.level, LogLevel::Debug);
	}

	#[test]
	fn explicit_config_file_replaces_user_file() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("custom.toml");
		write(&file, "[workflow]\nclose_delay_ms = 0\n");

		let config = load_config(
			None,
			CliOverrides {
				config_file: Some(file.clone()),
				..Default::default()
			},
		)
		.unwrap();
		assert_eq!(config.paths.user_config_file, file);
		assert_eq!(config.workflow.close_delay_ms, 0);
	}
}
