// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, files, environment, CLI.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::layer::ConfigLayer;
use crate::paths::{workspace_config_path, PathsConfig};
use crate::ConfigError;

/// Prefix shared by every environment variable autogit reads.
pub const ENV_PREFIX: &str = "AUTOGIT_";

/// Source precedence levels. Higher overrides lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	UserFile = 30,
	WorkspaceFile = 40,
	Environment = 50,
	Cli = 60,
}

pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	fn precedence(&self) -> Precedence;

	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults. The layer is empty; defaults are filled in when the
/// runtime config is built.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		Ok(ConfigLayer::default())
	}
}

/// TOML file source. A missing file yields an empty layer; a malformed one
/// is an error.
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
}

impl FileSource {
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			precedence: Precedence::UserFile,
			name: "user-config",
		}
	}

	/// `<workspace>/.autogit/config.toml`
	pub fn workspace(workspace: &std::path::Path) -> Self {
		Self {
			path: workspace_config_path(workspace),
			precedence: Precedence::WorkspaceFile,
			name: "workspace-config",
		}
	}

	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
		}
	}

	pub fn path(&self) -> &std::path::Path {
		&self.path
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// `AUTOGIT_*` environment variables, one per leaf setting.
///
/// Booleans accept `true/false`, `1/0`, `yes/no` and `on/off`.
/// `AUTOGIT_GENERATOR_ARGS` is split on whitespace.
pub struct EnvSource {
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Read from the process environment at load time.
	pub fn new() -> Self {
		Self { vars: None }
	}

	/// Read from a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn vars(&self) -> Vec<(String, String)> {
		match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let mut layer = ConfigLayer::default();

		for (key, value) in self.vars() {
			let Some(setting) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match setting {
				"PREFERRED_REMOTE" => layer.workflow_mut().preferred_remote = Some(value),
				"AUTO_STAGE" => layer.workflow_mut().auto_stage = Some(parse_bool(&key, &value)?),
				"PUSH_AFTER_COMMIT" => {
					layer.workflow_mut().push_after_commit = Some(parse_bool(&key, &value)?)
				}
				"CONFIRM_BEFORE_PUSH" => {
					layer.workflow_mut().confirm_before_push = Some(parse_bool(&key, &value)?)
				}
				"MESSAGE_STYLE" => layer.workflow_mut().message_style = Some(value),
				"INCLUDE_SCOPE" => {
					layer.workflow_mut().include_scope = Some(parse_bool(&key, &value)?)
				}
				"QUICK_MODE" => layer.workflow_mut().quick_mode = Some(parse_bool(&key, &value)?),
				"CLOSE_DELAY_MS" => {
					layer.workflow_mut().close_delay_ms = Some(parse_number(&key, &value)?)
				}

				"GENERATOR_COMMAND" => layer.generator_mut().command = Some(value),
				"GENERATOR_ARGS" => {
					layer.generator_mut().args =
						Some(value.split_whitespace().map(str::to_string).collect())
				}
				"GENERATOR_MAX_DIFF_BYTES" => {
					layer.generator_mut().max_diff_bytes = Some(parse_number(&key, &value)?)
				}
				"GENERATOR_TIMEOUT_SECS" => {
					layer.generator_mut().timeout_secs = Some(parse_number(&key, &value)?)
				}

				"LOG_LEVEL" => layer.logging_mut().level = Some(value),
				"LOG_FORMAT" => layer.logging_mut().format = Some(value),
				"LOG_FILE" => layer.logging_mut().file = Some(PathBuf::from(value)),

				_ => {}
			}
		}

		Ok(layer)
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::env(key, format!("expected a boolean, got '{value}'"))),
	}
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
	value
		.parse()
		.map_err(|_| ConfigError::env(key, format!("expected a number, got '{value}'")))
}

/// Values taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	/// Replaces the user config file.
	pub config_file: Option<PathBuf>,
}

pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let mut layer = ConfigLayer::default();

		if let Some(level) = &self.overrides.log_level {
			layer.logging_mut().level = Some(level.clone());
		}
		if let Some(format) = &self.overrides.log_format {
			layer.logging_mut().format = Some(format.clone());
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::WorkspaceFile);
		assert!(Precedence::WorkspaceFile > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::Defaults);
	}

	#[test]
	fn missing_file_is_empty_layer() {
		let source = FileSource::custom(
			PathBuf::from("/nonexistent/autogit.toml"),
			Precedence::UserFile,
			"test",
		);
		assert_eq!(source.load().unwrap(), ConfigLayer::default());
	}

	#[test]
	fn workspace_file_is_read_from_dot_autogit() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::create_dir(dir.path().join(".autogit")).unwrap();
		let mut file = std::fs::File::create(dir.path().join(".autogit/config.toml")).unwrap();
		writeln!(file, "[workflow]\npreferred_remote = \"upstream\"").unwrap();

		let source = FileSource::workspace(dir.path());
		assert_eq!(source.precedence(), Precedence::WorkspaceFile);
		let layer = source.load().unwrap();
		assert_eq!(
			layer.workflow.unwrap().preferred_remote.as_deref(),
			Some("upstream")
		);
	}

	#[test]
	fn malformed_file_reports_its_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[workflow\nquick_mode = ").unwrap();

		let err = FileSource::custom(path.clone(), Precedence::UserFile, "test")
			.load()
			.unwrap_err();
		match err {
			ConfigError::TomlParse { path: p, .. } => assert_eq!(p, path),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn env_vars_map_onto_sections() {
		let layer = EnvSource::from_vars([
			("AUTOGIT_PREFERRED_REMOTE", "fork"),
			("AUTOGIT_AUTO_STAGE", "no"),
			("AUTOGIT_CLOSE_DELAY_MS", "250"),
			("AUTOGIT_GENERATOR_COMMAND", "llm"),
			("AUTOGIT_GENERATOR_ARGS", "-m  small  --raw"),
			("AUTOGIT_LOG_FORMAT", "json"),
			("AUTOGIT_UNKNOWN", "ignored"),
			("HOME", "/home/someone"),
		])
		.load()
		.unwrap();

		let workflow = layer.workflow.unwrap();
		assert_eq!(workflow.preferred_remote.as_deref(), Some("fork"));
		assert_eq!(workflow.auto_stage, Some(false));
		assert_eq!(workflow.close_delay_ms, Some(250));

		let generator = layer.generator.unwrap();
		assert_eq!(generator.command.as_deref(), Some("llm"));
		assert_eq!(
			generator.args,
			Some(vec!["-m".to_string(), "small".to_string(), "--raw".to_string()])
		);
		assert_eq!(layer.logging.unwrap().format.as_deref(), Some("json"));
	}

	#[test]
	fn blank_env_values_are_skipped() {
		let layer = EnvSource::from_vars([("AUTOGIT_PREFERRED_REMOTE", "   ")])
			.load()
			.unwrap();
		assert!(layer.workflow.is_none());
	}

	#[test]
	fn malformed_env_boolean_is_an_error() {
		let err = EnvSource::from_vars([("AUTOGIT_QUICK_MODE", "maybe")])
			.load()
			.unwrap_err();
		assert!(err.to_string().contains("AUTOGIT_QUICK_MODE"));
	}

	#[test]
	fn malformed_env_number_is_an_error() {
		let err = EnvSource::from_vars([("AUTOGIT_GENERATOR_TIMEOUT_SECS", "soon")])
			.load()
			.unwrap_err();
		assert!(matches!(err, ConfigError::Env { .. }));
	}

	#[test]
	fn cli_overrides_only_set_what_was_given() {
		let layer = CliSource::new(CliOverrides {
			log_level: Some("trace".into()),
			..Default::default()
		})
		.load()
		.unwrap();
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("trace"));
		assert!(layer.workflow.is_none());
	}
}
