// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Resolved configuration with defaults applied.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::layer::{ConfigLayer, GeneratorLayer, LoggingLayer, WorkflowLayer};
use crate::paths::PathsConfig;
use crate::ConfigError;

pub const DEFAULT_PREFERRED_REMOTE: &str = "origin";
pub const DEFAULT_MESSAGE_STYLE: &str = "conventional";
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 1500;
pub const DEFAULT_MAX_DIFF_BYTES: usize = 32 * 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Accepted values for `workflow.message_style`.
pub const MESSAGE_STYLES: &[&str] = &["conventional", "simple", "detailed"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutogitConfig {
	pub workflow: WorkflowConfig,
	pub generator: GeneratorConfig,
	pub logging: LoggingConfig,

	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
	pub preferred_remote: String,
	pub auto_stage: bool,
	pub push_after_commit: bool,
	pub confirm_before_push: bool,
	/// One of [`MESSAGE_STYLES`], lowercased.
	pub message_style: String,
	pub include_scope: bool,
	pub quick_mode: bool,
	pub close_delay_ms: u64,
}

impl WorkflowConfig {
	pub fn close_delay(&self) -> Duration {
		Duration::from_millis(self.close_delay_ms)
	}
}

impl Default for WorkflowConfig {
	fn default() -> Self {
		Self {
			preferred_remote: DEFAULT_PREFERRED_REMOTE.to_string(),
			auto_stage: true,
			push_after_commit: true,
			confirm_before_push: true,
			message_style: DEFAULT_MESSAGE_STYLE.to_string(),
			include_scope: true,
			quick_mode: false,
			close_delay_ms: DEFAULT_CLOSE_DELAY_MS,
		}
	}
}

/// External command used to draft commit messages and explain failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
	pub command: Option<String>,
	pub args: Vec<String>,
	pub max_diff_bytes: usize,
	pub timeout_secs: u64,
}

impl GeneratorConfig {
	pub fn is_configured(&self) -> bool {
		self.command.is_some()
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			command: None,
			args: Vec::new(),
			max_diff_bytes: DEFAULT_MAX_DIFF_BYTES,
			timeout_secs: DEFAULT_TIMEOUT_SECS,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
	/// Logs go to stderr when unset.
	pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}

	/// Case-insensitive level name; `warning` is accepted for `warn`.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"error" => Some(LogLevel::Error),
			"warn" | "warning" => Some(LogLevel::Warn),
			"info" => Some(LogLevel::Info),
			"debug" => Some(LogLevel::Debug),
			"trace" => Some(LogLevel::Trace),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Compact,
	Json,
}

impl LogFormat {
	fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"pretty" => Some(LogFormat::Pretty),
			"compact" => Some(LogFormat::Compact),
			"json" => Some(LogFormat::Json),
			_ => None,
		}
	}
}

impl AutogitConfig {
	/// Fill defaults into a merged layer.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			workflow: build_workflow_config(layer.workflow),
			generator: build_generator_config(layer.generator),
			logging: build_logging_config(layer.logging)?,
			paths,
		})
	}

	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}
}

impl Default for AutogitConfig {
	fn default() -> Self {
		Self {
			workflow: WorkflowConfig::default(),
			generator: GeneratorConfig::default(),
			logging: LoggingConfig::default(),
			paths: PathsConfig::default(),
		}
	}
}

fn build_workflow_config(layer: Option<WorkflowLayer>) -> WorkflowConfig {
	let layer = layer.unwrap_or_default();
	let defaults = WorkflowConfig::default();
	WorkflowConfig {
		preferred_remote: layer
			.preferred_remote
			.map(|r| r.trim().to_string())
			.unwrap_or(defaults.preferred_remote),
		auto_stage: layer.auto_stage.unwrap_or(defaults.auto_stage),
		push_after_commit: layer.push_after_commit.unwrap_or(defaults.push_after_commit),
		confirm_before_push: layer
			.confirm_before_push
			.unwrap_or(defaults.confirm_before_push),
		message_style: layer
			.message_style
			.map(|s| s.trim().to_ascii_lowercase())
			.unwrap_or(defaults.message_style),
		include_scope: layer.include_scope.unwrap_or(defaults.include_scope),
		quick_mode: layer.quick_mode.unwrap_or(defaults.quick_mode),
		close_delay_ms: layer.close_delay_ms.unwrap_or(defaults.close_delay_ms),
	}
}

fn build_generator_config(layer: Option<GeneratorLayer>) -> GeneratorConfig {
	let layer = layer.unwrap_or_default();
	let defaults = GeneratorConfig::default();
	GeneratorConfig {
		// A blank command means "no generator".
		command: layer
			.command
			.map(|c| c.trim().to_string())
			.filter(|c| !c.is_empty()),
		args: layer.args.unwrap_or(defaults.args),
		max_diff_bytes: layer.max_diff_bytes.unwrap_or(defaults.max_diff_bytes),
		timeout_secs: layer.timeout_secs.unwrap_or(defaults.timeout_secs),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> Result<LoggingConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	let level = match layer.level.as_deref() {
		Some(raw) => LogLevel::parse(raw).ok_or_else(|| {
			ConfigError::invalid_value(
				"logging.level",
				format!("'{raw}' is not one of error, warn, info, debug, trace"),
			)
		})?,
		None => LogLevel::default(),
	};
	let format = match layer.format.as_deref() {
		Some(raw) => LogFormat::parse(raw).ok_or_else(|| {
			ConfigError::invalid_value(
				"logging.format",
				format!("'{raw}' is not one of pretty, compact, json"),
			)
		})?,
		None => LogFormat::default(),
	};
	Ok(LoggingConfig {
		level,
		format,
		file: layer.file,
	})
}
