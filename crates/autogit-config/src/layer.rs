// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Partial configuration layer. Every field is optional so layers from
//! different sources can be stacked.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub workflow: Option<WorkflowLayer>,
	#[serde(default)]
	pub generator: Option<GeneratorLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkflowLayer {
	#[serde(default)]
	pub preferred_remote: Option<String>,
	#[serde(default)]
	pub auto_stage: Option<bool>,
	#[serde(default)]
	pub push_after_commit: Option<bool>,
	#[serde(default)]
	pub confirm_before_push: Option<bool>,
	#[serde(default)]
	pub message_style: Option<String>,
	#[serde(default)]
	pub include_scope: Option<bool>,
	#[serde(default)]
	pub quick_mode: Option<bool>,
	#[serde(default)]
	pub close_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratorLayer {
	#[serde(default)]
	pub command: Option<String>,
	#[serde(default)]
	pub args: Option<Vec<String>>,
	#[serde(default)]
	pub max_diff_bytes: Option<usize>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
	#[serde(default)]
	pub file: Option<PathBuf>,
}

impl ConfigLayer {
	/// Overlay `other` on top of `self`. Fields set in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.workflow, other.workflow, WorkflowLayer::merge);
		merge_option(&mut self.generator, other.generator, GeneratorLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub(crate) fn workflow_mut(&mut self) -> &mut WorkflowLayer {
		self.workflow.get_or_insert_with(WorkflowLayer::default)
	}

	pub(crate) fn generator_mut(&mut self) -> &mut GeneratorLayer {
		self.generator.get_or_insert_with(GeneratorLayer::default)
	}

	pub(crate) fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn overlay<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

impl WorkflowLayer {
	fn merge(&mut self, other: WorkflowLayer) {
		overlay(&mut self.preferred_remote, other.preferred_remote);
		overlay(&mut self.auto_stage, other.auto_stage);
		overlay(&mut self.push_after_commit, other.push_after_commit);
		overlay(&mut self.confirm_before_push, other.confirm_before_push);
		overlay(&mut self.message_style, other.message_style);
		overlay(&mut self.include_scope, other.include_scope);
		overlay(&mut self.quick_mode, other.quick_mode);
		overlay(&mut self.close_delay_ms, other.close_delay_ms);
	}
}

impl GeneratorLayer {
	fn merge(&mut self, other: GeneratorLayer) {
		overlay(&mut self.command, other.command);
		overlay(&mut self.args, other.args);
		overlay(&mut self.max_diff_bytes, other.max_diff_bytes);
		overlay(&mut self.timeout_secs, other.timeout_secs);
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		overlay(&mut self.level, other.level);
		overlay(&mut self.format, other.format);
		overlay(&mut self.file, other.file);
	}
}
