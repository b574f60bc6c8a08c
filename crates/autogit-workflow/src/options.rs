// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shape of generated commit messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
	/// `type(scope): summary`.
	#[default]
	Conventional,
	/// A single plain sentence.
	Simple,
	/// Subject line, blank line, wrapped body.
	Detailed,
}

impl MessageStyle {
	pub const ALL: [MessageStyle; 3] = [
		MessageStyle::Conventional,
		MessageStyle::Simple,
		MessageStyle::Detailed,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			MessageStyle::Conventional => "conventional",
			MessageStyle::Simple => "simple",
			MessageStyle::Detailed => "detailed",
		}
	}
}

impl fmt::Display for MessageStyle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for MessageStyle {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		MessageStyle::ALL
			.into_iter()
			.find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| {
				format!("unknown message style '{s}' (expected conventional, simple or detailed)")
			})
	}
}

/// Read-only settings a workflow receives when it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowOptions {
	pub preferred_remote: String,
	pub auto_stage: bool,
	pub push_after_commit: bool,
	pub confirm_before_push: bool,
	pub message_style: MessageStyle,
	pub include_scope: bool,
	/// Skips the branch prompt and the final confirmation.
	pub quick_mode: bool,
	/// How long the session stays visible after a run ends.
	pub close_delay: Duration,
}

impl Default for WorkflowOptions {
	fn default() -> Self {
		Self {
			preferred_remote: "origin".to_string(),
			auto_stage: true,
			push_after_commit: true,
			confirm_before_push: true,
			message_style: MessageStyle::Conventional,
			include_scope: true,
			quick_mode: false,
			close_delay: Duration::from_millis(1500),
		}
	}
}

impl WorkflowOptions {
	pub fn with_preferred_remote(mut self, remote: impl Into<String>) -> Self {
		self.preferred_remote = remote.into();
		self
	}

	pub fn with_auto_stage(mut self, enabled: bool) -> Self {
		self.auto_stage = enabled;
		self
	}

	pub fn with_push_after_commit(mut self, enabled: bool) -> Self {
		self.push_after_commit = enabled;
		self
	}

	pub fn with_confirm_before_push(mut self, enabled: bool) -> Self {
		self.confirm_before_push = enabled;
		self
	}

	pub fn with_message_style(mut self, style: MessageStyle) -> Self {
		self.message_style = style;
		self
	}

	pub fn with_include_scope(mut self, enabled: bool) -> Self {
		self.include_scope = enabled;
		self
	}

	pub fn with_quick_mode(mut self, enabled: bool) -> Self {
		self.quick_mode = enabled;
		self
	}

	pub fn with_close_delay(mut self, delay: Duration) -> Self {
		self.close_delay = delay;
		self
	}
}
