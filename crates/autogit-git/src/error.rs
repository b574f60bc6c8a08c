// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io;
use thiserror::Error;

/// Outcome of a repository operation: `Ok(data)` on success, `Err` carrying
/// the tool's own error text otherwise.
pub type OperationResult<T> = Result<T, GitError>;

#[derive(Debug, Error)]
pub enum GitError {
	#[error("not a git repository: {0}")]
	NotARepository(String),

	/// The tool ran and exited non-zero. `message` is the trimmed stderr, or a
	/// generic `<tool> command failed with code <N>` when stderr was empty.
	#[error("{message}")]
	CommandFailed {
		cmd: String,
		args: Vec<String>,
		code: Option<i32>,
		message: String,
	},

	/// The tool could not be started at all.
	#[error("failed to run {cmd}: {source}")]
	Launch {
		cmd: String,
		#[source]
		source: io::Error,
	},

	#[error("invalid branch name '{name}': {reason}")]
	InvalidBranchName { name: String, reason: String },

	#[error("commit message cannot be empty")]
	EmptyCommitMessage,

	#[error("remote URL cannot be empty")]
	EmptyRemoteUrl,

	#[error("invalid remote name '{0}'")]
	InvalidRemoteName(String),
}

impl GitError {
	/// True for failures detected before the tool was invoked.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			GitError::InvalidBranchName { .. }
				| GitError::EmptyCommitMessage
				| GitError::EmptyRemoteUrl
				| GitError::InvalidRemoteName(_)
		)
	}

	/// Builds the error a mock or test double reports for a failed command.
	pub fn command_failed(args: &[&str], message: impl Into<String>) -> Self {
		GitError::CommandFailed {
			cmd: "git".to_string(),
			args: args.iter().map(|s| s.to_string()).collect(),
			code: Some(1),
			message: message.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_failure_displays_tool_text_verbatim() {
		let err = GitError::command_failed(&["push"], "! [rejected] main -> main (fetch first)");
		assert_eq!(err.to_string(), "! [rejected] main -> main (fetch first)");
		assert!(!err.is_validation());
	}

	#[test]
	fn validation_errors_are_flagged() {
		assert!(GitError::EmptyCommitMessage.is_validation());
		assert!(GitError::EmptyRemoteUrl.is_validation());
		assert!(GitError::InvalidBranchName {
			name: "a b".to_string(),
			reason: "contains whitespace".to_string(),
		}
		.is_validation());
	}
}
