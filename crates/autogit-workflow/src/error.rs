// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::time::Duration;

use autogit_git::GitError;
use autogit_session::SessionError;
use thiserror::Error;

/// Why a workflow stopped short of completing.
#[derive(Debug, Error)]
pub enum WorkflowError {
	/// Missing tool or workspace. Reported once, no recovery.
	#[error("{0}")]
	Environment(String),

	/// Bad input caught before the tool was invoked.
	#[error("{0}")]
	Validation(String),

	/// The tool ran and failed.
	#[error(transparent)]
	Operation(GitError),

	#[error("session error: {0}")]
	Session(#[from] SessionError),

	/// A defect: a panic or an impossible state.
	#[error("internal error: {0}")]
	Internal(String),
}

impl From<GitError> for WorkflowError {
	fn from(err: GitError) -> Self {
		if err.is_validation() {
			WorkflowError::Validation(err.to_string())
		} else {
			WorkflowError::Operation(err)
		}
	}
}

/// Failures of the message generator. Always recoverable by the workflow.
#[derive(Debug, Error)]
pub enum GeneratorError {
	#[error("no message generator configured")]
	NotConfigured,

	#[error("generator command '{0}' not found on PATH")]
	NotFound(String),

	#[error("failed to run generator: {0}")]
	Launch(#[from] std::io::Error),

	#[error("generator timed out after {0:?}")]
	Timeout(Duration),

	#[error("generator exited with code {code:?}: {stderr}")]
	Failed { code: Option<i32>, stderr: String },

	#[error("generator returned no usable text")]
	EmptyOutput,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn git_validation_errors_become_validation() {
		let err: WorkflowError = GitError::EmptyCommitMessage.into();
		assert!(matches!(err, WorkflowError::Validation(_)));
		assert_eq!(err.to_string(), "commit message cannot be empty");
	}

	#[test]
	fn git_command_failures_keep_tool_text() {
		let err: WorkflowError = GitError::command_failed(&["push"], "! [rejected]").into();
		assert!(matches!(err, WorkflowError::Operation(_)));
		assert_eq!(err.to_string(), "! [rejected]");
	}
}
