// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use autogit_git::GitError;
use autogit_session::SessionError;

use crate::classify::ConflictKind;
use crate::error::WorkflowError;
use crate::notify::NotificationLevel;

/// How a workflow run ended.
#[derive(Debug)]
pub enum WorkflowOutcome {
	Committed {
		sha: String,
		/// Branch checked out when the run ended.
		branch: String,
		pushed: bool,
	},
	Synced {
		remote: String,
		branch: String,
		pushed: bool,
	},
	/// The working tree was clean.
	NothingToCommit,
	/// The user answered "no" at a confirmation.
	Declined,
	/// Ctrl-C, or the session closed under the workflow.
	Cancelled,
	/// Git stopped on a conflict the user must resolve.
	Conflict { kind: ConflictKind },
	Failed(WorkflowError),
	/// Another run was in flight; this trigger was dropped.
	Skipped,
}

impl WorkflowOutcome {
	/// Completed, nothing to do, or declined by the user.
	pub fn is_success(&self) -> bool {
		matches!(
			self,
			WorkflowOutcome::Committed { .. }
				| WorkflowOutcome::Synced { .. }
				| WorkflowOutcome::NothingToCommit
				| WorkflowOutcome::Declined
		)
	}

	/// Conflicts and defects leave the terminal up so the output stays
	/// readable.
	pub fn keeps_session_open(&self) -> bool {
		matches!(
			self,
			WorkflowOutcome::Conflict { .. } | WorkflowOutcome::Failed(WorkflowError::Internal(_))
		)
	}

	pub fn exit_code(&self) -> i32 {
		if self.is_success() {
			0
		} else {
			1
		}
	}

	pub fn level(&self) -> NotificationLevel {
		match self {
			WorkflowOutcome::Conflict { .. } | WorkflowOutcome::Skipped => NotificationLevel::Warning,
			WorkflowOutcome::Failed(_) => NotificationLevel::Error,
			_ => NotificationLevel::Info,
		}
	}

	/// One-line description for notifications and the final session line.
	pub fn summary(&self) -> String {
		match self {
			WorkflowOutcome::Committed {
				sha, branch, pushed, ..
			} => {
				let pushed = if *pushed { " and pushed" } else { "" };
				format!("Committed {} on {branch}{pushed}", short_sha(sha))
			}
			WorkflowOutcome::Synced {
				remote,
				branch,
				pushed,
			} => {
				let pushed = if *pushed { " and pushed back" } else { "" };
				format!("Pulled {remote}/{branch}{pushed}")
			}
			WorkflowOutcome::NothingToCommit => "Nothing to commit".to_string(),
			WorkflowOutcome::Declined => "Stopped at your request".to_string(),
			WorkflowOutcome::Cancelled => "Cancelled".to_string(),
			WorkflowOutcome::Conflict { kind } => {
				format!("Stopped on a {kind}; resolve it and run again")
			}
			WorkflowOutcome::Failed(e) => {
				let text = e.to_string();
				let first = text.lines().next().unwrap_or("").trim();
				format!("Failed: {first}")
			}
			WorkflowOutcome::Skipped => "Skipped: another workflow is running".to_string(),
		}
	}
}

pub fn short_sha(sha: &str) -> &str {
	sha.get(..7).unwrap_or(sha)
}

/// Early exit from a step. Carries the outcome the run ends with.
#[derive(Debug)]
pub(crate) struct Halt(pub(crate) WorkflowOutcome);

impl From<WorkflowOutcome> for Halt {
	fn from(outcome: WorkflowOutcome) -> Self {
		Halt(outcome)
	}
}

impl From<WorkflowError> for Halt {
	fn from(err: WorkflowError) -> Self {
		match err {
			WorkflowError::Session(e) => e.into(),
			other => Halt(WorkflowOutcome::Failed(other)),
		}
	}
}

impl From<GitError> for Halt {
	fn from(err: GitError) -> Self {
		WorkflowError::from(err).into()
	}
}

impl From<SessionError> for Halt {
	fn from(err: SessionError) -> Self {
		if err.is_cancellation() {
			Halt(WorkflowOutcome::Cancelled)
		} else {
			Halt(WorkflowOutcome::Failed(WorkflowError::Session(err)))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exit_codes() {
		assert_eq!(WorkflowOutcome::NothingToCommit.exit_code(), 0);
		assert_eq!(WorkflowOutcome::Declined.exit_code(), 0);
		assert_eq!(WorkflowOutcome::Cancelled.exit_code(), 1);
		assert_eq!(
			WorkflowOutcome::Conflict {
				kind: ConflictKind::Merge
			}
			.exit_code(),
			1
		);
	}

	#[test]
	fn only_conflicts_and_defects_keep_session_open() {
		assert!(WorkflowOutcome::Conflict {
			kind: ConflictKind::Rebase
		}
		.keeps_session_open());
		assert!(WorkflowOutcome::Failed(WorkflowError::Internal("x".into())).keeps_session_open());
		assert!(!WorkflowOutcome::Failed(WorkflowError::Validation("x".into())).keeps_session_open());
		assert!(!WorkflowOutcome::Cancelled.keeps_session_open());
	}

	#[test]
	fn session_cancellation_halts_as_cancelled() {
		let Halt(outcome) = SessionError::Cancelled.into();
		assert!(matches!(outcome, WorkflowOutcome::Cancelled));
		let Halt(outcome) = WorkflowError::Session(SessionError::Closed).into();
		assert!(matches!(outcome, WorkflowOutcome::Cancelled));
	}

	#[test]
	fn summary_uses_first_error_line() {
		let err = GitError::command_failed(&["push"], "fatal: denied\nmore detail");
		let outcome = WorkflowOutcome::Failed(err.into());
		assert_eq!(outcome.summary(), "Failed: fatal: denied");
	}

	#[test]
	fn committed_summary_shortens_sha() {
		let outcome = WorkflowOutcome::Committed {
			sha: "abc123def456".to_string(),
			branch: "main".to_string(),
			pushed: true,
		};
		assert_eq!(outcome.summary(), "Committed abc123d on main and pushed");
	}
}
