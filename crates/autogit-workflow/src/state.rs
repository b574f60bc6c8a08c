// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

/// Mutable record threaded through the steps of one workflow run. Created at
/// start, dropped at the end; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkflowSession {
	pub repo_path: PathBuf,
	pub current_branch: String,
	/// Branch chosen at the branch prompt. Applied only after the commit.
	pub target_branch: String,
	pub commit_message: String,
	pub selected_remote: Option<String>,
	pub confirmed: bool,
}

impl WorkflowSession {
	pub fn new(repo_path: impl Into<PathBuf>) -> Self {
		Self {
			repo_path: repo_path.into(),
			..Default::default()
		}
	}

	/// True when the user picked a branch other than the one checked out.
	pub fn needs_branch_switch(&self) -> bool {
		!self.target_branch.is_empty() && self.target_branch != self.current_branch
	}
}
