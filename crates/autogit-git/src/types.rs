// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

/// Working tree state, split by the column that reported the change.
///
/// Always computed fresh from `git status`; a file may sit in both
/// `staged` and `unstaged` when only part of its edits are in the index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
	pub staged: Vec<String>,
	pub unstaged: Vec<String>,
	pub untracked: Vec<String>,
}

impl RepositoryStatus {
	/// True iff any of the three lists is non-empty.
	pub fn has_changes(&self) -> bool {
		!self.staged.is_empty() || !self.unstaged.is_empty() || !self.untracked.is_empty()
	}

	/// Sum of the three list lengths.
	pub fn files_changed(&self) -> usize {
		self.staged.len() + self.unstaged.len() + self.untracked.len()
	}
}

/// Everything a message generator gets to look at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffContext {
	pub status: RepositoryStatus,
	/// Staged diff followed by the unstaged diff.
	pub diff: String,
	pub branch: String,
	pub files_changed: usize,
}

impl DiffContext {
	pub fn new(status: RepositoryStatus, diff: String, branch: String) -> Self {
		let files_changed = status.files_changed();
		Self {
			status,
			diff,
			branch,
			files_changed,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteDirection {
	Fetch,
	Push,
}

impl fmt::Display for RemoteDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RemoteDirection::Fetch => f.write_str("fetch"),
			RemoteDirection::Push => f.write_str("push"),
		}
	}
}

/// One line of `git remote -v`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteDescriptor {
	pub name: String,
	pub url: String,
	pub direction: RemoteDirection,
}

impl RemoteDescriptor {
	pub fn new(name: impl Into<String>, url: impl Into<String>, direction: RemoteDirection) -> Self {
		Self {
			name: name.into(),
			url: url.into(),
			direction,
		}
	}
}

/// Distinct remote names, in listing order.
pub fn remote_names(remotes: &[RemoteDescriptor]) -> Vec<String> {
	let mut names: Vec<String> = Vec::new();
	for remote in remotes {
		if !names.iter().any(|n| n == &remote.name) {
			names.push(remote.name.clone());
		}
	}
	names
}

/// True for the synthesized name `current_branch` reports on a detached HEAD.
pub fn is_detached_head(branch: &str) -> bool {
	branch.starts_with("(detached at ")
}

/// Flags for `git pull`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PullOptions {
	pub rebase: bool,
	pub allow_unrelated_histories: bool,
}

impl PullOptions {
	pub fn merge() -> Self {
		Self::default()
	}

	pub fn rebase() -> Self {
		Self {
			rebase: true,
			allow_unrelated_histories: false,
		}
	}

	pub fn allowing_unrelated_histories(mut self) -> Self {
		self.allow_unrelated_histories = true;
		self
	}
}
