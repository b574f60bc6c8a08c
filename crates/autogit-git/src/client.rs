// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::OperationResult;
use crate::types::{DiffContext, PullOptions, RemoteDescriptor, RepositoryStatus};

/// Trait abstracting git operations for testability.
#[async_trait]
pub trait GitClient: Send + Sync {
	/// Version string of the tool; fails when the tool is not usable.
	async fn tool_version(&self) -> OperationResult<String>;

	/// Check if the path is inside a git repository.
	async fn is_repository(&self, path: &Path) -> bool;

	/// Top-level directory of the repository containing `path`.
	async fn repository_root(&self, path: &Path) -> OperationResult<PathBuf>;

	/// Create an empty repository at `path`.
	async fn init(&self, path: &Path) -> OperationResult<()>;

	/// Current branch name. Detached HEAD is reported as a descriptive string,
	/// not an error.
	async fn current_branch(&self, path: &Path) -> OperationResult<String>;

	async fn list_branches(&self, path: &Path) -> OperationResult<Vec<String>>;

	async fn checkout(&self, path: &Path, branch: &str) -> OperationResult<()>;

	/// Create `branch` from HEAD and switch to it. Invalid names are rejected
	/// before the tool runs.
	async fn create_and_checkout(&self, path: &Path, branch: &str) -> OperationResult<()>;

	async fn remotes(&self, path: &Path) -> OperationResult<Vec<RemoteDescriptor>>;

	async fn add_remote(&self, path: &Path, name: &str, url: &str) -> OperationResult<()>;

	async fn status(&self, path: &Path) -> OperationResult<RepositoryStatus>;

	/// Staged diff followed by the unstaged diff.
	async fn diff(&self, path: &Path) -> OperationResult<String>;

	/// Stage all changes in the repository, including untracked files.
	async fn stage_all(&self, path: &Path) -> OperationResult<()>;

	async fn stage_files(&self, path: &Path, files: &[String]) -> OperationResult<()>;

	/// Create a commit with the given message and return its SHA.
	async fn commit(&self, path: &Path, message: &str) -> OperationResult<String>;

	/// Whether `branch` already tracks a remote branch.
	async fn has_upstream(&self, path: &Path, branch: &str) -> bool;

	/// Commits on `branch` not yet on the remote-tracking `remote/branch`.
	/// `None` when there is no remote-tracking ref to compare against.
	async fn commits_ahead(
		&self,
		path: &Path,
		remote: &str,
		branch: &str,
	) -> OperationResult<Option<usize>>;

	async fn push(
		&self,
		path: &Path,
		remote: &str,
		branch: &str,
		set_upstream: bool,
	) -> OperationResult<String>;

	async fn fetch(&self, path: &Path, remote: &str) -> OperationResult<()>;

	async fn pull(
		&self,
		path: &Path,
		remote: &str,
		branch: &str,
		options: PullOptions,
	) -> OperationResult<String>;

	/// Reads status, diff and branch concurrently and assembles the context a
	/// message generator needs. Fails if any of the three reads fails.
	async fn diff_context(&self, path: &Path) -> OperationResult<DiffContext> {
		let (status, diff, branch) =
			futures::try_join!(self.status(path), self.diff(path), self.current_branch(path))?;
		Ok(DiffContext::new(status, diff, branch))
	}
}
