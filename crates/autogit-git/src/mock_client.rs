// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::GitClient;
use crate::error::{GitError, OperationResult};
use crate::types::{PullOptions, RemoteDescriptor, RemoteDirection, RepositoryStatus};
use crate::validate::{
	validate_branch_name, validate_commit_message, validate_remote_name, validate_remote_url,
};

/// Recorded call to the mock git client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
	ToolVersion,
	IsRepository,
	RepositoryRoot,
	Init,
	CurrentBranch,
	ListBranches,
	Checkout(String),
	CreateAndCheckout(String),
	Remotes,
	AddRemote { name: String, url: String },
	Status,
	Diff,
	StageAll,
	StageFiles(Vec<String>),
	Commit(String),
	HasUpstream(String),
	CommitsAhead { remote: String, branch: String },
	Push {
		remote: String,
		branch: String,
		set_upstream: bool,
	},
	Fetch(String),
	Pull {
		remote: String,
		branch: String,
		options: PullOptions,
	},
}

#[derive(Default)]
struct MockState {
	is_repo: bool,
	branch: String,
	branches: Vec<String>,
	remotes: Vec<RemoteDescriptor>,
	status: RepositoryStatus,
	push_results: VecDeque<Result<String, String>>,
	pull_results: VecDeque<Result<String, String>>,
}

/// Mock git client for testing.
///
/// Push and pull answers are scripted as queues; once a queue is drained the
/// operation succeeds.
#[derive(Clone)]
pub struct MockGitClient {
	/// Whether tool_version succeeds.
	pub tool_available: bool,
	/// Diff text returned from diff.
	pub diff_text: String,
	/// Whether has_upstream returns true.
	pub upstream: bool,
	/// Answer from commits_ahead. `None` means no remote-tracking ref.
	pub ahead: Option<usize>,
	/// If set, commit returns this error.
	pub commit_error: Option<String>,
	/// If set, checkout and create_and_checkout return this error.
	pub checkout_error: Option<String>,
	/// If set, fetch returns this error.
	pub fetch_error: Option<String>,
	/// If set, status returns this error.
	pub status_error: Option<String>,
	/// SHA to return from commit.
	pub commit_sha: String,
	state: Arc<Mutex<MockState>>,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGitClient {
	pub fn new() -> Self {
		Self {
			tool_available: true,
			diff_text: String::new(),
			upstream: false,
			ahead: None,
			commit_error: None,
			checkout_error: None,
			fetch_error: None,
			status_error: None,
			commit_sha: "abc123def456789012345678901234567890abcd".to_string(),
			state: Arc::new(Mutex::new(MockState {
				is_repo: true,
				branch: "main".to_string(),
				branches: vec!["main".to_string()],
				..Default::default()
			})),
			calls: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn without_tool(mut self) -> Self {
		self.tool_available = false;
		self
	}

	pub fn not_a_repo(self) -> Self {
		self.state.lock().unwrap().is_repo = false;
		self
	}

	pub fn with_branch(self, branch: impl Into<String>) -> Self {
		{
			let mut state = self.state.lock().unwrap();
			let branch = branch.into();
			if !state.branches.contains(&branch) {
				state.branches.push(branch.clone());
			}
			state.branch = branch;
		}
		self
	}

	pub fn with_branches(self, branches: &[&str]) -> Self {
		self.state.lock().unwrap().branches = branches.iter().map(|b| b.to_string()).collect();
		self
	}

	pub fn with_status(self, status: RepositoryStatus) -> Self {
		self.state.lock().unwrap().status = status;
		self
	}

	pub fn with_untracked(self, files: &[&str]) -> Self {
		self.with_status(RepositoryStatus {
			untracked: files.iter().map(|f| f.to_string()).collect(),
			..Default::default()
		})
	}

	/// Adds a remote with both fetch and push entries.
	pub fn with_remote(self, name: &str, url: &str) -> Self {
		{
			let mut state = self.state.lock().unwrap();
			state
				.remotes
				.push(RemoteDescriptor::new(name, url, RemoteDirection::Fetch));
			state
				.remotes
				.push(RemoteDescriptor::new(name, url, RemoteDirection::Push));
		}
		self
	}

	pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
		self.diff_text = diff.into();
		self
	}

	pub fn with_upstream(mut self) -> Self {
		self.upstream = true;
		self
	}

	pub fn with_commits_ahead(mut self, count: usize) -> Self {
		self.ahead = Some(count);
		self
	}

	pub fn with_commit_error(mut self, error: impl Into<String>) -> Self {
		self.commit_error = Some(error.into());
		self
	}

	pub fn with_checkout_error(mut self, error: impl Into<String>) -> Self {
		self.checkout_error = Some(error.into());
		self
	}

	pub fn with_fetch_error(mut self, error: impl Into<String>) -> Self {
		self.fetch_error = Some(error.into());
		self
	}

	pub fn with_status_error(mut self, error: impl Into<String>) -> Self {
		self.status_error = Some(error.into());
		self
	}

	pub fn with_commit_sha(mut self, sha: impl Into<String>) -> Self {
		self.commit_sha = sha.into();
		self
	}

	/// Queues the next push answer: `Ok(stdout)` or `Err(stderr)`.
	pub fn push_result(self, result: Result<&str, &str>) -> Self {
		self
			.state
			.lock()
			.unwrap()
			.push_results
			.push_back(result.map(str::to_string).map_err(str::to_string));
		self
	}

	/// Queues the next pull answer: `Ok(stdout)` or `Err(stderr)`.
	pub fn pull_result(self, result: Result<&str, &str>) -> Self {
		self
			.state
			.lock()
			.unwrap()
			.pull_results
			.push_back(result.map(str::to_string).map_err(str::to_string));
		self
	}

	/// Returns the recorded calls.
	pub fn get_calls(&self) -> Vec<MockCall> {
		self.calls.lock().unwrap().clone()
	}

	/// Clears recorded calls.
	pub fn clear_calls(&self) {
		self.calls.lock().unwrap().clear();
	}

	/// Number of recorded calls matching `predicate`.
	pub fn count_calls(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
		self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
	}

	fn record(&self, call: MockCall) {
		self.calls.lock().unwrap().push(call);
	}
}

impl Default for MockGitClient {
	fn default() -> Self {
		Self::new()
	}
}

fn scripted(result: Option<Result<String, String>>, args: &[&str]) -> OperationResult<String> {
	match result {
		None => Ok(String::new()),
		Some(Ok(out)) => Ok(out),
		Some(Err(stderr)) => Err(GitError::command_failed(args, stderr)),
	}
}

#[async_trait]
impl GitClient for MockGitClient {
	async fn tool_version(&self) -> OperationResult<String> {
		self.record(MockCall::ToolVersion);
		if self.tool_available {
			Ok("git version 2.43.0".to_string())
		} else {
			Err(GitError::Launch {
				cmd: "git".to_string(),
				source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
			})
		}
	}

	async fn is_repository(&self, _path: &Path) -> bool {
		self.record(MockCall::IsRepository);
		self.state.lock().unwrap().is_repo
	}

	async fn repository_root(&self, path: &Path) -> OperationResult<PathBuf> {
		self.record(MockCall::RepositoryRoot);
		if self.state.lock().unwrap().is_repo {
			Ok(path.to_path_buf())
		} else {
			Err(GitError::NotARepository(path.display().to_string()))
		}
	}

	async fn init(&self, _path: &Path) -> OperationResult<()> {
		self.record(MockCall::Init);
		self.state.lock().unwrap().is_repo = true;
		Ok(())
	}

	async fn current_branch(&self, _path: &Path) -> OperationResult<String> {
		self.record(MockCall::CurrentBranch);
		Ok(self.state.lock().unwrap().branch.clone())
	}

	async fn list_branches(&self, _path: &Path) -> OperationResult<Vec<String>> {
		self.record(MockCall::ListBranches);
		Ok(self.state.lock().unwrap().branches.clone())
	}

	async fn checkout(&self, _path: &Path, branch: &str) -> OperationResult<()> {
		self.record(MockCall::Checkout(branch.to_string()));
		validate_branch_name(branch)?;
		if let Some(ref error) = self.checkout_error {
			return Err(GitError::command_failed(&["checkout", branch], error.clone()));
		}
		self.state.lock().unwrap().branch = branch.to_string();
		Ok(())
	}

	async fn create_and_checkout(&self, _path: &Path, branch: &str) -> OperationResult<()> {
		self.record(MockCall::CreateAndCheckout(branch.to_string()));
		validate_branch_name(branch)?;
		if let Some(ref error) = self.checkout_error {
			return Err(GitError::command_failed(
				&["checkout", "-b", branch],
				error.clone(),
			));
		}
		let mut state = self.state.lock().unwrap();
		state.branches.push(branch.to_string());
		state.branch = branch.to_string();
		Ok(())
	}

	async fn remotes(&self, _path: &Path) -> OperationResult<Vec<RemoteDescriptor>> {
		self.record(MockCall::Remotes);
		Ok(self.state.lock().unwrap().remotes.clone())
	}

	async fn add_remote(&self, _path: &Path, name: &str, url: &str) -> OperationResult<()> {
		self.record(MockCall::AddRemote {
			name: name.to_string(),
			url: url.to_string(),
		});
		validate_remote_name(name)?;
		validate_remote_url(url)?;
		let mut state = self.state.lock().unwrap();
		state
			.remotes
			.push(RemoteDescriptor::new(name, url, RemoteDirection::Fetch));
		state
			.remotes
			.push(RemoteDescriptor::new(name, url, RemoteDirection::Push));
		Ok(())
	}

	async fn status(&self, _path: &Path) -> OperationResult<RepositoryStatus> {
		self.record(MockCall::Status);
		if let Some(ref error) = self.status_error {
			return Err(GitError::command_failed(&["status"], error.clone()));
		}
		Ok(self.state.lock().unwrap().status.clone())
	}

	async fn diff(&self, _path: &Path) -> OperationResult<String> {
		self.record(MockCall::Diff);
		Ok(self.diff_text.clone())
	}

	async fn stage_all(&self, _path: &Path) -> OperationResult<()> {
		self.record(MockCall::StageAll);
		Ok(())
	}

	async fn stage_files(&self, _path: &Path, files: &[String]) -> OperationResult<()> {
		self.record(MockCall::StageFiles(files.to_vec()));
		Ok(())
	}

	async fn commit(&self, _path: &Path, message: &str) -> OperationResult<String> {
		self.record(MockCall::Commit(message.to_string()));
		validate_commit_message(message)?;
		if let Some(ref error) = self.commit_error {
			return Err(GitError::command_failed(
				&["commit", "-m", message],
				error.clone(),
			));
		}
		self.state.lock().unwrap().status = RepositoryStatus::default();
		Ok(self.commit_sha.clone())
	}

	async fn has_upstream(&self, _path: &Path, branch: &str) -> bool {
		self.record(MockCall::HasUpstream(branch.to_string()));
		self.upstream
	}

	async fn commits_ahead(
		&self,
		_path: &Path,
		remote: &str,
		branch: &str,
	) -> OperationResult<Option<usize>> {
		self.record(MockCall::CommitsAhead {
			remote: remote.to_string(),
			branch: branch.to_string(),
		});
		Ok(self.ahead)
	}

	async fn push(
		&self,
		_path: &Path,
		remote: &str,
		branch: &str,
		set_upstream: bool,
	) -> OperationResult<String> {
		self.record(MockCall::Push {
			remote: remote.to_string(),
			branch: branch.to_string(),
			set_upstream,
		});
		let next = self.state.lock().unwrap().push_results.pop_front();
		scripted(next, &["push", remote, branch])
	}

	async fn fetch(&self, _path: &Path, remote: &str) -> OperationResult<()> {
		self.record(MockCall::Fetch(remote.to_string()));
		if let Some(ref error) = self.fetch_error {
			return Err(GitError::command_failed(&["fetch", remote], error.clone()));
		}
		Ok(())
	}

	async fn pull(
		&self,
		_path: &Path,
		remote: &str,
		branch: &str,
		options: PullOptions,
	) -> OperationResult<String> {
		self.record(MockCall::Pull {
			remote: remote.to_string(),
			branch: branch.to_string(),
			options,
		});
		let next = self.state.lock().unwrap().pull_results.pop_front();
		scripted(next, &["pull", remote, branch])
	}
}
