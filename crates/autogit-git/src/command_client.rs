// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::client::GitClient;
use crate::error::{GitError, OperationResult};
use crate::parse::{parse_branches, parse_remotes, parse_status};
use crate::runner::ProcessRunner;
use crate::types::{PullOptions, RemoteDescriptor, RepositoryStatus};
use crate::validate::{
	validate_branch_name, validate_commit_message, validate_remote_name, validate_remote_url,
};

/// Git client implementation using the git CLI.
#[derive(Clone, Debug, Default)]
pub struct CommandGitClient {
	runner: ProcessRunner,
}

impl CommandGitClient {
	pub fn new() -> Self {
		Self {
			runner: ProcessRunner::git(),
		}
	}

	/// Uses a specific git executable instead of the one on `PATH`.
	pub fn with_runner(runner: ProcessRunner) -> Self {
		Self { runner }
	}

	async fn run(&self, path: &Path, args: &[&str]) -> OperationResult<String> {
		self.runner.run(path, args).await
	}
}

#[async_trait]
impl GitClient for CommandGitClient {
	async fn tool_version(&self) -> OperationResult<String> {
		let cwd = std::env::temp_dir();
		self.run(&cwd, &["--version"]).await
	}

	async fn is_repository(&self, path: &Path) -> bool {
		self
			.run(path, &["rev-parse", "--is-inside-work-tree"])
			.await
			.map(|out| out == "true")
			.unwrap_or(false)
	}

	async fn repository_root(&self, path: &Path) -> OperationResult<PathBuf> {
		let root = self
			.run(path, &["rev-parse", "--show-toplevel"])
			.await
			.map_err(|_| GitError::NotARepository(path.display().to_string()))?;
		Ok(PathBuf::from(root))
	}

	async fn init(&self, path: &Path) -> OperationResult<()> {
		self.run(path, &["init"]).await?;
		info!(path = %path.display(), "initialized repository");
		Ok(())
	}

	async fn current_branch(&self, path: &Path) -> OperationResult<String> {
		// symbolic-ref also works on an unborn branch, where rev-parse HEAD fails.
		if let Ok(branch) = self.run(path, &["symbolic-ref", "--quiet", "--short", "HEAD"]).await {
			if !branch.is_empty() {
				return Ok(branch);
			}
		}

		let sha = self.run(path, &["rev-parse", "--short", "HEAD"]).await?;
		debug!(path = %path.display(), sha = %sha, "detached HEAD state");
		Ok(format!("(detached at {sha})"))
	}

	async fn list_branches(&self, path: &Path) -> OperationResult<Vec<String>> {
		let output = self
			.run(path, &["branch", "--format=%(refname:short)"])
			.await?;
		Ok(parse_branches(&output))
	}

	async fn checkout(&self, path: &Path, branch: &str) -> OperationResult<()> {
		validate_branch_name(branch)?;
		self.run(path, &["checkout", branch]).await?;
		debug!(path = %path.display(), branch = %branch, "checked out branch");
		Ok(())
	}

	async fn create_and_checkout(&self, path: &Path, branch: &str) -> OperationResult<()> {
		validate_branch_name(branch)?;
		self.run(path, &["checkout", "-b", branch]).await?;
		debug!(path = %path.display(), branch = %branch, "created branch");
		Ok(())
	}

	async fn remotes(&self, path: &Path) -> OperationResult<Vec<RemoteDescriptor>> {
		let output = self.run(path, &["remote", "-v"]).await?;
		let remotes = parse_remotes(&output);
		debug!(path = %path.display(), count = remotes.len(), "listed remotes");
		Ok(remotes)
	}

	async fn add_remote(&self, path: &Path, name: &str, url: &str) -> OperationResult<()> {
		validate_remote_name(name)?;
		validate_remote_url(url)?;
		self.run(path, &["remote", "add", name, url.trim()]).await?;
		info!(path = %path.display(), remote = %name, "added remote");
		Ok(())
	}

	async fn status(&self, path: &Path) -> OperationResult<RepositoryStatus> {
		// -z keeps paths unquoted; raw output keeps the leading status column.
		let output = self
			.runner
			.run_raw(path, &["status", "--porcelain=v1", "-z"])
			.await?;
		let status = parse_status(&output);
		debug!(
				path = %path.display(),
				staged = status.staged.len(),
				unstaged = status.unstaged.len(),
				untracked = status.untracked.len(),
				"read status"
		);
		Ok(status)
	}

	async fn diff(&self, path: &Path) -> OperationResult<String> {
		let (staged, unstaged) = futures::try_join!(
			self.run(path, &["diff", "--cached"]),
			self.run(path, &["diff"])
		)?;

		let combined = match (staged.is_empty(), unstaged.is_empty()) {
			(true, _) => unstaged,
			(false, true) => staged,
			(false, false) => format!("{staged}\n{unstaged}"),
		};
		Ok(combined)
	}

	async fn stage_all(&self, path: &Path) -> OperationResult<()> {
		self.run(path, &["add", "-A"]).await?;
		debug!(path = %path.display(), "staged all changes");
		Ok(())
	}

	async fn stage_files(&self, path: &Path, files: &[String]) -> OperationResult<()> {
		if files.is_empty() {
			return Ok(());
		}
		let mut args = vec!["add", "--"];
		args.extend(files.iter().map(String::as_str));
		self.run(path, &args).await?;
		debug!(path = %path.display(), count = files.len(), "staged files");
		Ok(())
	}

	async fn commit(&self, path: &Path, message: &str) -> OperationResult<String> {
		validate_commit_message(message)?;
		self.run(path, &["commit", "-m", message]).await?;

		let sha = self.run(path, &["rev-parse", "HEAD"]).await?;

		debug!(path = %path.display(), sha = %sha, "created commit");
		Ok(sha)
	}

	async fn has_upstream(&self, path: &Path, branch: &str) -> bool {
		let spec = format!("{branch}@{{upstream}}");
		self
			.run(path, &["rev-parse", "--abbrev-ref", "--symbolic-full-name", &spec])
			.await
			.is_ok()
	}

	async fn commits_ahead(
		&self,
		path: &Path,
		remote: &str,
		branch: &str,
	) -> OperationResult<Option<usize>> {
		validate_remote_name(remote)?;
		validate_branch_name(branch)?;

		let tracking = format!("refs/remotes/{remote}/{branch}");
		if self
			.run(path, &["rev-parse", "--verify", "--quiet", &tracking])
			.await
			.is_err()
		{
			debug!(path = %path.display(), tracking = %tracking, "no remote-tracking ref");
			return Ok(None);
		}

		let range = format!("{tracking}..{branch}");
		let args = ["rev-list", "--count", range.as_str()];
		let output = self.run(path, &args).await?;
		let ahead = output.parse::<usize>().map_err(|_| {
			GitError::command_failed(&args, format!("unexpected commit count '{output}'"))
		})?;
		Ok(Some(ahead))
	}

	async fn push(
		&self,
		path: &Path,
		remote: &str,
		branch: &str,
		set_upstream: bool,
	) -> OperationResult<String> {
		validate_remote_name(remote)?;
		validate_branch_name(branch)?;

		let mut args = vec!["push"];
		if set_upstream {
			args.push("--set-upstream");
		}
		args.extend([remote, branch]);

		let output = self.run(path, &args).await?;
		info!(path = %path.display(), remote = %remote, branch = %branch, set_upstream, "pushed");
		Ok(output)
	}

	async fn fetch(&self, path: &Path, remote: &str) -> OperationResult<()> {
		validate_remote_name(remote)?;
		self.run(path, &["fetch", remote]).await?;
		debug!(path = %path.display(), remote = %remote, "fetched");
		Ok(())
	}

	async fn pull(
		&self,
		path: &Path,
		remote: &str,
		branch: &str,
		options: PullOptions,
	) -> OperationResult<String> {
		validate_remote_name(remote)?;
		validate_branch_name(branch)?;

		let mut args = vec!["pull"];
		args.push(if options.rebase { "--rebase" } else { "--no-rebase" });
		if options.allow_unrelated_histories {
			args.push("--allow-unrelated-histories");
		}
		args.extend([remote, branch]);

		let output = self.run(path, &args).await?;
		info!(
				path = %path.display(),
				remote = %remote,
				branch = %branch,
				rebase = options.rebase,
				allow_unrelated = options.allow_unrelated_histories,
				"pulled"
		);
		Ok(output)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use std::process::Command as StdCommand;
	use tempfile::TempDir;

	fn git(dir: &Path, args: &[&str]) -> String {
		let output = StdCommand::new("git")
			.args(args)
			.current_dir(dir)
			.output()
			.expect("git failed to start");
		String::from_utf8_lossy(&output.stdout).trim().to_string()
	}

	fn init_git_repo(dir: &Path) {
		git(dir, &["init", "-b", "main"]);
		git(dir, &["config", "user.email", "test@test.com"]);
		git(dir, &["config", "user.name", "Test"]);
		git(dir, &["config", "commit.gpgsign", "false"]);
	}

	fn create_initial_commit(dir: &Path) {
		fs::write(dir.join("README.md"), "# Test").expect("write failed");
		git(dir, &["add", "."]);
		git(dir, &["commit", "-m", "Initial commit"]);
	}

	/// Test: is_repository distinguishes repositories from plain directories.
	#[tokio::test]
	async fn test_is_repository() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		let plain = TempDir::new().unwrap();

		let client = CommandGitClient::new();
		assert!(client.is_repository(repo.path()).await);
		assert!(!client.is_repository(plain.path()).await);
	}

	#[tokio::test]
	async fn test_repository_root_from_subdirectory() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		fs::create_dir(repo.path().join("nested")).unwrap();

		let client = CommandGitClient::new();
		let root = client
			.repository_root(&repo.path().join("nested"))
			.await
			.unwrap();
		assert_eq!(
			root.canonicalize().unwrap(),
			repo.path().canonicalize().unwrap()
		);
	}

	/// Test: the branch name is known before the first commit.
	#[tokio::test]
	async fn test_current_branch_on_unborn_repo() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());

		let client = CommandGitClient::new();
		assert_eq!(client.current_branch(repo.path()).await.unwrap(), "main");
	}

	/// Test: detached HEAD is described, not treated as a failure.
	#[tokio::test]
	async fn test_current_branch_detached_head() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());
		let sha = git(repo.path(), &["rev-parse", "HEAD"]);
		git(repo.path(), &["checkout", "--detach", &sha]);

		let client = CommandGitClient::new();
		let branch = client.current_branch(repo.path()).await.unwrap();
		assert!(branch.starts_with("(detached at "), "got {branch}");
	}

	#[tokio::test]
	async fn test_status_reports_untracked_and_partial_staging() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());

		fs::write(repo.path().join("README.md"), "# Staged").unwrap();
		git(repo.path(), &["add", "README.md"]);
		fs::write(repo.path().join("README.md"), "# Staged then edited").unwrap();
		fs::write(repo.path().join("new.txt"), "new").unwrap();

		let client = CommandGitClient::new();
		let status = client.status(repo.path()).await.unwrap();
		assert_eq!(status.staged, vec!["README.md"]);
		assert_eq!(status.unstaged, vec!["README.md"]);
		assert_eq!(status.untracked, vec!["new.txt"]);
		assert!(status.has_changes());
	}

	/// Test: status paths with spaces, non-ASCII and a leading dash can be
	/// handed straight back to stage_files.
	///
	/// Why this test is important: the commit workflow stages exactly the
	/// untracked list status reports. Quoted or shifted paths make `git add`
	/// fail with a pathspec error.
	#[tokio::test]
	async fn test_status_paths_round_trip_through_stage_files() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());

		// The modified tracked file is listed first, so its record starts the
		// output with a space.
		fs::write(repo.path().join("README.md"), "# Modified").unwrap();
		for name in ["my notes.txt", "caf\u{e9}.txt", "-dash.txt"] {
			fs::write(repo.path().join(name), name).unwrap();
		}

		let client = CommandGitClient::new();
		let status = client.status(repo.path()).await.unwrap();
		assert_eq!(status.unstaged, vec!["README.md"]);
		assert!(status.staged.is_empty());
		let mut untracked = status.untracked.clone();
		untracked.sort();
		assert_eq!(untracked, vec!["-dash.txt", "caf\u{e9}.txt", "my notes.txt"]);

		client
			.stage_files(repo.path(), &status.untracked)
			.await
			.unwrap();

		let after = client.status(repo.path()).await.unwrap();
		let mut staged = after.staged.clone();
		staged.sort();
		assert_eq!(staged, vec!["-dash.txt", "caf\u{e9}.txt", "my notes.txt"]);
		assert!(after.untracked.is_empty());
		assert_eq!(after.unstaged, vec!["README.md"]);
	}

	/// Test: a rename is reported once, under its new name.
	#[tokio::test]
	async fn test_status_reports_rename_destination() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());
		git(repo.path(), &["mv", "README.md", "read me.md"]);

		let client = CommandGitClient::new();
		let status = client.status(repo.path()).await.unwrap();
		assert_eq!(status.staged, vec!["read me.md"]);
		assert!(status.unstaged.is_empty());
		assert!(status.untracked.is_empty());
	}

	/// Test: a file named like an option is staged, not parsed as a flag.
	#[tokio::test]
	async fn test_stage_files_accepts_dash_prefixed_names() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());
		fs::write(repo.path().join("-dash.txt"), "x").unwrap();
		fs::write(repo.path().join("--all"), "y").unwrap();
		fs::write(repo.path().join("left alone.txt"), "z").unwrap();

		let client = CommandGitClient::new();
		client
			.stage_files(repo.path(), &["-dash.txt".to_string(), "--all".to_string()])
			.await
			.unwrap();

		let status = client.status(repo.path()).await.unwrap();
		let mut staged = status.staged.clone();
		staged.sort();
		assert_eq!(staged, vec!["--all", "-dash.txt"]);
		assert_eq!(status.untracked, vec!["left alone.txt"]);
	}

	/// Test: a commit message full of shell metacharacters lands in the log
	/// byte for byte.
	///
	/// Why this test is important: messages come from users and generators; a
	/// shell-interpolated command line would execute `$d` and the backtick.
	#[tokio::test]
	async fn test_commit_message_round_trips_verbatim() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());
		fs::write(repo.path().join("README.md"), "# Modified").unwrap();

		let message = "a\"b`c$d $(whoami) 'e'; f\n\nbody line with $HOME\nand `id` > out";
		let client = CommandGitClient::new();
		client.stage_all(repo.path()).await.unwrap();
		let sha = client.commit(repo.path(), message).await.unwrap();
		assert_eq!(sha.len(), 40);

		let logged = git(repo.path(), &["log", "-1", "--format=%B"]);
		assert_eq!(logged, message);
	}

	#[tokio::test]
	async fn test_commit_rejects_blank_message_without_running_git() {
		let plain = TempDir::new().unwrap();
		let client = CommandGitClient::new();
		let err = client.commit(plain.path(), "   ").await.unwrap_err();
		assert!(matches!(err, GitError::EmptyCommitMessage));
	}

	#[tokio::test]
	async fn test_create_and_checkout_validates_name_first() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());

		let client = CommandGitClient::new();
		let err = client
			.create_and_checkout(repo.path(), "bad name")
			.await
			.unwrap_err();
		assert!(matches!(err, GitError::InvalidBranchName { .. }));

		client
			.create_and_checkout(repo.path(), "feature/ok")
			.await
			.unwrap();
		assert_eq!(
			client.current_branch(repo.path()).await.unwrap(),
			"feature/ok"
		);
		let branches = client.list_branches(repo.path()).await.unwrap();
		assert!(branches.contains(&"main".to_string()));
		assert!(branches.contains(&"feature/ok".to_string()));
	}

	#[tokio::test]
	async fn test_add_remote_and_list() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());

		let client = CommandGitClient::new();
		assert!(client.remotes(repo.path()).await.unwrap().is_empty());

		client
			.add_remote(repo.path(), "origin", "https://example.com/o/r.git")
			.await
			.unwrap();
		let remotes = client.remotes(repo.path()).await.unwrap();
		assert_eq!(remotes.len(), 2);
		assert!(remotes.iter().all(|r| r.name == "origin"));

		let err = client.add_remote(repo.path(), "backup", "  ").await.unwrap_err();
		assert!(matches!(err, GitError::EmptyRemoteUrl));
	}

	/// Test: diff_context fans out and assembles all three reads.
	#[tokio::test]
	async fn test_diff_context_combines_reads() {
		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());
		fs::write(repo.path().join("README.md"), "# Modified").unwrap();
		fs::write(repo.path().join("extra.txt"), "x").unwrap();

		let client = CommandGitClient::new();
		let ctx = client.diff_context(repo.path()).await.unwrap();
		assert_eq!(ctx.branch, "main");
		assert_eq!(ctx.files_changed, 2);
		assert!(ctx.diff.contains("Modified"));
	}

	#[tokio::test]
	async fn test_diff_context_fails_outside_repository() {
		let plain = TempDir::new().unwrap();
		let client = CommandGitClient::new();
		assert!(client.diff_context(plain.path()).await.is_err());
	}

	/// Test: push to a bare remote sets upstream, and a later pull succeeds.
	#[tokio::test]
	async fn test_push_sets_upstream_and_pull() {
		let remote = TempDir::new().unwrap();
		git(remote.path(), &["init", "--bare", "-b", "main"]);

		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());

		let client = CommandGitClient::new();
		let url = remote.path().display().to_string();
		client.add_remote(repo.path(), "origin", &url).await.unwrap();

		assert!(!client.has_upstream(repo.path(), "main").await);
		client.push(repo.path(), "origin", "main", true).await.unwrap();
		assert!(client.has_upstream(repo.path(), "main").await);

		client.fetch(repo.path(), "origin").await.unwrap();
		client
			.pull(repo.path(), "origin", "main", PullOptions::merge())
			.await
			.unwrap();
	}

	/// Test: commits_ahead compares the branch with its remote-tracking ref.
	///
	/// Why this test is important: sync skips the push when nothing is ahead,
	/// instead of interpreting push output.
	#[tokio::test]
	async fn test_commits_ahead_tracks_unpushed_commits() {
		let remote = TempDir::new().unwrap();
		git(remote.path(), &["init", "--bare", "-b", "main"]);

		let repo = TempDir::new().unwrap();
		init_git_repo(repo.path());
		create_initial_commit(repo.path());

		let client = CommandGitClient::new();
		let url = remote.path().display().to_string();
		client.add_remote(repo.path(), "origin", &url).await.unwrap();

		assert_eq!(
			client.commits_ahead(repo.path(), "origin", "main").await.unwrap(),
			None
		);

		client.push(repo.path(), "origin", "main", true).await.unwrap();
		assert_eq!(
			client.commits_ahead(repo.path(), "origin", "main").await.unwrap(),
			Some(0)
		);

		fs::write(repo.path().join("README.md"), "# Ahead").unwrap();
		client.stage_all(repo.path()).await.unwrap();
		client.commit(repo.path(), "ahead by one").await.unwrap();
		assert_eq!(
			client.commits_ahead(repo.path(), "origin", "main").await.unwrap(),
			Some(1)
		);
	}
}
