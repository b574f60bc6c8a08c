// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;

use autogit_git::{
	is_detached_head, remote_names, validate_branch_name, validate_commit_message,
	validate_remote_url, GitClient, PullOptions,
};
use autogit_session::{InteractiveSession, Style};
use tracing::{debug, info, warn};

use crate::classify::{classify, is_divergent, is_push_rejection, is_unrelated_histories};
use crate::generator::ErrorContext;
use crate::outcome::{short_sha, Halt, WorkflowOutcome};
use crate::runner::drive;
use crate::state::WorkflowSession;
use crate::steps::{preflight, report_failure, resolve_repository, show_status, WorkflowContext};

/// Status check, branch choice, message, remote, commit, deferred branch
/// switch, push with one pull-and-retry on rejection.
pub struct CommitWorkflow<G: GitClient> {
	ctx: WorkflowContext<G>,
	ui: InteractiveSession,
}

impl<G: GitClient> CommitWorkflow<G> {
	pub fn new(ctx: WorkflowContext<G>, ui: InteractiveSession) -> Self {
		Self { ctx, ui }
	}

	pub async fn run(&self) -> WorkflowOutcome {
		drive(
			&self.ui,
			self.ctx.notifier.as_ref(),
			self.ctx.options.close_delay,
			"commit",
			self.execute(),
		)
		.await
	}

	async fn execute(&self) -> WorkflowOutcome {
		let mut ws = WorkflowSession::default();
		match self.steps(&mut ws).await {
			Ok(outcome) | Err(Halt(outcome)) => outcome,
		}
	}

	async fn steps(&self, ws: &mut WorkflowSession) -> Result<WorkflowOutcome, Halt> {
		let git = self.ctx.git.as_ref();
		let options = &self.ctx.options;
		let ui = &self.ui;

		ui.write_styled_line("autogit commit", Style::Heading);
		preflight(&self.ctx, ui).await?;
		resolve_repository(&self.ctx, ui, ws).await?;
		let path = ws.repo_path.clone();

		let status = git.status(&path).await?;
		if !status.has_changes() {
			ui.write_line("Nothing to commit, working tree clean.");
			return Ok(WorkflowOutcome::NothingToCommit);
		}
		show_status(ui, &status);

		ws.current_branch = git.current_branch(&path).await?;
		self.choose_branch(ws).await?;
		self.acquire_message(ws).await?;
		if options.push_after_commit {
			self.choose_remote(ws).await?;
		}

		if options.quick_mode {
			ws.confirmed = true;
		} else {
			self.show_plan(ws);
			ws.confirmed = ui.confirm("Commit these changes?", true).await?;
			if !ws.confirmed {
				return Ok(WorkflowOutcome::Declined);
			}
		}

		if options.auto_stage {
			git.stage_all(&path).await?;
		}
		let sha = git.commit(&path, &ws.commit_message).await?;
		info!(sha = %sha, branch = %ws.current_branch, "commit created");
		ui.write_styled_line(
			&format!("✓ Committed {} on {}", short_sha(&sha), ws.current_branch),
			Style::Success,
		);

		self.switch_branch(ws, &sha).await;

		let pushed = match ws.selected_remote.clone() {
			Some(remote) if options.push_after_commit => self.push(ws, &remote).await?,
			_ => false,
		};

		Ok(WorkflowOutcome::Committed {
			sha,
			branch: ws.current_branch.clone(),
			pushed,
		})
	}

	/// Records the target branch. The switch itself waits until after the
	/// commit so uncommitted changes cannot block the checkout.
	async fn choose_branch(&self, ws: &mut WorkflowSession) -> Result<(), Halt> {
		if self.ctx.options.quick_mode {
			ws.target_branch = ws.current_branch.clone();
			return Ok(());
		}

		let answer = self
			.ui
			.prompt("Branch to commit to", &ws.current_branch)
			.await?;
		let target = match answer.trim() {
			"" => ws.current_branch.clone(),
			name => name.to_string(),
		};
		if target != ws.current_branch {
			validate_branch_name(&target)?;
			self.ui.write_styled_line(
				&format!("Will switch to '{target}' after committing."),
				Style::Info,
			);
		}
		ws.target_branch = target;
		Ok(())
	}

	async fn acquire_message(&self, ws: &mut WorkflowSession) -> Result<(), Halt> {
		let ui = &self.ui;
		let options = &self.ctx.options;

		let suggestion = self.generate_message(ws).await;
		let message = match suggestion {
			Some(message) if options.quick_mode => {
				ui.write_line(&format!("Message: {message}"));
				message
			}
			Some(message) => {
				ui.write_styled_line("Suggested message:", Style::Heading);
				for line in message.lines() {
					ui.write_line(&format!("  {line}"));
				}
				let edited = ui
					.prompt("Commit message (Enter to accept)", "")
					.await?;
				if edited.trim().is_empty() {
					message
				} else {
					edited
				}
			}
			None => ui.prompt("Commit message", "").await?,
		};

		let message = message.trim().to_string();
		validate_commit_message(&message)?;
		ws.commit_message = message;
		Ok(())
	}

	/// Best-effort: any failure means the user types the message.
	async fn generate_message(&self, ws: &WorkflowSession) -> Option<String> {
		let generator = &self.ctx.generator;
		if !generator.is_available() {
			debug!("no message generator available");
			return None;
		}

		self.ui
			.write_styled_line("Generating commit message...", Style::Muted);
		let result = match self.ctx.git.diff_context(&ws.repo_path).await {
			Ok(context) => {
				generator
					.generate(
						&context,
						self.ctx.options.message_style,
						self.ctx.options.include_scope,
					)
					.await
			}
			Err(e) => {
				warn!(error = %e, "failed to collect diff context");
				self.ui.write_styled_line(
					&format!("Could not read the diff: {e}. Enter a message manually."),
					Style::Warning,
				);
				return None;
			}
		};

		match result {
			Ok(message) => Some(message),
			Err(e) => {
				warn!(error = %e, "message generation failed");
				self.ui.write_styled_line(
					&format!("Message generation failed: {e}. Enter a message manually."),
					Style::Warning,
				);
				None
			}
		}
	}

	/// Picks the push remote: the preferred one, else the first listed, else
	/// offers to add the preferred name. Declining leaves no remote and the
	/// push is skipped.
	async fn choose_remote(&self, ws: &mut WorkflowSession) -> Result<(), Halt> {
		let git = self.ctx.git.as_ref();
		let ui = &self.ui;
		let preferred = &self.ctx.options.preferred_remote;

		let names = remote_names(&git.remotes(&ws.repo_path).await?);
		if names.iter().any(|n| n == preferred) {
			ws.selected_remote = Some(preferred.clone());
			return Ok(());
		}
		if let Some(first) = names.first() {
			ui.write_line(&format!("Remote '{preferred}' not found, using '{first}'."));
			ws.selected_remote = Some(first.clone());
			return Ok(());
		}

		let add = ui
			.confirm(&format!("No remote configured. Add '{preferred}' now?"), true)
			.await?;
		if !add {
			ui.write_styled_line("No remote: the push will be skipped.", Style::Warning);
			return Ok(());
		}

		let url = ui.prompt("Remote URL", "").await?;
		let url = url.trim();
		validate_remote_url(url)?;
		git.add_remote(&ws.repo_path, preferred, url).await?;
		ui.write_styled_line(&format!("✓ Added remote '{preferred}'"), Style::Success);
		ws.selected_remote = Some(preferred.clone());
		Ok(())
	}

	fn show_plan(&self, ws: &WorkflowSession) {
		let ui = &self.ui;
		ui.write_styled_line("Ready to commit:", Style::Heading);
		if ws.needs_branch_switch() {
			ui.write_line(&format!(
				"  Branch:  {} (then switch to {})",
				ws.current_branch, ws.target_branch
			));
		} else {
			ui.write_line(&format!("  Branch:  {}", ws.current_branch));
		}
		let subject = ws.commit_message.lines().next().unwrap_or_default();
		ui.write_line(&format!("  Message: {subject}"));
		match (&ws.selected_remote, self.ctx.options.push_after_commit) {
			(Some(remote), true) => ui.write_line(&format!("  Push:    {remote}")),
			_ => ui.write_line("  Push:    skipped"),
		}
	}

	/// Applies the branch decision now that the commit exists. Failure leaves
	/// the commit where it is and is only a warning.
	async fn switch_branch(&self, ws: &mut WorkflowSession, sha: &str) {
		if !ws.needs_branch_switch() {
			return;
		}
		let git = self.ctx.git.as_ref();
		let path = ws.repo_path.as_path();
		let target = ws.target_branch.clone();

		let result = match git.list_branches(path).await {
			Ok(branches) if branches.contains(&target) => git.checkout(path, &target).await,
			Ok(_) => git.create_and_checkout(path, &target).await,
			Err(e) => Err(e),
		};

		match result {
			Ok(()) => {
				info!(branch = %target, "switched branch after commit");
				self.ui
					.write_styled_line(&format!("✓ Switched to '{target}'"), Style::Success);
				ws.current_branch = target;
			}
			Err(e) => {
				warn!(error = %e, branch = %target, "branch switch failed");
				let message = format!(
					"Commit {} stays on '{}': switching to '{target}' failed: {e}",
					short_sha(sha),
					ws.current_branch
				);
				self.ui.write_styled_line(&message, Style::Warning);
				self.ctx.notifier.warn(&message);
			}
		}
	}

	/// Returns whether anything was pushed.
	async fn push(&self, ws: &WorkflowSession, remote: &str) -> Result<bool, Halt> {
		let branch = ws.current_branch.as_str();
		if is_detached_head(branch) {
			self.ui
				.write_styled_line("HEAD is detached: not pushing.", Style::Warning);
			return Ok(false);
		}

		let options = &self.ctx.options;
		if options.confirm_before_push && !options.quick_mode {
			let push = self
				.ui
				.confirm(&format!("Push '{branch}' to '{remote}'?"), true)
				.await?;
			if !push {
				self.ui.write_line("Push skipped.");
				return Ok(false);
			}
		}

		self.push_with_recovery(&ws.repo_path, remote, branch).await?;
		Ok(true)
	}

	/// Pushes; on rejection pulls with rebase and retries exactly once.
	async fn push_with_recovery(&self, path: &Path, remote: &str, branch: &str) -> Result<(), Halt> {
		let git = self.ctx.git.as_ref();
		let ui = &self.ui;
		let set_upstream = !git.has_upstream(path, branch).await;
		let error_ctx = ErrorContext::new("push")
			.with_branch(branch)
			.with_remote(remote);

		ui.write_line(&format!("Pushing {branch} to {remote}..."));
		let rejected = match git.push(path, remote, branch, set_upstream).await {
			Ok(_) => {
				ui.write_styled_line(&format!("✓ Pushed to {remote}/{branch}"), Style::Success);
				return Ok(());
			}
			Err(e) => e,
		};

		let text = rejected.to_string();
		if !is_push_rejection(&text) {
			warn!(error = %rejected, "push failed");
			report_failure(&self.ctx, ui, &text, &error_ctx, None).await;
			return Err(rejected.into());
		}

		info!(remote, branch, "push rejected, pulling before one retry");
		ui.write_styled_line(
			"Push rejected: the remote has commits you do not. Pulling with rebase and retrying once.",
			Style::Warning,
		);
		self.pull_before_retry(path, remote, branch).await?;

		match git.push(path, remote, branch, set_upstream).await {
			Ok(_) => {
				ui.write_styled_line(&format!("✓ Pushed to {remote}/{branch}"), Style::Success);
				Ok(())
			}
			Err(e) => {
				warn!(error = %e, "push failed after pull, not retrying");
				report_failure(&self.ctx, ui, &e.to_string(), &error_ctx, None).await;
				Err(e.into())
			}
		}
	}

	async fn pull_before_retry(&self, path: &Path, remote: &str, branch: &str) -> Result<(), Halt> {
		let git = self.ctx.git.as_ref();
		let error = match git.pull(path, remote, branch, PullOptions::rebase()).await {
			Ok(_) => return Ok(()),
			Err(e) => e,
		};

		let text = error.to_string();
		let error = if is_unrelated_histories(&text) || is_divergent(&text) {
			self.ui.write_line("Retrying the pull with --allow-unrelated-histories.");
			let options = PullOptions::rebase().allowing_unrelated_histories();
			match git.pull(path, remote, branch, options).await {
				Ok(_) => return Ok(()),
				Err(e) => e,
			}
		} else {
			error
		};

		let text = error.to_string();
		let error_ctx = ErrorContext::new("pull")
			.with_branch(branch)
			.with_remote(remote);
		match classify(&text) {
			Some(kind) => {
				warn!(kind = %kind, "pull before push retry stopped on a conflict");
				report_failure(&self.ctx, &self.ui, &text, &error_ctx, Some(kind)).await;
				Err(WorkflowOutcome::Conflict { kind }.into())
			}
			None => {
				warn!(error = %error, "pull before push retry failed");
				report_failure(&self.ctx, &self.ui, &text, &error_ctx, None).await;
				Err(error.into())
			}
		}
	}
}
