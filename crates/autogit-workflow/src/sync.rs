// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use autogit_git::{remote_names, validate_branch_name, GitClient, PullOptions};
use autogit_session::{InteractiveSession, Style};
use tracing::{debug, info, warn};

use crate::classify::{classify, is_unrelated_histories, truncate_lines};
use crate::error::WorkflowError;
use crate::generator::ErrorContext;
use crate::outcome::{Halt, WorkflowOutcome};
use crate::runner::drive;
use crate::state::WorkflowSession;
use crate::steps::{preflight, report_failure, resolve_repository, show_status, WorkflowContext};

const MAX_PULL_OUTPUT_LINES: usize = 10;

/// Clean-tree gate, remote choice, fetch, pull with conflict detection, then
/// push local commits back.
pub struct PullWorkflow<G: GitClient> {
	ctx: WorkflowContext<G>,
	ui: InteractiveSession,
}

impl<G: GitClient> PullWorkflow<G> {
	pub fn new(ctx: WorkflowContext<G>, ui: InteractiveSession) -> Self {
		Self { ctx, ui }
	}

	pub async fn run(&self) -> WorkflowOutcome {
		drive(
			&self.ui,
			self.ctx.notifier.as_ref(),
			self.ctx.options.close_delay,
			"sync",
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
		let ui = &self.ui;

		ui.write_styled_line("autogit sync", Style::Heading);
		preflight(&self.ctx, ui).await?;
		resolve_repository(&self.ctx, ui, ws).await?;
		let path = ws.repo_path.clone();

		// Pulling into a dirty tree is refused outright.
		let status = git.status(&path).await?;
		if status.has_changes() {
			ui.write_styled_line(
				"The working tree has uncommitted changes. Commit or stash them before syncing.",
				Style::Error,
			);
			show_status(ui, &status);
			return Err(WorkflowError::Validation(
				"working tree has uncommitted changes".to_string(),
			)
			.into());
		}

		ws.current_branch = git.current_branch(&path).await?;
		let remote = self.choose_remote(ws).await?;

		ui.write_line(&format!("Fetching {remote}..."));
		if let Err(e) = git.fetch(&path, &remote).await {
			warn!(error = %e, remote = %remote, "fetch failed");
			let error_ctx = ErrorContext::new("fetch").with_remote(&remote);
			report_failure(&self.ctx, ui, &e.to_string(), &error_ctx, None).await;
			return Err(e.into());
		}

		let answer = ui.prompt("Branch to pull", &ws.current_branch).await?;
		let branch = match answer.trim() {
			"" => ws.current_branch.clone(),
			name => name.to_string(),
		};
		validate_branch_name(&branch)?;
		ws.target_branch = branch.clone();

		ws.confirmed = ui
			.confirm(
				&format!("Pull {remote}/{branch} into '{}'?", ws.current_branch),
				true,
			)
			.await?;
		if !ws.confirmed {
			return Ok(WorkflowOutcome::Declined);
		}

		let output = self.pull(ws, &remote, &branch).await?;
		ui.write_styled_line(&format!("✓ Pulled {remote}/{branch}"), Style::Success);
		if !output.is_empty() {
			for line in truncate_lines(&output, MAX_PULL_OUTPUT_LINES).lines() {
				ui.write_styled_line(&format!("  {line}"), Style::Muted);
			}
		}

		let pushed = self.push_back(ws, &remote).await;
		Ok(WorkflowOutcome::Synced {
			remote,
			branch,
			pushed,
		})
	}

	/// One remote is used as is; several are offered with the preferred one
	/// as the default.
	async fn choose_remote(&self, ws: &mut WorkflowSession) -> Result<String, Halt> {
		let names = remote_names(&self.ctx.git.remotes(&ws.repo_path).await?);
		let remote = match names.as_slice() {
			[] => {
				return Err(WorkflowError::Environment(
					"no remote configured: add one before syncing".to_string(),
				)
				.into())
			}
			[only] => only.clone(),
			_ => {
				let preferred = &self.ctx.options.preferred_remote;
				let default_index = names.iter().position(|n| n == preferred).unwrap_or(0);
				self.ui
					.select("Remote to sync with", &names, default_index)
					.await?
			}
		};
		ws.selected_remote = Some(remote.clone());
		Ok(remote)
	}

	/// Plain pull, retried once with `--allow-unrelated-histories` when git
	/// refuses to merge unrelated histories. No other failure is retried.
	async fn pull(&self, ws: &WorkflowSession, remote: &str, branch: &str) -> Result<String, Halt> {
		let git = self.ctx.git.as_ref();
		let path = ws.repo_path.as_path();

		info!(remote, branch, "pulling");
		let error = match git.pull(path, remote, branch, PullOptions::merge()).await {
			Ok(output) => return Ok(output),
			Err(e) => e,
		};

		let error = if is_unrelated_histories(&error.to_string()) {
			self.ui.write_line(
				"The histories are unrelated. Retrying once with --allow-unrelated-histories.",
			);
			let options = PullOptions::merge().allowing_unrelated_histories();
			match git.pull(path, remote, branch, options).await {
				Ok(output) => return Ok(output),
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
				warn!(kind = %kind, "pull stopped on a conflict");
				report_failure(&self.ctx, &self.ui, &text, &error_ctx, Some(kind)).await;
				Err(WorkflowOutcome::Conflict { kind }.into())
			}
			None => {
				warn!(error = %error, "pull failed");
				report_failure(&self.ctx, &self.ui, &text, &error_ctx, None).await;
				Err(error.into())
			}
		}
	}

	/// Sends local commits back after a successful pull. A branch with no
	/// commits ahead of its remote-tracking ref is not pushed at all. Push
	/// failures are warnings since the pull already happened.
	async fn push_back(&self, ws: &WorkflowSession, remote: &str) -> bool {
		let git = self.ctx.git.as_ref();
		let path = ws.repo_path.as_path();
		let branch = ws.current_branch.as_str();

		match git.commits_ahead(path, remote, branch).await {
			Ok(Some(0)) => {
				debug!(remote = %remote, branch = %branch, "branch is not ahead of remote");
				self.ui.write_line("Nothing to push.");
				return false;
			}
			Ok(_) => {}
			Err(e) => warn!(error = %e, "could not count unpushed commits; pushing anyway"),
		}

		let set_upstream = !git.has_upstream(path, branch).await;

		match git.push(path, remote, branch, set_upstream).await {
			Ok(_) => {
				self.ui
					.write_styled_line(&format!("✓ Pushed {branch} to {remote}"), Style::Success);
				true
			}
			Err(e) => {
				warn!(error = %e, "push after pull failed");
				let message = format!("Pulled, but pushing {branch} to {remote} failed: {e}");
				self.ui.write_styled_line(&message, Style::Warning);
				self.ctx.notifier.warn(&message);
				false
			}
		}
	}
}
