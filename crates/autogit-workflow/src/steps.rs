// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Steps shared by the commit and sync workflows.

use std::path::PathBuf;
use std::sync::Arc;

use autogit_git::{validate_remote_url, GitClient, RepositoryStatus};
use autogit_session::{InteractiveSession, Style};
use tracing::{info, warn};

use crate::classify::{instructions, truncate_lines, ConflictKind};
use crate::error::WorkflowError;
use crate::generator::{DisabledGenerator, ErrorContext, MessageGenerator};
use crate::notify::Notifier;
use crate::options::WorkflowOptions;
use crate::outcome::{Halt, WorkflowOutcome};
use crate::state::WorkflowSession;

/// Raw git errors longer than this are cut when shown without an explainer.
pub const MAX_ERROR_LINES: usize = 10;

/// Services and settings a workflow run is started with.
pub struct WorkflowContext<G: GitClient> {
	pub git: Arc<G>,
	pub generator: Arc<dyn MessageGenerator>,
	pub notifier: Arc<dyn Notifier>,
	pub options: WorkflowOptions,
	/// Folder the user is working in. `None` when no folder is open.
	pub workspace: Option<PathBuf>,
}

impl<G: GitClient> WorkflowContext<G> {
	pub fn new(git: Arc<G>, notifier: Arc<dyn Notifier>, workspace: Option<PathBuf>) -> Self {
		Self {
			git,
			generator: Arc::new(DisabledGenerator),
			notifier,
			options: WorkflowOptions::default(),
			workspace,
		}
	}

	pub fn with_generator(mut self, generator: Arc<dyn MessageGenerator>) -> Self {
		self.generator = generator;
		self
	}

	pub fn with_options(mut self, options: WorkflowOptions) -> Self {
		self.options = options;
		self
	}
}

impl<G: GitClient> Clone for WorkflowContext<G> {
	fn clone(&self) -> Self {
		Self {
			git: self.git.clone(),
			generator: self.generator.clone(),
			notifier: self.notifier.clone(),
			options: self.options.clone(),
			workspace: self.workspace.clone(),
		}
	}
}

/// Fails unless the git executable can be run.
pub(crate) async fn preflight<G: GitClient>(
	ctx: &WorkflowContext<G>,
	ui: &InteractiveSession,
) -> Result<(), Halt> {
	match ctx.git.tool_version().await {
		Ok(version) => {
			ui.write_styled_line(&version, Style::Muted);
			Ok(())
		}
		Err(e) => {
			warn!(error = %e, "git is not available");
			Err(WorkflowError::Environment(format!("git is not available: {e}")).into())
		}
	}
}

/// Finds the repository for the workspace, offering to create one when the
/// folder is not under version control. Sets `ws.repo_path`.
pub(crate) async fn resolve_repository<G: GitClient>(
	ctx: &WorkflowContext<G>,
	ui: &InteractiveSession,
	ws: &mut WorkflowSession,
) -> Result<(), Halt> {
	let Some(workspace) = ctx.workspace.as_deref() else {
		return Err(WorkflowError::Environment("no workspace folder is open".to_string()).into());
	};

	if ctx.git.is_repository(workspace).await {
		ws.repo_path = ctx.git.repository_root(workspace).await?;
		info!(path = %ws.repo_path.display(), "repository resolved");
		return Ok(());
	}

	ui.write_styled_line(
		&format!("{} is not a git repository.", workspace.display()),
		Style::Warning,
	);
	if !ui.confirm("Initialize a new repository here?", true).await? {
		return Err(WorkflowOutcome::Declined.into());
	}

	let url = ui
		.prompt("Remote URL (leave empty to add one later)", "")
		.await?;
	let url = url.trim();

	ctx.git.init(workspace).await?;
	ui.write_styled_line("✓ Initialized empty repository", Style::Success);

	if !url.is_empty() {
		validate_remote_url(url)?;
		let remote = &ctx.options.preferred_remote;
		ctx.git.add_remote(workspace, remote, url).await?;
		ui.write_styled_line(&format!("✓ Added remote '{remote}'"), Style::Success);
	}

	ws.repo_path = workspace.to_path_buf();
	info!(path = %ws.repo_path.display(), "repository initialized");
	Ok(())
}

pub(crate) fn show_status(ui: &InteractiveSession, status: &RepositoryStatus) {
	ui.write_line(&format!(
		"{} file(s) changed: {} staged, {} unstaged, {} untracked",
		status.files_changed(),
		status.staged.len(),
		status.unstaged.len(),
		status.untracked.len()
	));
	for (marker, list) in [
		("+", &status.staged),
		("~", &status.unstaged),
		("?", &status.untracked),
	] {
		for path in list {
			ui.write_styled_line(&format!("  {marker} {path}"), Style::Muted);
		}
	}
}

/// Shows why an operation failed. An explainer answer replaces the static
/// text; without one, conflicts get their recovery script and other failures
/// a truncated copy of git's output.
pub(crate) async fn report_failure<G: GitClient>(
	ctx: &WorkflowContext<G>,
	ui: &InteractiveSession,
	error_text: &str,
	error_ctx: &ErrorContext,
	conflict: Option<ConflictKind>,
) {
	match conflict {
		Some(kind) => ui.write_styled_line(&format!("✗ git {} hit a {kind}", error_ctx.operation), Style::Error),
		None => ui.write_styled_line(&format!("✗ git {} failed", error_ctx.operation), Style::Error),
	}

	if ctx.generator.is_available() {
		match ctx.generator.explain_error(error_text, error_ctx).await {
			Ok(explained) => {
				for line in explained.explanation.lines() {
					ui.write_line(line);
				}
				for suggestion in &explained.suggestions {
					ui.write_styled_line(&format!("  - {suggestion}"), Style::Info);
				}
				return;
			}
			Err(e) => warn!(error = %e, "error explanation failed, using fallback"),
		}
	}

	match conflict {
		Some(kind) => {
			for line in instructions(kind) {
				ui.write_line(line);
			}
		}
		None => {
			for line in truncate_lines(error_text, MAX_ERROR_LINES).lines() {
				ui.write_styled_line(&format!("  {line}"), Style::Muted);
			}
		}
	}
}
