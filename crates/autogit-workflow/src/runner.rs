// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use autogit_git::GitClient;
use autogit_session::{InteractiveSession, Style};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::commit::CommitWorkflow;
use crate::error::WorkflowError;
use crate::guard::{FlightPermit, SingleFlight, Trigger};
use crate::notify::{NotificationLevel, Notifier};
use crate::outcome::WorkflowOutcome;
use crate::steps::WorkflowContext;
use crate::sync::PullWorkflow;

/// Builds a fresh, open session with input attached for each run.
pub type SessionFactory = Arc<dyn Fn() -> InteractiveSession + Send + Sync>;

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}

/// Outermost boundary of a workflow run: opens the session, turns panics into
/// an internal failure, reports the outcome and closes the session unless the
/// outcome needs it kept on screen.
pub(crate) async fn drive<F>(
	ui: &InteractiveSession,
	notifier: &dyn Notifier,
	close_delay: Duration,
	workflow: &'static str,
	work: F,
) -> WorkflowOutcome
where
	F: Future<Output = WorkflowOutcome>,
{
	if let Err(e) = ui.open() {
		error!(workflow, error = %e, "failed to open session");
		let outcome = WorkflowOutcome::Failed(WorkflowError::Session(e));
		notifier.error(&outcome.summary());
		return outcome;
	}

	let outcome = match AssertUnwindSafe(work).catch_unwind().await {
		Ok(outcome) => outcome,
		Err(payload) => {
			let message = panic_message(payload.as_ref());
			error!(workflow, panic = %message, "workflow panicked");
			WorkflowOutcome::Failed(WorkflowError::Internal(message))
		}
	};

	info!(workflow, outcome = %outcome.summary(), "workflow finished");
	let summary = outcome.summary();
	if ui.is_open() {
		let style = match outcome.level() {
			NotificationLevel::Info if outcome.is_success() => Style::Success,
			NotificationLevel::Info => Style::Plain,
			NotificationLevel::Warning => Style::Warning,
			NotificationLevel::Error => Style::Error,
		};
		ui.write_styled_line(&summary, style);
	}
	notifier.notify(outcome.level(), &summary);

	if outcome.keeps_session_open() {
		if ui.is_open() {
			ui.write_styled_line("Session left open so the output above stays visible.", Style::Muted);
		}
	} else {
		ui.close(close_delay).await;
	}
	outcome
}

/// Entry point for both workflows, sharing one single-flight latch.
pub struct WorkflowRunner<G: GitClient> {
	ctx: WorkflowContext<G>,
	sessions: SessionFactory,
	flight: SingleFlight,
}

impl<G: GitClient> WorkflowRunner<G> {
	pub fn new(ctx: WorkflowContext<G>, sessions: SessionFactory) -> Self {
		Self {
			ctx,
			sessions,
			flight: SingleFlight::new(),
		}
	}

	pub fn is_running(&self) -> bool {
		self.flight.is_running()
	}

	pub async fn commit(&self, trigger: Trigger, quick: bool) -> WorkflowOutcome {
		let Some(_permit) = self.admit(trigger, "commit") else {
			return WorkflowOutcome::Skipped;
		};
		let mut ctx = self.ctx.clone();
		ctx.options.quick_mode |= quick;
		CommitWorkflow::new(ctx, (self.sessions)()).run().await
	}

	pub async fn sync(&self, trigger: Trigger) -> WorkflowOutcome {
		let Some(_permit) = self.admit(trigger, "sync") else {
			return WorkflowOutcome::Skipped;
		};
		PullWorkflow::new(self.ctx.clone(), (self.sessions)())
			.run()
			.await
	}

	/// A trigger that finds a run in flight is dropped. Manual triggers are
	/// told so; automatic ones are only logged.
	fn admit(&self, trigger: Trigger, workflow: &'static str) -> Option<FlightPermit> {
		match self.flight.try_acquire() {
			Some(permit) => {
				info!(workflow, trigger = %trigger, "starting workflow");
				Some(permit)
			}
			None => {
				match trigger {
					Trigger::Manual => {
						warn!(workflow, "workflow already running, manual trigger dropped");
						self.ctx
							.notifier
							.warn("A workflow is already running; this request was ignored.");
					}
					Trigger::Automatic => {
						debug!(workflow, "workflow already running, automatic trigger dropped");
					}
				}
				None
			}
		}
	}
}
