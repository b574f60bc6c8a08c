// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Turns resolved configuration into workflow collaborators.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};
use autogit_config::{AutogitConfig, GeneratorConfig};
use autogit_session::{spawn_key_reader, CrosstermSink, InteractiveSession};
use autogit_workflow::{
	CommandMessageGenerator, DisabledGenerator, MessageGenerator, MessageStyle, SessionFactory,
	WorkflowOptions,
};
use tracing::{debug, warn};

/// Snapshot handed to each workflow run.
pub fn workflow_options(config: &AutogitConfig) -> Result<WorkflowOptions> {
	let workflow = &config.workflow;
	let style: MessageStyle = workflow.message_style.parse().map_err(|e: String| anyhow!(e))?;
	Ok(WorkflowOptions::default()
		.with_preferred_remote(workflow.preferred_remote.clone())
		.with_auto_stage(workflow.auto_stage)
		.with_push_after_commit(workflow.push_after_commit)
		.with_confirm_before_push(workflow.confirm_before_push)
		.with_message_style(style)
		.with_include_scope(workflow.include_scope)
		.with_quick_mode(workflow.quick_mode)
		.with_close_delay(workflow.close_delay()))
}

pub fn message_generator(config: &GeneratorConfig) -> Arc<dyn MessageGenerator> {
	let Some(command) = &config.command else {
		debug!("no generator command configured");
		return Arc::new(DisabledGenerator);
	};
	let generator = CommandMessageGenerator::new(command.clone(), config.args.clone())
		.with_max_diff_bytes(config.max_diff_bytes)
		.with_timeout(config.timeout());
	if !generator.is_available() {
		warn!(command = %command, "generator command not found on PATH, messages will be typed by hand");
	}
	Arc::new(generator)
}

/// Terminal sessions for workflow runs. The most recent one is kept so the
/// caller can hold it open after the run ends.
#[derive(Clone, Default)]
pub struct TerminalSessions {
	last: Arc<Mutex<Option<InteractiveSession>>>,
}

impl TerminalSessions {
	pub fn factory(&self) -> SessionFactory {
		let last = self.last.clone();
		Arc::new(move || {
			let session = InteractiveSession::new(CrosstermSink::new());
			match session.open() {
				Ok(()) => {
					spawn_key_reader(session.clone());
				}
				Err(e) => warn!(error = %e, "failed to enter raw mode"),
			}
			*last.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
			session
		})
	}

	pub fn last(&self) -> Option<InteractiveSession> {
		self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}
}
