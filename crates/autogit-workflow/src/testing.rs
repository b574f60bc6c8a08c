// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Harness for driving workflows against mocks with scripted answers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use autogit_git::{MockCall, MockGitClient};
use autogit_session::{spawn_line_feeder, InteractiveSession, MemorySink};

use crate::commit::CommitWorkflow;
use crate::mock_generator::MockMessageGenerator;
use crate::notify::QueuedNotifier;
use crate::options::WorkflowOptions;
use crate::outcome::WorkflowOutcome;
use crate::steps::WorkflowContext;
use crate::sync::PullWorkflow;

pub(crate) struct Harness {
	pub git: MockGitClient,
	pub generator: MockMessageGenerator,
	pub notifier: QueuedNotifier,
	pub options: WorkflowOptions,
	pub sink: MemorySink,
	pub ui: InteractiveSession,
}

pub(crate) struct Run {
	pub outcome: WorkflowOutcome,
	/// Answers consumed by prompts.
	pub answered: usize,
	pub left_open: bool,
	pub output: String,
}

impl Harness {
	pub fn new(git: MockGitClient) -> Self {
		let sink = MemorySink::new();
		Self {
			git,
			generator: MockMessageGenerator::unavailable(),
			notifier: QueuedNotifier::new(),
			options: WorkflowOptions::default().with_close_delay(Duration::ZERO),
			ui: InteractiveSession::new(sink.clone()),
			sink,
		}
	}

	pub fn generator(mut self, generator: MockMessageGenerator) -> Self {
		self.generator = generator;
		self
	}

	pub fn options(mut self, f: impl FnOnce(WorkflowOptions) -> WorkflowOptions) -> Self {
		self.options = f(self.options);
		self
	}

	pub fn context(&self) -> WorkflowContext<MockGitClient> {
		WorkflowContext::new(
			Arc::new(self.git.clone()),
			Arc::new(self.notifier.clone()),
			Some(PathBuf::from("/ws")),
		)
		.with_generator(Arc::new(self.generator.clone()))
		.with_options(self.options.clone())
	}

	pub async fn commit(&self, answers: &[&str]) -> Run {
		let workflow = CommitWorkflow::new(self.context(), self.ui.clone());
		self.drive(answers, workflow.run()).await
	}

	pub async fn sync(&self, answers: &[&str]) -> Run {
		let workflow = PullWorkflow::new(self.context(), self.ui.clone());
		self.drive(answers, workflow.run()).await
	}

	async fn drive(
		&self,
		answers: &[&str],
		run: impl std::future::Future<Output = WorkflowOutcome>,
	) -> Run {
		// Opened up front so the feeder does not mistake "not yet open" for
		// "closed".
		self.ui.open().unwrap();
		let feeder = spawn_line_feeder(
			self.ui.clone(),
			answers.iter().map(|a| a.to_string()).collect(),
		);
		let outcome = run.await;
		let left_open = self.ui.is_open();
		self.ui.close_immediately();
		Run {
			outcome,
			answered: feeder.await.unwrap(),
			left_open,
			output: self.sink.contents(),
		}
	}

	pub fn calls(&self) -> Vec<MockCall> {
		self.git.get_calls()
	}

	pub fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
		self.git.count_calls(predicate)
	}

	/// Index of the first call matching `predicate`.
	pub fn position(&self, predicate: impl Fn(&MockCall) -> bool) -> Option<usize> {
		self.calls().iter().position(predicate)
	}
}
