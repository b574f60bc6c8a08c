// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Commit and sync workflow engines.
//!
//! Each workflow is a linear sequence of git operations and prompts with a
//! small number of designed recovery points. Steps read and update one
//! [`WorkflowSession`] record; the run ends in a [`WorkflowOutcome`].

mod classify;
mod command_generator;
mod commit;
mod error;
mod generator;
mod guard;
mod mock_generator;
mod notify;
mod options;
mod outcome;
mod prompt;
mod runner;
mod state;
mod steps;
mod sync;

#[cfg(test)]
mod testing;

pub use classify::{
	classify, instructions, is_divergent, is_push_rejection,
	is_unrelated_histories, truncate_lines, ConflictKind,
};
pub use command_generator::{CommandMessageGenerator, DEFAULT_MAX_DIFF_BYTES, DEFAULT_TIMEOUT};
pub use commit::CommitWorkflow;
pub use error::{GeneratorError, WorkflowError};
pub use generator::{DisabledGenerator, ErrorContext, ErrorExplanation, MessageGenerator};
pub use guard::{FlightPermit, SingleFlight, Trigger};
pub use mock_generator::MockMessageGenerator;
pub use notify::{Notification, NotificationLevel, Notifier, QueuedNotifier};
pub use options::{MessageStyle, WorkflowOptions};
pub use outcome::{short_sha, WorkflowOutcome};
pub use prompt::{clean_message, commit_prompt, explain_prompt, parse_explanation, truncate_diff};
pub use runner::{SessionFactory, WorkflowRunner};
pub use state::WorkflowSession;
pub use steps::{WorkflowContext, MAX_ERROR_LINES};
pub use sync::PullWorkflow;
