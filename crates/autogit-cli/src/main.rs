// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! autogit - interactive commit and sync assistant for git.
//!
//! `autogit commit` stages, commits and pushes the working tree of the
//! workspace, optionally drafting the message with an external command.
//! `autogit sync` fetches, pulls a chosen branch and pushes local commits
//! back. Both run in a raw-mode terminal session that answers prompts one
//! line at a time.

mod logging;
mod wiring;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use autogit_config::{load_config, CliOverrides};
use autogit_git::CommandGitClient;
use autogit_workflow::{
	NotificationLevel, QueuedNotifier, Trigger, WorkflowContext, WorkflowOutcome, WorkflowRunner,
};

use wiring::TerminalSessions;

/// Interactive commit and sync assistant for git
#[derive(Parser, Debug)]
#[command(name = "autogit", version, about, long_about = None)]
struct Args {
	/// Repository to operate on (defaults to the current directory)
	#[arg(short, long, global = true)]
	workspace: Option<PathBuf>,

	/// Path to a configuration file, used instead of the user config file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long, global = true)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long, global = true)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Stage, commit and push the working tree
	Commit {
		/// Commit to the current branch without the final confirmation
		#[arg(long, short)]
		quick: bool,
	},
	/// Fetch, pull a branch and push local commits back
	Sync,
	/// Print the resolved configuration as JSON
	Config,
}

enum Workflow {
	Commit { quick: bool },
	Sync,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		CliOverrides {
			log_level: args.log_level.clone(),
			log_format: args.json_logs.then(|| "json".to_string()),
			config_file: args.config.clone(),
		}
	}
}

fn resolve_workspace(arg: Option<&PathBuf>) -> Option<PathBuf> {
	match arg {
		Some(path) => Some(path.clone()),
		None => std::env::current_dir().ok(),
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();
	let workspace = resolve_workspace(args.workspace.as_ref());

	// Warnings raised while loading are logged before the configured
	// subscriber can exist.
	let bootstrap = logging::bootstrap_subscriber(args.log_level.as_deref(), std::io::stderr);
	let config = tracing::subscriber::with_default(bootstrap, || {
		load_config(workspace.as_deref(), CliOverrides::from(&args))
	})
	.context("failed to load configuration")?;

	let workflow = match args.command {
		Command::Config => {
			println!("{}", config.to_json().context("failed to serialize configuration")?);
			return Ok(ExitCode::SUCCESS);
		}
		Command::Commit { quick } => Workflow::Commit { quick },
		Command::Sync => Workflow::Sync,
	};

	logging::init_tracing(&config.logging)?;
	info!(workspace = ?workspace, "starting autogit");

	let options = wiring::workflow_options(&config)?;
	let notifier = QueuedNotifier::new();
	let ctx = WorkflowContext::new(
		Arc::new(CommandGitClient::new()),
		Arc::new(notifier.clone()),
		workspace,
	)
	.with_generator(wiring::message_generator(&config.generator))
	.with_options(options);

	let sessions = TerminalSessions::default();
	let runner = WorkflowRunner::new(ctx, sessions.factory());

	let outcome = match workflow {
		Workflow::Commit { quick } => runner.commit(Trigger::Manual, quick).await,
		Workflow::Sync => runner.sync(Trigger::Manual).await,
	};

	hold_open_session(&sessions, &outcome).await;
	print_notifications(&notifier);

	debug!(exit_code = outcome.exit_code(), "exiting");
	Ok(ExitCode::from(u8::try_from(outcome.exit_code()).unwrap_or(1)))
}

/// Keeps a session the workflow left open on screen until the user presses
/// Enter.
async fn hold_open_session(sessions: &TerminalSessions, outcome: &WorkflowOutcome) {
	let Some(ui) = sessions.last() else {
		return;
	};
	if ui.is_open() {
		debug!(outcome = %outcome.summary(), "holding session open");
		let _ = ui.prompt("Press Enter to close", "").await;
		ui.close_immediately();
	}
}

fn print_notifications(notifier: &QueuedNotifier) {
	for notification in notifier.drain() {
		let prefix = match notification.level {
			NotificationLevel::Info => "autogit",
			NotificationLevel::Warning => "autogit: warning",
			NotificationLevel::Error => "autogit: error",
		};
		eprintln!("{prefix}: {}", notification.message);
	}
}
