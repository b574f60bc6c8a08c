// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Spawns the version-control executable with an explicit argument vector.
//!
//! Arguments are handed to the OS as-is; no shell is involved, so branch
//! names, commit messages and URLs are never reinterpreted.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::{GitError, OperationResult};

/// Runs one executable (normally `git`) inside a working directory.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
	program: PathBuf,
}

impl ProcessRunner {
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self {
			program: program.into(),
		}
	}

	pub fn git() -> Self {
		Self::new("git")
	}

	pub fn program(&self) -> &Path {
		&self.program
	}

	/// Short tool name used in generic failure messages.
	fn tool_name(&self) -> String {
		self
			.program
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| self.program.display().to_string())
	}

	/// Runs the tool and returns trimmed stdout on a zero exit code.
	pub async fn run<S: AsRef<str>>(&self, cwd: &Path, args: &[S]) -> OperationResult<String> {
		let stdout = self.run_raw(cwd, args).await?;
		Ok(stdout.trim().to_string())
	}

	/// Like [`run`](Self::run) but leaves stdout untouched. Needed for
	/// record-oriented output where leading whitespace is significant.
	pub async fn run_raw<S: AsRef<str>>(&self, cwd: &Path, args: &[S]) -> OperationResult<String> {
		let tool = self.tool_name();
		let argv: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();

		let mut cmd = Command::new(&self.program);
		cmd.current_dir(cwd)
			.args(argv.iter().map(OsString::from))
			.kill_on_drop(true);

		trace!(
				cwd = %cwd.display(),
				cmd = %tool,
				args = ?argv,
				"running command"
		);

		let output = cmd.output().await.map_err(|e| {
			warn!(cmd = %tool, error = %e, "failed to launch command");
			GitError::Launch {
				cmd: tool.clone(),
				source: e,
			}
		})?;

		if output.status.success() {
			return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
		}

		let code = output.status.code();
		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		let message = if stderr.is_empty() {
			match code {
				Some(code) => format!("{tool} command failed with code {code}"),
				None => format!("{tool} command was terminated by a signal"),
			}
		} else {
			stderr
		};

		debug!(cmd = %tool, args = ?argv, code = ?code, "command failed");

		Err(GitError::CommandFailed {
			cmd: tool,
			args: argv,
			code,
			message,
		})
	}
}

impl Default for ProcessRunner {
	fn default() -> Self {
		Self::git()
	}
}
