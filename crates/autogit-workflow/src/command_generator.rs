// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use autogit_git::DiffContext;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::GeneratorError;
use crate::generator::{ErrorContext, ErrorExplanation, MessageGenerator};
use crate::options::MessageStyle;
use crate::prompt::{clean_message, commit_prompt, explain_prompt, parse_explanation};

pub const DEFAULT_MAX_DIFF_BYTES: usize = 32 * 1024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Message generator backed by any local command that reads a prompt on
/// stdin and answers on stdout.
#[derive(Clone, Debug)]
pub struct CommandMessageGenerator {
	command: String,
	args: Vec<String>,
	/// `None` when the command does not resolve on PATH.
	program: Option<PathBuf>,
	max_diff_bytes: usize,
	timeout: Duration,
}

impl CommandMessageGenerator {
	pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
		let command = command.into();
		let program = match which::which(&command) {
			Ok(path) => Some(path),
			Err(e) => {
				warn!(command = %command, error = %e, "message generator command not found");
				None
			}
		};
		Self {
			command,
			args,
			program,
			max_diff_bytes: DEFAULT_MAX_DIFF_BYTES,
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_max_diff_bytes(mut self, bytes: usize) -> Self {
		self.max_diff_bytes = bytes;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn command(&self) -> &str {
		&self.command
	}

	async fn run(&self, input: String) -> Result<String, GeneratorError> {
		let program = self
			.program
			.as_ref()
			.ok_or_else(|| GeneratorError::NotFound(self.command.clone()))?;

		debug!(
			command = %program.display(),
			args = ?self.args,
			input_bytes = input.len(),
			"running message generator"
		);

		let mut child = Command::new(program)
			.args(&self.args)
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()?;

		// Feed stdin concurrently so a chatty child cannot fill its stdout pipe
		// while we are still writing.
		if let Some(mut stdin) = child.stdin.take() {
			tokio::spawn(async move {
				if let Err(e) = stdin.write_all(input.as_bytes()).await {
					debug!(error = %e, "generator closed stdin early");
				}
			});
		}

		let output = tokio::time::timeout(self.timeout, child.wait_with_output())
			.await
			.map_err(|_| GeneratorError::Timeout(self.timeout))??;

		if !output.status.success() {
			return Err(GeneratorError::Failed {
				code: output.status.code(),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}

		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}
}

#[async_trait]
impl MessageGenerator for CommandMessageGenerator {
	fn is_available(&self) -> bool {
		self.program.is_some()
	}

	async fn generate(
		&self,
		context: &DiffContext,
		style: MessageStyle,
		include_scope: bool,
	) -> Result<String, GeneratorError> {
		let prompt = commit_prompt(context, style, include_scope, self.max_diff_bytes);
		let message = clean_message(&self.run(prompt).await?);
		if message.is_empty() {
			return Err(GeneratorError::EmptyOutput);
		}
		info!(message_len = message.len(), style = %style, "generated commit message");
		Ok(message)
	}

	async fn explain_error(
		&self,
		error_text: &str,
		context: &ErrorContext,
	) -> Result<ErrorExplanation, GeneratorError> {
		let raw = self.run(explain_prompt(error_text, context)).await?;
		let explanation = parse_explanation(&raw);
		if explanation.explanation.is_empty() && explanation.suggestions.is_empty() {
			return Err(GeneratorError::EmptyOutput);
		}
		Ok(explanation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use autogit_git::RepositoryStatus;

	fn sh(script: &str) -> CommandMessageGenerator {
		CommandMessageGenerator::new("sh", vec!["-c".to_string(), script.to_string()])
	}

	fn context() -> DiffContext {
		DiffContext::new(
			RepositoryStatus {
				untracked: vec!["a.txt".to_string()],
				..Default::default()
			},
			"+hello".to_string(),
			"main".to_string(),
		)
	}

	#[tokio::test]
	async fn missing_command_is_unavailable() {
		let generator = CommandMessageGenerator::new("autogit-no-such-generator-xyz", vec![]);
		assert!(!generator.is_available());
		let result = generator
			.generate(&context(), MessageStyle::Conventional, true)
			.await;
		assert!(matches!(result, Err(GeneratorError::NotFound(_))));
	}

	#[tokio::test]
	async fn prompt_is_piped_to_stdin() {
		let generator = CommandMessageGenerator::new("cat", vec![]);
		assert!(generator.is_available());
		let echoed = generator
			.generate(&context(), MessageStyle::Simple, false)
			.await
			.unwrap();
		assert!(echoed.contains("Branch: main"));
		assert!(echoed.contains("+hello"));
	}

	#[tokio::test]
	async fn generated_message_is_cleaned() {
		let generator = sh(r#"cat >/dev/null; printf '%s\n' '"feat: add widget"'"#);
		let message = generator
			.generate(&context(), MessageStyle::Conventional, true)
			.await
			.unwrap();
		assert_eq!(message, "feat: add widget");
	}

	#[tokio::test]
	async fn blank_output_is_an_error() {
		let generator = sh("cat >/dev/null; echo");
		let result = generator
			.generate(&context(), MessageStyle::Conventional, true)
			.await;
		assert!(matches!(result, Err(GeneratorError::EmptyOutput)));
	}

	#[tokio::test]
	async fn non_zero_exit_reports_stderr() {
		let generator = sh("cat >/dev/null; echo 'model offline' >&2; exit 3");
		match generator.explain_error("boom", &ErrorContext::new("push")).await {
			Err(GeneratorError::Failed { code, stderr }) => {
				assert_eq!(code, Some(3));
				assert_eq!(stderr, "model offline");
			}
			other => panic!("expected failure, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn slow_generator_times_out() {
		let generator = sh("sleep 5").with_timeout(Duration::from_millis(100));
		let result = generator
			.generate(&context(), MessageStyle::Simple, false)
			.await;
		assert!(matches!(result, Err(GeneratorError::Timeout(_))));
	}

	#[tokio::test]
	async fn explanation_is_parsed() {
		let generator = sh(r#"cat >/dev/null; printf 'Your branch is behind.\n- Pull first\n- Push again\n'"#);
		let explanation = generator
			.explain_error("! [rejected]", &ErrorContext::new("push"))
			.await
			.unwrap();
		assert_eq!(explanation.explanation, "Your branch is behind.");
		assert_eq!(explanation.suggestions, vec!["Pull first", "Push again"]);
	}
}
