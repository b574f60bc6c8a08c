// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use autogit_git::DiffContext;
use serde::Serialize;

use crate::error::GeneratorError;
use crate::options::MessageStyle;

/// What the failing operation was doing, for the explainer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
	pub operation: String,
	pub branch: Option<String>,
	pub remote: Option<String>,
}

impl ErrorContext {
	pub fn new(operation: impl Into<String>) -> Self {
		Self {
			operation: operation.into(),
			..Default::default()
		}
	}

	pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
		self.branch = Some(branch.into());
		self
	}

	pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
		self.remote = Some(remote.into());
		self
	}
}

/// A plain-language reading of a git error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorExplanation {
	pub explanation: String,
	pub suggestions: Vec<String>,
}

/// Turns repository context into commit messages and git errors into advice.
///
/// Both operations are best-effort: the workflows fall back to manual entry
/// or static instructions on any error.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
	/// Whether the generator is configured and usable right now.
	fn is_available(&self) -> bool;

	async fn generate(
		&self,
		context: &DiffContext,
		style: MessageStyle,
		include_scope: bool,
	) -> Result<String, GeneratorError>;

	async fn explain_error(
		&self,
		error_text: &str,
		context: &ErrorContext,
	) -> Result<ErrorExplanation, GeneratorError>;
}

/// Generator used when none is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl MessageGenerator for DisabledGenerator {
	fn is_available(&self) -> bool {
		false
	}

	async fn generate(
		&self,
		_context: &DiffContext,
		_style: MessageStyle,
		_include_scope: bool,
	) -> Result<String, GeneratorError> {
		Err(GeneratorError::NotConfigured)
	}

	async fn explain_error(
		&self,
		_error_text: &str,
		_context: &ErrorContext,
	) -> Result<ErrorExplanation, GeneratorError> {
		Err(GeneratorError::NotConfigured)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn disabled_generator_is_never_available() {
		let generator = DisabledGenerator;
		assert!(!generator.is_available());
		let result = generator
			.generate(&DiffContext::default(), MessageStyle::Simple, false)
			.await;
		assert!(matches!(result, Err(GeneratorError::NotConfigured)));
	}

	#[test]
	fn error_context_builders() {
		let ctx = ErrorContext::new("pull")
			.with_branch("main")
			.with_remote("origin");
		assert_eq!(ctx.operation, "pull");
		assert_eq!(ctx.branch.as_deref(), Some("main"));
		assert_eq!(ctx.remote.as_deref(), Some("origin"));
	}
}
