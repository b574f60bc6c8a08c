// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autogit_git::DiffContext;

use crate::error::GeneratorError;
use crate::generator::{ErrorContext, ErrorExplanation, MessageGenerator};
use crate::options::MessageStyle;

/// Scripted message generator for testing.
#[derive(Clone, Default)]
pub struct MockMessageGenerator {
	pub available: bool,
	/// Message returned by generate; `None` makes generation fail.
	pub message: Option<String>,
	/// Explanation returned by explain_error; `None` makes it fail.
	pub explanation: Option<ErrorExplanation>,
	generate_calls: Arc<AtomicUsize>,
	explained: Arc<Mutex<Vec<(String, ErrorContext)>>>,
}

impl MockMessageGenerator {
	/// Available, but every request fails.
	pub fn new() -> Self {
		Self {
			available: true,
			..Default::default()
		}
	}

	pub fn unavailable() -> Self {
		Self::default()
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn with_explanation(mut self, explanation: impl Into<String>, suggestions: &[&str]) -> Self {
		self.explanation = Some(ErrorExplanation {
			explanation: explanation.into(),
			suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
		});
		self
	}

	pub fn generate_calls(&self) -> usize {
		self.generate_calls.load(Ordering::SeqCst)
	}

	/// Error texts and contexts passed to explain_error, in order.
	pub fn explained(&self) -> Vec<(String, ErrorContext)> {
		self.explained.lock().unwrap().clone()
	}
}

#[async_trait]
impl MessageGenerator for MockMessageGenerator {
	fn is_available(&self) -> bool {
		self.available
	}

	async fn generate(
		&self,
		_context: &DiffContext,
		_style: MessageStyle,
		_include_scope: bool,
	) -> Result<String, GeneratorError> {
		self.generate_calls.fetch_add(1, Ordering::SeqCst);
		self.message.clone().ok_or(GeneratorError::EmptyOutput)
	}

	async fn explain_error(
		&self,
		error_text: &str,
		context: &ErrorContext,
	) -> Result<ErrorExplanation, GeneratorError> {
		self
			.explained
			.lock()
			.unwrap()
			.push((error_text.to_string(), context.clone()));
		self.explanation.clone().ok_or(GeneratorError::EmptyOutput)
	}
}
