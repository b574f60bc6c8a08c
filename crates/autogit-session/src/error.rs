// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
	/// The user pressed Ctrl-C while a prompt was waiting.
	#[error("cancelled by user")]
	Cancelled,

	#[error("session is closed")]
	Closed,

	/// A second prompt was requested before the first one was answered.
	#[error("a prompt is already waiting for input")]
	PromptOutstanding,

	#[error("select requires at least one option")]
	NoOptions,

	#[error("terminal I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl SessionError {
	/// True when the user ended the session rather than something failing.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, SessionError::Cancelled | SessionError::Closed)
	}
}
