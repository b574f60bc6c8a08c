// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
	Info,
	Warning,
	Error,
}

impl fmt::Display for NotificationLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NotificationLevel::Info => f.write_str("info"),
			NotificationLevel::Warning => f.write_str("warning"),
			NotificationLevel::Error => f.write_str("error"),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
	pub level: NotificationLevel,
	pub message: String,
}

/// Out-of-band summaries, independent of the interactive session.
/// Fire-and-forget: implementations must not fail or block.
pub trait Notifier: Send + Sync {
	fn notify(&self, level: NotificationLevel, message: &str);

	fn info(&self, message: &str) {
		self.notify(NotificationLevel::Info, message);
	}

	fn warn(&self, message: &str) {
		self.notify(NotificationLevel::Warning, message);
	}

	fn error(&self, message: &str) {
		self.notify(NotificationLevel::Error, message);
	}
}

/// Holds notifications until someone drains them, e.g. after the terminal
/// session has been torn down.
#[derive(Clone, Default)]
pub struct QueuedNotifier {
	queue: Arc<Mutex<Vec<Notification>>>,
}

impl QueuedNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies the queued notifications without removing them.
	pub fn notifications(&self) -> Vec<Notification> {
		self.queue
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Removes and returns everything queued so far.
	pub fn drain(&self) -> Vec<Notification> {
		std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
	}
}

impl Notifier for QueuedNotifier {
	fn notify(&self, level: NotificationLevel, message: &str) {
		tracing::debug!(level = %level, message, "notification queued");
		self.queue
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(Notification {
				level,
				message: message.to_string(),
			});
	}
}
