// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::InteractiveSession;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A keystroke the session understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
	Char(char),
	Enter,
	Backspace,
	/// Ctrl-C.
	Interrupt,
}

impl Key {
	/// Maps a terminal key event, ignoring releases and keys with no meaning
	/// in a line editor.
	pub fn from_event(key: KeyEvent) -> Option<Self> {
		if key.kind == KeyEventKind::Release {
			return None;
		}
		if key.modifiers.contains(KeyModifiers::CONTROL) {
			return match key.code {
				KeyCode::Char('c') | KeyCode::Char('C') => Some(Key::Interrupt),
				_ => None,
			};
		}
		match key.code {
			KeyCode::Char(c) => Some(Key::Char(c)),
			KeyCode::Enter => Some(Key::Enter),
			KeyCode::Backspace => Some(Key::Backspace),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
	/// No prompt was waiting, or the session is closed.
	Ignored,
	/// The line buffer changed.
	Buffered,
	/// Enter answered the pending prompt.
	Submitted,
	/// Ctrl-C tore the session down.
	Cancelled,
}

/// Reads terminal key events on a blocking thread and feeds them to the
/// session until it closes.
pub fn spawn_key_reader(session: InteractiveSession) -> JoinHandle<()> {
	tokio::task::spawn_blocking(move || {
		while session.is_open() {
			match event::poll(POLL_INTERVAL) {
				Ok(false) => continue,
				Ok(true) => {}
				Err(e) => {
					warn!(error = %e, "terminal event poll failed");
					session.close_immediately();
					break;
				}
			}
			match event::read() {
				Ok(Event::Key(key)) => {
					if let Some(key) = Key::from_event(key) {
						session.handle_key(key);
					}
				}
				Ok(_) => {}
				Err(e) => {
					warn!(error = %e, "terminal event read failed");
					session.close_immediately();
					break;
				}
			}
		}
		debug!("key reader stopped");
	})
}

/// Answers the session's prompts with `lines`, one per prompt, in order.
/// Returns how many lines were consumed before the session closed.
pub fn spawn_line_feeder(session: InteractiveSession, lines: Vec<String>) -> JoinHandle<usize> {
	tokio::spawn(async move {
		let mut fed = 0;
		for line in lines {
			if session.wait_for_prompt().await.is_err() {
				break;
			}
			session.type_line(&line);
			fed += 1;
		}
		fed
	})
}
