// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{oneshot, Notify};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::key::{Key, KeyOutcome};
use crate::sink::{Style, TerminalSink};

const ERASE_CHAR: &str = "\x08 \x08";
const NEWLINE: &str = "\r\n";

struct PendingPrompt {
	default: String,
	reply: oneshot::Sender<Result<String, SessionError>>,
}

#[derive(Default)]
struct SessionState {
	/// Set only between a prompt request and the Enter that answers it.
	pending: Option<PendingPrompt>,
	input_buffer: String,
	is_open: bool,
}

struct Inner {
	state: Mutex<SessionState>,
	sink: Box<dyn TerminalSink>,
	prompt_ready: Notify,
}

/// A line-editing terminal session.
///
/// Keystrokes arrive through [`InteractiveSession::handle_key`]; a workflow
/// awaits lines through [`InteractiveSession::prompt`]. At most one prompt can
/// be outstanding: the pending slot is a single-slot mailbox, and a keystroke
/// with nothing waiting is dropped.
#[derive(Clone)]
pub struct InteractiveSession {
	inner: Arc<Inner>,
}

impl InteractiveSession {
	pub fn new(sink: impl TerminalSink + 'static) -> Self {
		Self {
			inner: Arc::new(Inner {
				state: Mutex::new(SessionState::default()),
				sink: Box::new(sink),
				prompt_ready: Notify::new(),
			}),
		}
	}

	fn state(&self) -> MutexGuard<'_, SessionState> {
		self
			.inner
			.state
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
	}

	fn emit(&self, text: &str, style: Style) {
		if let Err(e) = self.inner.sink.write(text, style) {
			warn!(error = %e, "failed to write to terminal");
		}
	}

	pub fn open(&self) -> Result<(), SessionError> {
		let mut state = self.state();
		if state.is_open {
			return Ok(());
		}
		self.inner.sink.enter()?;
		state.is_open = true;
		state.input_buffer.clear();
		debug!("interactive session opened");
		Ok(())
	}

	pub fn is_open(&self) -> bool {
		self.state().is_open
	}

	/// True while a prompt is waiting for Enter.
	pub fn has_pending_prompt(&self) -> bool {
		self.state().pending.is_some()
	}

	pub fn write(&self, text: &str) {
		self.emit(text, Style::Plain);
	}

	pub fn write_line(&self, text: &str) {
		self.write_styled_line(text, Style::Plain);
	}

	pub fn write_styled(&self, text: &str, style: Style) {
		self.emit(text, style);
	}

	pub fn write_styled_line(&self, text: &str, style: Style) {
		// Raw mode needs an explicit carriage return.
		for (i, line) in text.split('\n').enumerate() {
			if i > 0 {
				self.emit(NEWLINE, Style::Plain);
			}
			self.emit(line.trim_end_matches('\r'), style);
		}
		self.emit(NEWLINE, Style::Plain);
	}

	/// Waits for one line of input. An empty line resolves to `default`.
	pub async fn prompt(&self, label: &str, default: &str) -> Result<String, SessionError> {
		let rx = {
			let mut state = self.state();
			if !state.is_open {
				return Err(SessionError::Closed);
			}
			if state.pending.is_some() {
				return Err(SessionError::PromptOutstanding);
			}
			let (tx, rx) = oneshot::channel();
			state.pending = Some(PendingPrompt {
				default: default.to_string(),
				reply: tx,
			});
			state.input_buffer.clear();
			if default.is_empty() {
				self.emit(&format!("{label}: "), Style::Plain);
			} else {
				self.emit(&format!("{label} "), Style::Plain);
				self.emit(&format!("[{default}]"), Style::Muted);
				self.emit(": ", Style::Plain);
			}
			rx
		};
		self.inner.prompt_ready.notify_one();

		rx.await.unwrap_or(Err(SessionError::Closed))
	}

	/// Yes/no question. Empty input, or the hint itself, picks the default.
	pub async fn confirm(&self, label: &str, default_yes: bool) -> Result<bool, SessionError> {
		let hint = if default_yes { "Y/n" } else { "y/N" };
		let answer = self.prompt(label, hint).await?;
		Ok(interpret_confirm(&answer, hint, default_yes))
	}

	/// Shows a numbered list and reads a 1-based choice. Anything that is not
	/// a valid number picks the default option.
	pub async fn select(
		&self,
		label: &str,
		options: &[String],
		default_index: usize,
	) -> Result<String, SessionError> {
		if options.is_empty() {
			return Err(SessionError::NoOptions);
		}
		let default_index = default_index.min(options.len() - 1);

		self.write_styled_line(label, Style::Heading);
		for (i, option) in options.iter().enumerate() {
			let marker = if i == default_index { "*" } else { " " };
			self.write_line(&format!(" {marker} {}) {option}", i + 1));
		}
		let answer = self
			.prompt("Enter a number", &(default_index + 1).to_string())
			.await?;
		let index = pick_index(&answer, options.len()).unwrap_or(default_index);
		Ok(options[index].clone())
	}

	/// Feeds one keystroke into the session.
	pub fn handle_key(&self, key: Key) -> KeyOutcome {
		let mut state = self.state();
		if !state.is_open {
			return KeyOutcome::Ignored;
		}

		if key == Key::Interrupt {
			let pending = state.pending.take();
			state.input_buffer.clear();
			drop(state);
			self.emit(NEWLINE, Style::Plain);
			self.write_styled_line("Cancelled.", Style::Warning);
			if let Some(pending) = pending {
				let _ = pending.reply.send(Err(SessionError::Cancelled));
			}
			self.close_immediately();
			return KeyOutcome::Cancelled;
		}

		if state.pending.is_none() {
			return KeyOutcome::Ignored;
		}

		match key {
			Key::Char(c) => {
				state.input_buffer.push(c);
				drop(state);
				self.emit(c.encode_utf8(&mut [0; 4]), Style::Plain);
				KeyOutcome::Buffered
			}
			Key::Backspace => {
				let erased = state.input_buffer.pop().is_some();
				drop(state);
				if erased {
					self.emit(ERASE_CHAR, Style::Plain);
				}
				KeyOutcome::Buffered
			}
			Key::Enter => {
				let line = std::mem::take(&mut state.input_buffer);
				let Some(pending) = state.pending.take() else {
					return KeyOutcome::Ignored;
				};
				drop(state);
				self.emit(NEWLINE, Style::Plain);
				let value = if line.is_empty() {
					pending.default
				} else {
					line
				};
				let _ = pending.reply.send(Ok(value));
				KeyOutcome::Submitted
			}
			Key::Interrupt => KeyOutcome::Ignored,
		}
	}

	/// Types `line` followed by Enter.
	pub fn type_line(&self, line: &str) -> KeyOutcome {
		for c in line.chars() {
			self.handle_key(Key::Char(c));
		}
		self.handle_key(Key::Enter)
	}

	/// Resolves once a prompt is waiting for input.
	pub async fn wait_for_prompt(&self) -> Result<(), SessionError> {
		loop {
			{
				let state = self.state();
				if state.pending.is_some() {
					return Ok(());
				}
				if !state.is_open {
					return Err(SessionError::Closed);
				}
			}
			self.inner.prompt_ready.notified().await;
		}
	}

	/// Closes the session after `delay`, leaving final output on screen.
	pub async fn close(&self, delay: Duration) {
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		self.close_immediately();
	}

	pub fn close_immediately(&self) {
		let pending = {
			let mut state = self.state();
			if !state.is_open {
				return;
			}
			state.is_open = false;
			state.input_buffer.clear();
			state.pending.take()
		};
		if let Some(pending) = pending {
			let _ = pending.reply.send(Err(SessionError::Closed));
		}
		if let Err(e) = self.inner.sink.leave() {
			warn!(error = %e, "failed to restore terminal");
		}
		self.inner.prompt_ready.notify_one();
		debug!("interactive session closed");
	}
}

fn interpret_confirm(answer: &str, hint: &str, default_yes: bool) -> bool {
	let answer = answer.trim();
	if answer.is_empty() || answer == hint {
		return default_yes;
	}
	answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

fn pick_index(answer: &str, len: usize) -> Option<usize> {
	match answer.trim().parse::<usize>() {
		Ok(n) if (1..=len).contains(&n) => Some(n - 1),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::MemorySink;
	use proptest::prelude::*;

	fn open_session() -> (InteractiveSession, MemorySink) {
		let sink = MemorySink::new();
		let session = InteractiveSession::new(sink.clone());
		session.open().unwrap();
		(session, sink)
	}

	/// Spawns the future and answers its single prompt with `line`.
	async fn answer<T: Send + 'static>(
		session: &InteractiveSession,
		fut: impl std::future::Future<Output = Result<T, SessionError>> + Send + 'static,
		line: &str,
	) -> Result<T, SessionError> {
		let handle = tokio::spawn(fut);
		session.wait_for_prompt().await.unwrap();
		session.type_line(line);
		handle.await.unwrap()
	}

	#[tokio::test]
	async fn empty_line_resolves_to_default() {
		let (session, sink) = open_session();
		let s = session.clone();
		let value = answer(&session, async move { s.prompt("Branch", "main").await }, "").await;
		assert_eq!(value.unwrap(), "main");
		assert!(sink.contents().contains("Branch [main]: "));
	}

	#[tokio::test]
	async fn backspace_removes_last_character() {
		let (session, sink) = open_session();
		let s = session.clone();
		let handle = tokio::spawn(async move { s.prompt("Name", "").await });
		session.wait_for_prompt().await.unwrap();

		session.handle_key(Key::Char('a'));
		session.handle_key(Key::Char('b'));
		session.handle_key(Key::Backspace);
		session.handle_key(Key::Char('c'));
		assert_eq!(session.handle_key(Key::Enter), KeyOutcome::Submitted);

		assert_eq!(handle.await.unwrap().unwrap(), "ac");
		assert!(sink.contents().contains(ERASE_CHAR));
	}

	#[tokio::test]
	async fn backspace_on_empty_buffer_writes_nothing() {
		let (session, sink) = open_session();
		let s = session.clone();
		let handle = tokio::spawn(async move { s.prompt("Name", "x").await });
		session.wait_for_prompt().await.unwrap();

		session.handle_key(Key::Backspace);
		session.handle_key(Key::Enter);
		assert_eq!(handle.await.unwrap().unwrap(), "x");
		assert!(!sink.contents().contains(ERASE_CHAR));
	}

	#[tokio::test]
	async fn interrupt_cancels_prompt_and_closes() {
		let (session, sink) = open_session();
		let s = session.clone();
		let handle = tokio::spawn(async move { s.prompt("Message", "").await });
		session.wait_for_prompt().await.unwrap();

		session.handle_key(Key::Char('x'));
		assert_eq!(session.handle_key(Key::Interrupt), KeyOutcome::Cancelled);

		assert!(matches!(
			handle.await.unwrap(),
			Err(SessionError::Cancelled)
		));
		assert!(!session.is_open());
		assert!(sink.contents().contains("Cancelled."));
	}

	#[tokio::test]
	async fn second_prompt_while_pending_is_rejected() {
		let (session, _sink) = open_session();
		let s = session.clone();
		let first = tokio::spawn(async move { s.prompt("First", "").await });
		session.wait_for_prompt().await.unwrap();

		let second = session.prompt("Second", "").await;
		assert!(matches!(second, Err(SessionError::PromptOutstanding)));

		session.type_line("one");
		assert_eq!(first.await.unwrap().unwrap(), "one");
	}

	#[tokio::test]
	async fn keys_without_pending_prompt_are_ignored() {
		let (session, sink) = open_session();
		assert_eq!(session.handle_key(Key::Char('z')), KeyOutcome::Ignored);
		assert_eq!(session.handle_key(Key::Enter), KeyOutcome::Ignored);
		assert_eq!(sink.contents(), "");
	}

	#[tokio::test]
	async fn prompt_on_closed_session_fails() {
		let sink = MemorySink::new();
		let session = InteractiveSession::new(sink);
		assert!(matches!(
			session.prompt("x", "").await,
			Err(SessionError::Closed)
		));
	}

	#[tokio::test]
	async fn close_resolves_pending_prompt() {
		let (session, _sink) = open_session();
		let s = session.clone();
		let handle = tokio::spawn(async move { s.prompt("x", "").await });
		session.wait_for_prompt().await.unwrap();
		session.close(Duration::ZERO).await;
		assert!(matches!(handle.await.unwrap(), Err(SessionError::Closed)));
		assert!(session.wait_for_prompt().await.is_err());
	}

	#[tokio::test]
	async fn confirm_empty_input_uses_default() {
		let (session, sink) = open_session();
		let s = session.clone();
		let yes = answer(&session, async move { s.confirm("Push?", true).await }, "").await;
		assert!(yes.unwrap());
		assert!(sink.contents().contains("[Y/n]"));

		let s = session.clone();
		let no = answer(&session, async move { s.confirm("Push?", false).await }, "").await;
		assert!(!no.unwrap());
	}

	#[tokio::test]
	async fn confirm_n_overrides_yes_default() {
		let (session, _sink) = open_session();
		let s = session.clone();
		let value = answer(&session, async move { s.confirm("Push?", true).await }, "n").await;
		assert!(!value.unwrap());
	}

	#[tokio::test]
	async fn select_non_numeric_falls_back_to_default() {
		let (session, sink) = open_session();
		let options: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
		let s = session.clone();
		let opts = options.clone();
		let value = answer(&session, async move { s.select("Pick", &opts, 1).await }, "abc").await;
		assert_eq!(value.unwrap(), "b");
		assert!(sink.contents().contains("3) c"));

		let s = session.clone();
		let opts = options.clone();
		let value = answer(&session, async move { s.select("Pick", &opts, 1).await }, "3").await;
		assert_eq!(value.unwrap(), "c");
	}

	#[tokio::test]
	async fn select_without_options_is_an_error() {
		let (session, _sink) = open_session();
		assert!(matches!(
			session.select("Pick", &[], 0).await,
			Err(SessionError::NoOptions)
		));
		assert!(!session.has_pending_prompt());
	}

	#[test]
	fn confirm_hint_literal_means_default() {
		assert!(interpret_confirm("Y/n", "Y/n", true));
		assert!(!interpret_confirm("y/N", "y/N", false));
		assert!(interpret_confirm("YES", "y/N", false));
		assert!(!interpret_confirm("nope", "Y/n", true));
	}

	proptest! {
			/// Only y / yes (any case) are truthy for non-default input.
			#[test]
			fn prop_confirm_truthy_only_for_yes(answer in "[a-zA-Z]{1,5}", default_yes: bool) {
					let hint = if default_yes { "Y/n" } else { "y/N" };
					let expected = answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes");
					prop_assert_eq!(interpret_confirm(&answer, hint, default_yes), expected);
			}

			/// Out-of-range numbers never pick an option.
			#[test]
			fn prop_pick_index_in_range(n in 0usize..20, len in 1usize..10) {
					let picked = pick_index(&n.to_string(), len);
					if n >= 1 && n <= len {
							prop_assert_eq!(picked, Some(n - 1));
					} else {
							prop_assert_eq!(picked, None);
					}
			}
	}
}
