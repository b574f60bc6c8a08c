// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::QueueableCommand;

/// Visual role of a piece of session output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
	#[default]
	Plain,
	Heading,
	Info,
	Success,
	Warning,
	Error,
	Muted,
}

impl Style {
	fn color(self) -> Option<Color> {
		match self {
			Style::Plain => None,
			Style::Heading => Some(Color::Cyan),
			Style::Info => Some(Color::Blue),
			Style::Success => Some(Color::Green),
			Style::Warning => Some(Color::Yellow),
			Style::Error => Some(Color::Red),
			Style::Muted => Some(Color::DarkGrey),
		}
	}
}

/// Where an interactive session sends its output.
pub trait TerminalSink: Send + Sync {
	/// Called when the session opens.
	fn enter(&self) -> io::Result<()> {
		Ok(())
	}

	/// Called once when the session closes.
	fn leave(&self) -> io::Result<()> {
		Ok(())
	}

	fn write(&self, text: &str, style: Style) -> io::Result<()>;
}

/// Sink that drives the real terminal through crossterm. Raw mode is held
/// between `enter` and `leave` so keystrokes arrive one at a time.
pub struct CrosstermSink {
	out: Mutex<io::Stdout>,
	raw: AtomicBool,
}

impl CrosstermSink {
	pub fn new() -> Self {
		Self {
			out: Mutex::new(io::stdout()),
			raw: AtomicBool::new(false),
		}
	}
}

impl Default for CrosstermSink {
	fn default() -> Self {
		Self::new()
	}
}

impl TerminalSink for CrosstermSink {
	fn enter(&self) -> io::Result<()> {
		if !self.raw.swap(true, Ordering::SeqCst) {
			enable_raw_mode()?;
		}
		Ok(())
	}

	fn leave(&self) -> io::Result<()> {
		if self.raw.swap(false, Ordering::SeqCst) {
			disable_raw_mode()?;
		}
		Ok(())
	}

	fn write(&self, text: &str, style: Style) -> io::Result<()> {
		let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
		match style.color() {
			None => out.queue(Print(text))?,
			Some(color) => out.queue(PrintStyledContent(text.with(color)))?,
		};
		out.flush()
	}
}

impl Drop for CrosstermSink {
	fn drop(&mut self) {
		let _ = self.leave();
	}
}

/// Sink that keeps everything written in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
	buffer: Arc<Mutex<String>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Everything written so far, without styling.
	pub fn contents(&self) -> String {
		self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}
}

impl TerminalSink for MemorySink {
	fn write(&self, text: &str, _style: Style) -> io::Result<()> {
		self
			.buffer
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push_str(text);
		Ok(())
	}
}
