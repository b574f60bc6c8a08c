// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Interactive terminal session used by autogit workflows.
//!
//! The session is a line editor over a [`TerminalSink`]: keystrokes are fed
//! in one at a time and a workflow awaits whole lines through `prompt`,
//! `confirm` and `select`.

mod error;
mod key;
mod session;
mod sink;

pub use error::SessionError;
pub use key::{spawn_key_reader, spawn_line_feeder, Key, KeyOutcome};
pub use session::InteractiveSession;
pub use sink::{CrosstermSink, MemorySink, Style, TerminalSink};
