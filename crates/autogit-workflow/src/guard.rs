// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Who asked for a workflow run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
	/// A user command.
	Manual,
	/// A debounced watcher or similar background source.
	Automatic,
}

impl fmt::Display for Trigger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Trigger::Manual => f.write_str("manual"),
			Trigger::Automatic => f.write_str("automatic"),
		}
	}
}

/// "Already running" latch. A second run is refused while a permit is held;
/// nothing is queued and nothing preempts the run in flight.
#[derive(Clone, Debug, Default)]
pub struct SingleFlight {
	running: Arc<AtomicBool>,
}

impl SingleFlight {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn try_acquire(&self) -> Option<FlightPermit> {
		self.running
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| FlightPermit {
				running: self.running.clone(),
			})
	}

	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::Acquire)
	}
}

/// Releases the latch when dropped, including on panic.
#[derive(Debug)]
pub struct FlightPermit {
	running: Arc<AtomicBool>,
}

impl Drop for FlightPermit {
	fn drop(&mut self) {
		self.running.store(false, Ordering::Release);
	}
}
