// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use autogit_config::{LogFormat, LogLevel, LoggingConfig};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(level: LogLevel) -> String {
	format!("autogit={}", log_level_to_tracing(level))
}

/// Subscriber in effect while configuration loads, before the configured one
/// can be built. Honors `RUST_LOG` and the `--log-level` flag.
pub fn bootstrap_subscriber<W>(
	level: Option<&str>,
	writer: W,
) -> impl tracing::Subscriber + Send + Sync
where
	W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
	let level = level.and_then(LogLevel::parse).unwrap_or_default();
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
	fmt().with_env_filter(filter).with_writer(writer).finish()
}

/// Logs go to stderr or the configured file, never stdout, so they do not
/// interleave with the interactive session.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directive(logging.level)));

	let (writer, ansi) = match &logging.file {
		Some(path) => {
			let file = OpenOptions::new()
				.create(true)
				.append(true)
				.open(path)
				.with_context(|| format!("failed to open log file {}", path.display()))?;
			(BoxMakeWriter::new(Mutex::new(file)), false)
		}
		None => (BoxMakeWriter::new(std::io::stderr), true),
	};

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(writer))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_ansi(ansi).with_writer(writer))
				.init();
		}
	}
	Ok(())
}
