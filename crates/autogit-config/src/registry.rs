// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Registry of configuration sources.

use tracing::{debug, info};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::runtime::AutogitConfig;
use crate::sources::ConfigSource;
use crate::validation::validate_config;
use crate::ConfigError;

pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Load every source, merge lowest precedence first, then validate.
	///
	/// Registration order does not matter. A source that fails to load
	/// fails the whole load: a broken config file is never silently ignored.
	pub fn load(&self, paths: PathsConfig) -> Result<AutogitConfig, ConfigError> {
		let mut sorted: Vec<_> = self.sources.iter().collect();
		sorted.sort_by_key(|s| s.precedence());

		debug!(source_count = sorted.len(), "loading configuration");

		let mut merged = ConfigLayer::default();
		for source in sorted {
			let layer = source.load()?;
			debug!(source = source.name(), "merging config layer");
			merged.merge(layer);
		}

		let config = AutogitConfig::from_layer(merged, paths)?;
		validate_config(&config)?;

		info!(
			preferred_remote = %config.workflow.preferred_remote,
			message_style = %config.workflow.message_style,
			generator = config.generator.command.as_deref().unwrap_or("none"),
			"configuration loaded"
		);

		Ok(config)
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

impl Default for ConfigRegistry {
	fn default() -> Self {
		Self::new()
	}
}
