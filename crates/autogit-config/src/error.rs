// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

/// Errors raised while loading, merging or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// An `AUTOGIT_*` variable held a value of the wrong shape.
	#[error("Environment variable {name}: {message}")]
	Env { name: String, message: String },

	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },

	#[error("Could not determine home directory")]
	HomeDirNotFound,
}

impl ConfigError {
	pub fn env(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Env {
			name: name.into(),
			message: message.into(),
		}
	}

	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}
