// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Config file locations.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Directory name used under the XDG config home.
const APP_DIR: &str = "autogit";

/// Per-repository config directory, relative to the workspace root.
pub const WORKSPACE_CONFIG_DIR: &str = ".autogit";

const CONFIG_FILE: &str = "config.toml";

/// Resolved config file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// `$XDG_CONFIG_HOME/autogit/config.toml`, or the file passed with `--config`.
	pub user_config_file: PathBuf,
	/// `<workspace>/.autogit/config.toml` when a workspace is known.
	pub workspace_config_file: Option<PathBuf>,
}

impl PathsConfig {
	pub fn config_dir(&self) -> PathBuf {
		self
			.user_config_file
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_else(|| self.user_config_file.clone())
	}

	/// Attach the workspace config file for `workspace`.
	pub fn with_workspace(mut self, workspace: &Path) -> Self {
		self.workspace_config_file = Some(workspace_config_path(workspace));
		self
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/autogit/config.toml"),
			workspace_config_file: None,
		}
	}
}

/// Resolve the user config file following the XDG Base Directory layout:
/// `XDG_CONFIG_HOME` if set, otherwise `~/.config`.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) if !dir.is_empty() => PathBuf::from(dir),
		_ => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	tracing::debug!(config_home = %config_home.display(), "resolved XDG config home");

	Ok(PathsConfig {
		user_config_file: config_home.join(APP_DIR).join(CONFIG_FILE),
		workspace_config_file: None,
	})
}

pub fn workspace_config_path(workspace: &Path) -> PathBuf {
	workspace.join(WORKSPACE_CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_file_lives_under_autogit_dir() {
		let paths = resolve_xdg_paths().unwrap();
		assert!(paths.user_config_file.ends_with("autogit/config.toml"));
		assert!(paths.config_dir().ends_with("autogit"));
		assert!(paths.workspace_config_file.is_none());
	}

	#[test]
	fn workspace_file_is_inside_dot_autogit() {
		let paths = PathsConfig::default().with_workspace(Path::new("/repo"));
		assert_eq!(
			paths.workspace_config_file,
			Some(PathBuf::from("/repo/.autogit/config.toml"))
		);
	}
}
