// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Git process runner and typed repository operations.

mod client;
mod command_client;
mod error;
mod mock_client;
mod parse;
mod runner;
mod types;
mod validate;

pub use client::GitClient;
pub use command_client::CommandGitClient;
pub use error::{GitError, OperationResult};
pub use mock_client::{MockCall, MockGitClient};
pub use parse::{parse_branches, parse_remotes, parse_status};
pub use runner::ProcessRunner;
pub use types::{
	is_detached_head, remote_names, DiffContext, PullOptions, RemoteDescriptor, RemoteDirection,
	RepositoryStatus,
};
pub use validate::{
	validate_branch_name, validate_commit_message, validate_remote_name, validate_remote_url,
};
