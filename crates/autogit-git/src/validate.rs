// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Input checks run before a command is spawned.

use crate::error::GitError;

const FORBIDDEN_BRANCH_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', ']', '\\'];

pub fn validate_branch_name(name: &str) -> Result<(), GitError> {
	let invalid = |reason: &str| GitError::InvalidBranchName {
		name: name.to_string(),
		reason: reason.to_string(),
	};

	if name.is_empty() {
		return Err(invalid("name is empty"));
	}
	if name.chars().any(char::is_whitespace) {
		return Err(invalid("contains whitespace"));
	}
	if let Some(c) = name.chars().find(|c| FORBIDDEN_BRANCH_CHARS.contains(c)) {
		return Err(invalid(&format!("contains forbidden character '{c}'")));
	}
	if name.starts_with('-') {
		return Err(invalid("cannot start with '-'"));
	}
	Ok(())
}

pub fn validate_commit_message(message: &str) -> Result<(), GitError> {
	if message.trim().is_empty() {
		return Err(GitError::EmptyCommitMessage);
	}
	Ok(())
}

pub fn validate_remote_url(url: &str) -> Result<(), GitError> {
	if url.trim().is_empty() {
		return Err(GitError::EmptyRemoteUrl);
	}
	Ok(())
}

pub fn validate_remote_name(name: &str) -> Result<(), GitError> {
	if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
		return Err(GitError::InvalidRemoteName(name.to_string()));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_accepts_ordinary_branch_names() {
		for name in ["main", "feature/login", "fix-123", "release_1.2"] {
			assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
		}
	}

	#[test]
	fn test_rejects_whitespace_and_forbidden_chars() {
		for name in ["my branch", "a\tb", "x~1", "x^", "a:b", "wh?", "st*r", "[x]", "a\\b", ""] {
			assert!(validate_branch_name(name).is_err(), "{name:?} should be rejected");
		}
	}

	#[test]
	fn test_rejects_option_lookalike() {
		assert!(validate_branch_name("--force").is_err());
	}

	#[test]
	fn test_commit_message_must_have_content() {
		assert!(matches!(
			validate_commit_message("   \n\t"),
			Err(GitError::EmptyCommitMessage)
		));
		assert!(validate_commit_message("fix: typo").is_ok());
	}

	#[test]
	fn test_remote_url_must_have_content() {
		assert!(matches!(validate_remote_url(" "), Err(GitError::EmptyRemoteUrl)));
		assert!(validate_remote_url("git@example.com:o/r.git").is_ok());
	}

	proptest! {
			/// Any name containing a forbidden character is rejected with a reason.
			#[test]
			fn prop_forbidden_chars_always_rejected(
					prefix in "[a-z]{0,5}",
					bad in prop::sample::select(FORBIDDEN_BRANCH_CHARS.to_vec()),
					suffix in "[a-z]{0,5}",
			) {
					let name = format!("{prefix}{bad}{suffix}");
					let is_invalid_branch = matches!(
							validate_branch_name(&name),
							Err(GitError::InvalidBranchName { .. })
					);
					prop_assert!(is_invalid_branch);
			}
	}
}
