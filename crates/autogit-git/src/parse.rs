// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Parsers for porcelain output.

use crate::types::{RemoteDescriptor, RemoteDirection, RepositoryStatus};

/// Parses `git status --porcelain=v1 -z` output.
///
/// Records are NUL-terminated and paths are never quoted. Column one is the
/// index state, column two the working tree state. `??` marks an untracked
/// file. A rename or copy record is followed by a second record holding the
/// source path, which is skipped so only the destination is reported.
pub fn parse_status(output: &str) -> RepositoryStatus {
	let mut status = RepositoryStatus::default();
	let mut records = output.split('\0');

	while let Some(record) = records.next() {
		let mut chars = record.chars();
		let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
			continue;
		};
		if matches!(index, 'R' | 'C') {
			records.next();
		}
		let path = match record.get(3..) {
			Some(path) if !path.is_empty() => path.to_string(),
			_ => continue,
		};

		if index == '?' {
			status.untracked.push(path);
			continue;
		}
		if index == '!' {
			continue;
		}
		if index != ' ' {
			status.staged.push(path.clone());
		}
		if worktree != ' ' {
			status.unstaged.push(path);
		}
	}

	status
}

/// Parses `git remote -v`. Lines that are not `name url (fetch|push)` are
/// dropped.
pub fn parse_remotes(output: &str) -> Vec<RemoteDescriptor> {
	output
		.lines()
		.filter_map(|line| {
			let mut fields = line.split_whitespace();
			let name = fields.next()?;
			let url = fields.next()?;
			let direction = match fields.next()? {
				"(fetch)" => RemoteDirection::Fetch,
				"(push)" => RemoteDirection::Push,
				_ => return None,
			};
			if fields.next().is_some() {
				return None;
			}
			Some(RemoteDescriptor::new(name, url, direction))
		})
		.collect()
}

/// Parses `git branch --format=%(refname:short)`.
pub fn parse_branches(output: &str) -> Vec<String> {
	output
		.lines()
		.map(str::trim)
		.filter(|l| !l.is_empty() && !l.starts_with('('))
		.map(str::to_string)
		.collect()
}
