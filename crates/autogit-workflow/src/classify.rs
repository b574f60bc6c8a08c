// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Pattern matching over git's free-text errors.
//!
//! Git gives no machine-readable failure codes for the cases the workflows
//! recover from, so every decision here is a substring heuristic. Keep them
//! pure so they can be tested in isolation.

use std::fmt;

use serde::Serialize;

/// Conflict families, each with its own recovery script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
	Rebase,
	Merge,
	Pull,
}

impl fmt::Display for ConflictKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConflictKind::Rebase => f.write_str("rebase conflict"),
			ConflictKind::Merge => f.write_str("merge conflict"),
			ConflictKind::Pull => f.write_str("pull conflict"),
		}
	}
}

const REBASE_MARKERS: &[&str] = &[
	"could not apply",
	"rebase --continue",
	"rebase in progress",
	"it seems that there is already a rebase-merge directory",
];

const MERGE_MARKERS: &[&str] = &[
	"automatic merge failed",
	"fix conflicts and then commit the result",
	"conflict (content)",
	"conflict (add/add)",
	"conflict (modify/delete)",
	"conflict (rename/delete)",
];

const PULL_MARKERS: &[&str] = &[
	"pulling is not possible because you have unmerged files",
	"you have not concluded your merge",
	"would be overwritten by merge",
	"untracked working tree files would be overwritten",
	"unmerged files",
];

/// Classifies error text as one of the conflict kinds, or `None` when it is
/// some other failure. Rebase markers win over merge markers because a
/// conflicting rebase also prints `CONFLICT (content)` lines.
pub fn classify(error_text: &str) -> Option<ConflictKind> {
	let text = error_text.to_lowercase();
	let has_any = |markers: &[&str]| markers.iter().any(|m| text.contains(m));

	if has_any(REBASE_MARKERS) {
		Some(ConflictKind::Rebase)
	} else if has_any(MERGE_MARKERS) {
		Some(ConflictKind::Merge)
	} else if has_any(PULL_MARKERS) {
		Some(ConflictKind::Pull)
	} else {
		None
	}
}

/// Step-by-step recovery instructions shown when no explainer is available.
pub fn instructions(kind: ConflictKind) -> &'static [&'static str] {
	match kind {
		ConflictKind::Rebase => &[
			"A rebase stopped on conflicting changes.",
			"1. Run `git status` to list the conflicted files.",
			"2. Edit each file and resolve the conflict markers.",
			"3. Stage the resolved files with `git add <file>`.",
			"4. Continue with `git rebase --continue`.",
			"To give up and restore the previous state run `git rebase --abort`.",
		],
		ConflictKind::Merge => &[
			"The merge stopped on conflicting changes.",
			"1. Run `git status` to list the conflicted files.",
			"2. Edit each file and resolve the conflict markers.",
			"3. Stage the resolved files with `git add <file>`.",
			"4. Finish the merge with `git commit`.",
			"To give up and restore the previous state run `git merge --abort`.",
		],
		ConflictKind::Pull => &[
			"The pull could not start because of local state.",
			"1. Run `git status` to see unmerged or blocking files.",
			"2. Finish or abort any merge in progress (`git merge --abort`).",
			"3. Commit or stash local changes that would be overwritten.",
			"4. Run the sync again.",
		],
	}
}

/// Push refused because the remote has commits the local branch lacks.
pub fn is_push_rejection(error_text: &str) -> bool {
	let text = error_text.to_lowercase();
	["[rejected]", "non-fast-forward", "fetch first", "updates were rejected"]
		.iter()
		.any(|m| text.contains(m))
}

pub fn is_unrelated_histories(error_text: &str) -> bool {
	error_text
		.to_lowercase()
		.contains("refusing to merge unrelated histories")
}

/// Pull refused because local and remote have diverged and git was not told
/// how to reconcile them.
pub fn is_divergent(error_text: &str) -> bool {
	let text = error_text.to_lowercase();
	text.contains("divergent branches") || text.contains("have diverged")
}

/// Keeps the first `max_lines` lines, noting how many were dropped.
pub fn truncate_lines(text: &str, max_lines: usize) -> String {
	let lines: Vec<&str> = text.lines().collect();
	if lines.len() <= max_lines {
		return text.trim_end().to_string();
	}
	let mut kept = lines[..max_lines].join("\n");
	kept.push_str(&format!("\n... ({} more lines)", lines.len() - max_lines));
	kept
}
