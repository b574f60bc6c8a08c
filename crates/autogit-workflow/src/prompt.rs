// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Prompt text for the message generator, and cleanup of what comes back.

use autogit_git::DiffContext;

use crate::generator::{ErrorContext, ErrorExplanation};
use crate::options::MessageStyle;

const COMMON_RULES: &str = "Rules:
- Use imperative mood (\"add\" not \"added\")
- Be specific about what changed
- If there are several unrelated changes, summarize the primary one
- Output ONLY the commit message, nothing else";

fn style_instructions(style: MessageStyle, include_scope: bool) -> String {
	match style {
		MessageStyle::Conventional => {
			let format = if include_scope {
				"<type>(<scope>): <description>"
			} else {
				"<type>: <description>"
			};
			format!(
				"Write a conventional commit message in the form {format}.\n\
				 Types: feat, fix, refactor, docs, style, test, chore.\n\
				 Keep it to a single line under 72 characters."
			)
		}
		MessageStyle::Simple => {
			"Write a single short sentence under 72 characters describing the change.".to_string()
		}
		MessageStyle::Detailed => "Write a subject line under 72 characters, a blank line, \
			 then a body of short wrapped lines explaining what changed."
			.to_string(),
	}
}

/// Cuts `content` to at most `max_bytes`, preferring a newline boundary and
/// never splitting a UTF-8 character.
pub fn truncate_diff(content: &str, max_bytes: usize) -> &str {
	if content.len() <= max_bytes {
		return content;
	}
	let mut end = max_bytes;
	while end > 0 && !content.is_char_boundary(end) {
		end -= 1;
	}
	let truncated = &content[..end];
	match truncated.rfind('\n') {
		Some(last_newline) => &truncated[..last_newline],
		None => truncated,
	}
}

pub fn commit_prompt(
	context: &DiffContext,
	style: MessageStyle,
	include_scope: bool,
	max_diff_bytes: usize,
) -> String {
	let diff = truncate_diff(&context.diff, max_diff_bytes);
	let notice = if diff.len() < context.diff.len() {
		format!(
			"\n[TRUNCATED: {} bytes, showing first {}]",
			context.diff.len(),
			diff.len()
		)
	} else {
		String::new()
	};

	let mut files = String::new();
	for (label, list) in [
		("staged", &context.status.staged),
		("unstaged", &context.status.unstaged),
		("untracked", &context.status.untracked),
	] {
		for path in list {
			files.push_str(&format!("- {path} ({label})\n"));
		}
	}

	format!(
		"You are generating a git commit message.\n\n{}\n\n{COMMON_RULES}\n\n\
		 Branch: {}\nFiles changed ({}):\n{files}\n<diff>\n{diff}\n</diff>{notice}\n",
		style_instructions(style, include_scope),
		context.branch,
		context.files_changed,
	)
}

pub fn explain_prompt(error_text: &str, context: &ErrorContext) -> String {
	let mut details = format!("Operation: git {}\n", context.operation);
	if let Some(ref branch) = context.branch {
		details.push_str(&format!("Branch: {branch}\n"));
	}
	if let Some(ref remote) = context.remote {
		details.push_str(&format!("Remote: {remote}\n"));
	}
	format!(
		"A git command failed. Explain the cause in two or three plain sentences, \
		 then list concrete next steps as lines starting with \"- \".\n\n\
		 {details}\n<error>\n{}\n</error>\n",
		error_text.trim()
	)
}

/// Strips code fences and wrapping quotes from a generated message.
pub fn clean_message(raw: &str) -> String {
	let mut text = raw.trim();

	if let Some(rest) = text.strip_prefix("```") {
		// Drop the info string on the opening fence.
		text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
		text = text.trim_end();
		text = text.strip_suffix("```").unwrap_or(text).trim();
	}

	for quote in ['"', '\'', '`'] {
		if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
			text = text[1..text.len() - 1].trim();
		}
	}

	text.to_string()
}

fn suggestion_text(line: &str) -> Option<&str> {
	if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
		return Some(rest.trim());
	}
	let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
	if digits > 0 {
		if let Some(rest) = line[digits..].strip_prefix(". ") {
			return Some(rest.trim());
		}
	}
	None
}

/// Splits explainer output into prose and bullet or numbered suggestions.
pub fn parse_explanation(raw: &str) -> ErrorExplanation {
	let mut explanation = Vec::new();
	let mut suggestions = Vec::new();

	let cleaned = clean_message(raw);
	for line in cleaned.lines() {
		let trimmed = line.trim();
		match suggestion_text(trimmed) {
			Some(s) if !s.is_empty() => suggestions.push(s.to_string()),
			_ => explanation.push(trimmed),
		}
	}

	ErrorExplanation {
		explanation: explanation.join("\n").trim().to_string(),
		suggestions,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use autogit_git::RepositoryStatus;
	use proptest::prelude::*;

	fn context(diff: &str) -> DiffContext {
		DiffContext::new(
			RepositoryStatus {
				staged: vec!["src/lib.rs".to_string()],
				unstaged: vec![],
				untracked: vec!["notes.md".to_string()],
			},
			diff.to_string(),
			"main".to_string(),
		)
	}

	#[test]
	fn commit_prompt_lists_files_and_branch() {
		let prompt = commit_prompt(&context("+fn a() {}"), MessageStyle::Conventional, true, 1024);
		assert!(prompt.contains("Branch: main"));
		assert!(prompt.contains("- src/lib.rs (staged)"));
		assert!(prompt.contains("- notes.md (untracked)"));
		assert!(prompt.contains("<type>(<scope>)"));
		assert!(!prompt.contains("TRUNCATED"));
	}

	#[test]
	fn commit_prompt_without_scope() {
		let prompt = commit_prompt(&context(""), MessageStyle::Conventional, false, 1024);
		assert!(prompt.contains("<type>: <description>"));
		assert!(!prompt.contains("<scope>"));
	}

	#[test]
	fn commit_prompt_marks_truncation() {
		let diff = "line one\nline two\nline three\n";
		let prompt = commit_prompt(&context(diff), MessageStyle::Simple, false, 12);
		assert!(prompt.contains("line one"));
		assert!(!prompt.contains("line three"));
		assert!(prompt.contains("[TRUNCATED:"));
	}

	#[test]
	fn explain_prompt_includes_context() {
		let ctx = ErrorContext::new("pull").with_remote("origin");
		let prompt = explain_prompt("fatal: boom\n", &ctx);
		assert!(prompt.contains("Operation: git pull"));
		assert!(prompt.contains("Remote: origin"));
		assert!(!prompt.contains("Branch:"));
		assert!(prompt.contains("<error>\nfatal: boom\n</error>"));
	}

	#[test]
	fn clean_message_strips_fences_and_quotes() {
		assert_eq!(clean_message("```text\nfeat: add x\n```"), "feat: add x");
		assert_eq!(clean_message("\"fix: y\""), "fix: y");
		assert_eq!(clean_message("  chore: z  "), "chore: z");
		assert_eq!(clean_message("```\n```"), "");
	}

	#[test]
	fn parse_explanation_splits_suggestions() {
		let raw = "Your branch is behind the remote.\n\n- Run git pull\n* Resolve conflicts\n2. Push again\n";
		let parsed = parse_explanation(raw);
		assert_eq!(parsed.explanation, "Your branch is behind the remote.");
		assert_eq!(
			parsed.suggestions,
			vec!["Run git pull", "Resolve conflicts", "Push again"]
		);
	}

	#[test]
	fn parse_explanation_keeps_plain_text() {
		let parsed = parse_explanation("Just prose.\n2024 was a year.");
		assert!(parsed.suggestions.is_empty());
		assert!(parsed.explanation.contains("2024 was a year."));
	}

	proptest! {
			/// Truncation never exceeds the byte limit.
			#[test]
			fn truncation_never_exceeds_max_bytes(content in ".{0,4000}", max_bytes in 1usize..2000) {
					prop_assert!(truncate_diff(&content, max_bytes).len() <= max_bytes);
			}

			/// Small diffs pass through untouched.
			#[test]
			fn small_diffs_are_not_truncated(content in ".{0,100}") {
					prop_assert_eq!(truncate_diff(&content, 1000), content.as_str());
			}
	}
}
