//! Quiz prompt construction and response parsing.
//!
//! The model is asked to put [`SUMMARY_MARKER`] between the questions and
//! the summary, but nothing guarantees it will. [`parse_response`] treats the
//! reply as an unstructured blob and falls back to [`NO_SUMMARY`] when the
//! marker is missing.

use crate::CleanedSlide;
use serde::{Deserialize, Serialize};

/// Separator between the question block and the summary.
pub const SUMMARY_MARKER: &str = "--- Summary ---";

/// Summary used when the reply has no [`SUMMARY_MARKER`].
pub const NO_SUMMARY: &str = "No summary generated.";

/// Characters of slide text embedded in the prompt. Hard cut, may split a word.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// System instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates multiple-choice questions with answers and a summary from content.";

const USER_INSTRUCTION: &str = "Generate exactly 10 multiple-choice questions with four options each (one correct answer), and provide the correct answer after each question. Then, provide a separate summary of the following content. Ignore any references to lecturers or course numbers. Separate the questions and summary clearly:";

/// Generated questions and summary.
///
/// `Quiz::default()` (no questions, empty summary) is what a failed
/// generation leaves behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Question blocks, each expected to hold a question, its options and
    /// the answer. Passed through as-is.
    pub questions: Vec<String>,

    /// Summary text, or [`NO_SUMMARY`].
    pub summary: String,
}

impl Quiz {
    /// True when there is summary text other than the placeholder.
    pub fn has_summary(&self) -> bool {
        !self.summary.is_empty() && self.summary != NO_SUMMARY
    }
}

/// The two messages of a quiz request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPrompt {
    pub system: &'static str,
    pub user: String,
}

impl QuizPrompt {
    /// Build the prompt for the given aggregated slide text.
    pub fn for_text(text: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            user: build_user_prompt(text),
        }
    }
}

/// The user instruction with the truncated text and marker appended.
pub fn build_user_prompt(text: &str) -> String {
    let truncated = truncate_chars(text, MAX_PROMPT_CHARS);
    format!("{USER_INSTRUCTION}\n\n{truncated}\n\n{SUMMARY_MARKER}")
}

/// The first `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Join cleaned slide texts with single spaces.
pub fn aggregate(slides: &[CleanedSlide]) -> String {
    slides
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a model reply into question blocks and a summary.
///
/// The reply is trimmed and split on [`SUMMARY_MARKER`]. Everything before
/// the first marker is split on blank lines into question blocks; blocks
/// that are only whitespace are dropped. The text between the first marker
/// and the next one (or the end) is the trimmed summary.
pub fn parse_response(raw: &str) -> Quiz {
    let mut parts = raw.trim().split(SUMMARY_MARKER);
    let questions_part = parts.next().unwrap_or_default().trim();
    let summary = parts
        .next()
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| NO_SUMMARY.to_string());

    let questions = questions_part
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(str::to_string)
        .collect();

    Quiz { questions, summary }
}
