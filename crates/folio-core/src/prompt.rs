//! Prompt construction for summarization and question answering.

use std::borrow::Cow;
use std::collections::BTreeMap;

use folio_store::{ChatMessage, ChatRole, SectionKind};

/// Section text beyond this many characters is cut before summarization.
pub const MAX_SECTION_CHARS: usize = 30_000;

/// Trailing history messages included in the question prompt.
pub const HISTORY_WINDOW: usize = 4;

/// Build the summarization prompt for one section's text.
#[must_use]
pub fn summarize_prompt(text: &str) -> String {
    let truncated = truncate_chars(text, MAX_SECTION_CHARS);
    format!(
        "You are a research assistant that creates clear, accurate summaries of academic text.\n\n\
         Summarize the following text in a concise paragraph:\n\n\
         {truncated}"
    )
}

/// Build the question prompt from section summaries, recent conversation,
/// and the new question.
///
/// Summaries stand in for the full text to keep the prompt bounded.
#[must_use]
pub fn question_prompt(
    summaries: &BTreeMap<SectionKind, String>,
    history: &[ChatMessage],
    question: &str,
) -> String {
    let context = summaries_context(summaries);
    let conversation = conversation_context(history);
    format!(
        "You are a research assistant helping with questions about an academic paper.\n\n\
         Here is information about the paper:\n\n\
         {context}{conversation}User question: {question}\n\n\
         Answer the user's question based on the paper content. If the information is not \
         in the paper, say that you don't have that information rather than making up an \
         answer."
    )
}

// Each entry renders as `NAME: summary` with an uppercased name and a
// blank line after it, the last entry included.
fn summaries_context(summaries: &BTreeMap<SectionKind, String>) -> String {
    let mut context = String::from("Paper summaries:\n");
    for (kind, summary) in summaries {
        context.push_str(&kind.as_str().to_uppercase());
        context.push_str(": ");
        context.push_str(summary);
        context.push_str("\n\n");
    }
    context
}

// Renders the last `HISTORY_WINDOW` messages oldest-first, or nothing at
// all for an empty history.
fn conversation_context(history: &[ChatMessage]) -> String {
    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
    if recent.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = recent
        .iter()
        .map(|msg| {
            let label = match msg.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{label}: {}", msg.content)
        })
        .collect();

    let mut block = String::from("Recent conversation:\n");
    block.push_str(&lines.join("\n"));
    block.push_str("\n\n");
    block
}

fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &text[..idx])),
        None => Cow::Borrowed(text),
    }
}
