//! Suggestion insertion
//!
//! Replaces the open trigger span (trigger char up to the cursor) with the
//! selected candidate followed by one space.

use crate::cursor;
use crate::suggest::{Candidate, SuggestionContext};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Insertion {
    pub text: String,
    pub cursor: usize,
    /// Always closed after an insertion attempt
    pub context: SuggestionContext,
    /// Whether the text was rewritten
    pub applied: bool,
    /// The host should hand focus back to the text input
    pub refocus: bool,
}

/// Splice `selected` into `text` at the trigger the cursor sits in.
///
/// Without an open trigger the text and cursor come back unchanged.
pub fn insert_suggestion(text: &str, cursor: usize, selected: &Candidate) -> Insertion {
    let cursor = cursor::clamp(text, cursor);
    let context = SuggestionContext::detect(text, cursor);

    let Some(start) = context.trigger_start else {
        tracing::debug!(cursor, "no open trigger, insertion skipped");
        return Insertion {
            text: text.to_string(),
            cursor,
            context: SuggestionContext::closed(cursor),
            applied: false,
            refocus: false,
        };
    };

    let replacement = selected.insertion_text();
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(cursor::slice(text, 0, start));
    out.push_str(&replacement);
    out.push_str(&text[cursor::byte_index(text, cursor)..]);

    let new_cursor = start + replacement.chars().count();
    tracing::debug!(id = selected.id(), start, new_cursor, "suggestion inserted");

    Insertion {
        text: out,
        cursor: new_cursor,
        context: SuggestionContext::closed(new_cursor),
        applied: true,
        refocus: true,
    }
}
