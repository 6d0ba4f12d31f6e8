//! Extraction of the user-visible reply from thread messages.

use concierge_assistant::{TextContent, ThreadMessage};

/// Removes annotation markers from a text value.
///
/// Each annotation's literal text is removed everywhere it occurs, in
/// annotation order. This is substring removal, not offset splicing: if the
/// marker text also appears elsewhere in the value, that occurrence goes too.
#[must_use]
pub fn strip_annotations(text: &TextContent) -> String {
    text.annotations
        .iter()
        .filter(|annotation| !annotation.text.is_empty())
        .fold(text.value.clone(), |value, annotation| {
            value.replace(&annotation.text, "")
        })
}

/// Returns the stripped text of the newest message, if it has any text.
///
/// `messages` must be ordered newest first.
#[must_use]
pub fn latest_reply(messages: &[ThreadMessage]) -> Option<String> {
    messages
        .first()
        .and_then(ThreadMessage::first_text)
        .map(strip_annotations)
}
