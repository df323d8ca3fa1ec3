//! Reporting-identity extraction from inbound chat messages.
//!
//! Most status updates carry their author in the event's sender field. Posts
//! made on a member's behalf (workflow forms, integrations) have no sender and
//! name the member with a mention token instead, e.g.
//! `Submission from <@U01J9JZQZ8G>`.

const MENTION_START: &str = "<@";
const MENTION_END: char = '>';
const MENTION_LABEL_SEPARATOR: char = '|';

/// Resolve who a message reports for.
///
/// Returns the explicit sender when present, otherwise the first mention
/// token in `text`. `None` means the message names nobody, which is the
/// normal outcome for chatter that is not a status report.
pub fn extract_identity<'a>(explicit_sender: &'a str, text: &'a str) -> Option<&'a str> {
    let sender = explicit_sender.trim();
    if !sender.is_empty() {
        return Some(sender);
    }
    first_mention(text)
}

fn first_mention(text: &str) -> Option<&str> {
    let start = text.find(MENTION_START)? + MENTION_START.len();
    let rest = &text[start..];
    let end = rest.find(MENTION_END)?;
    let token = &rest[..end];

    // `<@U123|alice>` carries a display label after the ID.
    let id = token
        .split_once(MENTION_LABEL_SEPARATOR)
        .map_or(token, |(id, _label)| id)
        .trim();

    (!id.is_empty()).then_some(id)
}
