//! Ignore list of team members excluded from status reporting.

use std::collections::HashSet;

/// Delimiter separating entries in the raw ignore-list setting.
pub const IGNORE_LIST_DELIMITER: char = ',';

/// Immutable set of identities (user IDs or display names) that never count
/// as reporters and never appear in the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnorePolicy {
    entries: HashSet<String>,
}

impl IgnorePolicy {
    /// Parse a comma-separated ignore list.
    ///
    /// Entries are trimmed; empty entries are dropped so that an unset
    /// setting yields an empty policy. Matching is exact and case-sensitive.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(IGNORE_LIST_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains(identity)
    }

    /// True when either the stable ID or the resolved display name is listed.
    pub fn matches_member(&self, user_id: &str, display_name: &str) -> bool {
        self.contains(user_id) || self.contains(display_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
