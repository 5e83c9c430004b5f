//! Answer normalization.

use std::collections::BTreeSet;

/// Canonical form of a typed answer.
///
/// Lowercases, drops every whitespace character, and drops the parentheses
/// students use to mark optional terms, so `"(Alveolar) "` and `"alveolar"`
/// compare equal. Total and idempotent.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalize every item of a selection; duplicates collapse.
pub fn normalize_set<'a, I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    items.into_iter().map(|s| normalize(s)).collect()
}
