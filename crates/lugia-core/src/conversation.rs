use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Names the server gives new conversations: `conversation_YYYYMMDD_HHMMSS.json`
static TIMESTAMPED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^conversation_(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})\.json$")
        .expect("timestamped conversation pattern is valid")
});

/// Opaque server-side conversation identifier (the conversation file name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label: the creation time for server-generated names,
    /// otherwise the id itself
    pub fn label(&self) -> String {
        match TIMESTAMPED_NAME.captures(&self.0) {
            Some(caps) => format!(
                "{}-{}-{} {}:{}:{}",
                &caps[1], &caps[2], &caps[3], &caps[4], &caps[5], &caps[6]
            ),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A row of the conversation listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub id: ConversationId,
    pub selected: bool,
}

/// Case-insensitive match of `query` against the id and its label.
/// An empty or blank query keeps every entry.
pub fn filter_conversations<'a>(
    entries: &'a [ConversationEntry],
    query: &str,
) -> Vec<&'a ConversationEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|entry| {
            entry.id.as_str().to_lowercase().contains(&needle)
                || entry.id.label().to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> ConversationEntry {
        ConversationEntry {
            id: ConversationId::new(id),
            selected: false,
        }
    }

    #[test]
    fn test_label_for_timestamped_name() {
        let id = ConversationId::new("conversation_20240610_143022.json");
        assert_eq!(id.label(), "2024-06-10 14:30:22");
    }

    #[test]
    fn test_label_for_other_names() {
        let id = ConversationId::new("notes.json");
        assert_eq!(id.label(), "notes.json");
    }

    #[test]
    fn test_filter_matches_label_and_id() {
        let entries = vec![
            entry("conversation_20240610_143022.json"),
            entry("conversation_20240611_090000.json"),
            entry("Rust Questions.json"),
        ];

        let by_label = filter_conversations(&entries, "2024-06-11");
        assert_eq!(by_label.len(), 1);
        assert_eq!(by_label[0].id.as_str(), "conversation_20240611_090000.json");

        let by_id = filter_conversations(&entries, "rust");
        assert_eq!(by_id.len(), 1);

        assert_eq!(filter_conversations(&entries, "  ").len(), 3);
        assert!(filter_conversations(&entries, "python").is_empty());
    }
}
