//! UI-agnostic conversation state types
//!
//! Shared by the session and any front-end; nothing here depends on a UI
//! framework.

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationId;

/// A chat message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            id: None,
            timestamp: None,
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Which conversation the client currently treats as active.
///
/// `None` only exists at start-up and transiently while the selected
/// conversation is being deleted and replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveConversation {
    #[default]
    None,
    Selected(ConversationId),
}

impl ActiveConversation {
    pub fn selected(&self) -> Option<&ConversationId> {
        match self {
            ActiveConversation::None => None,
            ActiveConversation::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self, id: &ConversationId) -> bool {
        self.selected() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_decodes_server_shape() {
        let json = r#"{"id":"5d1c","role":"assistant","content":"hi","timestamp":"2024-06-10T12:00:00Z"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, ChatRole::Assistant);
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.id.as_deref(), Some("5d1c"));
    }

    #[test]
    fn test_message_decodes_without_metadata() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert_eq!(msg, ChatMessage::user("hello"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = serde_json::from_str::<ChatMessage>(r#"{"role":"system","content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_active_conversation_selection() {
        let id = ConversationId::new("conversation_20240610_120000.json");
        let active = ActiveConversation::Selected(id.clone());
        assert!(active.is_selected(&id));
        assert!(!ActiveConversation::None.is_selected(&id));
    }
}
