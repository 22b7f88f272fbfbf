/// Model shortcuts the chat server resolves to concrete provider models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatModel {
    Claude3Haiku,
    Claude3Opus,
    Claude3Sonnet,
    Claude2,
    #[default]
    Gpt4,
    Gpt35,
}

impl ChatModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatModel::Claude3Haiku => "claude-3-haiku",
            ChatModel::Claude3Opus => "claude-3-opus",
            ChatModel::Claude3Sonnet => "claude-3-sonnet",
            ChatModel::Claude2 => "claude-2",
            ChatModel::Gpt4 => "gpt-4",
            ChatModel::Gpt35 => "gpt-3.5",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "claude-3-haiku" => Some(ChatModel::Claude3Haiku),
            "claude-3-opus" => Some(ChatModel::Claude3Opus),
            "claude-3-sonnet" => Some(ChatModel::Claude3Sonnet),
            "claude-2" => Some(ChatModel::Claude2),
            "gpt-4" => Some(ChatModel::Gpt4),
            "gpt-3.5" => Some(ChatModel::Gpt35),
            _ => None,
        }
    }

    pub fn all() -> Vec<ChatModel> {
        vec![
            ChatModel::Claude3Haiku,
            ChatModel::Claude3Opus,
            ChatModel::Claude3Sonnet,
            ChatModel::Claude2,
            ChatModel::Gpt4,
            ChatModel::Gpt35,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatModel::Claude3Haiku => "Claude 3 Haiku",
            ChatModel::Claude3Opus => "Claude 3 Opus",
            ChatModel::Claude3Sonnet => "Claude 3 Sonnet",
            ChatModel::Claude2 => "Claude 2.1",
            ChatModel::Gpt4 => "GPT-4 Turbo",
            ChatModel::Gpt35 => "GPT-3.5 Turbo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for model in ChatModel::all() {
            assert_eq!(ChatModel::from_str(model.as_str()), Some(model));
        }
        assert_eq!(ChatModel::from_str(" GPT-4 "), Some(ChatModel::Gpt4));
        assert_eq!(ChatModel::from_str("llama3"), None);
    }
}
