pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod format;
pub mod model;
pub mod sequence;
pub mod session;
pub mod state;
pub mod storage;
pub mod transport;

// Re-export main types for convenience
pub use client::ConversationClient;
pub use config::Config;
pub use conversation::{filter_conversations, ConversationEntry, ConversationId};
pub use error::StoreError;
pub use format::{format, CodeBlock, RenderBlock, TextBlock, TextLine, TextSegment};
pub use model::ChatModel;
pub use sequence::{RequestSequence, RequestToken};
pub use session::{Deletion, Session};
pub use state::{ActiveConversation, ChatMessage, ChatRole};
pub use storage::SelectionStore;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
