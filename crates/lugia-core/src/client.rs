use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::ConversationId;
use crate::error::{Result, StoreError};
use crate::state::ChatMessage;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_file: Option<&'a ConversationId>,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct ConversationsResponse {
    conversations: Vec<ConversationId>,
}

#[derive(Deserialize)]
struct NewConversationResponse {
    conversation_file: Option<ConversationId>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: Value,
}

/// Client for the conversation-management and chat endpoints
#[derive(Clone)]
pub struct ConversationClient {
    transport: Arc<dyn Transport>,
}

impl ConversationClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn http(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(base_url)?)))
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path();
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            let detail = error_detail(&response);
            tracing::debug!(%path, status = response.status, %detail, "request failed");
            return Err(StoreError::Server {
                status: response.status,
                detail,
            });
        }

        Ok(response)
    }

    /// One page of conversation ids, in server order. Pages start at 1.
    pub async fn list_conversations(&self, page: u32) -> Result<Vec<ConversationId>> {
        let page = page.max(1);
        let response = self
            .call(ApiRequest::get(&["conversations", ""]).query("page", page.to_string()))
            .await?;

        let listing: ConversationsResponse = response.json()?;
        tracing::debug!(page, count = listing.conversations.len(), "listed conversations");
        Ok(listing.conversations)
    }

    pub async fn create_conversation(&self) -> Result<ConversationId> {
        let response = self.call(ApiRequest::post(&["conversations", "new", ""])).await?;

        let created: NewConversationResponse = response.json()?;
        created
            .conversation_file
            .ok_or_else(|| StoreError::Decode("server did not return a conversation id".to_string()))
    }

    /// Mark `id` active on the server, then fetch its messages
    pub async fn switch_conversation(&self, id: &ConversationId) -> Result<Vec<ChatMessage>> {
        self.call(
            ApiRequest::post(&["conversations", "switch", ""])
                .query("conversation_file", id.as_str()),
        )
        .await?;

        self.conversation_history(id).await
    }

    pub async fn conversation_history(&self, id: &ConversationId) -> Result<Vec<ChatMessage>> {
        let response = self
            .call(
                ApiRequest::get(&["conversations", "history", ""])
                    .query("conversation_file", id.as_str()),
            )
            .await?;

        let history: HistoryResponse = response.json()?;
        Ok(history.messages)
    }

    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<()> {
        self.call(ApiRequest::delete(&["conversations", id.as_str()]))
            .await?;
        Ok(())
    }

    /// Single request/response exchange; the reply text is returned as-is
    pub async fn send_message(
        &self,
        context: Option<&ConversationId>,
        model: &str,
        text: &str,
    ) -> Result<String> {
        let body = serde_json::to_value(ChatRequest {
            model,
            content: text,
            conversation_file: context,
        })?;

        let response = self.call(ApiRequest::post(&["chat", ""]).json(body)).await?;
        let reply: ChatResponse = response.json()?;
        Ok(reply.response)
    }
}

/// FastAPI puts the reason in `detail`, either a string or a list of
/// validation errors; fall back to the raw body.
fn error_detail(response: &ApiResponse) -> String {
    match serde_json::from_str::<ErrorResponse>(&response.body) {
        Ok(ErrorResponse {
            detail: Value::String(detail),
        }) => detail,
        Ok(ErrorResponse { detail }) => detail.to_string(),
        Err(_) if response.body.trim().is_empty() => "no details".to_string(),
        Err(_) => response.body.trim().to_string(),
    }
}
