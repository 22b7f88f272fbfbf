//! The active-conversation state machine
//!
//! A [`Session`] ties the store client to the durable selection. After any
//! successful operation the session is `Selected`; `None` is only seen
//! before [`Session::restore`] and while a selected conversation is deleted
//! and replaced.

use tracing::{info, warn};

use crate::client::ConversationClient;
use crate::conversation::{ConversationEntry, ConversationId};
use crate::error::{Result, StoreError};
use crate::state::{ActiveConversation, ChatMessage};
use crate::storage::SelectionStore;

/// What deleting a conversation did to the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// Another conversation was deleted; the selection is unchanged
    Other,
    /// The selected conversation was deleted and this one replaced it
    Replaced(ConversationId),
    /// The selected conversation was deleted but no replacement could be
    /// created; nothing is selected
    ReplacementFailed(StoreError),
}

pub struct Session {
    client: ConversationClient,
    store: SelectionStore,
    active: ActiveConversation,
}

impl Session {
    pub fn new(client: ConversationClient, store: SelectionStore) -> Self {
        Self {
            client,
            store,
            active: ActiveConversation::None,
        }
    }

    pub fn selected(&self) -> Option<&ConversationId> {
        self.active.selected()
    }

    /// Resume the stored selection, or start a new conversation when there
    /// is none or the server no longer knows it
    pub async fn restore(&mut self) -> Result<(ConversationId, Vec<ChatMessage>)> {
        let stored = self.store.load().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable selection state");
            None
        });

        if let Some(id) = stored {
            match self.switch(&id).await {
                Ok(messages) => return Ok((id, messages)),
                Err(err) if err.is_server() => {
                    warn!(conversation = %id, error = %err, "stored conversation unavailable, starting a new one");
                }
                Err(err) => return Err(err),
            }
        }

        let id = self.create().await?;
        Ok((id, Vec::new()))
    }

    pub async fn create(&mut self) -> Result<ConversationId> {
        let id = self.client.create_conversation().await?;
        info!(conversation = %id, "created conversation");
        self.select(id.clone());
        Ok(id)
    }

    pub async fn switch(&mut self, id: &ConversationId) -> Result<Vec<ChatMessage>> {
        let messages = self.client.switch_conversation(id).await?;
        info!(conversation = %id, messages = messages.len(), "switched conversation");
        self.select(id.clone());
        Ok(messages)
    }

    /// Re-fetch the selected conversation's messages
    pub async fn reload(&self) -> Result<Vec<ChatMessage>> {
        match self.selected() {
            Some(id) => self.client.conversation_history(id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Delete a conversation. Deleting the selected one creates and selects
    /// a replacement.
    ///
    /// Only a failed server-side delete is an error. Once the selected
    /// conversation is gone the selection is cleared, so a failed
    /// replacement leaves the session without one until the next `create`.
    pub async fn delete(&mut self, id: &ConversationId) -> Result<Deletion> {
        self.client.delete_conversation(id).await?;
        info!(conversation = %id, "deleted conversation");

        if !self.active.is_selected(id) {
            return Ok(Deletion::Other);
        }

        self.active = ActiveConversation::None;
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "could not clear stored selection");
        }

        match self.create().await {
            Ok(replacement) => Ok(Deletion::Replaced(replacement)),
            Err(err) => {
                warn!(conversation = %id, error = %err, "could not create a replacement conversation");
                Ok(Deletion::ReplacementFailed(err))
            }
        }
    }

    /// One page of conversations with the selected one flagged
    pub async fn list(&self, page: u32) -> Result<Vec<ConversationEntry>> {
        let ids = self.client.list_conversations(page).await?;
        Ok(ids
            .into_iter()
            .map(|id| ConversationEntry {
                selected: self.active.is_selected(&id),
                id,
            })
            .collect())
    }

    /// Send `text` in the context of the selected conversation
    pub async fn send(&self, model: &str, text: &str) -> Result<String> {
        self.client.send_message(self.selected(), model, text).await
    }

    fn select(&mut self, id: ConversationId) {
        if let Err(err) = self.store.save(&id) {
            warn!(conversation = %id, error = %err, "could not persist selection");
        }
        self.active = ActiveConversation::Selected(id);
    }
}
