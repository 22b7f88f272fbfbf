//! Serialized access to the session
//!
//! Every API call the UI makes runs on one task, in the order the UI issued
//! it. Outcomes that can move the selection carry the session's selection as
//! it stood right after the call, so the view follows the session instead of
//! the id it asked for.

use lugia_core::{
    ChatMessage, ConversationEntry, ConversationId, Deletion, RequestToken, Session, StoreError,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::tui::AppEvent;

/// Work for the session, tagged with the token the view will check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Restore { token: RequestToken },
    List { token: RequestToken, page: u32 },
    Create { token: RequestToken },
    Switch { token: RequestToken, id: ConversationId },
    Reload { token: RequestToken },
    Delete { token: RequestToken, id: ConversationId },
    Send { token: RequestToken, model: String, text: String },
}

/// Result of a session call, delivered through the event channel
#[derive(Debug)]
pub enum TaskOutcome {
    Restored {
        token: RequestToken,
        selected: Option<ConversationId>,
        result: Result<Vec<ChatMessage>, StoreError>,
    },
    Listed {
        token: RequestToken,
        page: u32,
        result: Result<Vec<ConversationEntry>, StoreError>,
    },
    Created {
        token: RequestToken,
        selected: Option<ConversationId>,
        result: Result<ConversationId, StoreError>,
    },
    /// A switch or a reload; `result` holds the messages of `selected`
    HistoryLoaded {
        token: RequestToken,
        selected: Option<ConversationId>,
        result: Result<Vec<ChatMessage>, StoreError>,
    },
    Deleted {
        token: RequestToken,
        id: ConversationId,
        selected: Option<ConversationId>,
        result: Result<Deletion, StoreError>,
    },
    Replied {
        token: RequestToken,
        result: Result<String, StoreError>,
    },
}

/// Handle to the task that owns the [`Session`]
pub struct SessionWorker {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionWorker {
    pub fn spawn(session: Session, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(session, rx, events));
        Self { tx }
    }

    pub fn submit(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("session worker stopped, dropping command");
        }
    }
}

async fn run(
    mut session: Session,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<AppEvent>,
) {
    while let Some(command) = commands.recv().await {
        let outcome = execute(&mut session, command).await;
        // The receiver is gone only when the app is shutting down
        if events.send(AppEvent::Task(outcome)).is_err() {
            break;
        }
    }
    debug!("session worker finished");
}

pub async fn execute(session: &mut Session, command: Command) -> TaskOutcome {
    match command {
        Command::Restore { token } => {
            let result = session.restore().await.map(|(_, messages)| messages);
            TaskOutcome::Restored {
                token,
                selected: session.selected().cloned(),
                result,
            }
        }
        Command::List { token, page } => TaskOutcome::Listed {
            token,
            page,
            result: session.list(page).await,
        },
        Command::Create { token } => {
            let result = session.create().await;
            TaskOutcome::Created {
                token,
                selected: session.selected().cloned(),
                result,
            }
        }
        Command::Switch { token, id } => {
            let result = session.switch(&id).await;
            TaskOutcome::HistoryLoaded {
                token,
                selected: session.selected().cloned(),
                result,
            }
        }
        Command::Reload { token } => {
            let result = session.reload().await;
            TaskOutcome::HistoryLoaded {
                token,
                selected: session.selected().cloned(),
                result,
            }
        }
        Command::Delete { token, id } => {
            let result = session.delete(&id).await;
            TaskOutcome::Deleted {
                token,
                id,
                selected: session.selected().cloned(),
                result,
            }
        }
        Command::Send { token, model, text } => TaskOutcome::Replied {
            token,
            result: session.send(&model, &text).await,
        },
    }
}
