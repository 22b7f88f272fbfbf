use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Could not reach the chat server: {0}")]
    Network(String),

    #[error("Server returned {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Unexpected response from the chat server: {0}")]
    Decode(String),

    #[error("Could not persist the selected conversation: {0}")]
    Storage(String),
}

impl StoreError {
    /// The server answered with an error status, as opposed to being unreachable
    /// or replying with something unreadable
    pub fn is_server(&self) -> bool {
        matches!(self, StoreError::Server { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
