use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifies a status message created by a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusHandle {
    pub chat_id: String,
    pub message_id: String,
}

impl StatusHandle {
    pub fn new(chat_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id: message_id.into(),
        }
    }

    /// Creates a handle with a fresh random message id.
    pub fn generate(chat_id: impl Into<String>) -> Self {
        Self::new(chat_id, Uuid::new_v4().to_string())
    }
}

/// A status change forwarded by [`super::ChannelNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    Created { handle: StatusHandle, text: String },
    Updated { handle: StatusHandle, text: String },
}

impl StatusEvent {
    pub fn handle(&self) -> &StatusHandle {
        match self {
            Self::Created { handle, .. } | Self::Updated { handle, .. } => handle,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Created { text, .. } | Self::Updated { text, .. } => text,
        }
    }
}

/// Errors returned by a notifier.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The receiving side is gone.
    #[error("Status channel closed")]
    Closed,

    /// The backend refused the update.
    #[error("Status update failed: {reason}")]
    Failed { reason: String },
}

impl NotifyError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
