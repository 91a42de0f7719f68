//! Trait definitions for status notification.

use async_trait::async_trait;

use super::types::{NotifyError, StatusHandle};

/// Capability to publish and update a user-visible status message.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Posts a new status message to `chat_id` and returns its handle.
    async fn send_status(&self, chat_id: &str, text: &str) -> Result<StatusHandle, NotifyError>;

    /// Replaces the text of a message previously returned by `send_status`.
    async fn edit_status(&self, handle: &StatusHandle, text: &str) -> Result<(), NotifyError>;
}
