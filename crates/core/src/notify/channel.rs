//! Built-in notifier implementations.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::traits::StatusNotifier;
use super::types::{NotifyError, StatusEvent, StatusHandle};

/// Notifier that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl StatusNotifier for NullNotifier {
    async fn send_status(&self, chat_id: &str, text: &str) -> Result<StatusHandle, NotifyError> {
        debug!(chat_id, text, "Status (discarded)");
        Ok(StatusHandle::generate(chat_id))
    }

    async fn edit_status(&self, handle: &StatusHandle, text: &str) -> Result<(), NotifyError> {
        debug!(message_id = %handle.message_id, text, "Status edit (discarded)");
        Ok(())
    }
}

/// Notifier that forwards every status change as a [`StatusEvent`] on an mpsc channel.
///
/// Useful when the code that renders status lives on another task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<StatusEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<StatusEvent>) -> Self {
        Self { tx }
    }

    /// Creates a notifier together with the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StatusEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl StatusNotifier for ChannelNotifier {
    async fn send_status(&self, chat_id: &str, text: &str) -> Result<StatusHandle, NotifyError> {
        let handle = StatusHandle::generate(chat_id);
        self.tx
            .send(StatusEvent::Created {
                handle: handle.clone(),
                text: text.to_string(),
            })
            .await
            .map_err(|_| NotifyError::Closed)?;
        Ok(handle)
    }

    async fn edit_status(&self, handle: &StatusHandle, text: &str) -> Result<(), NotifyError> {
        self.tx
            .send(StatusEvent::Updated {
                handle: handle.clone(),
                text: text.to_string(),
            })
            .await
            .map_err(|_| NotifyError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_forwards_events() {
        let (notifier, mut rx) = ChannelNotifier::channel(8);

        let handle = notifier.send_status("chat-1", "starting").await.unwrap();
        notifier.edit_status(&handle, "halfway").await.unwrap();

        let created = rx.recv().await.unwrap();
        assert!(matches!(created, StatusEvent::Created { .. }));
        assert_eq!(created.handle(), &handle);
        assert_eq!(created.text(), "starting");

        let updated = rx.recv().await.unwrap();
        assert!(matches!(updated, StatusEvent::Updated { .. }));
        assert_eq!(updated.handle().chat_id, "chat-1");
        assert_eq!(updated.text(), "halfway");
    }

    #[tokio::test]
    async fn test_channel_notifier_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::channel(1);
        drop(rx);

        let result = notifier.send_status("chat", "hello").await;
        assert!(matches!(result, Err(NotifyError::Closed)));
    }

    #[tokio::test]
    async fn test_null_notifier_generates_distinct_handles() {
        let notifier = NullNotifier;
        let a = notifier.send_status("c", "x").await.unwrap();
        let b = notifier.send_status("c", "y").await.unwrap();
        assert_ne!(a.message_id, b.message_id);
        assert!(notifier.edit_status(&a, "z").await.is_ok());
    }
}
