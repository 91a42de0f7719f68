//! Mock status notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notify::{NotifyError, StatusEvent, StatusHandle, StatusNotifier};

/// Notifier that records every status change.
///
/// Edits can be made to fail to exercise the best-effort paths of callers.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    events: Arc<RwLock<Vec<StatusEvent>>>,
    fail_sends: Arc<RwLock<bool>>,
    fail_edits: Arc<RwLock<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in order.
    pub async fn events(&self) -> Vec<StatusEvent> {
        self.events.read().await.clone()
    }

    /// Texts of all recorded events in order.
    pub async fn texts(&self) -> Vec<String> {
        self.events
            .read()
            .await
            .iter()
            .map(|e| e.text().to_string())
            .collect()
    }

    /// Make `send_status` fail.
    pub async fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.write().await = fail;
    }

    /// Make `edit_status` fail.
    pub async fn set_fail_edits(&self, fail: bool) {
        *self.fail_edits.write().await = fail;
    }
}

#[async_trait]
impl StatusNotifier for MockNotifier {
    async fn send_status(&self, chat_id: &str, text: &str) -> Result<StatusHandle, NotifyError> {
        if *self.fail_sends.read().await {
            return Err(NotifyError::failed("send rejected by mock"));
        }
        let handle = StatusHandle::generate(chat_id);
        self.events.write().await.push(StatusEvent::Created {
            handle: handle.clone(),
            text: text.to_string(),
        });
        Ok(handle)
    }

    async fn edit_status(&self, handle: &StatusHandle, text: &str) -> Result<(), NotifyError> {
        if *self.fail_edits.read().await {
            return Err(NotifyError::failed("edit rejected by mock"));
        }
        self.events.write().await.push(StatusEvent::Updated {
            handle: handle.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}
