//! Status notification seam used by long-running media operations.
//!
//! Operations that report progress (compression) talk to a caller-provided
//! [`StatusNotifier`] instead of a concrete messaging platform. A notifier
//! creates a status message once and then edits it in place.

mod channel;
mod traits;
mod types;

pub use channel::{ChannelNotifier, NullNotifier};
pub use traits::StatusNotifier;
pub use types::{NotifyError, StatusEvent, StatusHandle};
