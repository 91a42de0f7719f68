pub mod archive;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod ws;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage, WsStatusNotifier};
