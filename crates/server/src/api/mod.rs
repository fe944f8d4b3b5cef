pub mod handlers;
pub mod middleware;
pub mod play;
pub mod routes;
pub mod search;
pub mod sources;
pub mod ws;

pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
