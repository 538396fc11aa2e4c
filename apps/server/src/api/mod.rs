//! HTTP surface: routes and handlers for the wire protocol.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
