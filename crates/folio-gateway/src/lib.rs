//! HTTP gateway exposing paper upload and follow-up chat over REST.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::GatewayServer;
