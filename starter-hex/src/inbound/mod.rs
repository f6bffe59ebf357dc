//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod auth;
mod extract;
pub(crate) mod handlers;
mod server;

pub use handlers::{
    PAYMENT_SIGNATURE_HEADER, SVIX_ID_HEADER, SVIX_SIGNATURE_HEADER, SVIX_TIMESTAMP_HEADER,
};
pub use server::HttpServer;
