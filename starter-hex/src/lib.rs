//! # Starter Hex
//!
//! Application service layer and HTTP adapter for the starter service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (identity sync, orders, webhooks)
//! - `inbound/` - HTTP adapter (Axum server, session auth, validation)
//! - `openapi/` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `R: Repository`; the payment gateway and
//! identity provider are injected as trait objects.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use inbound::HttpServer;
pub use service::AppService;
