//! API Module
//!
//! HTTP handlers and routing for the diagnostics surface.
//!
//! # Endpoints
//! - `GET /metadata/:category/:key` - Read a cached record
//! - `DELETE /metadata/:category/:key` - Remove a cached record
//! - `DELETE /cache` - Clear every category cache
//! - `PUT /settings` - Update settings and rebuild the caches
//! - `GET /stats` - Per-category cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
