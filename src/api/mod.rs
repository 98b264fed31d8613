//! API Module
//!
//! HTTP handlers and routing for the cache admin REST API.
//!
//! # Endpoints
//! - `GET /get/:key`, `GET /all`, `GET /values` - Reads
//! - `PUT /set`, `DELETE /purge` - Writes
//! - `POST /reload`, `POST /stop`, `POST /restart` - Reload lifecycle
//! - `GET /stats`, `GET /health` - Monitoring

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
