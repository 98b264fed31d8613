//! Request and Response models for the cache admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{SetRequest, MAX_KEY_LENGTH};
pub use responses::{
    AllResponse, GetResponse, HealthResponse, LifecycleResponse, PurgeResponse, ReloadResponse,
    SetResponse, StatsResponse, ValuesResponse,
};
