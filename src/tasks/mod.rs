//! Background Tasks Module
//!
//! Contains the background task that reloads the cache on a fixed period.

mod scheduler;

pub use scheduler::{spawn_scheduler, FirstLoad};
