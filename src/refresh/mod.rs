//! Refresh Module
//!
//! Everything between a refresh source and the store: the source trait, the
//! error boundary around each invocation, and the retry-gated loader.

mod file;
mod guard;
mod loader;
mod source;

pub use file::FileSnapshotSource;
pub use guard::guarded_refresh;
pub use loader::{Loader, TickOutcome};
pub use source::RefreshSource;
