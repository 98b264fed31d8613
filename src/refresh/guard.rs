//! Error boundary around refresh source invocations.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::error::RefreshError;
use crate::refresh::RefreshSource;

/// Calls `source` once, turning both returned errors and panics into
/// [`RefreshError`] values.
///
/// Callers invoke this without holding the store lock, so an unwinding source
/// can never leave the store locked.
pub fn guarded_refresh<K, V>(
    source: &dyn RefreshSource<K, V>,
) -> Result<HashMap<K, V>, RefreshError> {
    match panic::catch_unwind(AssertUnwindSafe(|| source.refresh())) {
        Ok(Ok(entries)) => Ok(entries),
        Ok(Err(err)) => Err(RefreshError::Source(err)),
        Err(payload) => Err(RefreshError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
