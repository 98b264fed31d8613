//! Reload Scheduler Task
//!
//! Background task that runs one loader tick per expiration interval until
//! its cancellation token fires.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::refresh::{Loader, TickOutcome};

/// First-load settings for a scheduler that loads in the background.
#[derive(Debug, Clone, Copy)]
pub struct FirstLoad {
    pub attempts: u32,
    pub max_backoff: Duration,
}

/// Spawns the reload scheduler on `runtime`.
///
/// With `first_load` set, the task performs the retried first load before
/// arming its timer. The first tick fires one full `period` after the timer
/// is armed. Cancelling `cancel` ends the task; a tick that is already
/// running completes first.
///
/// # Returns
/// A JoinHandle for the spawned task, awaited during graceful shutdown.
pub fn spawn_scheduler<K, V>(
    runtime: &Handle,
    loader: Arc<Loader<K, V>>,
    period: Duration,
    cancel: CancellationToken,
    first_load: Option<FirstLoad>,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    runtime.spawn(async move {
        if let Some(first) = first_load {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Reload scheduler stopped before the first load finished");
                    return;
                }
                result = loader.first_load(first.attempts, first.max_backoff) => {
                    if let Err(err) = result {
                        error!(
                            attempts = first.attempts,
                            "First load exhausted its attempts, starting empty: {}",
                            err
                        );
                    }
                }
            }
        }

        run(loader, period, cancel).await;
    })
}

async fn run<K, V>(loader: Arc<Loader<K, V>>, period: Duration, cancel: CancellationToken)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Starting reload scheduler with interval of {:?}", period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Reload scheduler stopped");
                return;
            }
            _ = ticker.tick() => {
                let loader = Arc::clone(&loader);
                match tokio::task::spawn_blocking(move || loader.scheduled_load()).await {
                    Ok(TickOutcome::Applied { entries }) => {
                        debug!("Reload tick: applied {} entries", entries);
                    }
                    Ok(TickOutcome::Suppressed { consecutive_failures }) => {
                        debug!("Reload tick: kept stale entries ({} failures in a row)", consecutive_failures);
                    }
                    Ok(TickOutcome::Flushed { consecutive_failures }) => {
                        info!("Reload tick: flushed store after {} failures in a row", consecutive_failures);
                    }
                    Err(err) => {
                        warn!("Reload tick did not complete: {}", err);
                    }
                }
            }
        }
    }
}
