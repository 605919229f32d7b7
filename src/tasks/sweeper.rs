//! Expiration Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

// == Sweep Target ==
/// Something the sweeper can purge.
pub trait Sweep: Send + Sync + 'static {
    /// Removes expired entries and returns how many went away, or None once
    /// the target is closed and the sweeper should exit.
    fn sweep(&self) -> Option<usize>;
}

// == Sweeper Handle ==
/// Owns a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to exit and aborts it if it is parked on a timer.
    pub fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.abort();
    }

    /// True once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that sweeps `target` every `frequency`.
///
/// The first sweep happens one full interval after spawning. Ticks missed
/// while a sweep was waiting on the store lock are not replayed.
///
/// # Arguments
/// * `runtime` - Runtime hosting the task
/// * `target` - Shared reference to what gets swept
/// * `frequency` - Interval between sweeps, must be non-zero
///
/// A frequency too large to schedule means the target is never swept; the
/// task then only waits for the stop signal.
pub fn spawn_sweeper<T: Sweep>(
    runtime: &Handle,
    target: Arc<T>,
    frequency: Duration,
) -> SweeperHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let task = runtime.spawn(async move {
        debug!(?frequency, "Starting expiration sweeper");

        let Some(start) = Instant::now().checked_add(frequency) else {
            debug!("Sweep frequency out of range, sweeper idle until stopped");
            let _ = stop_rx.await;
            return;
        };
        let mut ticker = time::interval_at(start, frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    match target.sweep() {
                        Some(removed) if removed > 0 => {
                            info!("Sweep: removed {} expired entries", removed);
                        }
                        Some(_) => debug!("Sweep: no expired entries found"),
                        None => break,
                    }
                }
            }
        }

        debug!("Expiration sweeper stopped");
    });

    SweeperHandle {
        stop: Some(stop_tx),
        task,
    }
}
