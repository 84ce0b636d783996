//! Scheduler (spec §4.5, §5): spawns one reconciliation task per origin,
//! ticks each on the global `check_interval`, and tears all of them down
//! cooperatively on shutdown.

use crate::error::{Error, Result};
use crate::reconciler::{Reconciler, TickOutcome};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Owns every origin's [`Reconciler`] and drives them independently.
/// Origins share no state and take no cross-origin locks; a tick that runs
/// long only delays that origin's own next tick.
pub struct Scheduler {
    reconcilers: Vec<Reconciler>,
    check_interval: Duration,
}

impl Scheduler {
    pub fn new(reconcilers: Vec<Reconciler>, check_interval: Duration) -> Self {
        Self { reconcilers, check_interval }
    }

    /// Daemon mode: tick every origin forever on `check_interval`, until
    /// `cancel` fires. All tasks are joined before returning.
    pub async fn run_daemon(self, cancel: CancellationToken) -> Result<()> {
        let mut set = JoinSet::new();

        for mut reconciler in self.reconcilers {
            let cancel = cancel.clone();
            let interval = self.check_interval;
            set.spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!(origin = reconciler.name(), "shutting down");
                            break;
                        }
                        _ = ticker.tick() => {
                            match reconciler.tick().await {
                                Ok(TickOutcome::Skipped { reason }) => {
                                    warn!(origin = reconciler.name(), reason, "tick skipped");
                                }
                                Ok(_) => {}
                                Err(err) => {
                                    error!(origin = reconciler.name(), error = %err, "tick errored");
                                }
                            }
                        }
                    }
                }
            });
        }

        while set.join_next().await.is_some() {}
        Ok(())
    }

    /// One-shot mode: tick every origin exactly once, in parallel, and
    /// return once all have completed. A genuinely failed tick (gateway
    /// `list`/`replace_set` error) is reported as fatal for that origin;
    /// the scheduler aggregates all of them into one `Result`.
    /// `Skipped { reason: "no-records-present" }` is spec §4.4 step 3's
    /// deliberate no-op (no records administratively present and
    /// `return_to_priority` disabled) and is not an error.
    pub async fn run_once(self) -> Result<()> {
        let mut set = JoinSet::new();

        for mut reconciler in self.reconcilers {
            set.spawn(async move {
                let name = reconciler.name().to_string();
                match reconciler.tick().await {
                    Ok(TickOutcome::Skipped { reason: "no-records-present" }) => Ok(()),
                    Ok(TickOutcome::Skipped { reason }) => Err(format!("{name}: {reason}")),
                    Ok(_) => Ok(()),
                    Err(err) => Err(format!("{name}: {err}")),
                }
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(msg)) => errors.push(msg),
                Err(join_err) => errors.push(join_err.to_string()),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Other(errors.join("; ")))
        }
    }
}
