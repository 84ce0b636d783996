//! Origin Reconciler (spec §4.4): the per-origin state machine that drives
//! one `(zone, dns_name, record_type)` triple through observe → probe →
//! select → apply, one serialized tick at a time.

use crate::config::{Origin, PriorityTier, RecordType};
use crate::error::Result;
use crate::selector;
use crate::state::{ActiveTier, Event, EventKind, OriginState};
use crate::traits::{DnsGateway, Notifier, Probe};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a single tick actually did, for logging and for tests.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// `replace_set` succeeded and an event was emitted.
    Applied(Event),
    /// Desired state already matched observed state; no gateway write.
    NoChange,
    /// No tier had any healthy IP; existing records were left untouched.
    Held,
    /// The tick could not proceed past observation, or the apply failed;
    /// `reason` is a short machine-readable tag for logging/tests.
    Skipped { reason: &'static str },
}

/// Drives one origin's reconciliation loop. Not `Clone`; owned by exactly
/// one scheduler task.
pub struct Reconciler {
    name: String,
    zone_name: String,
    record_type: RecordType,
    priority_tiers: Vec<PriorityTier>,
    return_to_priority: bool,
    proxied: bool,
    gateway: Arc<dyn DnsGateway>,
    probe: Arc<dyn Probe>,
    notifiers: Vec<Arc<dyn Notifier>>,
    state: OriginState,
}

impl Reconciler {
    pub fn new(
        origin: &Origin,
        gateway: Arc<dyn DnsGateway>,
        probe: Arc<dyn Probe>,
        notifiers: Vec<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            name: origin.name.clone(),
            zone_name: origin.zone_name.clone(),
            record_type: origin.record_type,
            priority_tiers: origin.priority_tiers.clone(),
            return_to_priority: origin.return_to_priority,
            proxied: origin.proxied,
            gateway,
            probe,
            notifiers,
            state: OriginState::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &OriginState {
        &self.state
    }

    /// Run one reconciliation tick to completion. Never returns an `Err`
    /// for a recoverable per-tick failure (those are logged and reported
    /// via `TickOutcome::Skipped`); `Err` is reserved for bugs in the
    /// caller's wiring, which none of the current callers trigger.
    #[tracing::instrument(skip(self), fields(origin = %self.name))]
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let current_records = match self.gateway.list(&self.name, self.record_type).await {
            Ok(records) => records,
            Err(err) => {
                warn!(origin = %self.name, error = %err, "gateway list failed, retaining state");
                return Ok(TickOutcome::Skipped { reason: "list-failed" });
            }
        };

        let observed_ips: HashSet<String> =
            current_records.iter().map(|r| r.content.clone()).collect();
        self.state.observed_ips = observed_ips.clone();

        if current_records.is_empty() && !self.return_to_priority {
            debug!(origin = %self.name, "no records present, return_to_priority disabled");
            return Ok(TickOutcome::Skipped { reason: "no-records-present" });
        }

        let probe_targets = self.probe_targets(&observed_ips);
        let probe_results = self.run_probes(&probe_targets).await;

        let Some((mut desired_priority, desired_ips_vec)) =
            selector::select(&self.priority_tiers, &probe_results, self.record_type)
        else {
            info!(origin = %self.name, "no healthy ip in any tier, holding existing records");
            self.state.last_check_at = Some(Utc::now());
            return Ok(TickOutcome::Held);
        };
        let mut desired_ips: Vec<String> = desired_ips_vec;

        let active_priority = self.state.active_tier.priority();

        if !self.return_to_priority {
            if let Some(active) = active_priority {
                if desired_priority > active {
                    let healthy_subset: Vec<String> = self
                        .priority_tiers
                        .iter()
                        .find(|t| t.priority == active)
                        .map(|t| {
                            t.ips
                                .iter()
                                .filter(|ip| probe_results.get(ip.as_str()).copied().unwrap_or(false))
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();

                    if !healthy_subset.is_empty() {
                        desired_priority = active;
                        desired_ips = healthy_subset;
                    }
                    // else: subset empty, allow the upward move as-is —
                    // flapping down is not worse than the current state.
                }
            }
        }

        let desired_ips: HashSet<String> = desired_ips.into_iter().collect();

        if desired_ips == observed_ips && Some(desired_priority) == active_priority {
            self.state.last_check_at = Some(Utc::now());
            return Ok(TickOutcome::NoChange);
        }

        match self
            .gateway
            .replace_set(&self.name, self.record_type, &desired_ips, self.proxied)
            .await
        {
            Ok(()) => {
                let now = Utc::now();
                let kind = classify_transition(active_priority, desired_priority);
                let event = Event {
                    origin: self.name.clone(),
                    zone: self.zone_name.clone(),
                    record_type: self.record_type,
                    old_ips: observed_ips,
                    new_ips: desired_ips.clone(),
                    old_priority: active_priority,
                    new_priority: desired_priority,
                    max_priority: self.priority_tiers.iter().map(|t| t.priority).max().unwrap_or(desired_priority),
                    reason: reason_for(kind),
                    kind,
                    timestamp: now,
                };

                self.state.active_tier = ActiveTier::Active(desired_priority);
                self.state.active_ips = desired_ips.clone();
                self.state.observed_ips = desired_ips;
                self.state.last_transition_at = Some(now);
                self.state.last_check_at = Some(now);

                info!(
                    origin = %self.name,
                    old_priority = ?active_priority,
                    new_priority = desired_priority,
                    kind = ?kind,
                    "applied record-set transition"
                );

                self.dispatch(event.clone());
                Ok(TickOutcome::Applied(event))
            }
            Err(err) => {
                warn!(origin = %self.name, error = %err, "replace_set failed, retaining state");
                Ok(TickOutcome::Skipped { reason: "replace-set-failed" })
            }
        }
    }

    /// The minimum set of IPs worth probing this tick: always the observed
    /// contents, plus every tier at or below the active priority (needed to
    /// know where to fail down to), plus — only when `return_to_priority`
    /// is enabled — tiers above the active priority, so recovery can be
    /// detected. Before any tier is active, every configured IP is probed.
    fn probe_targets(&self, observed_ips: &HashSet<String>) -> HashSet<String> {
        let mut targets = observed_ips.clone();
        match self.state.active_tier.priority() {
            Some(active) => {
                for tier in &self.priority_tiers {
                    if tier.priority <= active || self.return_to_priority {
                        targets.extend(tier.ips.iter().cloned());
                    }
                }
            }
            None => {
                for tier in &self.priority_tiers {
                    targets.extend(tier.ips.iter().cloned());
                }
            }
        }
        targets
    }

    async fn run_probes(&self, targets: &HashSet<String>) -> HashMap<String, bool> {
        let mut set = tokio::task::JoinSet::new();
        for target in targets {
            let target = target.clone();
            let probe = self.probe.clone();
            set.spawn(async move {
                let ok = probe.check(&target).await.is_ok();
                (target, ok)
            });
        }

        let mut results = HashMap::with_capacity(targets.len());
        while let Some(joined) = set.join_next().await {
            if let Ok((target, ok)) = joined {
                results.insert(target, ok);
            }
        }
        results
    }

    /// Fire-and-forget dispatch to every configured notifier; never
    /// awaited by the caller, and a notifier's failure never affects
    /// reconciliation.
    fn dispatch(&self, event: Event) {
        for notifier in &self.notifiers {
            let notifier = notifier.clone();
            let event = event.clone();
            tokio::spawn(async move {
                if let Err(err) = notifier.notify(&event).await {
                    warn!(notifier = notifier.name(), error = %err, "notifier delivery failed");
                }
            });
        }
    }
}

fn classify_transition(old_priority: Option<i64>, new_priority: i64) -> EventKind {
    match old_priority {
        None => EventKind::FailoverAcross,
        Some(old) if new_priority > old => EventKind::ReturnToPriority,
        Some(old) if new_priority < old => EventKind::FailoverDown,
        _ => EventKind::FailoverAcross,
    }
}

fn reason_for(kind: EventKind) -> String {
    match kind {
        EventKind::FailoverDown => "active tier lost all healthy ips".to_string(),
        EventKind::FailoverAcross => "content changed within active tier".to_string(),
        EventKind::ReturnToPriority => "higher-priority tier recovered".to_string(),
    }
}
