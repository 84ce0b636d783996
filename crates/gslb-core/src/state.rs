//! Per-origin in-memory state (spec §3).
//!
//! `OriginState` is created lazily on an origin's first tick, mutated only
//! inside that origin's serialized reconciliation tick, and is never
//! persisted — on restart it is reconstructed from the gateway's current
//! records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// The priority tier currently believed to back the authoritative record
/// set, if any reconciliation has ever succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTier {
    Unknown,
    Active(i64),
}

impl ActiveTier {
    pub fn priority(self) -> Option<i64> {
        match self {
            ActiveTier::Unknown => None,
            ActiveTier::Active(p) => Some(p),
        }
    }
}

/// Per-origin state, owned exclusively by that origin's reconciler task.
#[derive(Debug, Clone)]
pub struct OriginState {
    /// Last-seen DNS contents for this origin's `(name, type)`.
    pub observed_ips: HashSet<String>,
    pub active_tier: ActiveTier,
    /// Subset of `ips_of_tier(active_tier)`, empty only before the first
    /// successful reconciliation.
    pub active_ips: HashSet<String>,
    pub last_check_at: Option<DateTime<Utc>>,
    pub last_transition_at: Option<DateTime<Utc>>,
}

impl OriginState {
    pub fn new() -> Self {
        Self {
            observed_ips: HashSet::new(),
            active_tier: ActiveTier::Unknown,
            active_ips: HashSet::new(),
            last_check_at: None,
            last_transition_at: None,
        }
    }
}

impl Default for OriginState {
    fn default() -> Self {
        Self::new()
    }
}

/// What kind of transition produced an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Moved to a lower-priority tier because the active tier lost all
    /// healthy IPs.
    FailoverDown,
    /// Stayed within the same priority tier but the content set changed
    /// (e.g. one IP in a multi-IP tier failed, another took over).
    FailoverAcross,
    /// Moved to a higher-priority tier because it recovered and
    /// `return_to_priority` is enabled.
    ReturnToPriority,
}

/// Immutable record of one record-set change, emitted to every notifier.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub origin: String,
    pub zone: String,
    pub record_type: crate::config::RecordType,
    pub old_ips: HashSet<String>,
    pub new_ips: HashSet<String>,
    pub old_priority: Option<i64>,
    pub new_priority: i64,
    pub max_priority: i64,
    pub reason: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}
