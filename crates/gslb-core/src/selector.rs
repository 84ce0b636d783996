//! Priority Selector (spec §4.3).
//!
//! Pure, synchronous, no I/O: given an origin's tiers and a probe-result
//! map, decide which tier (if any) should back the authoritative record
//! set right now.

use crate::config::{PriorityTier, RecordType};
use std::collections::HashMap;

/// Result of [`select`]: `None` means no tier has any healthy IP — the
/// reconciler's hold rule applies.
pub type Selection = Option<(i64, Vec<String>)>;

/// Walk `tiers` (assumed sorted descending by priority) from highest to
/// lowest. The first tier with any `ok` IP wins; its healthy IPs are
/// returned in declaration order. `record_type` clamps multi-IP results to
/// a single IP for CNAME/SOA, as defense in depth on top of config-time
/// validation.
pub fn select(
    tiers: &[PriorityTier],
    probe_results: &HashMap<String, bool>,
    record_type: RecordType,
) -> Selection {
    for tier in tiers {
        let healthy: Vec<String> = tier
            .ips
            .iter()
            .filter(|ip| probe_results.get(*ip).copied().unwrap_or(false))
            .cloned()
            .collect();

        if healthy.is_empty() {
            continue;
        }

        let chosen = if record_type.is_single_record() {
            vec![healthy[0].clone()]
        } else {
            healthy
        };

        return Some((tier.priority, chosen));
    }

    None
}
