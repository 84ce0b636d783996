//! The Probe contract (spec §4.1).
//!
//! Trust Level: Untrusted (collaborator)
//!
//! A probe implementation checks one target's liveness and nothing else. It
//! is stateless across calls, bounded by its own configured timeout, and
//! never retries internally — the reconciler decides what to do with a
//! failure, not the probe.
//!
//! The target is the tier's declared content, verbatim: an IP literal for
//! `A`/`AAAA` origins, a DNS name for `CNAME`/`SOA` origins. HTTP/HTTPS
//! probes accept either; ICMP requires a literal IP (see
//! `gslb-probe-icmp`).
//!
//! Allowed:
//! - Opening exactly one connection/socket per `check` call.
//! - Classifying the outcome into the concrete [`ProbeOutcome`] variants.
//!
//! Forbidden:
//! - Retrying within a single `check` call.
//! - Caching previous results for the same target.
//! - Logging response bodies (bounded but potentially attacker-influenced).

use async_trait::async_trait;
use std::time::Duration;

/// Why a probe considered a target unhealthy. Opaque to the reconciler,
/// which only ever asks [`ProbeOutcome::is_ok`] — this exists for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailureKind {
    Timeout,
    ConnectionRefused,
    TlsError,
    UnexpectedStatus(u16),
    UnexpectedIcmpType,
    /// The target string isn't a literal IP address; only ICMP requires one.
    NotAnIpAddress,
    Other,
}

/// The result of a single liveness check against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ok,
    Fail { kind: ProbeFailureKind, detail: String },
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok)
    }

    pub fn fail(kind: ProbeFailureKind, detail: impl Into<String>) -> Self {
        ProbeOutcome::Fail { kind, detail: detail.into() }
    }
}

/// A single-target liveness check, synchronous in effect (one request, one
/// response) and bounded by `timeout()`.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Check `target`'s liveness. Must not exceed `self.timeout()`.
    async fn check(&self, target: &str) -> ProbeOutcome;

    /// The configured bound for a single `check` call.
    fn timeout(&self) -> Duration;
}
