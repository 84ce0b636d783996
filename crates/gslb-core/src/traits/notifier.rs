//! The Notifier contract (spec §4.6).
//!
//! Trust Level: Untrusted (collaborator)
//!
//! A notifier implementation delivers one [`Event`](crate::state::Event) to
//! one outbound sink (Slack, Discord, ...). It is stateless, single-shot,
//! and carries its own internal 10s timeout — the reconciler dispatches
//! delivery fire-and-forget and never blocks on, or retries, the result.
//!
//! Allowed:
//! - Formatting `Event` into the sink's wire payload.
//! - A single outbound request per `notify` call.
//!
//! Forbidden:
//! - Retrying a failed delivery.
//! - Queuing events across calls.
//! - Blocking the caller past its own internal timeout.

use crate::state::Event;
use async_trait::async_trait;

/// Fire-and-forget delivery of one transition event to one sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `event`. Must internally bound itself to 10s; failures are
    /// logged by the caller and never retried.
    async fn notify(&self, event: &Event) -> Result<(), crate::Error>;

    /// Human-readable notifier name, for logging.
    fn name(&self) -> &str;
}
