//! Contracts for the three untrusted collaborator roles: [`Probe`],
//! [`DnsGateway`], and [`Notifier`]. The reconciler is written against these
//! traits only; concrete implementations live in sibling crates.

mod gateway;
mod notifier;
mod probe;

pub use gateway::{DnsGateway, Record};
pub use notifier::Notifier;
pub use probe::{Probe, ProbeFailureKind, ProbeOutcome};
