// # gslb-core
//
// Core library for the DNS-based global server load balancer.
//
// ## Architecture Overview
//
// - **Probe / DnsGateway / Notifier**: small polymorphic contracts for the
//   untrusted collaborator roles — liveness checking, record CRUD, and
//   outbound event delivery. Concrete implementations live in sibling
//   crates and are constructed from config by the binary crate.
// - **selector**: the pure priority-selection function.
// - **state**: per-origin `OriginState` and the `Event` type it produces.
// - **reconciler**: the per-origin state machine (observe → probe →
//   select → apply) that is the heart of this crate.
// - **scheduler**: spawns and drives one reconciler per origin, in daemon
//   or one-shot mode.
// - **config**: declarative JSON schema, legacy migrations, and
//   record-type invariant validation.
//
// ## Design Principles
//
// 1. **Core-owns-logic**: selection, state transitions, and event
//    emission all live here; collaborators are single-shot and stateless.
// 2. **Per-origin isolation**: each reconciler owns its own state; no
//    cross-origin locks or shared mutable maps.
// 3. **Fail-open**: transient collaborator failures are logged and leave
//    existing state untouched; they never bring the process down.

pub mod config;
pub mod error;
pub mod reconciler;
pub mod scheduler;
pub mod selector;
pub mod state;
pub mod traits;

pub use config::Config;
pub use error::{Error, Result};
pub use reconciler::{Reconciler, TickOutcome};
pub use scheduler::Scheduler;
pub use state::{Event, EventKind, OriginState};
pub use traits::{DnsGateway, Notifier, Probe};
