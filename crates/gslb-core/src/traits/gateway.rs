//! The DNS Record Gateway contract (spec §4.2).
//!
//! Trust Level: Untrusted (collaborator)
//!
//! A gateway implementation is a thin, stateless client for one DNS
//! provider's record CRUD API, scoped to a single zone. It owns no
//! business logic: priority selection, idempotence checks, and event
//! emission all live in the reconciler. A gateway call is a single
//! request/response (or the small create-before-delete sequence inside
//! `replace_set`) — never a retry loop, never a cache, never a background
//! task.
//!
//! Allowed:
//! - Translating `(name, type)` to the provider's record representation.
//! - Pagination internal to a single `list` call.
//! - The 500ms inter-delete pacing and rollback-on-create-failure behavior
//!   that `replace_set` itself specifies.
//!
//! Forbidden:
//! - Retrying a failed create/delete across calls.
//! - Caching `list` results across calls.
//! - Spawning tasks that outlive the call.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

use crate::config::RecordType;

/// One authoritative DNS record as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub content: String,
    pub proxied: bool,
    pub ttl: u32,
}

/// CRUD + atomic replace over one zone's records for a fixed `(name, type)`.
#[async_trait]
pub trait DnsGateway: Send + Sync {
    /// List every record currently authoritative for `(name, type)`.
    async fn list(&self, name: &str, record_type: RecordType) -> Result<Vec<Record>>;

    /// Create a single record with the given content.
    async fn create(
        &self,
        name: &str,
        record_type: RecordType,
        content: &str,
        proxied: bool,
    ) -> Result<Record>;

    /// Delete a single record by provider id.
    async fn delete(&self, record_id: &str) -> Result<()>;

    /// Make the authoritative set for `(name, type)` equal to
    /// `desired_contents`, per the create-before-delete algorithm of
    /// spec §4.2. The default implementation is provided in terms of
    /// `list`/`create`/`delete` so gateway implementations only need those
    /// three primitives; a provider whose API offers a genuinely atomic
    /// bulk-replace endpoint may override this.
    async fn replace_set(
        &self,
        name: &str,
        record_type: RecordType,
        desired_contents: &HashSet<String>,
        proxied: bool,
    ) -> Result<()> {
        replace_set_via_crud(self, name, record_type, desired_contents, proxied).await
    }

    /// Provider-facing zone identifier this gateway is scoped to.
    fn zone_id(&self) -> &str;
}

const INTER_DELETE_PACING: std::time::Duration = std::time::Duration::from_millis(500);

/// Shared create-before-delete implementation of `replace_set`, expressed
/// purely in terms of `list`/`create`/`delete` so every gateway gets the
/// same ordering, pacing, and rollback guarantees for free.
async fn replace_set_via_crud<G: DnsGateway + ?Sized>(
    gateway: &G,
    name: &str,
    record_type: RecordType,
    desired_contents: &HashSet<String>,
    proxied: bool,
) -> Result<()> {
    if desired_contents.is_empty() {
        return Err(crate::Error::gateway("empty-desired-set"));
    }

    let current = gateway.list(name, record_type).await?;

    // Collapse duplicate-content records: keep the first, delete the rest.
    let mut kept_contents: HashSet<&str> = HashSet::new();
    let mut to_delete: Vec<&Record> = Vec::new();
    for record in &current {
        if desired_contents.contains(&record.content) && kept_contents.insert(record.content.as_str())
        {
            continue;
        }
        to_delete.push(record);
    }

    let existing_contents: HashSet<&str> = kept_contents;
    let to_create: Vec<&str> = desired_contents
        .iter()
        .filter(|c| !existing_contents.contains(c.as_str()))
        .map(String::as_str)
        .collect();

    let mut created: Vec<Record> = Vec::new();
    for content in &to_create {
        match gateway.create(name, record_type, content, proxied).await {
            Ok(record) => created.push(record),
            Err(err) => {
                // Best-effort rollback of everything created this call.
                for record in &created {
                    let _ = gateway.delete(&record.id).await;
                }
                return Err(err);
            }
        }
    }

    if current.is_empty() {
        return Ok(());
    }

    let mut delete_err: Option<crate::Error> = None;
    let mut first = true;
    for record in to_delete {
        if !first {
            tokio::time::sleep(INTER_DELETE_PACING).await;
        }
        first = false;
        if let Err(err) = gateway.delete(&record.id).await {
            delete_err = Some(match delete_err {
                Some(prev) => crate::Error::gateway(format!("{prev}; {err}")),
                None => crate::Error::gateway(err.to_string()),
            });
        }
    }

    match delete_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
