// # Cloudflare DNS Record Gateway
//
// A `DnsGateway` implementation against the Cloudflare API v4, scoped to a
// single zone.
//
// ## Trust Level: Untrusted (collaborator)
//
// This gateway is isolated, stateless, and single-shot: one HTTP request
// per `list`/`create`/`delete` call. `replace_set`'s create-before-delete
// ordering, rollback, and 500ms inter-delete pacing are provided by
// `gslb_core::traits::DnsGateway`'s default implementation in terms of
// these three primitives; this crate never reimplements that ordering
// itself.
//
// **Allowed**: HTTP calls to the Cloudflare API only; parsing Cloudflare's
// response shape.
// **Forbidden**: retries, backoff, caching across calls, spawning tasks,
// reimplementing `replace_set`'s ordering guarantees.
//
// ## Security
//
// The API token never appears in logs or in this type's `Debug` output.

use async_trait::async_trait;
use gslb_core::config::RecordType;
use gslb_core::traits::{DnsGateway, Record};
use gslb_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare `DnsGateway`, fixed to one zone for its lifetime.
pub struct CloudflareGateway {
    /// ⚠️ NEVER log this value.
    api_token: String,
    zone_id: String,
    client: reqwest::Client,
    base_url: String,
    /// When true, `create`/`delete` are logged but not sent.
    dry_run: bool,
}

impl std::fmt::Debug for CloudflareGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareGateway")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareGateway {
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>, dry_run: bool) -> Self {
        let api_token = api_token.into();
        if api_token.is_empty() {
            panic!("Cloudflare API token cannot be empty");
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_token,
            zone_id: zone_id.into(),
            client,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            dry_run,
        }
    }

    pub fn new_live(api_token: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self::new(api_token, zone_id, false)
    }

    pub fn new_dry_run(api_token: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self::new(api_token, zone_id, true)
    }

    /// Point this gateway at an alternate API base URL (e.g. a mocked
    /// server in tests). Not used in production.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }

    async fn map_error_response(response: reqwest::Response, context: &str) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "{context}: invalid API token or insufficient permissions (status {status})"
            )),
            404 => Error::not_found(format!("{context}: not found (status {status})")),
            429 => Error::rate_limited(format!("{context}: rate limited (status {status})")),
            500..=599 => Error::provider(
                "cloudflare",
                format!("{context}: transient server error {status} - {body}"),
            ),
            _ => Error::provider("cloudflare", format!("{context}: {status} - {body}")),
        }
    }
}

#[async_trait]
impl DnsGateway for CloudflareGateway {
    async fn list(&self, name: &str, record_type: RecordType) -> Result<Vec<Record>> {
        let url = format!("{}?name={}&type={}", self.records_url(), name, record_type);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::gateway(format!("list request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::map_error_response(response, "list").await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::gateway(format!("failed to parse list response: {e}")))?;

        let records = json["result"]
            .as_array()
            .ok_or_else(|| Error::gateway("list response: result is not an array"))?;

        records
            .iter()
            .map(|r| {
                Ok(Record {
                    id: r["id"]
                        .as_str()
                        .ok_or_else(|| Error::gateway("record missing id"))?
                        .to_string(),
                    content: r["content"]
                        .as_str()
                        .ok_or_else(|| Error::gateway("record missing content"))?
                        .to_string(),
                    proxied: r["proxied"].as_bool().unwrap_or(false),
                    ttl: r["ttl"].as_u64().unwrap_or(1) as u32,
                })
            })
            .collect()
    }

    async fn create(
        &self,
        name: &str,
        record_type: RecordType,
        content: &str,
        proxied: bool,
    ) -> Result<Record> {
        if self.dry_run {
            tracing::info!(name, content, "[dry-run] would create record");
            return Ok(Record {
                id: format!("dry-run-{content}"),
                content: content.to_string(),
                proxied,
                ttl: 1,
            });
        }

        let payload = serde_json::json!({
            "type": record_type.as_str(),
            "name": name,
            "content": content,
            "proxied": proxied,
            "ttl": 1,
        });

        let response = self
            .client
            .post(self.records_url())
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::gateway(format!("create request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::map_error_response(response, "create").await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::gateway(format!("failed to parse create response: {e}")))?;

        let id = json["result"]["id"]
            .as_str()
            .ok_or_else(|| Error::gateway("create response: result.id is not a string"))?
            .to_string();

        tracing::info!(name, content, id, "created record");
        Ok(Record { id, content: content.to_string(), proxied, ttl: 1 })
    }

    async fn delete(&self, record_id: &str) -> Result<()> {
        if self.dry_run {
            tracing::info!(record_id, "[dry-run] would delete record");
            return Ok(());
        }

        let url = format!("{}/{}", self.records_url(), record_id);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::gateway(format!("delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::map_error_response(response, "delete").await);
        }

        tracing::info!(record_id, "deleted record");
        Ok(())
    }

    fn zone_id(&self) -> &str {
        &self.zone_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "API token cannot be empty")]
    fn empty_token_panics() {
        CloudflareGateway::new("", "zone1", false);
    }

    #[test]
    fn dry_run_flag_set_correctly() {
        let dry = CloudflareGateway::new_dry_run("token", "zone1");
        let live = CloudflareGateway::new_live("token", "zone1");
        assert!(dry.dry_run);
        assert!(!live.dry_run);
    }

    #[test]
    fn zone_id_accessor() {
        let gw = CloudflareGateway::new("token", "zone1", false);
        assert_eq!(gw.zone_id(), "zone1");
    }

    #[test]
    fn debug_does_not_leak_token() {
        let gw = CloudflareGateway::new("super-secret-token", "zone1", false);
        let debug_str = format!("{:?}", gw);
        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("CloudflareGateway"));
    }
}
