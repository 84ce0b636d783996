//! HTTP/HTTPS `Probe` implementation (spec §4.1).
//!
//! ## Trust Level: Untrusted (collaborator)
//!
//! One GET per `check` call, nothing retried, nothing cached.

use async_trait::async_trait;
use gslb_core::config::HealthCheckSpec;
use gslb_core::traits::{Probe, ProbeFailureKind, ProbeOutcome};
use gslb_core::{Error, Result};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Probes one origin target (an IP literal or a DNS name) over HTTP or
/// HTTPS.
pub struct HttpProbe {
    scheme: Scheme,
    endpoint: String,
    host: Option<String>,
    port: u16,
    headers: HashMap<String, String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe from a `HealthCheckSpec::Http` or `::Https` variant.
    pub fn from_spec(spec: &HealthCheckSpec) -> Result<Self> {
        match spec {
            HealthCheckSpec::Http { endpoint, host, port, headers, .. } => Self::build(
                Scheme::Http,
                endpoint.clone(),
                host.clone(),
                port.unwrap_or(80),
                headers.clone(),
                spec.timeout(),
                false,
            ),
            HealthCheckSpec::Https { endpoint, host, port, headers, insecure_skip_verify, .. } => Self::build(
                Scheme::Https,
                endpoint.clone(),
                host.clone(),
                port.unwrap_or(443),
                headers.clone(),
                spec.timeout(),
                *insecure_skip_verify,
            ),
            HealthCheckSpec::Icmp { .. } => {
                Err(Error::config("HttpProbe::from_spec called with a non-HTTP health check spec"))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        scheme: Scheme,
        endpoint: String,
        host: Option<String>,
        port: u16,
        headers: HashMap<String, String>,
        timeout: Duration,
        insecure_skip_verify: bool,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_skip_verify)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP probe client: {e}")))?;

        Ok(Self { scheme, endpoint, host, port, headers, timeout, client })
    }

    /// `target` is either an IP literal (A/AAAA origins) or a DNS name
    /// (CNAME/SOA origins); only literal IPv6 addresses need bracketing.
    fn target_url(&self, target: &str) -> String {
        let host_part = match target.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{v6}]"),
            _ => target.to_string(),
        };
        format!("{}://{}:{}{}", self.scheme.as_str(), host_part, self.port, self.endpoint)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self, target: &str) -> ProbeOutcome {
        let url = self.target_url(target);
        debug!(target, url = %url, "probing");
        let mut request = self.client.get(&url);

        // Host header override drives both virtual hosting and TLS SNI.
        if let Some(host) = &self.host {
            request = request.header(reqwest::header::HOST, host);
        }

        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = classify_reqwest_error(&e);
                warn!(target, error = %e, ?kind, "probe request failed");
                return ProbeOutcome::fail(kind, e.to_string());
            }
        };

        let status = response.status();
        // Drain and discard the body: bounded, never inspected.
        let _ = response.bytes().await;

        if (200..400).contains(&status.as_u16()) {
            ProbeOutcome::Ok
        } else {
            warn!(target, status = status.as_u16(), "probe returned unexpected status");
            ProbeOutcome::fail(ProbeFailureKind::UnexpectedStatus(status.as_u16()), status.to_string())
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> ProbeFailureKind {
    if e.is_timeout() {
        ProbeFailureKind::Timeout
    } else if e.is_connect() {
        ProbeFailureKind::ConnectionRefused
    } else if e.is_request() || e.to_string().to_lowercase().contains("tls") {
        ProbeFailureKind::TlsError
    } else {
        ProbeFailureKind::Other
    }
}
