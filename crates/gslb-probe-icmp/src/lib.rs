//! ICMP echo `Probe` implementation (spec §4.1).
//!
//! ## Trust Level: Untrusted (collaborator)
//!
//! One Echo Request per `check` call. The read deadline set via
//! `Pinger::timeout` is authoritative for the probe's bound; no retries.
//!
//! ICMP requires a literal IP target. A `CNAME`/`SOA` origin's tiers carry
//! DNS names, not IPs — pointing one at an ICMP health check always fails
//! the probe (`ProbeFailureKind::NotAnIpAddress`); use an HTTP/HTTPS health
//! check for those origins instead.

use async_trait::async_trait;
use gslb_core::config::HealthCheckSpec;
use gslb_core::traits::{Probe, ProbeFailureKind, ProbeOutcome};
use gslb_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};
use tracing::{debug, warn};

const ECHO_PAYLOAD: [u8; 56] = [0u8; 56];

/// Probes one origin IP with a single ICMP Echo Request, per address family.
pub struct IcmpProbe {
    client_v4: Client,
    client_v6: Client,
    identifier: u16,
    timeout: Duration,
}

impl IcmpProbe {
    /// Build a probe from a `HealthCheckSpec::Icmp` variant.
    pub fn from_spec(spec: &HealthCheckSpec) -> Result<Self> {
        match spec {
            HealthCheckSpec::Icmp { .. } => Self::new(spec.timeout()),
            _ => Err(Error::config("IcmpProbe::from_spec called with a non-ICMP health check spec")),
        }
    }

    pub fn new(timeout: Duration) -> Result<Self> {
        let client_v4 = Client::new(&Config::builder().kind(ICMP::V4).build())
            .map_err(|e| Error::config(format!("failed to open ICMPv4 socket: {e}")))?;
        let client_v6 = Client::new(&Config::builder().kind(ICMP::V6).build())
            .map_err(|e| Error::config(format!("failed to open ICMPv6 socket: {e}")))?;

        // Identifier derived from the process identity, truncated to the
        // 16 bits an ICMP echo header carries.
        let identifier = (std::process::id() & 0xFFFF) as u16;

        Ok(Self { client_v4, client_v6, identifier, timeout })
    }
}

#[async_trait]
impl Probe for IcmpProbe {
    async fn check(&self, target: &str) -> ProbeOutcome {
        let ip: IpAddr = match target.parse() {
            Ok(ip) => ip,
            Err(_) => {
                warn!(target, "icmp probe target is not a literal ip address");
                return ProbeOutcome::fail(
                    ProbeFailureKind::NotAnIpAddress,
                    format!("'{target}' is not a literal IP address"),
                );
            }
        };

        let client = match ip {
            IpAddr::V4(_) => &self.client_v4,
            IpAddr::V6(_) => &self.client_v6,
        };

        let mut pinger = client.pinger(ip, PingIdentifier(self.identifier)).await;
        pinger.timeout(self.timeout);

        debug!(target, "sending icmp echo request");
        match pinger.ping(PingSequence(1), &ECHO_PAYLOAD).await {
            Ok(_reply) => ProbeOutcome::Ok,
            Err(e) => {
                let kind = classify_surge_error(&e);
                warn!(target, error = %e, ?kind, "icmp probe failed");
                ProbeOutcome::fail(kind, e.to_string())
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn classify_surge_error(e: &surge_ping::SurgeError) -> ProbeFailureKind {
    let text = e.to_string().to_lowercase();
    if text.contains("timeout") {
        ProbeFailureKind::Timeout
    } else if text.contains("unreachable") || text.contains("not match") {
        ProbeFailureKind::UnexpectedIcmpType
    } else if text.contains("refused") {
        ProbeFailureKind::ConnectionRefused
    } else {
        ProbeFailureKind::Other
    }
}
