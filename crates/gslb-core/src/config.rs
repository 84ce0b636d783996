//! Configuration types for the GSLB system
//!
//! Defines the on-disk JSON schema (`Raw*` types), the legacy migrations
//! applied while loading it, and the resolved in-memory configuration
//! (`Config`, `Origin`) the rest of the crate consumes.
//!
//! Schema violations and record-type invariant violations are detected here,
//! at load time, and are always fatal.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// DNS record type managed for an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Soa,
}

impl RecordType {
    /// CNAME and SOA are RFC-constrained to a single record; a tier for
    /// these types may contain at most one IP.
    pub fn is_single_record(self) -> bool {
        matches!(self, RecordType::Cname | RecordType::Soa)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Soa => "SOA",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health-check configuration for an origin, tagged by probe transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthCheckSpec {
    Http {
        endpoint: String,
        #[serde(default)]
        host: Option<String>,
        /// Defaults to 80 when unset; origins rarely listen on the scheme's
        /// standard port.
        #[serde(default)]
        port: Option<u16>,
        #[serde(rename = "timeout", default = "default_probe_timeout_secs")]
        timeout_secs: u64,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    Https {
        endpoint: String,
        #[serde(default)]
        host: Option<String>,
        /// Defaults to 443 when unset.
        #[serde(default)]
        port: Option<u16>,
        #[serde(rename = "timeout", default = "default_probe_timeout_secs")]
        timeout_secs: u64,
        #[serde(default)]
        insecure_skip_verify: bool,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    Icmp {
        #[serde(rename = "timeout", default = "default_probe_timeout_secs")]
        timeout_secs: u64,
    },
}

impl HealthCheckSpec {
    pub fn timeout(&self) -> Duration {
        let secs = match self {
            HealthCheckSpec::Http { timeout_secs, .. } => *timeout_secs,
            HealthCheckSpec::Https { timeout_secs, .. } => *timeout_secs,
            HealthCheckSpec::Icmp { timeout_secs, .. } => *timeout_secs,
        };
        Duration::from_secs(secs)
    }
}

fn default_probe_timeout_secs() -> u64 {
    5
}

/// A single priority tier: `ips` are healthy-or-not as a unit, and tiers
/// with a larger `priority` are preferred over tiers with a smaller one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityTier {
    pub priority: i64,
    pub ips: Vec<String>,
}

/// Legacy `priority_failover_ips` entries: either a bare IP string (ordered,
/// declaration-first = highest priority) or an explicit `{ip, priority}`
/// object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LegacyPriorityIp {
    Plain(String),
    Tagged { ip: String, priority: i64 },
}

/// Outbound event notifier configuration, tagged by delivery transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    Slack { webhook_url: String },
    Discord { webhook_url: String },
}

/// One entry in the zone catalog: maps a logical name to a provider zone id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCatalogEntry {
    pub zone_id: String,
    pub name: String,
}

fn default_zone_name() -> String {
    "default".to_string()
}

/// On-disk origin schema, before legacy migration and validation.
#[derive(Debug, Clone, Deserialize)]
struct RawOrigin {
    name: String,
    #[serde(default = "default_zone_name")]
    zone_name: String,
    record_type: RecordType,
    health_check: HealthCheckSpec,
    #[serde(default)]
    priority_levels: Option<Vec<PriorityTier>>,
    #[serde(default)]
    priority_failover_ips: Option<Vec<LegacyPriorityIp>>,
    #[serde(default)]
    failover_ips: Option<Vec<String>>,
    #[serde(default)]
    proxied: bool,
    #[serde(default)]
    return_to_priority: bool,
}

/// On-disk config schema, before legacy migration and validation.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    cloudflare_api_token: String,
    #[serde(default)]
    cloudflare_zones: Vec<ZoneCatalogEntry>,
    #[serde(default)]
    cloudflare_zone_id: Option<String>,
    check_interval_seconds: u64,
    origins: Vec<RawOrigin>,
    #[serde(default)]
    notifications: Vec<NotifierConfig>,
}

/// A fully resolved, validated origin: one `(zone, dns_name, record_type)`
/// triple managed by one reconciler.
#[derive(Debug, Clone)]
pub struct Origin {
    pub name: String,
    pub zone_name: String,
    pub record_type: RecordType,
    pub health_check: HealthCheckSpec,
    /// Sorted descending by priority; an IP appears in at most one tier.
    pub priority_tiers: Vec<PriorityTier>,
    pub proxied: bool,
    pub return_to_priority: bool,
}

impl Origin {
    /// All IPs declared across every tier, in tier-then-declaration order.
    pub fn all_ips(&self) -> impl Iterator<Item = &str> {
        self.priority_tiers.iter().flat_map(|t| t.ips.iter().map(String::as_str))
    }

    pub fn ips_of_tier(&self, priority: i64) -> Option<&[String]> {
        self.priority_tiers
            .iter()
            .find(|t| t.priority == priority)
            .map(|t| t.ips.as_slice())
    }
}

/// Fully resolved GSLB configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub cloudflare_api_token: String,
    pub zones: Vec<ZoneCatalogEntry>,
    pub check_interval: Duration,
    pub origins: Vec<Origin>,
    pub notifications: Vec<NotifierConfig>,
}

impl Config {
    /// Load and validate a config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_str(&text)
    }

    /// Parse and validate a config document from a JSON string.
    pub fn from_str(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(text)
            .map_err(|e| Error::config(format!("invalid config JSON: {e}")))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        if raw.cloudflare_api_token.is_empty() {
            return Err(Error::config("cloudflare_api_token must not be empty"));
        }
        if raw.check_interval_seconds == 0 {
            return Err(Error::config("check_interval_seconds must be > 0"));
        }
        if raw.origins.is_empty() {
            return Err(Error::config("at least one origin must be configured"));
        }

        let zones = if raw.cloudflare_zones.is_empty() {
            match raw.cloudflare_zone_id {
                Some(zone_id) if !zone_id.is_empty() => {
                    vec![ZoneCatalogEntry { zone_id, name: "default".to_string() }]
                }
                _ => {
                    return Err(Error::config(
                        "either cloudflare_zones or cloudflare_zone_id must be set",
                    ));
                }
            }
        } else {
            raw.cloudflare_zones
        };

        let mut origins = Vec::with_capacity(raw.origins.len());
        for raw_origin in raw.origins {
            if !zones.iter().any(|z| z.name == raw_origin.zone_name) {
                return Err(Error::config(format!(
                    "origin '{}' references unknown zone '{}'",
                    raw_origin.name, raw_origin.zone_name
                )));
            }

            let priority_tiers = resolve_priority_tiers(&raw_origin)?;

            if raw_origin.record_type.is_single_record() {
                if let Some(bad) = priority_tiers.iter().find(|t| t.ips.len() > 1) {
                    return Err(Error::config(format!(
                        "origin '{}' has record_type {} but priority tier {} carries {} IPs \
                         (single-record types allow at most one IP per tier)",
                        raw_origin.name,
                        raw_origin.record_type,
                        bad.priority,
                        bad.ips.len()
                    )));
                }
            }

            origins.push(Origin {
                name: raw_origin.name,
                zone_name: raw_origin.zone_name,
                record_type: raw_origin.record_type,
                health_check: raw_origin.health_check,
                priority_tiers,
                proxied: raw_origin.proxied,
                return_to_priority: raw_origin.return_to_priority,
            });
        }

        Ok(Config {
            cloudflare_api_token: raw.cloudflare_api_token,
            zones,
            check_interval: Duration::from_secs(raw.check_interval_seconds),
            origins,
            notifications: raw.notifications,
        })
    }
}

/// Resolve an origin's tiers from whichever of `priority_levels`,
/// `priority_failover_ips`, and `failover_ips` it declares.
///
/// `priority_levels` wins outright if present. Otherwise
/// `priority_failover_ips` is migrated per the adopted legacy convention
/// (declaration-first = highest priority). `failover_ips`, when present, is
/// always appended as one extra tier below whatever tiers were already
/// resolved.
fn resolve_priority_tiers(raw: &RawOrigin) -> Result<Vec<PriorityTier>> {
    let mut tiers: Vec<PriorityTier> = if let Some(levels) = &raw.priority_levels {
        levels.clone()
    } else if let Some(legacy) = &raw.priority_failover_ips {
        migrate_legacy_priority_failover_ips(legacy)
    } else {
        Vec::new()
    };

    if let Some(failover) = &raw.failover_ips {
        if !failover.is_empty() {
            let lowest = tiers.iter().map(|t| t.priority).min().unwrap_or(1);
            tiers.push(PriorityTier { priority: lowest - 1, ips: failover.clone() });
        }
    }

    if tiers.is_empty() {
        return Err(Error::config(format!(
            "origin '{}' has no priority tiers (set priority_levels, priority_failover_ips, \
             or failover_ips)",
            raw.name
        )));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for tier in &tiers {
        for ip in &tier.ips {
            if !seen.insert(ip.as_str()) {
                return Err(Error::config(format!(
                    "origin '{}' lists ip '{}' in more than one priority tier",
                    raw.name, ip
                )));
            }
        }
    }

    tiers.sort_by(|a, b| b.priority.cmp(&a.priority));
    Ok(tiers)
}

fn migrate_legacy_priority_failover_ips(legacy: &[LegacyPriorityIp]) -> Vec<PriorityTier> {
    let n = legacy.len();
    let mut by_priority: BTreeMap<i64, Vec<String>> = BTreeMap::new();

    for (idx, entry) in legacy.iter().enumerate() {
        match entry {
            LegacyPriorityIp::Plain(ip) => {
                // First-declared = highest priority.
                let priority = (n - 1 - idx) as i64;
                by_priority.entry(priority).or_default().push(ip.clone());
            }
            LegacyPriorityIp::Tagged { ip, priority } => {
                by_priority.entry(*priority).or_default().push(ip.clone());
            }
        }
    }

    by_priority
        .into_iter()
        .map(|(priority, ips)| PriorityTier { priority, ips })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_json(extra_origin_fields: &str) -> String {
        format!(
            r#"{{
                "cloudflare_api_token": "test-token",
                "cloudflare_zones": [{{"zone_id": "zone1", "name": "primary"}}],
                "check_interval_seconds": 30,
                "origins": [
                    {{
                        "name": "www.example.com",
                        "zone_name": "primary",
                        "record_type": "A",
                        "health_check": {{"type": "http", "endpoint": "/healthz", "timeout": 3}},
                        {extra_origin_fields}
                    }}
                ]
            }}"#
        )
    }

    #[test]
    fn parses_priority_levels() {
        let json = base_json(
            r#""priority_levels": [
                {"priority": 100, "ips": ["10.0.0.1", "10.0.0.2"]},
                {"priority": 50, "ips": ["10.0.0.3"]}
            ]"#,
        );
        let cfg = Config::from_str(&json).unwrap();
        let origin = &cfg.origins[0];
        assert_eq!(origin.priority_tiers[0].priority, 100);
        assert_eq!(origin.priority_tiers[1].priority, 50);
    }

    #[test]
    fn migrates_legacy_priority_failover_ips_plain_list() {
        let json = base_json(r#""priority_failover_ips": ["10.0.0.1", "10.0.0.2", "10.0.0.3"]"#);
        let cfg = Config::from_str(&json).unwrap();
        let tiers = &cfg.origins[0].priority_tiers;
        assert_eq!(tiers[0].priority, 2);
        assert_eq!(tiers[0].ips, vec!["10.0.0.1"]);
        assert_eq!(tiers[2].priority, 0);
        assert_eq!(tiers[2].ips, vec!["10.0.0.3"]);
    }

    #[test]
    fn migrates_legacy_priority_failover_ips_tagged_objects() {
        let json = base_json(
            r#""priority_failover_ips": [
                {"ip": "10.0.0.1", "priority": 10},
                {"ip": "10.0.0.2", "priority": 10},
                {"ip": "10.0.0.3", "priority": 1}
            ]"#,
        );
        let cfg = Config::from_str(&json).unwrap();
        let tiers = &cfg.origins[0].priority_tiers;
        assert_eq!(tiers[0].priority, 10);
        assert_eq!(tiers[0].ips.len(), 2);
        assert_eq!(tiers[1].priority, 1);
    }

    #[test]
    fn failover_ips_appends_lowest_tier() {
        let json = base_json(
            r#""priority_levels": [{"priority": 100, "ips": ["10.0.0.1"]}],
               "failover_ips": ["10.0.0.9"]"#,
        );
        let cfg = Config::from_str(&json).unwrap();
        let tiers = &cfg.origins[0].priority_tiers;
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[1].priority, 99);
        assert_eq!(tiers[1].ips, vec!["10.0.0.9"]);
    }

    #[test]
    fn deprecated_zone_id_synthesizes_default_zone() {
        let json = r#"{
            "cloudflare_api_token": "test-token",
            "cloudflare_zone_id": "zone1",
            "check_interval_seconds": 30,
            "origins": [
                {
                    "name": "www.example.com",
                    "record_type": "A",
                    "health_check": {"type": "http", "endpoint": "/healthz"},
                    "priority_levels": [{"priority": 100, "ips": ["10.0.0.1"]}]
                }
            ]
        }"#;
        let cfg = Config::from_str(json).unwrap();
        assert_eq!(cfg.zones.len(), 1);
        assert_eq!(cfg.zones[0].name, "default");
        assert_eq!(cfg.origins[0].zone_name, "default");
    }

    #[test]
    fn single_record_type_with_multi_ip_tier_is_fatal() {
        let json = format!(
            r#"{{
                "cloudflare_api_token": "test-token",
                "cloudflare_zones": [{{"zone_id": "zone1", "name": "primary"}}],
                "check_interval_seconds": 30,
                "origins": [
                    {{
                        "name": "cname.example.com",
                        "zone_name": "primary",
                        "record_type": "CNAME",
                        "health_check": {{"type": "http", "endpoint": "/healthz"}},
                        "priority_levels": [{{"priority": 10, "ips": ["x", "y"]}}]
                    }}
                ]
            }}"#
        );
        let err = Config::from_str(&json).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("cname.example.com"));
    }

    #[test]
    fn unknown_zone_reference_is_fatal() {
        let json = base_json(
            r#""priority_levels": [{"priority": 100, "ips": ["10.0.0.1"]}], "zone_name": "missing""#,
        );
        let err = Config::from_str(&json).unwrap_err();
        assert!(err.to_string().contains("unknown zone"));
    }

    #[test]
    fn from_file_reads_and_validates_a_config_on_disk() {
        let json = base_json(
            r#""priority_levels": [{"priority": 100, "ips": ["10.0.0.1"]}]"#,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gslb.json");
        std::fs::write(&path, json).unwrap();

        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.origins[0].name, "www.example.com");
    }

    #[test]
    fn from_file_missing_path_is_fatal() {
        let err = Config::from_file("/nonexistent/gslb.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn duplicate_ip_across_tiers_is_fatal() {
        let json = base_json(
            r#""priority_levels": [
                {"priority": 100, "ips": ["10.0.0.1"]},
                {"priority": 50, "ips": ["10.0.0.1"]}
            ]"#,
        );
        let err = Config::from_str(&json).unwrap_err();
        assert!(err.to_string().contains("more than one priority tier"));
    }
}
