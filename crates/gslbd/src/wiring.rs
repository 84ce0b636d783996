//! Construction of concrete collaborators (gateway, probe, notifier) from
//! a loaded [`gslb_core::Config`], and assembly into a [`gslb_core::Scheduler`].
//!
//! This is pure wiring: no reconciliation logic lives here, only the
//! mapping from declarative config to trait objects.

use anyhow::{Context, Result, bail};
use gslb_core::config::{Config, HealthCheckSpec, NotifierConfig, Origin};
use gslb_core::traits::{DnsGateway, Notifier, Probe};
use gslb_core::{Reconciler, Scheduler};
use gslb_notify_webhook::{DiscordNotifier, SlackNotifier};
use gslb_probe_http::HttpProbe;
use gslb_probe_icmp::IcmpProbe;
use gslb_provider_cloudflare::CloudflareGateway;
use std::collections::HashMap;
use std::sync::Arc;

/// Build one gateway per zone in the catalog, keyed by zone name.
fn build_gateways(config: &Config, dry_run: bool) -> HashMap<String, Arc<dyn DnsGateway>> {
    config
        .zones
        .iter()
        .map(|zone| {
            let gateway: Arc<dyn DnsGateway> =
                Arc::new(CloudflareGateway::new(config.cloudflare_api_token.clone(), zone.zone_id.clone(), dry_run));
            (zone.name.clone(), gateway)
        })
        .collect()
}

fn build_probe(spec: &HealthCheckSpec) -> Result<Arc<dyn Probe>> {
    match spec {
        HealthCheckSpec::Http { .. } | HealthCheckSpec::Https { .. } => {
            Ok(Arc::new(HttpProbe::from_spec(spec).context("building HTTP probe")?))
        }
        HealthCheckSpec::Icmp { .. } => Ok(Arc::new(IcmpProbe::from_spec(spec).context("building ICMP probe")?)),
    }
}

fn build_notifiers(configs: &[NotifierConfig]) -> Vec<Arc<dyn Notifier>> {
    configs
        .iter()
        .map(|cfg| -> Arc<dyn Notifier> {
            match cfg {
                NotifierConfig::Slack { webhook_url } => Arc::new(SlackNotifier::new(webhook_url.clone())),
                NotifierConfig::Discord { webhook_url } => Arc::new(DiscordNotifier::new(webhook_url.clone())),
            }
        })
        .collect()
}

fn build_reconciler(
    origin: &Origin,
    gateways: &HashMap<String, Arc<dyn DnsGateway>>,
    notifiers: &[Arc<dyn Notifier>],
) -> Result<Reconciler> {
    let gateway = gateways
        .get(&origin.zone_name)
        .cloned()
        .with_context(|| format!("origin '{}' references unknown zone '{}'", origin.name, origin.zone_name))?;
    let probe = build_probe(&origin.health_check)
        .with_context(|| format!("origin '{}': failed to construct probe", origin.name))?;

    Ok(Reconciler::new(origin, gateway, probe, notifiers.to_vec()))
}

/// Assemble a [`Scheduler`] from a loaded config. `dry_run` routes the
/// Cloudflare gateway into its log-only mode (no record mutation).
pub fn build_scheduler(config: &Config, dry_run: bool) -> Result<Scheduler> {
    if config.origins.is_empty() {
        bail!("config declares no origins");
    }

    let gateways = build_gateways(config, dry_run);
    let notifiers = build_notifiers(&config.notifications);

    let reconcilers = config
        .origins
        .iter()
        .map(|origin| build_reconciler(origin, &gateways, &notifiers))
        .collect::<Result<Vec<_>>>()?;

    Ok(Scheduler::new(reconcilers, config.check_interval))
}
