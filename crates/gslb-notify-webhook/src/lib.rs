//! Slack and Discord webhook `Notifier` implementations (spec §4.6).
//!
//! ## Trust Level: Untrusted (collaborator)
//!
//! One POST per `notify` call, bounded by a fixed internal timeout. No
//! retries, no queueing, no circuit breaking — the reconciler already
//! treats delivery failure as fire-and-forget.

use async_trait::async_trait;
use gslb_core::state::{Event, EventKind};
use gslb_core::{Error, Result};
use std::time::Duration;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(NOTIFY_TIMEOUT)
        .build()
        .expect("failed to build webhook HTTP client")
}

fn event_summary(event: &Event) -> String {
    let verb = match event.kind {
        EventKind::FailoverDown => "failed over down to",
        EventKind::FailoverAcross => "updated within",
        EventKind::ReturnToPriority => "returned to priority",
    };
    let old_ips: Vec<&str> = {
        let mut v: Vec<&str> = event.old_ips.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    };
    let new_ips: Vec<&str> = {
        let mut v: Vec<&str> = event.new_ips.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    };
    format!(
        "GSLB: `{origin}` ({record_type}) {verb} priority {new_priority} (of {max_priority}). {old:?} -> {new:?}. {reason}",
        origin = event.origin,
        record_type = event.record_type,
        verb = verb,
        new_priority = event.new_priority,
        max_priority = event.max_priority,
        old = old_ips,
        new = new_ips,
        reason = event.reason,
    )
}

/// Delivers transition events to a Slack incoming webhook.
pub struct SlackNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self { webhook_url: webhook_url.into(), client: build_client() }
    }
}

#[async_trait]
impl gslb_core::traits::Notifier for SlackNotifier {
    async fn notify(&self, event: &Event) -> Result<()> {
        let payload = serde_json::json!({ "text": event_summary(event) });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notifier(format!("slack webhook request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::notifier(format!("slack webhook returned status {}", response.status())));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}

/// Delivers transition events to a Discord incoming webhook.
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self { webhook_url: webhook_url.into(), client: build_client() }
    }
}

#[async_trait]
impl gslb_core::traits::Notifier for DiscordNotifier {
    async fn notify(&self, event: &Event) -> Result<()> {
        let payload = serde_json::json!({ "content": event_summary(event) });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notifier(format!("discord webhook request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::notifier(format!("discord webhook returned status {}", response.status())));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gslb_core::config::RecordType;
    use gslb_core::traits::Notifier;
    use std::collections::HashSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_event() -> Event {
        Event {
            origin: "www.example.com".to_string(),
            zone: "example.com".to_string(),
            record_type: RecordType::A,
            old_ips: HashSet::from(["10.0.0.1".to_string()]),
            new_ips: HashSet::from(["10.0.0.2".to_string()]),
            old_priority: Some(100),
            new_priority: 50,
            max_priority: 100,
            reason: "tier 100 lost all healthy IPs".to_string(),
            kind: EventKind::FailoverDown,
            timestamp: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn slack_posts_json_payload_with_text_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(format!("{}/hook", server.uri()));
        notifier.notify(&sample_event()).await.expect("slack notify should succeed");
    }

    #[tokio::test]
    async fn discord_posts_json_payload_with_content_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(format!("{}/hook", server.uri()));
        notifier.notify(&sample_event()).await.expect("discord notify should succeed");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(format!("{}/hook", server.uri()));
        assert!(notifier.notify(&sample_event()).await.is_err());
    }

    #[test]
    fn summary_mentions_origin_and_priority() {
        let summary = event_summary(&sample_event());
        assert!(summary.contains("www.example.com"));
        assert!(summary.contains("50"));
    }
}
