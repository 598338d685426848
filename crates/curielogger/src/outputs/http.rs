//! HTTP POST sinks: logstash, webhook and fluentd-compatible collectors.
//!
//! All three POST one document per record to a fixed URL and treat any
//! transport error or non-2xx response as an insert failure (logged and
//! dropped by the worker; no per-record retry).

use async_trait::async_trait;

use super::{Driver, QueuedOutput};
use crate::config::{LogstashConfig, WebhookConfig};
use crate::entities::{AccessLog, MARKER_TAG};
use crate::metrics::Metrics;

enum Encoding {
    /// `application/json` body; the marker tag is appended to the
    /// serialized copy of `tags`.
    TaggedJson,
    /// `application/x-www-form-urlencoded` body with a single `json=` field.
    Form,
}

struct HttpSink {
    client: reqwest::Client,
    url: String,
    encoding: Encoding,
}

pub fn logstash(cfg: &LogstashConfig, capacity: usize, metrics: &Metrics) -> QueuedOutput {
    tracing::info!(url = cfg.url, "initialized logstash");
    tracing::warn!("the logstash output is deprecated and will be removed in a future release");
    QueuedOutput::spawn(
        "logstash",
        HttpSink {
            client: reqwest::Client::new(),
            url: cfg.url.clone(),
            encoding: Encoding::TaggedJson,
        },
        capacity,
        metrics,
    )
}

pub fn webhook(cfg: &WebhookConfig, capacity: usize, metrics: &Metrics) -> QueuedOutput {
    tracing::info!(url = cfg.url, "initialized webhook");
    QueuedOutput::spawn(
        "webhook",
        HttpSink {
            client: reqwest::Client::new(),
            url: cfg.url.clone(),
            encoding: Encoding::TaggedJson,
        },
        capacity,
        metrics,
    )
}

pub fn fluentd(base_url: &str, capacity: usize, metrics: &Metrics) -> QueuedOutput {
    tracing::info!("initialized fluentd");
    QueuedOutput::spawn(
        "fluentd",
        HttpSink {
            client: reqwest::Client::new(),
            url: format!("{base_url}curiefense.log"),
            encoding: Encoding::Form,
        },
        capacity,
        metrics,
    )
}

/// Serialization shipped by the tagged-JSON sinks: the record itself stays
/// untouched, the marker tag only exists in this copy.
fn tagged_serialization(entry: &AccessLog) -> anyhow::Result<serde_json::Value> {
    let mut doc = serde_json::to_value(entry)?;
    match doc
        .get_mut("tags")
        .and_then(serde_json::Value::as_array_mut)
    {
        Some(tags) => tags.push(serde_json::Value::String(MARKER_TAG.to_string())),
        None => anyhow::bail!("serialized record has no tags array"),
    }
    Ok(doc)
}

#[async_trait]
impl Driver for HttpSink {
    async fn insert_entry(&mut self, entry: &AccessLog) -> anyhow::Result<()> {
        let response = match &self.encoding {
            Encoding::TaggedJson => {
                self.client
                    .post(&self.url)
                    .json(&tagged_serialization(entry)?)
                    .send()
                    .await?
            }
            Encoding::Form => {
                let doc = serde_json::to_string(entry)?;
                self.client
                    .post(&self.url)
                    .form(&[("json", doc)])
                    .send()
                    .await?
            }
        };
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{} returned {status}", self.url);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn marker_tag_lands_in_copy_only() {
        let mut log = AccessLog::default();
        log.tags = vec!["asn:1".to_string()];

        let doc = tagged_serialization(&log).unwrap();
        assert_eq!(
            doc["tags"],
            serde_json::json!(["asn:1", "curieaccesslog"])
        );
        // The record itself is untouched.
        assert_eq!(log.tags, vec!["asn:1"]);
    }

    #[test]
    fn default_record_still_carries_tags_array() {
        let doc = tagged_serialization(&AccessLog::default()).unwrap();
        assert_eq!(doc["tags"], serde_json::json!(["curieaccesslog"]));
    }
}
