//! Elasticsearch sink.
//!
//! Indexes each record into the configured index. Construction kicks off a
//! best-effort bootstrap task (ILM policy, index template, first concrete
//! index, Kibana saved objects) that retries while the cluster comes up but
//! never blocks or fails ingestion.

use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::http::transport::Transport;
use elasticsearch::ilm::{IlmGetLifecycleParts, IlmPutLifecycleParts};
use elasticsearch::indices::{
    IndicesCreateParts, IndicesExistsIndexTemplateParts, IndicesExistsParts,
    IndicesPutIndexTemplateParts,
};
use elasticsearch::params::Refresh;
use elasticsearch::{Elasticsearch, IndexParts};

use super::{Driver, QueuedOutput};
use crate::config::ElasticsearchConfig;
use crate::entities::AccessLog;
use crate::metrics::Metrics;

const ILM_POLICY: &str = include_str!("../../assets/ilm_policy.json");
const INDEX_TEMPLATE: &str = include_str!("../../assets/es_index_template.json");
const INDEX_SETTINGS: &str = include_str!("../../assets/index_settings.json");
const DASHBOARD: &str = include_str!("../../assets/dashboard.ndjson");

const BOOTSTRAP_ATTEMPTS: usize = 60;
const BOOTSTRAP_DELAY: Duration = Duration::from_secs(5);

pub fn new_output(
    cfg: &ElasticsearchConfig,
    capacity: usize,
    metrics: &Metrics,
) -> anyhow::Result<QueuedOutput> {
    let transport = Transport::single_node(&cfg.url)?;
    let client = Elasticsearch::new(transport);
    tracing::info!(url = cfg.url, "initialized es");
    tracing::warn!(
        "the elasticsearch output is deprecated and will be removed in a future release"
    );

    if cfg.initialize {
        tokio::spawn(bootstrap(client.clone(), cfg.clone()));
    }

    let driver = EsSink {
        client,
        index: cfg.accesslog_index_name.clone(),
    };
    Ok(QueuedOutput::spawn("elasticsearch", driver, capacity, metrics))
}

struct EsSink {
    client: Elasticsearch,
    index: String,
}

#[async_trait]
impl Driver for EsSink {
    async fn insert_entry(&mut self, entry: &AccessLog) -> anyhow::Result<()> {
        let response = self
            .client
            .index(IndexParts::Index(&self.index))
            .refresh(Refresh::True)
            .body(entry)
            .send()
            .await?;
        let status = response.status_code();
        if !status.is_success() {
            anyhow::bail!("elasticsearch returned {status}");
        }
        Ok(())
    }
}

fn render(asset: &str, index_name: &str) -> serde_json::Value {
    serde_json::from_str(&asset.replace("{index_name}", index_name))
        .expect("embedded asset is valid JSON")
}

async fn bootstrap(client: Elasticsearch, cfg: ElasticsearchConfig) {
    let name = cfg.accesslog_index_name.clone();

    // The cluster may still be starting; the ILM probe doubles as the
    // readiness check.
    let mut policies = None;
    for _ in 0..BOOTSTRAP_ATTEMPTS {
        match client
            .ilm()
            .get_lifecycle(IlmGetLifecycleParts::None)
            .send()
            .await
        {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => {
                    policies = Some(body);
                    break;
                }
                Err(error) => {
                    tracing::error!(%error, "failed to read the ILM policies (retrying in 5s)")
                }
            },
            Err(error) => {
                tracing::error!(%error, "failed to query the ILM policies (retrying in 5s)")
            }
        }
        tokio::time::sleep(BOOTSTRAP_DELAY).await;
    }
    let Some(policies) = policies else {
        tracing::error!("giving up on elasticsearch bootstrap");
        return;
    };

    if cfg.overwrite || policies.get(&name).is_none() {
        tracing::debug!(index = name, "creating / overwriting elasticsearch ilm policy");
        let policy = if cfg.ilm_policy.is_empty() {
            render(ILM_POLICY, &name)
        } else {
            match serde_json::from_str(&cfg.ilm_policy) {
                Ok(policy) => policy,
                Err(error) => {
                    tracing::error!(%error, "configured ilm_policy is not valid JSON, using the default");
                    render(ILM_POLICY, &name)
                }
            }
        };
        match client
            .ilm()
            .put_lifecycle(IlmPutLifecycleParts::Policy(&name))
            .body(policy)
            .send()
            .await
        {
            Ok(response) if !response.status_code().is_success() => {
                tracing::error!(status = %response.status_code(), "ilm policy creation failed")
            }
            Ok(_) => (),
            Err(error) => tracing::error!(%error, "ilm policy creation failed"),
        }
    }

    // The index template binds the mapping, the ILM policy and the rollover
    // alias to indices or data streams; there should always be one.
    let template_missing = match client
        .indices()
        .exists_index_template(IndicesExistsIndexTemplateParts::Name(&name))
        .send()
        .await
    {
        Ok(response) => !response.status_code().is_success(),
        Err(error) => {
            tracing::error!(%error, "failed to query the index template");
            return;
        }
    };
    if cfg.overwrite || template_missing {
        tracing::debug!(index = name, "creating / overwriting elasticsearch index template");
        match client
            .indices()
            .put_index_template(IndicesPutIndexTemplateParts::Name(&name))
            .body(render(INDEX_TEMPLATE, &name))
            .send()
            .await
        {
            Ok(response) if !response.status_code().is_success() => {
                tracing::error!(status = %response.status_code(), "index template creation failed")
            }
            Ok(_) => (),
            Err(error) => tracing::error!(%error, "index template creation failed"),
        }
    }

    // Data streams manage their backing indices themselves. Otherwise the
    // first concrete index has to exist so the write alias and policy attach.
    if !cfg.use_data_stream {
        let index = format!("{name}-000001");
        match client
            .indices()
            .exists(IndicesExistsParts::Index(&[index.as_str()]))
            .send()
            .await
        {
            Ok(response) if response.status_code().is_success() => {
                tracing::debug!(index, "elasticsearch index exists: doing nothing");
            }
            Ok(_) => {
                tracing::debug!(index, "data streams disabled: creating initial index");
                match client
                    .indices()
                    .create(IndicesCreateParts::Index(&index))
                    .body(render(INDEX_SETTINGS, &name))
                    .send()
                    .await
                {
                    Ok(response) if !response.status_code().is_success() => {
                        tracing::error!(status = %response.status_code(), "index creation failed")
                    }
                    Ok(_) => (),
                    Err(error) => tracing::error!(%error, "index creation failed"),
                }
            }
            Err(error) => {
                tracing::error!(%error, "failed to query the initial index");
                return;
            }
        }
    }

    import_kibana_objects(&cfg).await;
}

/// Imports the index pattern and dashboard into Kibana, retrying while it
/// boots. 409 means the objects already exist, which is fine.
async fn import_kibana_objects(cfg: &ElasticsearchConfig) {
    if cfg.kibana_url.is_empty() {
        return;
    }
    let url = format!(
        "{}/api/saved_objects/_import?overwrite=true",
        cfg.kibana_url.trim_end_matches('/')
    );
    let body = DASHBOARD.replace("{index_name}", &cfg.accesslog_index_name);
    let client = reqwest::Client::new();

    for _ in 0..BOOTSTRAP_ATTEMPTS {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::text(body.clone()).file_name("dashboard.ndjson"),
        );
        match client
            .post(&url)
            .header("kbn-xsrf", "true")
            .multipart(form)
            .send()
            .await
        {
            Ok(response) if response.status() == 200 => {
                tracing::debug!(url, "kibana dashboard imported");
                return;
            }
            Ok(response) if response.status() == 409 => {
                tracing::debug!(url, "kibana objects already exist");
                return;
            }
            Ok(response) => tracing::error!(
                url,
                status = %response.status(),
                "kibana import failed (retrying in 5s)"
            ),
            Err(error) => {
                tracing::error!(url, %error, "kibana import failed (retrying in 5s)")
            }
        }
        tokio::time::sleep(BOOTSTRAP_DELAY).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assets_render_with_index_name() {
        let template = render(INDEX_TEMPLATE, "curieaccesslog");
        assert_eq!(
            template["index_patterns"],
            serde_json::json!(["curieaccesslog*"])
        );
        assert_eq!(
            template["template"]["settings"]["index.lifecycle.rollover_alias"],
            serde_json::json!("curieaccesslog")
        );

        let settings = render(INDEX_SETTINGS, "curieaccesslog");
        assert!(settings["aliases"]["curieaccesslog"]["is_write_index"]
            .as_bool()
            .unwrap());

        let policy = render(ILM_POLICY, "curieaccesslog");
        assert!(policy["policy"]["phases"]["hot"].is_object());
    }

    #[test]
    fn dashboard_lines_are_valid_ndjson() {
        let body = DASHBOARD.replace("{index_name}", "curieaccesslog");
        for line in body.lines().filter(|l| !l.is_empty()) {
            let doc: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(doc["type"].is_string());
        }
    }
}
