//! Prometheus metric derivation.
//!
//! One [`Metrics`] instance owns the registry (namespace `curiemetric`) and
//! is shared by the sender and every sink. `add` is invoked once per record
//! on the intake task, before fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::entities::AccessLog;

const NAMESPACE: &str = "curiemetric";

lazy_static! {
    /// Tag prefixes whose value surfaces as a `session_details_total` label
    /// dimension rather than a `session_tags_total` entry.
    static ref STATIC_TAGS: Vec<&'static str> = vec![
        "ip",
        "asn",
        "geo",
        "aclid",
        "aclname",
        "wafid",
        "wafname",
        "urlmap",
        "urlmap-entry",
        "container",
    ];
}

const SESSION_LABELS: &[&str] = &[
    "status_code",
    "status_class",
    "origin",
    "origin_status_code",
    "origin_status_class",
    "method",
    "path",
    "blocked",
    "asn",
    "geo",
    "aclid",
    "aclname",
    "wafid",
    "wafname",
    "urlmap",
    "urlmap_entry",
    "container",
];

pub struct Metrics {
    registry: Registry,
    on: bool,

    request_counter: IntCounter,
    request_bytes: IntCounter,
    response_bytes: IntCounter,
    session_details: IntCounterVec,
    session_tags: IntCounterVec,

    pub(crate) dropped_log_entries: IntCounterVec,
    pub(crate) logger_latency: HistogramVec,
}

impl Metrics {
    /// Builds the full metric set on a fresh registry. When `on` is false,
    /// `add` is a no-op; drop and latency accounting stay live either way.
    pub fn new(on: bool) -> Arc<Metrics> {
        let registry = Registry::new();

        let request_counter = IntCounter::with_opts(
            Opts::new("http_request_total", "Total number of HTTP requests")
                .namespace(NAMESPACE),
        )
        .unwrap();
        let request_bytes = IntCounter::with_opts(
            Opts::new("request_bytes", "The total number of request bytes").namespace(NAMESPACE),
        )
        .unwrap();
        let response_bytes = IntCounter::with_opts(
            Opts::new("response_bytes", "The total number of response bytes").namespace(NAMESPACE),
        )
        .unwrap();
        let session_details = IntCounterVec::new(
            Opts::new("session_details_total", "number of requests per label")
                .namespace(NAMESPACE),
            SESSION_LABELS,
        )
        .unwrap();
        let session_tags = IntCounterVec::new(
            Opts::new("session_tags_total", "Number of requests per label").namespace(NAMESPACE),
            &["tag"],
        )
        .unwrap();
        let dropped_log_entries = IntCounterVec::new(
            Opts::new(
                "dropped_log_entries",
                "number of dropped log entries per sink",
            )
            .namespace(NAMESPACE),
            &["sink"],
        )
        .unwrap();
        let logger_latency = HistogramVec::new(
            HistogramOpts::new("logger_latency", "latency per sink").namespace(NAMESPACE),
            &["sink"],
        )
        .unwrap();

        for collector in [
            Box::new(request_counter.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(request_bytes.clone()),
            Box::new(response_bytes.clone()),
            Box::new(session_details.clone()),
            Box::new(session_tags.clone()),
            Box::new(dropped_log_entries.clone()),
            Box::new(logger_latency.clone()),
        ] {
            registry.register(collector).unwrap();
        }

        Arc::new(Metrics {
            registry,
            on,
            request_counter,
            request_bytes,
            response_bytes,
            session_details,
            session_tags,
            dropped_log_entries,
            logger_latency,
        })
    }

    pub fn enabled(&self) -> bool {
        self.on
    }

    /// Derives all per-record series. Pure counter mutation, never blocks.
    pub fn add(&self, log: &AccessLog) {
        if !self.on {
            return;
        }
        self.request_counter.inc();
        self.request_bytes
            .inc_by(log.request.headersbytes + log.request.bodybytes);
        self.response_bytes
            .inc_by(log.response.headersbytes + log.response.bodybytes);

        let labels = session_labels(
            log.response.code,
            &log.request.attributes.method,
            &log.request.attributes.uri,
            &log.upstream.remoteaddress,
            log.blocked,
            &log.tags,
        );
        self.session_details
            .with(&labels.iter().map(|(k, v)| (*k, v.as_str())).collect())
            .inc();

        for tag in &log.tags {
            if !is_static_tag(tag) {
                self.session_tags.with_label_values(&[tag.as_str()]).inc();
            }
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

/// Router serving `/metrics` (mounted when the Prometheus exporter is
/// enabled).
pub fn build_router(metrics: Arc<Metrics>) -> axum::Router<()> {
    use axum::routing::get;

    axum::Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(metrics)
}

async fn prometheus_metrics(
    axum::extract::State(metrics): axum::extract::State<Arc<Metrics>>,
) -> (axum::http::StatusCode, String) {
    match metrics.render() {
        Err(e) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Ok(result) => (axum::http::StatusCode::OK, result),
    }
}

pub fn status_class(code: i32) -> &'static str {
    match code {
        100..=199 => "status_1xx",
        200..=299 => "status_2xx",
        300..=399 => "status_3xx",
        400..=499 => "status_4xx",
        500..=599 => "status_5xx",
        _ => "status_Nxx",
    }
}

pub fn is_static_tag(tag: &str) -> bool {
    if tag == "all" {
        return true;
    }
    match tag.split_once(':') {
        Some((prefix, _)) => STATIC_TAGS.contains(&prefix),
        None => false,
    }
}

fn tag_map(tags: &[String]) -> HashMap<&str, &str> {
    let mut map = HashMap::new();
    for tag in tags {
        if let Some((prefix, value)) = tag.split_once(':') {
            map.insert(prefix, value);
        }
    }
    map
}

fn session_labels(
    code: i32,
    method: &str,
    path: &str,
    upstream: &str,
    blocked: bool,
    tags: &[String],
) -> Vec<(&'static str, String)> {
    let class = status_class(code);
    let status_code = code.to_string();

    let (origin, origin_status_code, origin_status_class) = if upstream.is_empty() {
        ("N/A".to_string(), "N/A".to_string(), "N/A".to_string())
    } else {
        (
            upstream.to_string(),
            format!("origin_{status_code}"),
            format!("origin_{class}"),
        )
    };

    let tm = tag_map(tags);
    let tag = |prefix: &str| tm.get(prefix).copied().unwrap_or_default().to_string();

    vec![
        ("status_code", status_code),
        ("status_class", class.to_string()),
        ("origin", origin),
        ("origin_status_code", origin_status_code),
        ("origin_status_class", origin_status_class),
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("blocked", blocked.to_string()),
        ("asn", tag("asn")),
        ("geo", tag("geo")),
        ("aclid", tag("aclid")),
        ("aclname", tag("aclname")),
        ("wafid", tag("wafid")),
        ("wafname", tag("wafname")),
        ("urlmap", tag("urlmap")),
        ("urlmap_entry", tag("urlmap-entry")),
        ("container", tag("container")),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> AccessLog {
        serde_json::from_str(
            r#"{"timestamp":"2024-01-01T00:00:00Z",
                "response":{"code":200,"bodybytes":10,"headersbytes":5},
                "request":{"headersbytes":1,"bodybytes":0,
                           "attributes":{"method":"GET","uri":"/"}},
                "tags":["asn:1","x:y"],"blocked":false}"#,
        )
        .unwrap()
    }

    #[test]
    fn status_classes() {
        let cases = [
            (199, "status_1xx"),
            (200, "status_2xx"),
            (299, "status_2xx"),
            (300, "status_3xx"),
            (399, "status_3xx"),
            (400, "status_4xx"),
            (499, "status_4xx"),
            (500, "status_5xx"),
            (599, "status_5xx"),
            (600, "status_Nxx"),
        ];
        for (code, expect) in cases {
            assert_eq!(status_class(code), expect, "code {code}");
        }
    }

    #[test]
    fn static_tag_detection() {
        assert!(is_static_tag("all"));
        assert!(is_static_tag("asn:13335"));
        assert!(is_static_tag("urlmap-entry:/api"));
        assert!(!is_static_tag("custom:foo"));
        assert!(!is_static_tag("bare"));
    }

    #[test]
    fn derives_request_series() {
        let metrics = Metrics::new(true);
        metrics.add(&sample());

        assert_eq!(metrics.request_counter.get(), 1);
        assert_eq!(metrics.request_bytes.get(), 1);
        assert_eq!(metrics.response_bytes.get(), 15);

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("curiemetric_http_request_total 1"));
        assert!(rendered.contains(r#"status_code="200""#));
        assert!(rendered.contains(r#"status_class="status_2xx""#));
        assert!(rendered.contains(r#"asn="1""#));
        assert!(rendered.contains(r#"method="GET""#));
        assert!(rendered.contains(r#"path="/""#));
        assert!(rendered.contains(r#"blocked="false""#));
    }

    #[test]
    fn reserved_tags_do_not_count() {
        let metrics = Metrics::new(true);
        let mut log = sample();
        log.tags = vec![
            "asn:13335".to_string(),
            "custom:foo".to_string(),
            "all".to_string(),
        ];
        metrics.add(&log);

        assert_eq!(
            metrics.session_tags.with_label_values(&["custom:foo"]).get(),
            1
        );
        // Only the one non-static tag produced a series.
        let families = metrics.registry.gather();
        let tags = families
            .iter()
            .find(|f| f.get_name() == "curiemetric_session_tags_total")
            .unwrap();
        assert_eq!(tags.get_metric().len(), 1);
    }

    #[test]
    fn origin_labels_follow_upstream_presence() {
        let no_upstream = session_labels(503, "GET", "/", "", true, &[]);
        assert!(no_upstream.contains(&("origin", "N/A".to_string())));
        assert!(no_upstream.contains(&("origin_status_code", "N/A".to_string())));

        let with_upstream = session_labels(503, "GET", "/", "10.0.0.9", true, &[]);
        assert!(with_upstream.contains(&("origin", "10.0.0.9".to_string())));
        assert!(with_upstream.contains(&("origin_status_code", "origin_503".to_string())));
        assert!(with_upstream.contains(&("origin_status_class", "origin_status_5xx".to_string())));
    }

    #[test]
    fn disabled_metrics_do_not_record() {
        let metrics = Metrics::new(false);
        metrics.add(&sample());
        assert_eq!(metrics.request_counter.get(), 0);
    }
}
