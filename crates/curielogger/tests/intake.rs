//! End-to-end intake scenarios: a record entering through any listener
//! produces the same metric effects.

use std::sync::Arc;
use std::time::Duration;

use curielogger::metrics::Metrics;
use curielogger::outputs::Tee;
use curielogger::sender::LogSender;
use curielogger::servers;
use proto_envoy::envoy::config::core::v3 as core;
use proto_envoy::envoy::data::accesslog::v3 as accesslog;
use proto_envoy::envoy::service::accesslog::v3 as als;
use tokio::io::AsyncWriteExt;

const DATAGRAM: &str = r#"{"timestamp":"2024-01-01T00:00:00Z","response":{"code":200,"bodybytes":10,"headersbytes":5},"request":{"headersbytes":1,"bodybytes":0,"attributes":{"method":"GET","uri":"/"}},"tags":["asn:1","x:y"],"blocked":false}"#;

fn new_sender() -> (Arc<LogSender>, Arc<Metrics>) {
    let metrics = Metrics::new(true);
    let sender = Arc::new(LogSender::new(Tee::new(Vec::new()), metrics.clone()));
    (sender, metrics)
}

fn metric_value(rendered: &str, name: &str) -> Option<f64> {
    rendered
        .lines()
        .find(|line| line.starts_with(name))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

async fn wait_for_requests(metrics: &Metrics, expect: f64) -> String {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let rendered = metrics.render().unwrap();
        if metric_value(&rendered, "curiemetric_http_request_total") == Some(expect) {
            return rendered;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for ingestion:\n{rendered}"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

fn assert_session_metrics(rendered: &str) {
    assert_eq!(metric_value(rendered, "curiemetric_request_bytes"), Some(1.0));
    assert_eq!(metric_value(rendered, "curiemetric_response_bytes"), Some(15.0));

    let details = rendered
        .lines()
        .find(|line| line.starts_with("curiemetric_session_details_total"))
        .expect("a session_details_total series");
    for label in [
        r#"status_code="200""#,
        r#"status_class="status_2xx""#,
        r#"asn="1""#,
        r#"method="GET""#,
        r#"path="/""#,
        r#"blocked="false""#,
        r#"origin="N/A""#,
    ] {
        assert!(details.contains(label), "{label} missing in {details}");
    }

    assert_eq!(
        metric_value(rendered, r#"curiemetric_session_tags_total{tag="x:y"}"#),
        Some(1.0)
    );
    // The static tag never shows up as its own series.
    assert!(!rendered.contains(r#"tag="asn:1""#));
}

#[tokio::test]
async fn udp_datagram_is_metered() {
    let (sender, metrics) = new_sender();
    let addr = format!("127.0.0.1:{}", portpicker::pick_unused_port().unwrap());

    tokio::spawn({
        let sender = sender.clone();
        let addr = addr.clone();
        async move {
            let _ = servers::udp::serve(&addr, sender).await;
        }
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(DATAGRAM.as_bytes(), &addr).await.unwrap();

    let rendered = wait_for_requests(&metrics, 1.0).await;
    assert_session_metrics(&rendered);
}

#[tokio::test]
async fn grpc_stream_is_metered() {
    let (sender, metrics) = new_sender();
    let addr = format!("127.0.0.1:{}", portpicker::pick_unused_port().unwrap());

    tokio::spawn({
        let sender = sender.clone();
        let addr: std::net::SocketAddr = addr.parse().unwrap();
        async move {
            let _ = servers::grpc::serve(addr, sender, std::future::pending()).await;
        }
    });

    let endpoint = format!("http://{addr}");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let mut client = loop {
        match als::access_log_service_client::AccessLogServiceClient::connect(endpoint.clone())
            .await
        {
            Ok(client) => break client,
            Err(error) => {
                assert!(
                    tokio::time::Instant::now() < deadline,
                    "gRPC server never came up: {error}"
                );
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    };

    let message = als::StreamAccessLogsMessage {
        identifier: None,
        log_entries: Some(als::stream_access_logs_message::LogEntries::HttpLogs(
            als::stream_access_logs_message::HttpAccessLogEntries {
                log_entry: vec![http_log_entry()],
            },
        )),
    };
    client
        .stream_access_logs(tokio_stream::iter(vec![message]))
        .await
        .unwrap();

    let rendered = wait_for_requests(&metrics, 1.0).await;
    assert_session_metrics(&rendered);
}

#[tokio::test]
async fn syslog_enforces_the_nginx_prefix() {
    let (sender, metrics) = new_sender();
    let addr = format!("127.0.0.1:{}", portpicker::pick_unused_port().unwrap());

    tokio::spawn({
        let sender = sender.clone();
        let addr = addr.clone();
        async move {
            let _ = servers::syslog::serve(&addr, sender).await;
        }
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut stream = tokio::net::TcpStream::connect(&addr).await.unwrap();
    let frames = format!(
        "<190>Jan  2 15:04:05 gateway cron: {DATAGRAM}\n<190>Jan  2 15:04:05 gateway nginx: {DATAGRAM}\n"
    );
    stream.write_all(frames.as_bytes()).await.unwrap();
    stream.flush().await.unwrap();

    let rendered = wait_for_requests(&metrics, 1.0).await;
    assert_session_metrics(&rendered);

    // The non-nginx frame stays dropped.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let rendered = metrics.render().unwrap();
    assert_eq!(
        metric_value(&rendered, "curiemetric_http_request_total"),
        Some(1.0)
    );
}

fn http_log_entry() -> accesslog::HttpAccessLogEntry {
    let request_info = serde_json::json!({
        "headers": {},
        "cookies": {},
        "geo": {},
        "arguments": {},
        "attributes": {"method": "GET", "uri": "/"},
        "blocked": false,
        "block_reason": {},
        "tags": ["asn:1", "x:y"]
    })
    .to_string();

    let fields: std::collections::BTreeMap<String, pbjson_types::Value> = [(
        "request.info".to_string(),
        pbjson_types::Value {
            kind: Some(pbjson_types::value::Kind::StringValue(request_info)),
        },
    )]
    .into_iter()
    .collect();

    accesslog::HttpAccessLogEntry {
        common_properties: Some(accesslog::AccessLogCommon {
            start_time: Some(pbjson_types::Timestamp {
                seconds: 1_704_067_200,
                nanos: 0,
            }),
            metadata: Some(core::Metadata {
                filter_metadata: [(
                    "com.reblaze.curiefense".to_string(),
                    pbjson_types::Struct {
                        fields: fields.into_iter().collect(),
                    },
                )]
                .into_iter()
                .collect(),
            }),
            ..Default::default()
        }),
        request: Some(accesslog::HttpRequestProperties {
            request_headers_bytes: 1,
            request_body_bytes: 0,
            ..Default::default()
        }),
        response: Some(accesslog::HttpResponseProperties {
            response_code: Some(pbjson_types::UInt32Value { value: 200 }),
            response_headers_bytes: 5,
            response_body_bytes: 10,
            ..Default::default()
        }),
        ..Default::default()
    }
}
